// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// Symbol sets driving conditional-block resolution.

use std::collections::BTreeSet;
use std::fmt;

use crate::core::error::{FilterError, FilterErrorKind};
use crate::core::text_utils::to_upper;

/// A conditional-compilation name, upper-cased on construction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(name: &str) -> Self {
        Self(to_upper(name.trim()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol::new(name)
    }
}

/// Ordered set of symbols; ordering keeps log output stable between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolSet {
    entries: BTreeSet<Symbol>,
}

impl SymbolSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a symbol, returning `true` when the set grew.
    pub fn insert(&mut self, symbol: Symbol) -> bool {
        self.entries.insert(symbol)
    }

    #[must_use]
    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.entries.contains(symbol)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.entries.iter()
    }

    pub fn first_shared_with<'s>(&'s self, other: &'s SymbolSet) -> Option<&'s Symbol> {
        self.entries.intersection(&other.entries).next()
    }
}

impl<S: Into<Symbol>> FromIterator<S> for SymbolSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for SymbolSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.entries.iter().map(Symbol::as_str).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// Where EQU definitions are picked up during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefinitionScan {
    /// Only lines that are written to the output.
    #[default]
    IncludedOnly,
    /// Every content line, including suppressed regions.
    Everywhere,
}

/// Outcome of resolving a symbol-bearing directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Included,
    Excluded,
    Preserved,
}

/// Filter and preserve sets for one filtering pass.
///
/// The filter set grows while the pass discovers EQU definitions; the
/// preserve set is fixed. Both are disjoint for the whole pass.
#[derive(Debug, Clone)]
pub struct FilterSymbols {
    filter: SymbolSet,
    preserve: SymbolSet,
    scan: DefinitionScan,
}

impl FilterSymbols {
    pub fn new(filter: SymbolSet, preserve: SymbolSet) -> Result<Self, FilterError> {
        if let Some(shared) = filter.first_shared_with(&preserve) {
            return Err(FilterError::new(
                FilterErrorKind::Config,
                "You cannot specify the same definition for both filtering (-D) and preserving (-P)",
                Some(shared.as_str()),
            ));
        }
        Ok(Self {
            filter,
            preserve,
            scan: DefinitionScan::default(),
        })
    }

    pub fn with_scan(mut self, scan: DefinitionScan) -> Self {
        self.scan = scan;
        self
    }

    pub fn filter(&self) -> &SymbolSet {
        &self.filter
    }

    pub fn preserve(&self) -> &SymbolSet {
        &self.preserve
    }

    pub fn scan(&self) -> DefinitionScan {
        self.scan
    }

    pub fn is_preserved(&self, symbol: &Symbol) -> bool {
        self.preserve.contains(symbol)
    }

    /// Resolve `IFDEF`-style (`negated == false`) or `IFNDEF`-style directives.
    pub fn resolve(&self, symbol: &Symbol, negated: bool) -> Resolution {
        if self.preserve.contains(symbol) {
            return Resolution::Preserved;
        }
        if self.filter.contains(symbol) != negated {
            Resolution::Included
        } else {
            Resolution::Excluded
        }
    }

    /// Record an EQU definition. Preserved symbols never enter the filter set.
    pub fn define(&mut self, symbol: Symbol) -> bool {
        if self.preserve.contains(&symbol) {
            return false;
        }
        self.filter.insert(symbol)
    }
}
