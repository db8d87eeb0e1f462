// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Line classification: labels, conditional directives and EQU definitions.
//!
//! Only the first few whitespace-separated words of a line are inspected.
//! Comments (`;` outside quotes) are ignored; the line text itself is never
//! rewritten here.

use crate::core::error::{FilterError, FilterErrorKind};
use crate::core::symbols::Symbol;
use crate::core::text_utils::{split_comment, to_upper, Cursor};

/// A conditional directive recognised on a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    IfDef(Symbol),
    IfNDef(Symbol),
    ElseIfDef(Symbol),
    ElseIfNDef(Symbol),
    Else,
    EndIf,
    /// Any other `IF...` directive (`IF`, `IFE`, `IFB`, `IFIDN`, ...).
    OtherIf(String),
    /// Any other `ELSE...` directive (`ELSEIF`, `ELSEIFB`, ...).
    OtherElse(String),
}

impl Directive {
    /// Symbol argument of `IFDEF`/`IFNDEF`/`ELSEIFDEF`/`ELSEIFNDEF`.
    pub fn symbol(&self) -> Option<&Symbol> {
        match self {
            Directive::IfDef(sym)
            | Directive::IfNDef(sym)
            | Directive::ElseIfDef(sym)
            | Directive::ElseIfNDef(sym) => Some(sym),
            _ => None,
        }
    }

    /// True for every directive that opens a nested block.
    pub fn opens_block(&self) -> bool {
        matches!(
            self,
            Directive::IfDef(_) | Directive::IfNDef(_) | Directive::OtherIf(_)
        )
    }

    /// True for every directive that starts another branch of the current block.
    pub fn is_branch(&self) -> bool {
        matches!(
            self,
            Directive::Else
                | Directive::ElseIfDef(_)
                | Directive::ElseIfNDef(_)
                | Directive::OtherElse(_)
        )
    }

    pub fn name(&self) -> &str {
        match self {
            Directive::IfDef(_) => "IFDEF",
            Directive::IfNDef(_) => "IFNDEF",
            Directive::ElseIfDef(_) => "ELSEIFDEF",
            Directive::ElseIfNDef(_) => "ELSEIFNDEF",
            Directive::Else => "ELSE",
            Directive::EndIf => "ENDIF",
            Directive::OtherIf(name) | Directive::OtherElse(name) => name,
        }
    }
}

/// Result of classifying one source line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineClass<'a> {
    pub label: Option<&'a str>,
    pub directive: Option<Directive>,
}

/// Classify a line into an optional label and an optional conditional directive.
pub fn classify(line: &str) -> Result<LineClass<'_>, FilterError> {
    let (code, _comment) = split_comment(line);
    let mut cursor = Cursor::new(code);
    let mut class = LineClass::default();

    let mut word = match cursor.take_word() {
        Some(word) => word,
        None => return Ok(class),
    };
    if word.text.ends_with(':') {
        class.label = Some(word.text);
        word = match cursor.take_word() {
            Some(word) => word,
            None => return Ok(class),
        };
    }

    let keyword = to_upper(word.text);
    let directive = match keyword.as_str() {
        "IFDEF" | "IFNDEF" | "ELSEIFDEF" | "ELSEIFNDEF" => {
            let symbol = match cursor.take_word() {
                Some(arg) => Symbol::new(arg.text),
                None => {
                    return Err(FilterError::new(
                        FilterErrorKind::Directive,
                        "Conditional directive is missing its definition name",
                        Some(keyword.as_str()),
                    )
                    .with_column(word.column()))
                }
            };
            match keyword.as_str() {
                "IFDEF" => Directive::IfDef(symbol),
                "IFNDEF" => Directive::IfNDef(symbol),
                "ELSEIFDEF" => Directive::ElseIfDef(symbol),
                _ => Directive::ElseIfNDef(symbol),
            }
        }
        "ELSE" => Directive::Else,
        "ENDIF" => Directive::EndIf,
        _ if keyword.starts_with("IF") => Directive::OtherIf(keyword),
        _ if keyword.starts_with("ELSE") => Directive::OtherElse(keyword),
        _ => return Ok(class),
    };
    class.directive = Some(directive);
    Ok(class)
}

/// Detect `<name> EQU <value...>` and return the defined symbol.
pub fn scan_for_definition(line: &str) -> Option<Symbol> {
    let (code, _comment) = split_comment(line);
    let mut cursor = Cursor::new(code);
    let name = cursor.take_word()?;
    let keyword = cursor.take_word()?;
    if !keyword.text.eq_ignore_ascii_case("EQU") || cursor.at_end() {
        return None;
    }
    Some(Symbol::new(name.text))
}
