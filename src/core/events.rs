// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Structured events produced while filtering.
//!
//! The resolver pushes events to an [`EventSink`] as lines are processed;
//! presentation is left to the caller.

use crate::core::symbols::Symbol;

/// How a block was entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Condition true: body kept, directives dropped.
    Included,
    /// Condition false: body dropped until a matching branch.
    Excluded,
    /// Symbol in the preserve set: copied verbatim.
    Preserved,
    /// Unrelated `IF...` directive: copied verbatim.
    Passthrough,
}

impl BlockKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Included => "included",
            BlockKind::Excluded => "excluded",
            BlockKind::Preserved => "preserved",
            BlockKind::Passthrough => "passthrough",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterEvent {
    SymbolDiscovered {
        line: u32,
        symbol: Symbol,
    },
    BlockEntered {
        line: u32,
        directive: String,
        symbol: Option<Symbol>,
        kind: BlockKind,
    },
    /// An excluded block switched to its included branch.
    BranchTaken {
        line: u32,
        directive: String,
    },
    /// An included branch ended; the rest of its block is dropped.
    BranchClosed {
        line: u32,
        directive: String,
    },
    BlockExited {
        line: u32,
        opened_at: u32,
    },
    LabelRetained {
        line: u32,
        label: String,
    },
    /// A branch inside an excluded block that cannot be decided statically.
    UnresolvedBranch {
        line: u32,
        directive: String,
    },
    /// `ELSE`/`ENDIF` outside any conditional block, copied as-is.
    StrayDirective {
        line: u32,
        directive: String,
    },
    Fatal {
        line: u32,
        message: String,
    },
}

impl FilterEvent {
    pub fn line(&self) -> u32 {
        match self {
            FilterEvent::SymbolDiscovered { line, .. }
            | FilterEvent::BlockEntered { line, .. }
            | FilterEvent::BranchTaken { line, .. }
            | FilterEvent::BranchClosed { line, .. }
            | FilterEvent::BlockExited { line, .. }
            | FilterEvent::LabelRetained { line, .. }
            | FilterEvent::UnresolvedBranch { line, .. }
            | FilterEvent::StrayDirective { line, .. }
            | FilterEvent::Fatal { line, .. } => *line,
        }
    }

    /// Short machine-readable name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            FilterEvent::SymbolDiscovered { .. } => "symbol_discovered",
            FilterEvent::BlockEntered { .. } => "block_entered",
            FilterEvent::BranchTaken { .. } => "branch_taken",
            FilterEvent::BranchClosed { .. } => "branch_closed",
            FilterEvent::BlockExited { .. } => "block_exited",
            FilterEvent::LabelRetained { .. } => "label_retained",
            FilterEvent::UnresolvedBranch { .. } => "unresolved_branch",
            FilterEvent::StrayDirective { .. } => "stray_directive",
            FilterEvent::Fatal { .. } => "fatal",
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            FilterEvent::UnresolvedBranch { .. } | FilterEvent::StrayDirective { .. }
        )
    }

    /// Human-readable description, without location.
    pub fn describe(&self) -> String {
        match self {
            FilterEvent::SymbolDiscovered { symbol, .. } => {
                format!("Encountered EQU directive for definition {symbol}, adding it to the filter set")
            }
            FilterEvent::BlockEntered {
                directive,
                symbol: Some(symbol),
                kind,
                ..
            } => format!("{directive} {symbol}: {} block", kind.as_str()),
            FilterEvent::BlockEntered {
                directive, kind, ..
            } => format!("{directive}: {} block", kind.as_str()),
            FilterEvent::BranchTaken { directive, .. } => {
                format!("{directive} selects the included branch")
            }
            FilterEvent::BranchClosed { directive, .. } => {
                format!("{directive} ends the included branch")
            }
            FilterEvent::BlockExited { opened_at, .. } => {
                format!("ENDIF closes block opened at line {opened_at}")
            }
            FilterEvent::LabelRetained { label, .. } => {
                format!("Kept label {label} of dropped directive")
            }
            FilterEvent::UnresolvedBranch { directive, .. } => {
                format!("{directive} inside an excluded block cannot be resolved; branch dropped")
            }
            FilterEvent::StrayDirective { directive, .. } => {
                format!("{directive} without matching IF; copied unchanged")
            }
            FilterEvent::Fatal { message, .. } => message.clone(),
        }
    }
}

/// Receiver of filter events.
pub trait EventSink {
    fn event(&mut self, event: FilterEvent);
}

impl EventSink for Vec<FilterEvent> {
    fn event(&mut self, event: FilterEvent) {
        self.push(event);
    }
}

/// Sink that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct IgnoreEvents;

impl EventSink for IgnoreEvents {
    fn event(&mut self, _event: FilterEvent) {}
}

impl<T: EventSink + ?Sized> EventSink for &mut T {
    fn event(&mut self, event: FilterEvent) {
        (**self).event(event);
    }
}
