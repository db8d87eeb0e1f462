// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Conditional-definition filter core.
//!
//! Resolves IFDEF/IFNDEF blocks of an assembly source in a single forward
//! pass, independent of files, encodings and presentation.
//!
//! # Components
//!
//! - [`text_utils`] - Word cursor and comment splitting
//! - [`symbols`] - Definition names and the filter/preserve sets
//! - [`classify`] - Label, directive and EQU recognition per line
//! - [`resolver`] - Block stack and line emission
//! - [`events`] - Structured events reported while filtering
//! - [`error`] - Errors, diagnostics and run reports

pub mod classify;
pub mod error;
pub mod events;
pub mod resolver;
pub mod symbols;
pub mod text_utils;

// Re-exports for convenience
pub use classify::{classify, scan_for_definition, Directive, LineClass};
pub use error::{FilterError, FilterErrorKind, FilterStats};
pub use events::{BlockKind, EventSink, FilterEvent, IgnoreEvents};
pub use resolver::{filter_lines, BlockMode, BlockResolver, LineSink};
pub use symbols::{DefinitionScan, FilterSymbols, Resolution, Symbol, SymbolSet};
