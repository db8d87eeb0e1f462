// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Filter log: run configuration, filter events and the closing summary,
//! rendered as text or as one JSON object per line.

use std::fs::OpenOptions;
use std::io::{self, Write};

use serde_json::json;

use crate::core::error::{Diagnostic, FilterError, FilterErrorKind, FilterStats, Severity};
use crate::core::events::{EventSink, FilterEvent};
use crate::core::symbols::{DefinitionScan, FilterSymbols, SymbolSet};
use crate::filter::cli::{LogSinkConfig, OutputFormat, Verbosity};

/// Open the log destination.
pub fn open_log_sink(config: &LogSinkConfig) -> io::Result<Box<dyn Write>> {
    match config {
        LogSinkConfig::Stderr => Ok(Box::new(io::stderr())),
        LogSinkConfig::File { path, append } => {
            let mut opts = OpenOptions::new();
            opts.create(true).write(true);
            if *append {
                opts.append(true);
            } else {
                opts.truncate(true);
            }
            Ok(Box::new(opts.open(path)?))
        }
    }
}

/// Render a diagnostic as text with source context, or as a JSON line.
pub fn format_diagnostic_line(
    diag: &Diagnostic,
    source_lines: Option<&[String]>,
    use_color: bool,
    format: OutputFormat,
) -> String {
    match format {
        OutputFormat::Json => json!({
            "event": "fatal",
            "severity": diag.severity().as_str(),
            "message": diag.message(),
            "file": diag.file(),
            "line": diag.line(),
            "column": diag.column(),
        })
        .to_string(),
        OutputFormat::Text => diag.format_with_context(source_lines, use_color),
    }
}

fn symbol_list(set: &SymbolSet) -> Vec<&str> {
    set.iter().map(|sym| sym.as_str()).collect()
}

fn event_symbol(event: &FilterEvent) -> Option<&str> {
    match event {
        FilterEvent::SymbolDiscovered { symbol, .. }
        | FilterEvent::BlockEntered {
            symbol: Some(symbol),
            ..
        } => Some(symbol.as_str()),
        _ => None,
    }
}

/// Event sink that writes a filter log and collects warnings.
pub struct EventLogger<W: Write> {
    writer: W,
    file: String,
    format: OutputFormat,
    verbosity: Verbosity,
    warnings: Vec<Diagnostic>,
}

impl<W: Write> EventLogger<W> {
    pub fn new(writer: W, file: &str, format: OutputFormat, verbosity: Verbosity) -> Self {
        Self {
            writer,
            file: file.to_string(),
            format,
            verbosity,
            warnings: Vec::new(),
        }
    }

    /// Display name of the input, shared by log lines and diagnostics.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Warnings seen so far, in input order.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.warnings)
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn emit_line(&mut self, line: &str) {
        let _ = writeln!(self.writer, "{line}");
    }

    fn level_for(event: &FilterEvent) -> Option<Verbosity> {
        match event {
            FilterEvent::Fatal { .. } => None,
            FilterEvent::SymbolDiscovered { .. } => Some(Verbosity::Normal),
            event if event.is_warning() => Some(Verbosity::Normal),
            _ => Some(Verbosity::Verbose),
        }
    }

    pub fn log_config(&mut self, symbols: &FilterSymbols) {
        if self.verbosity < Verbosity::Normal {
            return;
        }
        match self.format {
            OutputFormat::Json => {
                let scan = match symbols.scan() {
                    DefinitionScan::IncludedOnly => "included-only",
                    DefinitionScan::Everywhere => "everywhere",
                };
                let line = json!({
                    "event": "config",
                    "file": self.file,
                    "filter": symbol_list(symbols.filter()),
                    "preserve": symbol_list(symbols.preserve()),
                    "equ_scan": scan,
                })
                .to_string();
                self.emit_line(&line);
            }
            OutputFormat::Text => {
                let filter = format!("Filter definitions (-D): {}", symbols.filter());
                let preserve = format!("Preserved definitions (-P): {}", symbols.preserve());
                self.emit_line(&filter);
                self.emit_line(&preserve);
            }
        }
    }

    pub fn log_summary(&mut self, stats: &FilterStats, output: &str) {
        if self.verbosity < Verbosity::Normal {
            return;
        }
        let line = match self.format {
            OutputFormat::Json => json!({
                "event": "summary",
                "file": self.file,
                "output": output,
                "lines_read": stats.lines_read,
                "lines_written": stats.lines_written,
                "labels_retained": stats.labels_retained,
                "symbols_discovered": stats.symbols_discovered,
                "warnings": self.warnings.len(),
            })
            .to_string(),
            OutputFormat::Text => format!(
                "Wrote {} of {} lines to {output} ({} labels kept, {} definitions discovered, {} warnings)",
                stats.lines_written,
                stats.lines_read,
                stats.labels_retained,
                stats.symbols_discovered,
                self.warnings.len()
            ),
        };
        self.emit_line(&line);
    }

    fn format_event(&self, event: &FilterEvent) -> String {
        let severity = if event.is_warning() {
            Severity::Warning.as_str()
        } else {
            "info"
        };
        match self.format {
            OutputFormat::Json => json!({
                "event": event.name(),
                "severity": severity,
                "file": self.file,
                "line": event.line(),
                "symbol": event_symbol(event),
                "message": event.describe(),
            })
            .to_string(),
            OutputFormat::Text if event.is_warning() => {
                format!("{}:{}: WARNING: {}", self.file, event.line(), event.describe())
            }
            OutputFormat::Text => format!("{}:{}: {}", self.file, event.line(), event.describe()),
        }
    }
}

impl<W: Write> EventSink for EventLogger<W> {
    fn event(&mut self, event: FilterEvent) {
        if event.is_warning() {
            let error = FilterError::new(FilterErrorKind::Directive, &event.describe(), None);
            self.warnings.push(
                Diagnostic::new(event.line(), Severity::Warning, error)
                    .with_file(Some(self.file.clone())),
            );
        }
        match Self::level_for(&event) {
            Some(level) if level <= self.verbosity => {
                let line = self.format_event(&event);
                self.emit_line(&line);
            }
            _ => {}
        }
    }
}
