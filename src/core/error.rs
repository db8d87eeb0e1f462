// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Error types, diagnostics, and reporting for the filter.

use std::fmt;

/// Categories of filter errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterErrorKind {
    Cli,
    Config,
    Directive,
    Encoding,
    Io,
    PreservedBranch,
    Unterminated,
}

/// A filter error with a kind, message and optional source location.
#[derive(Debug, Clone)]
pub struct FilterError {
    kind: FilterErrorKind,
    message: String,
    line: Option<u32>,
    column: Option<usize>,
    source: Option<String>,
}

impl FilterError {
    pub fn new(kind: FilterErrorKind, msg: &str, param: Option<&str>) -> Self {
        Self {
            kind,
            message: format_error(msg, param),
            line: None,
            column: None,
            source: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> FilterErrorKind {
        self.kind
    }

    pub fn line(&self) -> Option<u32> {
        self.line
    }

    pub fn column(&self) -> Option<usize> {
        self.column
    }

    pub fn source_line(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn with_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }

    /// Attach the offending line; the first context attached wins.
    pub fn with_context(mut self, line: u32, source: &str) -> Self {
        if self.line.is_none() {
            self.line = Some(line);
            self.source = Some(source.to_string());
        }
        self
    }
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for FilterError {}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// A diagnostic message with location and context.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    line: u32,
    column: Option<usize>,
    severity: Severity,
    error: FilterError,
    file: Option<String>,
    source: Option<String>,
}

impl Diagnostic {
    pub fn new(line: u32, severity: Severity, error: FilterError) -> Self {
        Self {
            line,
            column: None,
            severity,
            error,
            file: None,
            source: None,
        }
    }

    /// Build an error diagnostic from the location carried by the error itself.
    pub fn from_error(error: FilterError, file: Option<&str>) -> Self {
        let line = error.line().unwrap_or(0);
        let column = error.column();
        let source = error.source_line().map(str::to_string);
        Self::new(line, Severity::Error, error)
            .with_column(column)
            .with_file(file.map(str::to_string))
            .with_source(source)
    }

    pub fn with_column(mut self, column: Option<usize>) -> Self {
        self.column = column;
        self
    }

    pub fn with_file(mut self, file: Option<String>) -> Self {
        self.file = file;
        self
    }

    pub fn with_source(mut self, source: Option<String>) -> Self {
        self.source = source;
        self
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> Option<usize> {
        self.column
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        self.error.message()
    }

    pub fn kind(&self) -> FilterErrorKind {
        self.error.kind()
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn format(&self) -> String {
        let sev = match self.severity {
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        };
        format!("{}: {} - {}", self.line, sev, self.error.message())
    }

    pub fn format_with_context(&self, lines: Option<&[String]>, use_color: bool) -> String {
        let sev = match self.severity {
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        };
        if self.line == 0 {
            return match &self.file {
                Some(file) => format!("{file}: {sev}: {}", self.error.message()),
                None => format!("{sev}: {}", self.error.message()),
            };
        }
        let header = match &self.file {
            Some(file) => format!("{file}:{}: {sev}", self.line),
            None => format!("{}: {sev}", self.line),
        };

        let mut out = String::new();
        out.push_str(&header);
        out.push('\n');

        let context = build_context_lines(
            self.line,
            self.column,
            lines,
            self.source.as_deref(),
            use_color,
        );
        for line in context {
            out.push_str(&line);
            out.push('\n');
        }
        out.push_str(&format!("{sev}: {}", self.error.message()));
        out
    }
}

/// Line counts and discoveries of one filtering pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FilterStats {
    pub lines_read: u32,
    pub lines_written: u32,
    pub labels_retained: u32,
    pub symbols_discovered: u32,
}

/// Report from a successful filter run.
#[derive(Debug)]
pub struct FilterRunReport {
    diagnostics: Vec<Diagnostic>,
    source_lines: Vec<String>,
    stats: FilterStats,
    output: String,
}

impl FilterRunReport {
    pub fn new(
        diagnostics: Vec<Diagnostic>,
        source_lines: Vec<String>,
        stats: FilterStats,
        output: String,
    ) -> Self {
        Self {
            diagnostics,
            source_lines,
            stats,
            output,
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn source_lines(&self) -> &[String] {
        &self.source_lines
    }

    pub fn stats(&self) -> &FilterStats {
        &self.stats
    }

    /// Path of the written output file.
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }
}

/// Error from a failed filter run.
#[derive(Debug)]
pub struct FilterRunError {
    error: FilterError,
    diagnostics: Vec<Diagnostic>,
    source_lines: Vec<String>,
}

impl FilterRunError {
    pub fn new(error: FilterError, diagnostics: Vec<Diagnostic>, source_lines: Vec<String>) -> Self {
        Self {
            error,
            diagnostics,
            source_lines,
        }
    }

    pub fn error(&self) -> &FilterError {
        &self.error
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn source_lines(&self) -> &[String] {
        &self.source_lines
    }
}

impl From<FilterError> for FilterRunError {
    fn from(error: FilterError) -> Self {
        Self::new(error, Vec::new(), Vec::new())
    }
}

impl fmt::Display for FilterRunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for FilterRunError {}

/// Build context lines for error display.
pub fn build_context_lines(
    line_num: u32,
    column: Option<usize>,
    lines: Option<&[String]>,
    source_override: Option<&str>,
    use_color: bool,
) -> Vec<String> {
    let mut out = Vec::new();
    let line_idx = line_num.saturating_sub(1) as usize;

    if let Some(source) = source_override {
        let highlighted = highlight_line(source, column, use_color);
        out.push(format!("{:>5} | {}", line_num, highlighted));
        return out;
    }

    let line = match lines.and_then(|lines| lines.get(line_idx)) {
        Some(line) => line,
        None => {
            out.push(format!("{:>5} | <source unavailable>", line_num));
            return out;
        }
    };
    let display = highlight_line(line, column, use_color);
    out.push(format!("{:>5} | {}", line_num, display));

    out
}

fn highlight_line(line: &str, column: Option<usize>, use_color: bool) -> String {
    match column {
        Some(col) if col > 0 => {
            let idx = col - 1;
            if idx >= line.len() || !line.is_char_boundary(idx) {
                if use_color {
                    return format!("{line}\x1b[31m^\x1b[0m");
                }
                return format!("{line}^");
            }
            let (head, tail) = line.split_at(idx);
            let ch = tail.chars().next().unwrap_or(' ');
            let rest = &tail[ch.len_utf8()..];
            if use_color {
                format!("{head}\x1b[31m{ch}\x1b[0m{rest}")
            } else {
                format!("{head}{ch}{rest}")
            }
        }
        _ => line.to_string(),
    }
}

/// Format an error message with an optional parameter.
pub fn format_error(msg: &str, param: Option<&str>) -> String {
    match param {
        Some(p) => format!("{msg}: {p}"),
        None => msg.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_format_includes_line_and_severity() {
        let err = FilterError::new(FilterErrorKind::Directive, "Bad thing", None);
        let diag = Diagnostic::new(12, Severity::Error, err);
        assert_eq!(diag.format(), "12: ERROR - Bad thing");
    }

    #[test]
    fn format_error_appends_parameter() {
        assert_eq!(format_error("Missing symbol", Some("IFDEF")), "Missing symbol: IFDEF");
        assert_eq!(format_error("Plain", None), "Plain");
    }

    #[test]
    fn first_context_wins() {
        let err = FilterError::new(FilterErrorKind::Unterminated, "Open block", None)
            .with_context(3, "IFDEF A")
            .with_context(9, "ENDIF");
        assert_eq!(err.line(), Some(3));
        assert_eq!(err.source_line(), Some("IFDEF A"));
    }

    #[test]
    fn context_rendering_highlights_column() {
        let err = FilterError::new(FilterErrorKind::Directive, "IFDEF missing symbol", None)
            .with_column(5)
            .with_context(2, "L1: IFDEF");
        let diag = Diagnostic::from_error(err, Some("main.asm"));
        let text = diag.format_with_context(None, false);
        assert_eq!(
            text,
            "main.asm:2: ERROR\n    2 | L1: IFDEF\nERROR: IFDEF missing symbol"
        );
    }

    #[test]
    fn context_rendering_without_line_is_single_line() {
        let err = FilterError::new(FilterErrorKind::Io, "Error opening file", Some("x.asm"));
        let diag = Diagnostic::from_error(err, None);
        assert_eq!(
            diag.format_with_context(None, false),
            "ERROR: Error opening file: x.asm"
        );
    }

    #[test]
    fn context_lines_fall_back_to_placeholder() {
        let lines = vec!["NOP".to_string()];
        assert_eq!(
            build_context_lines(4, None, Some(lines.as_slice()), None, false),
            vec!["    4 | <source unavailable>".to_string()]
        );
        assert_eq!(
            build_context_lines(1, Some(1), Some(lines.as_slice()), None, true),
            vec!["    1 | \x1b[31mN\x1b[0mOP".to_string()]
        );
    }
}
