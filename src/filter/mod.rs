// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Definition filter - command-line driver.
//!
//! Reads one assembly source, resolves its IFDEF/IFNDEF blocks with the
//! core resolver and writes the result, logging as it goes.

pub mod cli;
pub mod logging;
pub mod source;

use std::io::Write;

use crate::core::error::{Diagnostic, FilterError, FilterErrorKind, FilterRunError, FilterRunReport};
use crate::core::resolver::filter_lines;

use cli::{validate_cli, Cli, FilterConfig};
use logging::{open_log_sink, EventLogger};
use source::{read_source, OutputFile};

/// Validate `cli` and run one filter pass.
pub fn run_with_cli(cli: &Cli) -> Result<FilterRunReport, FilterRunError> {
    let config = validate_cli(cli)?;
    let writer = open_log_sink(&config.log_sink).map_err(|err| {
        FilterError::new(
            FilterErrorKind::Io,
            "Failed to open log file",
            Some(&err.to_string()),
        )
    })?;
    let file = config.infile.display().to_string();
    let mut logger = EventLogger::new(writer, &file, config.format, config.verbosity);
    filter_file(config, &mut logger)
}

/// Filter `config.infile` into `config.outfile`.
///
/// The output file is flushed on every path once it has been created, so a
/// fatal error leaves everything emitted before it on disk.
pub fn filter_file<W: Write>(
    config: FilterConfig,
    logger: &mut EventLogger<W>,
) -> Result<FilterRunReport, FilterRunError> {
    let file = logger.file().to_string();
    let output_name = config.outfile.display().to_string();
    let source = read_source(&config.infile, config.encoding)
        .map_err(|err| run_error(err, &file, Vec::new(), Vec::new()))?;

    let mut symbols = config.symbols;
    logger.log_config(&symbols);

    let mut output = match OutputFile::create(
        &config.outfile,
        config.encoding,
        source.line_ending,
        source.bom,
    ) {
        Ok(output) => output,
        Err(err) => return Err(run_error(err, &file, logger.take_warnings(), source.lines)),
    };

    let result = filter_lines(&source.lines, &mut symbols, &mut output, &mut *logger);
    let flushed = output.finish();
    let stats = match result.and_then(|stats| flushed.map(|()| stats)) {
        Ok(stats) => stats,
        Err(err) => return Err(run_error(err, &file, logger.take_warnings(), source.lines)),
    };

    logger.log_summary(&stats, &output_name);
    Ok(FilterRunReport::new(
        logger.take_warnings(),
        source.lines,
        stats,
        output_name,
    ))
}

fn run_error(
    err: FilterError,
    file: &str,
    mut diagnostics: Vec<Diagnostic>,
    source_lines: Vec<String>,
) -> FilterRunError {
    diagnostics.push(Diagnostic::from_error(err.clone(), Some(file)));
    FilterRunError::new(err, diagnostics, source_lines)
}
