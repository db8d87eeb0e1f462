// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Command-line interface parsing and argument validation.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, ValueEnum};

use crate::core::error::{FilterError, FilterErrorKind, FilterRunError};
use crate::core::symbols::{DefinitionScan, FilterSymbols, SymbolSet};
use crate::filter::source::SourceEncoding;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_OUTPUT: &str = "out.asm";

const LONG_ABOUT: &str =
    "Filters an assembly source by resolving IFDEF/IFNDEF/ELSEIFDEF/ELSEIFNDEF/ELSE/ENDIF blocks.

Definitions given with -D are treated as defined; every other name is undefined.
Blocks keyed on definitions given with -P are copied unchanged, directives included.
Other IF... blocks are copied unchanged, but IFDEF/IFNDEF blocks inside them are resolved.
Names defined with EQU in kept code count as defined for the rest of the file.
Labels on dropped directive lines are kept on a line of their own.";

#[derive(Parser, Debug)]
#[command(
    name = "deffilter",
    version = VERSION,
    about = "Resolve IFDEF/IFNDEF conditional blocks in assembly sources",
    long_about = LONG_ABOUT
)]
pub struct Cli {
    #[arg(
        value_name = "INPUT",
        long_help = "Assembly source file to filter."
    )]
    pub infile: PathBuf,
    #[arg(
        short = 'D',
        long = "define",
        value_name = "NAME",
        action = ArgAction::Append,
        long_help = "Treat NAME as defined (repeatable). IFDEF NAME blocks are kept, IFNDEF NAME blocks are dropped."
    )]
    pub defines: Vec<String>,
    #[arg(
        short = 'P',
        long = "preserve",
        value_name = "NAME",
        action = ArgAction::Append,
        long_help = "Copy IFDEF/IFNDEF NAME blocks unchanged, directive lines included (repeatable)."
    )]
    pub preserves: Vec<String>,
    #[arg(
        long = "encoding",
        value_enum,
        ignore_case = true,
        default_value_t = SourceEncoding::Utf8,
        long_help = "Encoding of the input and output files. latin-1 copies every byte unchanged, so single-byte DOS code pages such as IBM437 round-trip exactly."
    )]
    pub encoding: SourceEncoding,
    #[arg(
        short = 'o',
        long = "outfile",
        value_name = "FILE",
        default_value = DEFAULT_OUTPUT,
        long_help = "Output file. Defaults to out.asm in the current directory."
    )]
    pub outfile: PathBuf,
    #[arg(
        long = "scan-excluded-equ",
        action = ArgAction::SetTrue,
        long_help = "Also pick up EQU definitions inside dropped blocks. By default only kept lines are scanned."
    )]
    pub scan_excluded_equ: bool,
    #[arg(
        long = "format",
        value_enum,
        default_value_t = OutputFormat::Text,
        long_help = "Log and error output format. json writes one JSON object per line."
    )]
    pub format: OutputFormat,
    #[arg(
        short = 'L',
        long = "log",
        value_name = "FILE",
        long_help = "Write the filter log to FILE instead of stderr. Fatal errors are always written to stderr."
    )]
    pub log_file: Option<PathBuf>,
    #[arg(
        long = "log-append",
        action = ArgAction::SetTrue,
        requires = "log_file",
        long_help = "Append to the -L/--log file instead of truncating it."
    )]
    pub log_append: bool,
    #[arg(
        short = 'q',
        long = "quiet",
        action = ArgAction::SetTrue,
        conflicts_with = "verbose",
        long_help = "Only report fatal errors."
    )]
    pub quiet: bool,
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::SetTrue,
        long_help = "Also log every block, branch and retained label."
    )]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSinkConfig {
    Stderr,
    File { path: PathBuf, append: bool },
}

/// Validated CLI configuration.
#[derive(Debug)]
pub struct FilterConfig {
    pub infile: PathBuf,
    pub outfile: PathBuf,
    pub encoding: SourceEncoding,
    pub symbols: FilterSymbols,
    pub format: OutputFormat,
    pub verbosity: Verbosity,
    pub log_sink: LogSinkConfig,
}

fn cli_error(msg: &str, param: Option<&str>) -> FilterRunError {
    FilterRunError::from(FilterError::new(FilterErrorKind::Cli, msg, param))
}

fn parse_symbol_set(names: &[String], option: &str) -> Result<SymbolSet, FilterRunError> {
    let mut set = SymbolSet::new();
    for name in names {
        let trimmed = name.trim();
        if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
            return Err(cli_error(
                &format!("Invalid definition name for {option}"),
                Some(name),
            ));
        }
        set.insert(trimmed.into());
    }
    Ok(set)
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Validate CLI arguments and return parsed configuration.
pub fn validate_cli(cli: &Cli) -> Result<FilterConfig, FilterRunError> {
    let filter = parse_symbol_set(&cli.defines, "-D/--define")?;
    let preserve = parse_symbol_set(&cli.preserves, "-P/--preserve")?;
    let scan = if cli.scan_excluded_equ {
        DefinitionScan::Everywhere
    } else {
        DefinitionScan::IncludedOnly
    };
    let symbols = FilterSymbols::new(filter, preserve)?.with_scan(scan);

    if cli.outfile.as_os_str().is_empty() {
        return Err(cli_error("-o/--outfile must not be empty", None));
    }
    if same_file(&cli.infile, &cli.outfile) {
        return Err(cli_error(
            "Output file must differ from the input file",
            Some(&cli.outfile.to_string_lossy()),
        ));
    }

    let verbosity = if cli.quiet {
        Verbosity::Quiet
    } else if cli.verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    };
    let log_sink = match &cli.log_file {
        Some(path) => LogSinkConfig::File {
            path: path.clone(),
            append: cli.log_append,
        },
        None => LogSinkConfig::Stderr,
    };

    Ok(FilterConfig {
        infile: cli.infile.clone(),
        outfile: cli.outfile.clone(),
        encoding: cli.encoding,
        symbols,
        format: cli.format,
        verbosity,
        log_sink,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::symbols::Symbol;

    #[test]
    fn cli_parses_definitions_and_defaults() {
        let cli = Cli::parse_from([
            "deffilter",
            "src/kernel.asm",
            "-DIBMVER",
            "-D",
            "msver",
            "--preserve",
            "Debug",
            "--encoding=IBM437",
        ]);
        assert_eq!(cli.infile, PathBuf::from("src/kernel.asm"));
        assert_eq!(cli.defines, vec!["IBMVER".to_string(), "msver".to_string()]);
        assert_eq!(cli.encoding, SourceEncoding::Latin1);
        assert_eq!(cli.outfile, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(cli.format, OutputFormat::Text);

        let config = validate_cli(&cli).expect("valid cli");
        assert!(config.symbols.filter().contains(&Symbol::new("MSVER")));
        assert!(config.symbols.is_preserved(&Symbol::new("DEBUG")));
        assert_eq!(config.symbols.scan(), DefinitionScan::IncludedOnly);
        assert_eq!(config.verbosity, Verbosity::Normal);
        assert_eq!(config.log_sink, LogSinkConfig::Stderr);
    }

    #[test]
    fn cli_accepts_encoding_aliases_case_insensitively() {
        for name in ["utf8", "UTF-8"] {
            let cli = Cli::parse_from(["deffilter", "a.asm", "--encoding", name]);
            assert_eq!(cli.encoding, SourceEncoding::Utf8);
        }
        for name in ["latin1", "ISO-8859-1", "cp437", "Latin-1"] {
            let cli = Cli::parse_from(["deffilter", "a.asm", "--encoding", name]);
            assert_eq!(cli.encoding, SourceEncoding::Latin1);
        }
        assert!(Cli::try_parse_from(["deffilter", "a.asm", "--encoding", "ebcdic"]).is_err());
    }

    #[test]
    fn cli_options_map_to_config() {
        let cli = Cli::parse_from([
            "deffilter",
            "a.asm",
            "-o",
            "b.asm",
            "--scan-excluded-equ",
            "-v",
            "--format",
            "json",
            "-L",
            "filter.log",
            "--log-append",
        ]);
        let config = validate_cli(&cli).expect("valid cli");
        assert_eq!(config.outfile, PathBuf::from("b.asm"));
        assert_eq!(config.symbols.scan(), DefinitionScan::Everywhere);
        assert_eq!(config.verbosity, Verbosity::Verbose);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(
            config.log_sink,
            LogSinkConfig::File {
                path: PathBuf::from("filter.log"),
                append: true
            }
        );
    }

    #[test]
    fn cli_rejects_quiet_with_verbose_and_orphan_append() {
        assert!(Cli::try_parse_from(["deffilter", "a.asm", "-q", "-v"]).is_err());
        assert!(Cli::try_parse_from(["deffilter", "a.asm", "--log-append"]).is_err());
        assert!(Cli::try_parse_from(["deffilter"]).is_err());
    }

    #[test]
    fn validate_rejects_shared_definitions() {
        let cli = Cli::parse_from(["deffilter", "a.asm", "-Dfoo", "-PFOO"]);
        let err = validate_cli(&cli).unwrap_err();
        assert_eq!(err.error().kind(), FilterErrorKind::Config);
        assert_eq!(
            err.to_string(),
            "You cannot specify the same definition for both filtering (-D) and preserving (-P): FOO"
        );
    }

    #[test]
    fn validate_rejects_bad_names_and_same_output() {
        let cli = Cli::parse_from(["deffilter", "a.asm", "-D", "TWO WORDS"]);
        let err = validate_cli(&cli).unwrap_err();
        assert_eq!(err.error().kind(), FilterErrorKind::Cli);
        assert_eq!(
            err.to_string(),
            "Invalid definition name for -D/--define: TWO WORDS"
        );

        let cli = Cli::parse_from(["deffilter", "a.asm", "-o", "a.asm"]);
        let err = validate_cli(&cli).unwrap_err();
        assert_eq!(err.error().kind(), FilterErrorKind::Cli);
    }
}
