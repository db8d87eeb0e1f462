// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// CLI entrypoint for deffilter.

use clap::Parser;

use deffilter::core::error::Severity;
use deffilter::filter::cli::Cli;
use deffilter::filter::logging::format_diagnostic_line;
use deffilter::filter::run_with_cli;

fn main() {
    let cli = Cli::parse();
    let use_color = std::env::var("NO_COLOR").is_err();
    if let Err(err) = run_with_cli(&cli) {
        let mut reported = false;
        for diag in err.diagnostics() {
            if diag.severity() != Severity::Error {
                continue;
            }
            eprintln!(
                "{}",
                format_diagnostic_line(diag, Some(err.source_lines()), use_color, cli.format)
            );
            reported = true;
        }
        if !reported {
            eprintln!("{err}");
        }
        std::process::exit(1);
    }
}
