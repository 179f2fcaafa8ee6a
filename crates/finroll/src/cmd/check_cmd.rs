//! finroll-check - Check a balance snapshot for data-quality problems.
//!
//! Reports every spot where the aggregation engine would silently absorb
//! incomplete input (missing types, dangling parents, unconverted accounts)
//! and every parent cycle that would make aggregation fail.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use finroll_core::{diagnose, Diagnostic, Severity};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use crate::snapshot::Snapshot;

/// Output format for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// JSON output for tooling integration
    Json,
}

/// JSON output structure for all diagnostics.
#[derive(Debug, Serialize)]
pub struct JsonOutput<'a> {
    /// List of diagnostics
    pub diagnostics: &'a [Diagnostic],
    /// Total error count
    pub error_count: usize,
    /// Total warning count
    pub warning_count: usize,
}

/// Counts of what a check found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckSummary {
    /// Findings that make aggregation fail
    pub error_count: usize,
    /// Findings the engine absorbs
    pub warning_count: usize,
}

/// Check a balance snapshot and report problems.
#[derive(Parser, Debug)]
#[command(name = "finroll-check")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// The snapshot JSON file to check
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Show verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all output (just use exit code)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format (text or json)
    #[arg(long, short = 'f', value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Main entry point for the check command.
pub fn main() -> ExitCode {
    let args = Args::parse();
    super::init_tracing(args.verbose);

    let mut stdout = io::stdout().lock();
    match run(&args, &mut stdout) {
        Ok(summary) if summary.error_count > 0 => ExitCode::from(1),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

/// Load the snapshot, run every check and write the findings.
pub fn run<W: Write>(args: &Args, writer: &mut W) -> Result<CheckSummary> {
    let snapshot = Snapshot::load(&args.file)?;
    let diagnostics = diagnose(&snapshot.categories, &snapshot.aggregates);

    let error_count = diagnostics
        .iter()
        .filter(|d| d.severity() == Severity::Error)
        .count();
    let summary = CheckSummary {
        error_count,
        warning_count: diagnostics.len() - error_count,
    };
    debug!(
        categories = snapshot.categories.len(),
        errors = summary.error_count,
        warnings = summary.warning_count,
        "checked snapshot"
    );

    if args.quiet {
        return Ok(summary);
    }

    match args.format {
        OutputFormat::Json => {
            let output = JsonOutput {
                diagnostics: &diagnostics,
                error_count: summary.error_count,
                warning_count: summary.warning_count,
            };
            writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
        }
        OutputFormat::Text => {
            for diagnostic in &diagnostics {
                write_diagnostic(diagnostic, writer)?;
            }
            if !diagnostics.is_empty() {
                writeln!(writer)?;
            }
            print_summary(summary.error_count, summary.warning_count, writer)?;
        }
    }

    Ok(summary)
}

fn write_diagnostic<W: Write>(diagnostic: &Diagnostic, writer: &mut W) -> io::Result<()> {
    writeln!(writer, "{diagnostic}")?;
    match &diagnostic.account {
        Some(account) => writeln!(
            writer,
            "  --> category {}, account {account}",
            diagnostic.category
        ),
        None => writeln!(writer, "  --> category {}", diagnostic.category),
    }
}

/// Print the closing error and warning counts.
pub fn print_summary<W: Write>(errors: usize, warnings: usize, writer: &mut W) -> io::Result<()> {
    if errors == 0 && warnings == 0 {
        return writeln!(writer, "\u{2713} No problems found");
    }

    let error_text = if errors == 1 { "error" } else { "errors" };
    let warning_text = if warnings == 1 { "warning" } else { "warnings" };

    if errors > 0 && warnings > 0 {
        writeln!(
            writer,
            "\u{2717} {errors} {error_text}, {warnings} {warning_text}"
        )
    } else if errors > 0 {
        writeln!(writer, "\u{2717} {errors} {error_text}")
    } else {
        writeln!(writer, "\u{26A0} {warnings} {warning_text}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary_text(errors: usize, warnings: usize) -> String {
        let mut out = Vec::new();
        print_summary(errors, warnings, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_print_summary() {
        assert_eq!(summary_text(0, 0), "\u{2713} No problems found\n");
        assert_eq!(summary_text(1, 0), "\u{2717} 1 error\n");
        assert_eq!(summary_text(0, 2), "\u{26A0} 2 warnings\n");
        assert_eq!(summary_text(2, 1), "\u{2717} 2 errors, 1 warning\n");
    }

    #[test]
    fn test_parse_args() {
        let args = Args::try_parse_from(["finroll-check", "-q", "--format", "json", "s.json"])
            .unwrap();
        assert!(args.quiet);
        assert_eq!(args.format, OutputFormat::Json);
    }
}
