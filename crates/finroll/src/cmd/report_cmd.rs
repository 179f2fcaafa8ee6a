//! finroll-report - Render financial reports from a balance snapshot.
//!
//! # Usage
//!
//! ```bash
//! finroll-report snapshot.json balance-sheet
//! finroll-report snapshot.json cash-flow --format csv --hide-empty
//! finroll-report snapshot.json summary expense --limit 3
//! ```
//!
//! # Reports
//!
//! - `balance-sheet` - Assets, liabilities and net worth
//! - `cash-flow` - Income, expenses and net cash flow
//! - `summary` - Largest top-level categories of one type

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use finroll_core::{BalanceSheet, CashFlowStatement, CategoryType, DashboardSummary};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::render::{self, JsonReport, OutputFormat, Section, Statement};
use crate::snapshot::Snapshot;

/// Generate reports from a balance snapshot.
#[derive(Parser, Debug)]
#[command(name = "finroll-report")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// The snapshot JSON file to process
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// The report to generate
    #[command(subcommand)]
    pub report: Report,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Leave out categories whose totals are all zero
    #[arg(long, global = true)]
    pub hide_empty: bool,

    /// Display base amounts under this currency code
    #[arg(long, value_name = "CODE", global = true)]
    pub base_currency: Option<String>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available reports.
#[derive(Subcommand, Debug, Clone)]
pub enum Report {
    /// Assets, liabilities and net worth
    BalanceSheet,
    /// Income, expenses and net cash flow
    CashFlow,
    /// Largest top-level categories of one type
    Summary {
        /// Category type: asset, liability, income or expense
        #[arg(value_name = "TYPE")]
        category_type: CategoryType,

        /// Number of categories to list
        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },
}

/// Main entry point for the report command.
pub fn main() -> ExitCode {
    let args = Args::parse();
    super::init_tracing(args.verbose);

    let mut stdout = io::stdout().lock();
    match run(&args, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

/// Load the snapshot and write the requested report.
pub fn run<W: Write>(args: &Args, writer: &mut W) -> Result<()> {
    let mut snapshot = Snapshot::load(&args.file)?;
    if let Some(code) = &args.base_currency {
        snapshot.override_base_currency(code);
    }

    match &args.report {
        Report::BalanceSheet => report_balance_sheet(&snapshot, args, writer),
        Report::CashFlow => report_cash_flow(&snapshot, args, writer),
        Report::Summary {
            category_type,
            limit,
        } => report_summary(&snapshot, *category_type, *limit, args, writer),
    }
}

/// Generate a balance sheet.
fn report_balance_sheet<W: Write>(
    snapshot: &Snapshot,
    args: &Args,
    writer: &mut W,
) -> Result<()> {
    let mut sheet = BalanceSheet::build(&snapshot.categories, &snapshot.aggregates)
        .context("failed to build balance sheet")?;
    if args.hide_empty {
        render::hide_empty(&mut sheet.assets);
        render::hide_empty(&mut sheet.liabilities);
    }

    if args.format == OutputFormat::Json {
        return render::render_json(&json_report(snapshot, &sheet), writer);
    }

    let statement = Statement {
        title: "Balance Sheet",
        subtitle: snapshot.as_of_label(),
        sections: vec![
            Section {
                key: "assets",
                title: "Assets",
                forest: &sheet.assets,
                total: &sheet.total_assets,
            },
            Section {
                key: "liabilities",
                title: "Liabilities",
                forest: &sheet.liabilities,
                total: &sheet.total_liabilities,
            },
        ],
        summary: vec![("Net Worth", &sheet.net_worth)],
    };
    render::render_statement(&statement, args.format, &snapshot.base_currency, writer)
}

/// Generate a cash-flow statement.
fn report_cash_flow<W: Write>(snapshot: &Snapshot, args: &Args, writer: &mut W) -> Result<()> {
    let mut statement = CashFlowStatement::build(&snapshot.categories, &snapshot.aggregates)
        .context("failed to build cash-flow statement")?;
    if args.hide_empty {
        render::hide_empty(&mut statement.income);
        render::hide_empty(&mut statement.expenses);
    }

    if args.format == OutputFormat::Json {
        return render::render_json(&json_report(snapshot, &statement), writer);
    }

    let layout = Statement {
        title: "Cash Flow",
        subtitle: snapshot.period_label(),
        sections: vec![
            Section {
                key: "income",
                title: "Income",
                forest: &statement.income,
                total: &statement.total_income,
            },
            Section {
                key: "expenses",
                title: "Expenses",
                forest: &statement.expenses,
                total: &statement.total_expenses,
            },
        ],
        summary: vec![("Net Cash Flow", &statement.net_cash_flow)],
    };
    render::render_statement(&layout, args.format, &snapshot.base_currency, writer)
}

/// Generate a dashboard summary for one category type.
fn report_summary<W: Write>(
    snapshot: &Snapshot,
    category_type: CategoryType,
    limit: usize,
    args: &Args,
    writer: &mut W,
) -> Result<()> {
    let mut forest = finroll_core::build_aggregated_tree(
        &snapshot.categories,
        &snapshot.aggregates,
        category_type,
    )
    .with_context(|| format!("failed to aggregate {category_type} categories"))?;
    if args.hide_empty {
        render::hide_empty(&mut forest);
    }
    let summary = DashboardSummary::from_forest(category_type, &forest, limit)
        .with_context(|| format!("failed to summarize {category_type} categories"))?;

    if args.format == OutputFormat::Json {
        return render::render_json(&json_report(snapshot, &summary), writer);
    }

    let subtitle = if category_type.is_balance() {
        snapshot.as_of_label()
    } else {
        snapshot.period_label()
    };
    render::render_summary(
        &summary,
        subtitle.as_deref(),
        args.format,
        &snapshot.base_currency,
        writer,
    )
}

fn json_report<'a, T: Serialize>(snapshot: &'a Snapshot, report: &'a T) -> JsonReport<'a, T> {
    JsonReport {
        base_currency: &snapshot.base_currency,
        as_of: snapshot.as_of,
        period: snapshot.period,
        report,
    }
}
