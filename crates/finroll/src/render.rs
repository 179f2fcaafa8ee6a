//! Report rendering.
//!
//! Reports reach this module fully aggregated. Everything here is
//! presentation: layout, number display and the optional removal of
//! categories that carry no value.

use anyhow::Result;
use chrono::NaiveDate;
use clap::ValueEnum;
use finroll_core::{
    CategoryNode, CategoryType, Currency, CurrencyTotals, DashboardSummary, Decimal, Totals,
};
use serde::Serialize;
use std::io::Write;

use crate::snapshot::Period;

/// Output format for reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Indented tree for terminals (default)
    #[default]
    Text,
    /// Pretty-printed JSON of the full report
    Json,
    /// One row per category and currency
    Csv,
}

const RULE_WIDTH: usize = 72;
const NAME_WIDTH: usize = 36;
const AMOUNT_WIDTH: usize = 16;

/// Column headers of the CSV category export.
pub const CSV_HEADER: [&str; 7] = [
    "section",
    "depth",
    "id",
    "name",
    "currency",
    "amount",
    "base_amount",
];

/// Column headers of the CSV dashboard export.
pub const SUMMARY_CSV_HEADER: [&str; 5] = ["rank", "id", "name", "base_amount", "share_percent"];

/// One titled forest of a statement.
#[derive(Debug, Clone, Copy)]
pub struct Section<'a> {
    /// Machine-readable name, used as the CSV `section` column
    pub key: &'static str,
    /// Heading shown in text output
    pub title: &'static str,
    /// The aggregated forest
    pub forest: &'a [CategoryNode],
    /// Sum of the forest's roots
    pub total: &'a Totals,
}

/// A multi-section statement such as a balance sheet.
#[derive(Debug, Clone)]
pub struct Statement<'a> {
    /// Report heading
    pub title: &'static str,
    /// Date or period the report covers
    pub subtitle: Option<String>,
    /// Forests in display order
    pub sections: Vec<Section<'a>>,
    /// Closing lines, such as net worth
    pub summary: Vec<(&'static str, &'a Totals)>,
}

/// JSON wrapper adding the snapshot metadata to a report.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a, T: Serialize> {
    /// Currency of every base amount
    pub base_currency: &'a Currency,
    /// Balance date, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_of: Option<NaiveDate>,
    /// Flow period, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
    /// The report itself
    #[serde(flatten)]
    pub report: &'a T,
}

/// Remove every category whose subtree carries no value.
///
/// Children are pruned first. A parent whose children cancel out stays as
/// long as one of them survives or one of its own accounts is non-zero.
pub fn hide_empty(forest: &mut Vec<CategoryNode>) {
    for node in forest.iter_mut() {
        hide_empty(&mut node.children);
    }
    forest.retain(|node| {
        !node.is_zero()
            || !node.children.is_empty()
            || node.accounts.iter().any(|a| !a.amount.is_zero())
    });
}

/// Render a statement as text or CSV.
///
/// JSON goes through [`render_json`] instead, since it serializes the report
/// value rather than the statement layout.
pub fn render_statement<W: Write>(
    statement: &Statement<'_>,
    format: OutputFormat,
    currency: &Currency,
    writer: &mut W,
) -> Result<()> {
    match format {
        OutputFormat::Csv => render_statement_csv(statement, writer),
        OutputFormat::Text | OutputFormat::Json => {
            render_statement_text(statement, currency, writer)
        }
    }
}

fn render_statement_text<W: Write>(
    statement: &Statement<'_>,
    currency: &Currency,
    writer: &mut W,
) -> Result<()> {
    write_heading(statement.title, statement.subtitle.as_deref(), writer)?;

    for section in &statement.sections {
        writeln!(writer, "{}", section.title)?;
        writeln!(writer, "{}", "-".repeat(RULE_WIDTH))?;

        if section.forest.is_empty() {
            writeln!(writer, "  (no categories)")?;
        }
        for row in CategoryNode::flatten(section.forest) {
            let label = format!("{}{}", "  ".repeat(row.depth), row.node.name);
            write_amount_line(
                &label,
                row.node.total_in_base_currency,
                &row.node.total_by_currency,
                currency,
                writer,
            )?;
        }

        let label = format!("Total {}", section.title);
        write_amount_line(
            &label,
            section.total.in_base_currency,
            &section.total.by_currency,
            currency,
            writer,
        )?;
        writeln!(writer)?;
    }

    if !statement.summary.is_empty() {
        writeln!(writer, "{}", "=".repeat(RULE_WIDTH))?;
        for (label, totals) in &statement.summary {
            write_amount_line(
                label,
                totals.in_base_currency,
                &totals.by_currency,
                currency,
                writer,
            )?;
        }
    }

    Ok(())
}

fn render_statement_csv<W: Write>(statement: &Statement<'_>, writer: &mut W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(CSV_HEADER)?;

    for section in &statement.sections {
        for row in CategoryNode::flatten(section.forest) {
            let node = row.node;
            let depth = row.depth.to_string();
            let base = node.total_in_base_currency.to_string();

            if node.total_by_currency.is_empty() {
                csv.write_record([
                    section.key,
                    depth.as_str(),
                    node.id.as_str(),
                    node.name.as_str(),
                    "",
                    "",
                    base.as_str(),
                ])?;
                continue;
            }
            for (code, amount) in node.total_by_currency.iter() {
                let amount = amount.to_string();
                csv.write_record([
                    section.key,
                    depth.as_str(),
                    node.id.as_str(),
                    node.name.as_str(),
                    code,
                    amount.as_str(),
                    base.as_str(),
                ])?;
            }
        }
    }

    csv.flush()?;
    Ok(())
}

/// Render a dashboard summary as text or CSV.
pub fn render_summary<W: Write>(
    summary: &DashboardSummary,
    subtitle: Option<&str>,
    format: OutputFormat,
    currency: &Currency,
    writer: &mut W,
) -> Result<()> {
    match format {
        OutputFormat::Csv => render_summary_csv(summary, writer),
        OutputFormat::Text | OutputFormat::Json => {
            render_summary_text(summary, subtitle, currency, writer)
        }
    }
}

fn render_summary_text<W: Write>(
    summary: &DashboardSummary,
    subtitle: Option<&str>,
    currency: &Currency,
    writer: &mut W,
) -> Result<()> {
    let title = format!("Top {} Categories", type_title(summary.category_type));
    write_heading(&title, subtitle, writer)?;

    if summary.top.is_empty() {
        writeln!(writer, "  (no categories)")?;
    }
    for (rank, share) in summary.top.iter().enumerate() {
        let label = format!("{:>2}. {}", rank + 1, share.name);
        let percent = format!("{}%", share.share_percent);
        writeln!(
            writer,
            "{label:<NAME_WIDTH$} {:>AMOUNT_WIDTH$} {percent:>9}",
            currency.format(display_scale(share.total_in_base_currency)),
        )?;
    }
    if !summary.remainder_in_base_currency.is_zero() {
        writeln!(
            writer,
            "{:<NAME_WIDTH$} {:>AMOUNT_WIDTH$}",
            "    Other",
            currency.format(display_scale(summary.remainder_in_base_currency)),
        )?;
    }

    writeln!(writer, "{}", "-".repeat(RULE_WIDTH))?;
    write_amount_line(
        "Total",
        summary.total.in_base_currency,
        &summary.total.by_currency,
        currency,
        writer,
    )?;
    Ok(())
}

fn render_summary_csv<W: Write>(summary: &DashboardSummary, writer: &mut W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(SUMMARY_CSV_HEADER)?;

    for (rank, share) in summary.top.iter().enumerate() {
        let rank = (rank + 1).to_string();
        let base = share.total_in_base_currency.to_string();
        let percent = share.share_percent.to_string();
        csv.write_record([
            rank.as_str(),
            share.id.as_str(),
            share.name.as_str(),
            base.as_str(),
            percent.as_str(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

/// Write any serializable report as pretty JSON followed by a newline.
pub fn render_json<W: Write, T: Serialize>(value: &T, writer: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    Ok(())
}

fn write_heading<W: Write>(title: &str, subtitle: Option<&str>, writer: &mut W) -> Result<()> {
    match subtitle {
        Some(subtitle) => writeln!(writer, "{title} ({subtitle})")?,
        None => writeln!(writer, "{title}")?,
    }
    writeln!(writer, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(writer)?;
    Ok(())
}

fn write_amount_line<W: Write>(
    label: &str,
    base: Decimal,
    by_currency: &CurrencyTotals,
    currency: &Currency,
    writer: &mut W,
) -> Result<()> {
    let natives = by_currency
        .iter()
        .map(|(code, amount)| format!("{amount} {code}"))
        .collect::<Vec<_>>()
        .join(", ");
    let line = format!(
        "{label:<NAME_WIDTH$} {:>AMOUNT_WIDTH$}  {natives}",
        currency.format(display_scale(base)),
    );
    writeln!(writer, "{}", line.trim_end())?;
    Ok(())
}

/// Show base amounts with at least two decimal places.
fn display_scale(number: Decimal) -> Decimal {
    let mut number = number;
    if number.scale() < 2 {
        number.rescale(2);
    }
    number
}

const fn type_title(category_type: CategoryType) -> &'static str {
    match category_type {
        CategoryType::Asset => "Asset",
        CategoryType::Liability => "Liability",
        CategoryType::Income => "Income",
        CategoryType::Expense => "Expense",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finroll_core::{AccountBalance, CategoryId};
    use rust_decimal_macros::dec;

    fn node(id: &str, base: Decimal, children: Vec<CategoryNode>) -> CategoryNode {
        let mut by_currency = CurrencyTotals::new();
        if !base.is_zero() {
            by_currency.add("USD", base);
        }
        CategoryNode {
            id: CategoryId::new(id),
            name: id.to_uppercase(),
            category_type: CategoryType::Asset,
            parent_id: None,
            order: 0,
            children,
            accounts: Vec::<AccountBalance>::new(),
            total_by_currency: by_currency,
            total_in_base_currency: base,
        }
    }

    fn usd() -> Currency {
        Currency::new("USD", "$")
    }

    #[test]
    fn test_hide_empty_prunes_zero_subtrees() {
        let mut forest = vec![
            node(
                "assets",
                dec!(10),
                vec![node("bank", dec!(10), vec![]), node("cash", dec!(0), vec![])],
            ),
            node("empty", dec!(0), vec![node("nested", dec!(0), vec![])]),
        ];
        hide_empty(&mut forest);

        assert_eq!(forest.len(), 1);
        let children: Vec<&str> = forest[0].children.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(children, vec!["bank"]);
    }

    #[test]
    fn test_hide_empty_keeps_offsetting_children() {
        let mut cards = node(
            "cards",
            dec!(0),
            vec![node("visa", dec!(250), vec![]), node("amex", dec!(-250), vec![])],
        );
        cards.total_by_currency.add("USD", dec!(0));
        let mut forest = vec![cards, node("unused", dec!(0), vec![])];
        hide_empty(&mut forest);

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id.as_str(), "cards");
        let children: Vec<&str> = forest[0].children.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(children, vec!["visa", "amex"]);
    }

    #[test]
    fn test_hide_empty_keeps_offsetting_accounts() {
        let mut wallet = node("wallet", dec!(0), vec![]);
        wallet.accounts = vec![
            AccountBalance::new("in", "In", usd(), dec!(5)).with_base_amount(dec!(5)),
            AccountBalance::new("out", "Out", usd(), dec!(-5)).with_base_amount(dec!(-5)),
        ];
        let mut forest = vec![wallet];
        hide_empty(&mut forest);
        assert_eq!(forest.len(), 1);
    }

    #[test]
    fn test_display_scale() {
        assert_eq!(display_scale(dec!(0)).to_string(), "0.00");
        assert_eq!(display_scale(dec!(154)).to_string(), "154.00");
        assert_eq!(display_scale(dec!(1.234)).to_string(), "1.234");
    }

    #[test]
    fn test_text_statement_layout() {
        let forest = vec![node("assets", dec!(15), vec![node("bank", dec!(15), vec![])])];
        let total = Totals::of_forest(&forest).unwrap();
        let statement = Statement {
            title: "Balance Sheet",
            subtitle: Some("as of 2024-03-31".to_string()),
            sections: vec![Section {
                key: "assets",
                title: "Assets",
                forest: &forest,
                total: &total,
            }],
            summary: vec![("Net Worth", &total)],
        };

        let mut out = Vec::new();
        render_statement(&statement, OutputFormat::Text, &usd(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("Balance Sheet (as of 2024-03-31)\n"));
        assert!(text.contains("\nASSETS "));
        assert!(text.contains("\n  BANK "));
        assert!(text.contains("$15.00  15 USD"));
        assert!(text.contains("Total Assets"));
        assert!(text.contains("Net Worth"));
    }

    #[test]
    fn test_csv_rows() {
        let mut bank = node("bank", dec!(54), vec![]);
        bank.total_by_currency.add("EUR", dec!(50));
        let forest = vec![node("assets", dec!(0), vec![]), bank];
        let total = Totals::of_forest(&forest).unwrap();
        let statement = Statement {
            title: "Balance Sheet",
            subtitle: None,
            sections: vec![Section {
                key: "assets",
                title: "Assets",
                forest: &forest,
                total: &total,
            }],
            summary: Vec::new(),
        };

        let mut out = Vec::new();
        render_statement(&statement, OutputFormat::Csv, &usd(), &mut out).unwrap();
        let csv = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines,
            vec![
                "section,depth,id,name,currency,amount,base_amount",
                "assets,0,assets,ASSETS,,,0",
                "assets,0,bank,BANK,EUR,50,54",
                "assets,0,bank,BANK,USD,54,54",
            ]
        );
    }
}
