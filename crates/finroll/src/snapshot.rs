//! Balance snapshot loading.
//!
//! A snapshot is the JSON hand-off between the balance-calculation side and
//! the report tools: the category list, the per-category account aggregates,
//! and the base currency and reporting date they were computed for.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use finroll_core::{AggregateMap, Category, Currency};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Reporting period for flow reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    /// First day of the period
    pub start: NaiveDate,
    /// Last day of the period
    pub end: NaiveDate,
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Everything a report needs, as produced upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Currency all `*_in_base_currency` amounts are expressed in
    pub base_currency: Currency,
    /// Date balances were taken
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<NaiveDate>,
    /// Period flows were summed over
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
    /// Flat category hierarchy
    #[serde(default)]
    pub categories: Vec<Category>,
    /// Own-account aggregates keyed by category id
    #[serde(default)]
    pub aggregates: AggregateMap,
}

impl Snapshot {
    /// Load a snapshot from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("file not found: {}", path.display());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let snapshot = Self::from_json(&content)
            .with_context(|| format!("failed to load {}", path.display()))?;

        debug!(
            path = %path.display(),
            categories = snapshot.categories.len(),
            aggregates = snapshot.aggregates.len(),
            "loaded snapshot"
        );
        Ok(snapshot)
    }

    /// Parse a snapshot from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self = serde_json::from_str(json).context("invalid snapshot JSON")?;
        if let Some(period) = snapshot.period {
            if period.start > period.end {
                anyhow::bail!(
                    "period start {} is after period end {}",
                    period.start,
                    period.end
                );
            }
        }
        Ok(snapshot)
    }

    /// Replace the display descriptor of the base currency.
    ///
    /// Amounts are not converted; the symbol is kept only when the code is
    /// unchanged.
    pub fn override_base_currency(&mut self, code: &str) {
        if !self.base_currency.code.eq_ignore_ascii_case(code) {
            self.base_currency = Currency::from_code(code.to_uppercase());
        }
    }

    /// Header line for point-in-time reports.
    #[must_use]
    pub fn as_of_label(&self) -> Option<String> {
        self.as_of
            .map(|date| format!("as of {date}"))
            .or_else(|| self.period.map(|p| format!("as of {}", p.end)))
    }

    /// Header line for period reports.
    #[must_use]
    pub fn period_label(&self) -> Option<String> {
        self.period
            .map(|p| format!("for {p}"))
            .or_else(|| self.as_of.map(|date| format!("up to {date}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finroll_core::CategoryType;
    use rust_decimal_macros::dec;

    const SNAPSHOT: &str = r#"{
        "base_currency": { "code": "USD", "symbol": "$" },
        "as_of": "2024-03-31",
        "period": { "start": "2024-03-01", "end": "2024-03-31" },
        "categories": [
            { "id": "assets", "name": "Assets", "type": "ASSET" },
            { "id": "bank", "name": "Bank", "type": "ASSET", "parent_id": "assets", "order": 1 },
            { "id": "misc", "name": "Misc" }
        ],
        "aggregates": {
            "bank": {
                "accounts": [
                    {
                        "account_id": "chk",
                        "name": "Checking",
                        "currency": { "code": "USD", "symbol": "$" },
                        "amount": "100.00",
                        "amount_in_base_currency": 100.00
                    },
                    {
                        "account_id": "sav",
                        "name": "Savings",
                        "currency": { "code": "EUR" },
                        "total_amount": 50
                    }
                ]
            }
        }
    }"#;

    #[test]
    fn test_parse_snapshot() {
        let snapshot = Snapshot::from_json(SNAPSHOT).unwrap();
        assert_eq!(snapshot.base_currency, Currency::new("USD", "$"));
        assert_eq!(snapshot.categories.len(), 3);
        assert_eq!(snapshot.categories[1].order, 1);
        assert_eq!(snapshot.categories[2].category_type, None);
        assert_eq!(
            snapshot.categories[0].category_type,
            Some(CategoryType::Asset)
        );

        let bank = snapshot.aggregates.get("bank").unwrap();
        assert_eq!(bank.accounts[0].amount, dec!(100.00));
        assert_eq!(bank.accounts[0].amount_in_base_currency, Some(dec!(100)));
        assert_eq!(bank.accounts[1].amount, dec!(50));
        assert_eq!(bank.accounts[1].currency.symbol, "");
        assert!(bank.total_by_currency.is_none());
    }

    #[test]
    fn test_labels() {
        let mut snapshot = Snapshot::from_json(SNAPSHOT).unwrap();
        assert_eq!(snapshot.as_of_label().as_deref(), Some("as of 2024-03-31"));
        assert_eq!(
            snapshot.period_label().as_deref(),
            Some("for 2024-03-01 to 2024-03-31")
        );

        snapshot.as_of = None;
        assert_eq!(snapshot.as_of_label().as_deref(), Some("as of 2024-03-31"));
        snapshot.period = None;
        assert_eq!(snapshot.as_of_label(), None);
        assert_eq!(snapshot.period_label(), None);
    }

    #[test]
    fn test_override_base_currency() {
        let mut snapshot = Snapshot::from_json(SNAPSHOT).unwrap();
        snapshot.override_base_currency("usd");
        assert_eq!(snapshot.base_currency.symbol, "$");

        snapshot.override_base_currency("eur");
        assert_eq!(snapshot.base_currency, Currency::from_code("EUR"));
    }

    #[test]
    fn test_reversed_period_rejected() {
        let json = r#"{
            "base_currency": { "code": "USD" },
            "period": { "start": "2024-04-01", "end": "2024-03-01" }
        }"#;
        let err = Snapshot::from_json(json).unwrap_err();
        assert!(err.to_string().contains("is after period end"));
    }

    #[test]
    fn test_invalid_json() {
        let err = Snapshot::from_json("{ not json").unwrap_err();
        assert!(err.to_string().contains("invalid snapshot JSON"));
    }
}
