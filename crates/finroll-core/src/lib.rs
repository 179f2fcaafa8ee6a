//! Core types and aggregation engine for finroll
//!
//! This crate turns a flat category list plus per-category account balances
//! into sorted category forests whose every node carries rolled-up totals,
//! both per native currency and in a single base currency:
//!
//! - [`Money`] - A decimal number tagged with a currency code
//! - [`CurrencyTotals`] - Per-currency sums that never invent zero entries
//! - [`Category`] / [`CategoryType`] - The flat classification hierarchy
//! - [`CategoryAggregate`] / [`AccountBalance`] - Pre-computed balances per category
//! - [`CategoryNode`] - An output node with rolled-up totals
//! - [`build_aggregated_tree`] - Build, attach, roll up and sort in one call
//! - [`BalanceSheet`], [`CashFlowStatement`], [`DashboardSummary`] - Report views
//!
//! # Example
//!
//! ```
//! use finroll_core::{
//!     build_aggregated_tree, AccountBalance, Category, CategoryAggregate, CategoryType,
//!     Currency,
//! };
//! use rust_decimal_macros::dec;
//! use std::collections::HashMap;
//!
//! let categories = vec![
//!     Category::new("assets", "Assets", CategoryType::Asset),
//!     Category::new("bank", "Bank", CategoryType::Asset).with_parent("assets"),
//! ];
//!
//! let mut aggregates = HashMap::new();
//! aggregates.insert(
//!     "bank".into(),
//!     CategoryAggregate::from_accounts(vec![AccountBalance::new(
//!         "acc-1",
//!         "Checking",
//!         Currency::new("USD", "$"),
//!         dec!(100.00),
//!     )
//!     .with_base_amount(dec!(100.00))]),
//! );
//!
//! let forest = build_aggregated_tree(&categories, &aggregates, CategoryType::Asset).unwrap();
//! assert_eq!(forest.len(), 1);
//! assert_eq!(forest[0].total_in_base_currency, dec!(100.00));
//! assert_eq!(forest[0].total_by_currency.get("USD"), Some(dec!(100.00)));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregate;
pub mod builder;
pub mod category;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod money;
pub mod node;
pub mod report;
pub mod rollup;
pub mod sort;

pub use aggregate::{AccountBalance, AggregateMap, CategoryAggregate};
pub use builder::{attach, CategoryTree, TreeBuilder};
pub use category::{Category, CategoryId, CategoryType};
pub use diagnostics::{diagnose, Diagnostic, DiagnosticCode, Severity};
pub use engine::build_aggregated_tree;
pub use error::EngineError;
pub use money::{Currency, CurrencyTotals, Money};
pub use node::{CategoryNode, FlatRow, Totals};
pub use report::{BalanceSheet, CashFlowStatement, CategoryShare, DashboardSummary};
pub use rollup::{rollup, MAX_DEPTH};
pub use sort::sort_forest;

// Re-export commonly used external types
pub use chrono::NaiveDate;
pub use rust_decimal::Decimal;
