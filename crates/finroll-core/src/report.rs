//! Report views built on top of the aggregation engine.
//!
//! Each report builds two (or one) independent forests and derives its
//! summary line from the root totals only.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    build_aggregated_tree, AggregateMap, Category, CategoryId, CategoryNode, CategoryType,
    EngineError, Totals,
};

/// Assets and liabilities at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheet {
    /// ASSET forest
    pub assets: Vec<CategoryNode>,
    /// LIABILITY forest
    pub liabilities: Vec<CategoryNode>,
    /// Sum of asset roots
    pub total_assets: Totals,
    /// Sum of liability roots
    pub total_liabilities: Totals,
    /// `total_assets - total_liabilities`
    pub net_worth: Totals,
}

impl BalanceSheet {
    /// Build the balance sheet.
    ///
    /// Liability balances are expected as positive amounts owed.
    pub fn build(categories: &[Category], aggregates: &AggregateMap) -> Result<Self, EngineError> {
        let assets = build_aggregated_tree(categories, aggregates, CategoryType::Asset)?;
        let liabilities = build_aggregated_tree(categories, aggregates, CategoryType::Liability)?;
        let total_assets = Totals::of_forest(&assets)?;
        let total_liabilities = Totals::of_forest(&liabilities)?;
        let net_worth = total_assets.checked_sub(&total_liabilities)?;

        Ok(Self {
            assets,
            liabilities,
            total_assets,
            total_liabilities,
            net_worth,
        })
    }
}

/// Income and expenses over a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowStatement {
    /// INCOME forest
    pub income: Vec<CategoryNode>,
    /// EXPENSE forest
    pub expenses: Vec<CategoryNode>,
    /// Sum of income roots
    pub total_income: Totals,
    /// Sum of expense roots
    pub total_expenses: Totals,
    /// `total_income - total_expenses`
    pub net_cash_flow: Totals,
}

impl CashFlowStatement {
    /// Build the cash-flow statement.
    pub fn build(categories: &[Category], aggregates: &AggregateMap) -> Result<Self, EngineError> {
        let income = build_aggregated_tree(categories, aggregates, CategoryType::Income)?;
        let expenses = build_aggregated_tree(categories, aggregates, CategoryType::Expense)?;
        let total_income = Totals::of_forest(&income)?;
        let total_expenses = Totals::of_forest(&expenses)?;
        let net_cash_flow = total_income.checked_sub(&total_expenses)?;

        Ok(Self {
            income,
            expenses,
            total_income,
            total_expenses,
            net_cash_flow,
        })
    }
}

/// A top-level category and its part of the partition total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryShare {
    /// Category identifier
    pub id: CategoryId,
    /// Display label
    pub name: String,
    /// Rolled-up base-currency total
    pub total_in_base_currency: Decimal,
    /// Percentage of the partition total, two decimal places
    pub share_percent: Decimal,
}

/// Dashboard panel: the largest top-level categories of one partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Partition summarized
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    /// Sum of every root
    pub total: Totals,
    /// Largest roots by base-currency total, at most `limit` of them
    pub top: Vec<CategoryShare>,
    /// Base-currency total of the roots left out of `top`
    pub remainder_in_base_currency: Decimal,
}

impl DashboardSummary {
    /// Build the summary for one partition.
    ///
    /// Roots are ranked by base-currency total, largest first; equal totals
    /// keep their display order.
    pub fn build(
        categories: &[Category],
        aggregates: &AggregateMap,
        category_type: CategoryType,
        limit: usize,
    ) -> Result<Self, EngineError> {
        let forest = build_aggregated_tree(categories, aggregates, category_type)?;
        Self::from_forest(category_type, &forest, limit)
    }

    /// Summarize an already aggregated forest.
    pub fn from_forest(
        category_type: CategoryType,
        forest: &[CategoryNode],
        limit: usize,
    ) -> Result<Self, EngineError> {
        let overflow = || EngineError::AmountOverflow { category: None };
        let total = Totals::of_forest(forest)?;

        let mut ranked: Vec<&CategoryNode> = forest.iter().collect();
        ranked.sort_by(|a, b| b.total_in_base_currency.cmp(&a.total_in_base_currency));

        let top = ranked
            .iter()
            .take(limit)
            .map(|node| {
                Ok(CategoryShare {
                    id: node.id.clone(),
                    name: node.name.clone(),
                    total_in_base_currency: node.total_in_base_currency,
                    share_percent: share_percent(
                        node.total_in_base_currency,
                        total.in_base_currency,
                    )
                    .ok_or_else(overflow)?,
                })
            })
            .collect::<Result<Vec<_>, EngineError>>()?;

        let remainder_in_base_currency = ranked
            .iter()
            .skip(limit)
            .try_fold(Decimal::ZERO, |sum, node| {
                sum.checked_add(node.total_in_base_currency)
            })
            .ok_or_else(overflow)?;

        Ok(Self {
            category_type,
            total,
            top,
            remainder_in_base_currency,
        })
    }
}

fn share_percent(part: Decimal, whole: Decimal) -> Option<Decimal> {
    if whole.is_zero() {
        return Some(Decimal::ZERO);
    }
    let ratio = part.checked_div(whole)?;
    Some(ratio.checked_mul(Decimal::ONE_HUNDRED)?.round_dp(2))
}
