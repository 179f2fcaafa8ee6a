//! Per-category balance data supplied by the balance-calculation collaborator.
//!
//! The engine never computes an account's balance. It receives, per category
//! id, the accounts directly owned by that category together with their
//! native and base-currency amounts, and only rolls those numbers up the tree.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{CategoryId, Currency, CurrencyTotals, Money};

/// Raw aggregates keyed by category id.
pub type AggregateMap = HashMap<CategoryId, CategoryAggregate>;

/// A single account's contribution to a category for one reporting period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// Account identifier
    pub account_id: String,
    /// Account display name
    pub name: String,
    /// Native currency of the account
    pub currency: Currency,
    /// Balance (or period flow) in the native currency
    #[serde(alias = "total_amount")]
    pub amount: Decimal,
    /// The same value converted to the report's base currency, if conversion
    /// was available upstream
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_in_base_currency: Option<Decimal>,
}

impl AccountBalance {
    /// Create an account balance without a base-currency amount.
    #[must_use]
    pub fn new(
        account_id: impl Into<String>,
        name: impl Into<String>,
        currency: Currency,
        amount: Decimal,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            name: name.into(),
            currency,
            amount,
            amount_in_base_currency: None,
        }
    }

    /// Set the base-currency amount.
    #[must_use]
    pub const fn with_base_amount(mut self, amount: Decimal) -> Self {
        self.amount_in_base_currency = Some(amount);
        self
    }

    /// The native amount as a money value.
    #[must_use]
    pub fn native(&self) -> Money {
        Money::new(self.amount, self.currency.code.clone())
    }

    /// The base-currency amount, counting a missing conversion as zero.
    #[must_use]
    pub fn base_amount_or_zero(&self) -> Decimal {
        self.amount_in_base_currency.unwrap_or(Decimal::ZERO)
    }
}

/// Own-account balance data for one category.
///
/// `total_by_currency` and `total_in_base_currency` cover this category's own
/// accounts only, never its descendants. Either may be left out by the
/// producer, in which case [`seed_by_currency`](Self::seed_by_currency) and
/// [`seed_in_base_currency`](Self::seed_in_base_currency) derive it from
/// `accounts`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAggregate {
    /// Accounts directly attached to the category
    #[serde(default)]
    pub accounts: Vec<AccountBalance>,
    /// Native sums over `accounts`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_by_currency: Option<CurrencyTotals>,
    /// Base-currency sum over `accounts`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_in_base_currency: Option<Decimal>,
}

impl CategoryAggregate {
    /// Build an aggregate whose totals are computed from the given accounts.
    ///
    /// Accounts lacking a base-currency amount contribute zero to the base
    /// total but still count in their native currency. A total that would
    /// overflow is left out and derived again, failing, at rollup.
    #[must_use]
    pub fn from_accounts(accounts: Vec<AccountBalance>) -> Self {
        let total_by_currency = native_totals(&accounts);
        let total_in_base_currency = base_total(&accounts);
        Self {
            accounts,
            total_by_currency,
            total_in_base_currency,
        }
    }

    /// Native totals used to seed a node, `None` on overflow.
    ///
    /// Supplied totals that are empty while accounts exist are treated as
    /// absent.
    #[must_use]
    pub fn seed_by_currency(&self) -> Option<CurrencyTotals> {
        match &self.total_by_currency {
            Some(totals) if !totals.is_empty() || self.accounts.is_empty() => Some(totals.clone()),
            _ => native_totals(&self.accounts),
        }
    }

    /// Base-currency total used to seed a node, `None` on overflow.
    #[must_use]
    pub fn seed_in_base_currency(&self) -> Option<Decimal> {
        self.total_in_base_currency
            .or_else(|| base_total(&self.accounts))
    }

    /// Accounts with no base-currency amount.
    pub fn unconverted_accounts(&self) -> impl Iterator<Item = &AccountBalance> {
        self.accounts
            .iter()
            .filter(|a| a.amount_in_base_currency.is_none())
    }
}

/// Native sums of a list of accounts, `None` if any sum overflows.
#[must_use]
pub fn native_totals(accounts: &[AccountBalance]) -> Option<CurrencyTotals> {
    let mut totals = CurrencyTotals::new();
    for account in accounts {
        totals.checked_add_money(&account.native())?;
    }
    Some(totals)
}

/// Base-currency sum of a list of accounts, missing conversions as zero.
///
/// `None` if the sum overflows.
#[must_use]
pub fn base_total(accounts: &[AccountBalance]) -> Option<Decimal> {
    accounts
        .iter()
        .try_fold(Decimal::ZERO, |sum, a| sum.checked_add(a.base_amount_or_zero()))
}
