//! Money values and per-currency totals.
//!
//! A [`Money`] is the atomic unit summed throughout a category tree: a
//! decimal number paired with a currency code. [`CurrencyTotals`] collects
//! money in several currencies at once, keyed by currency code in a stable
//! order, and only ever holds currencies that something actually reported.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A currency descriptor: ISO-style code plus a display symbol.
///
/// # Examples
///
/// ```
/// use finroll_core::Currency;
/// use rust_decimal_macros::dec;
///
/// let usd = Currency::new("USD", "$");
/// assert_eq!(usd.format(dec!(-12.50)), "-$12.50");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency {
    /// The currency code (e.g., "USD", "EUR", "JPY")
    pub code: String,
    /// The display symbol (e.g., "$", "€"); may be empty
    #[serde(default)]
    pub symbol: String,
}

impl Currency {
    /// Create a new currency descriptor.
    #[must_use]
    pub fn new(code: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            symbol: symbol.into(),
        }
    }

    /// Create a descriptor with no symbol; the code is used for display.
    #[must_use]
    pub fn from_code(code: impl Into<String>) -> Self {
        Self::new(code, "")
    }

    /// Format a number in this currency.
    ///
    /// Uses the symbol as a prefix when present, the code as a suffix otherwise.
    #[must_use]
    pub fn format(&self, number: Decimal) -> String {
        if self.symbol.is_empty() {
            return format!("{number} {}", self.code);
        }
        if number.is_sign_negative() && !number.is_zero() {
            format!("-{}{}", self.symbol, number.abs())
        } else {
            format!("{}{number}", self.symbol)
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

/// A quantity paired with a currency code.
///
/// # Examples
///
/// ```
/// use finroll_core::{CurrencyTotals, Money};
/// use rust_decimal_macros::dec;
///
/// let mut totals = CurrencyTotals::new();
/// totals.checked_add_money(&Money::new(dec!(100.00), "USD")).unwrap();
/// totals.checked_add_money(&Money::new(dec!(50.00), "USD")).unwrap();
/// assert_eq!(totals.get("USD"), Some(dec!(150.00)));
/// assert_eq!(Money::new(dec!(150.00), "USD").to_string(), "150.00 USD");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    /// The decimal quantity
    pub number: Decimal,
    /// The currency code
    pub currency: String,
}

impl Money {
    /// Create a new money value.
    #[must_use]
    pub fn new(number: Decimal, currency: impl Into<String>) -> Self {
        Self {
            number,
            currency: currency.into(),
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.number, self.currency)
    }
}

/// Totals in several currencies, keyed by currency code.
///
/// A key exists only once some amount in that currency has been added, so an
/// empty `CurrencyTotals` means "nothing reported" rather than "zero in
/// every currency". Keys iterate in code order.
///
/// # Examples
///
/// ```
/// use finroll_core::CurrencyTotals;
/// use rust_decimal_macros::dec;
///
/// let mut totals = CurrencyTotals::new();
/// totals.add("USD", dec!(100));
/// totals.add("EUR", dec!(50));
/// totals.add("USD", dec!(-25));
///
/// assert_eq!(totals.get("USD"), Some(dec!(75)));
/// assert_eq!(totals.get("JPY"), None);
/// assert_eq!(totals.currencies().collect::<Vec<_>>(), vec!["EUR", "USD"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyTotals(BTreeMap<String, Decimal>);

impl CurrencyTotals {
    /// Create empty totals.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an amount in the given currency, creating the key if absent.
    ///
    /// # Panics
    ///
    /// Panics if the total leaves the range of [`Decimal`]. The engine only
    /// uses [`checked_add`](Self::checked_add).
    pub fn add(&mut self, currency: &str, number: Decimal) {
        if let Some(total) = self.0.get_mut(currency) {
            *total += number;
        } else {
            self.0.insert(currency.to_string(), number);
        }
    }

    /// Add an amount, or return `None` and leave the totals unchanged if the
    /// sum would overflow.
    #[must_use]
    pub fn checked_add(&mut self, currency: &str, number: Decimal) -> Option<()> {
        if let Some(total) = self.0.get_mut(currency) {
            *total = total.checked_add(number)?;
        } else {
            self.0.insert(currency.to_string(), number);
        }
        Some(())
    }

    /// Add a money value; see [`checked_add`](Self::checked_add).
    #[must_use]
    pub fn checked_add_money(&mut self, money: &Money) -> Option<()> {
        self.checked_add(&money.currency, money.number)
    }

    /// Add every entry of `other` into these totals.
    ///
    /// On overflow `None` is returned and the entries before the failing
    /// currency have already been added.
    #[must_use]
    pub fn checked_merge(&mut self, other: &Self) -> Option<()> {
        for (currency, number) in &other.0 {
            self.checked_add(currency, *number)?;
        }
        Some(())
    }

    /// Per-currency difference over the union of both key sets.
    #[must_use]
    pub fn checked_sub(&self, other: &Self) -> Option<Self> {
        let mut result = self.clone();
        for (currency, number) in &other.0 {
            result.checked_add(currency, -*number)?;
        }
        Some(result)
    }

    /// Get the total for a currency, if that currency was ever reported.
    #[must_use]
    pub fn get(&self, currency: &str) -> Option<Decimal> {
        self.0.get(currency).copied()
    }

    /// Check whether a currency was reported.
    #[must_use]
    pub fn contains(&self, currency: &str) -> bool {
        self.0.contains_key(currency)
    }

    /// Check if no currency was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of currencies reported.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if every reported total is zero (vacuously true when empty).
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.values().all(Decimal::is_zero)
    }

    /// Iterate over `(currency, total)` pairs in currency-code order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.0.iter().map(|(c, n)| (c.as_str(), *n))
    }

    /// Iterate over the reported currency codes.
    pub fn currencies(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}
