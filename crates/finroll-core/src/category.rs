//! Category identity, type and the flat hierarchy record.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Unique identifier of a category.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(String);

impl CategoryId {
    /// Create a new id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for CategoryId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for CategoryId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// The partition a category belongs to.
///
/// Balance sheets use [`Asset`](Self::Asset) and [`Liability`](Self::Liability);
/// cash-flow statements use [`Income`](Self::Income) and [`Expense`](Self::Expense).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryType {
    /// Things owned
    Asset,
    /// Amounts owed
    Liability,
    /// Money coming in over a period
    Income,
    /// Money going out over a period
    Expense,
}

impl CategoryType {
    /// All category types, in report order.
    pub const ALL: [Self; 4] = [Self::Asset, Self::Liability, Self::Income, Self::Expense];

    /// The upper-case name used in inputs and outputs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asset => "ASSET",
            Self::Liability => "LIABILITY",
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
        }
    }

    /// Whether this type holds point-in-time balances rather than flows.
    #[must_use]
    pub const fn is_balance(&self) -> bool {
        matches!(self, Self::Asset | Self::Liability)
    }
}

impl FromStr for CategoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ASSET" | "ASSETS" => Ok(Self::Asset),
            "LIABILITY" | "LIABILITIES" => Ok(Self::Liability),
            "INCOME" => Ok(Self::Income),
            "EXPENSE" | "EXPENSES" => Ok(Self::Expense),
            _ => Err(format!("unknown category type: {s}")),
        }
    }
}

impl fmt::Display for CategoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of the classification hierarchy, as supplied by the category source.
///
/// A category without a type is kept in the input but never enters a forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier
    pub id: CategoryId,
    /// Display label
    pub name: String,
    /// Partition; `None` marks the category as unusable for aggregation
    #[serde(rename = "type", default)]
    pub category_type: Option<CategoryType>,
    /// Parent category; `None` means root
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    /// Sibling order for display
    #[serde(default)]
    pub order: i32,
}

impl Category {
    /// Create a root category of the given type with order 0.
    #[must_use]
    pub fn new(
        id: impl Into<CategoryId>,
        name: impl Into<String>,
        category_type: CategoryType,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category_type: Some(category_type),
            parent_id: None,
            order: 0,
        }
    }

    /// Create a category with no type.
    #[must_use]
    pub fn untyped(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category_type: None,
            parent_id: None,
            order: 0,
        }
    }

    /// Set the parent.
    #[must_use]
    pub fn with_parent(mut self, parent_id: impl Into<CategoryId>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Set the sibling order.
    #[must_use]
    pub const fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Whether this category belongs to the given partition.
    #[must_use]
    pub fn is_of_type(&self, category_type: CategoryType) -> bool {
        self.category_type == Some(category_type)
    }
}
