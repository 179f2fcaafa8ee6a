//! Output nodes of an aggregated category forest.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountBalance, CategoryId, CategoryType, CurrencyTotals, EngineError};

/// A category with its children, its own accounts and rolled-up totals.
///
/// `total_by_currency` and `total_in_base_currency` cover the whole subtree:
/// the node's own accounts plus every descendant, each account counted once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryNode {
    /// Category identifier
    pub id: CategoryId,
    /// Display label
    pub name: String,
    /// Partition the node belongs to
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    /// Parent as given in the input, even when the node was promoted to root
    pub parent_id: Option<CategoryId>,
    /// Sibling order
    pub order: i32,
    /// Child categories, sorted by `order`
    pub children: Vec<CategoryNode>,
    /// Accounts directly attached to this category
    pub accounts: Vec<AccountBalance>,
    /// Rolled-up native totals
    pub total_by_currency: CurrencyTotals,
    /// Rolled-up base-currency total
    pub total_in_base_currency: Decimal,
}

impl CategoryNode {
    /// The node's rolled-up totals.
    #[must_use]
    pub fn totals(&self) -> Totals {
        Totals {
            by_currency: self.total_by_currency.clone(),
            in_base_currency: self.total_in_base_currency,
        }
    }

    /// Whether the node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Whether the subtree carries no value at all.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.total_in_base_currency.is_zero() && self.total_by_currency.is_zero()
    }

    /// Number of nodes in this subtree, including itself.
    #[must_use]
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Self::subtree_len).sum::<usize>()
    }

    /// Visit every node of the subtree in pre-order with its depth.
    pub fn walk<'a, F>(&'a self, depth: usize, f: &mut F)
    where
        F: FnMut(&'a Self, usize),
    {
        f(self, depth);
        for child in &self.children {
            child.walk(depth + 1, f);
        }
    }

    /// Every account in the subtree, in pre-order.
    #[must_use]
    pub fn subtree_accounts(&self) -> Vec<&AccountBalance> {
        let mut accounts = Vec::new();
        self.walk(0, &mut |node, _| accounts.extend(node.accounts.iter()));
        accounts
    }

    /// Find a node by id within a forest.
    #[must_use]
    pub fn find<'a>(forest: &'a [Self], id: &str) -> Option<&'a Self> {
        forest.iter().find_map(|node| {
            if node.id.as_str() == id {
                Some(node)
            } else {
                Self::find(&node.children, id)
            }
        })
    }

    /// Flatten a forest into display rows, pre-order.
    #[must_use]
    pub fn flatten(forest: &[Self]) -> Vec<FlatRow<'_>> {
        let mut rows = Vec::new();
        for root in forest {
            root.walk(0, &mut |node, depth| rows.push(FlatRow { depth, node }));
        }
        rows
    }
}

/// A node paired with its depth in the forest.
#[derive(Debug, Clone, Copy)]
pub struct FlatRow<'a> {
    /// Zero for roots
    pub depth: usize,
    /// The node itself
    pub node: &'a CategoryNode,
}

/// Native and base-currency totals taken together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Per-currency totals
    pub by_currency: CurrencyTotals,
    /// Total in the base currency
    pub in_base_currency: Decimal,
}

impl Totals {
    /// Sum the root totals of a forest.
    pub fn of_forest(forest: &[CategoryNode]) -> Result<Self, EngineError> {
        let mut totals = Self::default();
        for root in forest {
            totals
                .by_currency
                .checked_merge(&root.total_by_currency)
                .ok_or_else(|| EngineError::overflow(&root.id))?;
            totals.in_base_currency = totals
                .in_base_currency
                .checked_add(root.total_in_base_currency)
                .ok_or_else(|| EngineError::overflow(&root.id))?;
        }
        Ok(totals)
    }

    /// `self - other`, per currency and in the base currency.
    pub fn checked_sub(&self, other: &Self) -> Result<Self, EngineError> {
        let overflow = || EngineError::AmountOverflow { category: None };
        Ok(Self {
            by_currency: self
                .by_currency
                .checked_sub(&other.by_currency)
                .ok_or_else(overflow)?,
            in_base_currency: self
                .in_base_currency
                .checked_sub(other.in_base_currency)
                .ok_or_else(overflow)?,
        })
    }
}
