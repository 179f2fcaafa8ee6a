//! Tree construction from a flat category list, and attachment of raw
//! per-category aggregates.
//!
//! Building never fails. Categories of another type (or without a type) are
//! left out, and a category whose parent is not part of the partition is
//! promoted to a root instead of being dropped.

use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::{
    AccountBalance, AggregateMap, Category, CategoryId, CategoryType, CurrencyTotals, EngineError,
};

/// A category of the partition, before rollup.
#[derive(Debug, Clone)]
pub(crate) struct DraftNode {
    pub(crate) category: Category,
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,
    pub(crate) accounts: Vec<AccountBalance>,
    pub(crate) seed_by_currency: CurrencyTotals,
    pub(crate) seed_in_base_currency: Decimal,
}

/// Parent/child structure for one category type, indexed by id.
///
/// Nodes keep the input order of the category list; children and roots are
/// appended in that order, and sorting by `order` happens after rollup.
#[derive(Debug, Clone)]
pub struct CategoryTree {
    category_type: CategoryType,
    pub(crate) nodes: Vec<DraftNode>,
    index: HashMap<CategoryId, usize>,
    pub(crate) roots: Vec<usize>,
    /// Ids of typed categories that belong to another partition.
    other_partitions: HashSet<CategoryId>,
}

impl CategoryTree {
    /// The partition this tree was built for.
    #[must_use]
    pub const fn category_type(&self) -> CategoryType {
        self.category_type
    }

    /// Number of categories retained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no category matched the partition.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether a category id is part of this tree.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Ids of the root categories, in input order.
    #[must_use]
    pub fn root_ids(&self) -> Vec<&CategoryId> {
        self.roots
            .iter()
            .map(|&i| &self.nodes[i].category.id)
            .collect()
    }

    /// Ids of a category's children, in input order.
    #[must_use]
    pub fn child_ids(&self, id: &str) -> Option<Vec<&CategoryId>> {
        let &idx = self.index.get(id)?;
        Some(
            self.nodes[idx]
                .children
                .iter()
                .map(|&c| &self.nodes[c].category.id)
                .collect(),
        )
    }

    /// Accounts attached to a category so far.
    #[must_use]
    pub fn accounts_of(&self, id: &str) -> Option<&[AccountBalance]> {
        self.index
            .get(id)
            .map(|&idx| self.nodes[idx].accounts.as_slice())
    }
}

/// Builds [`CategoryTree`]s from a flat category list.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeBuilder;

impl TreeBuilder {
    /// Build the tree for one category type.
    ///
    /// When the same id appears more than once, the first occurrence wins.
    #[must_use]
    pub fn build(categories: &[Category], category_type: CategoryType) -> CategoryTree {
        let mut nodes = Vec::new();
        let mut index = HashMap::new();
        let mut other_partitions = HashSet::new();

        for category in categories {
            if !category.is_of_type(category_type) {
                if category.category_type.is_some() {
                    other_partitions.insert(category.id.clone());
                }
                continue;
            }
            if index.contains_key(&category.id) {
                warn!(category = %category.id, "duplicate category id ignored");
                continue;
            }
            index.insert(category.id.clone(), nodes.len());
            nodes.push(DraftNode {
                category: category.clone(),
                parent: None,
                children: Vec::new(),
                accounts: Vec::new(),
                seed_by_currency: CurrencyTotals::new(),
                seed_in_base_currency: Decimal::ZERO,
            });
        }

        let mut roots = Vec::new();
        for idx in 0..nodes.len() {
            let parent_id = nodes[idx].category.parent_id.clone();
            let parent = parent_id.as_ref().and_then(|pid| index.get(pid).copied());

            match (parent, parent_id) {
                (Some(parent), _) => {
                    nodes[idx].parent = Some(parent);
                    nodes[parent].children.push(idx);
                }
                (None, Some(missing)) => {
                    warn!(
                        category = %nodes[idx].category.id,
                        parent = %missing,
                        "parent not in partition, promoting category to root"
                    );
                    roots.push(idx);
                }
                (None, None) => roots.push(idx),
            }
        }

        debug!(
            %category_type,
            retained = nodes.len(),
            roots = roots.len(),
            "built category tree"
        );

        CategoryTree {
            category_type,
            nodes,
            index,
            roots,
            other_partitions,
        }
    }
}

/// Copy raw aggregates onto the matching nodes of a tree.
///
/// Aggregates for ids outside the tree are ignored. Nodes without an
/// aggregate keep no accounts and zero seed totals. Fails only when the
/// accounts of one category cannot be summed within the range of `Decimal`.
pub fn attach(tree: &mut CategoryTree, aggregates: &AggregateMap) -> Result<(), EngineError> {
    let mut attached = 0usize;
    for (id, aggregate) in aggregates {
        let Some(&idx) = tree.index.get(id) else {
            if tree.other_partitions.contains(id) {
                debug!(category = %id, "aggregate belongs to another partition");
            } else {
                warn!(category = %id, "aggregate for unknown category ignored");
            }
            continue;
        };

        let unconverted = aggregate.unconverted_accounts().count();
        if unconverted > 0 {
            warn!(
                category = %id,
                accounts = unconverted,
                "accounts without a base-currency amount count as zero in base totals"
            );
        }

        let seed_by_currency = aggregate
            .seed_by_currency()
            .ok_or_else(|| EngineError::overflow(id))?;
        let seed_in_base_currency = aggregate
            .seed_in_base_currency()
            .ok_or_else(|| EngineError::overflow(id))?;

        let node = &mut tree.nodes[idx];
        node.accounts.clone_from(&aggregate.accounts);
        node.seed_by_currency = seed_by_currency;
        node.seed_in_base_currency = seed_in_base_currency;
        attached += 1;
    }
    debug!(attached, "attached category aggregates");
    Ok(())
}
