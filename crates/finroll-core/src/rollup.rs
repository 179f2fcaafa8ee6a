//! Post-order rollup of a [`CategoryTree`] into [`CategoryNode`]s.
//!
//! Children are aggregated before their parent consumes their totals, so each
//! account is counted once at the category that owns it and then once more
//! per ancestor level. The traversal starts from the roots only; categories
//! it never reaches sit on (or below) a parent cycle and are reported as
//! [`EngineError::CycleDetected`]. Chains deeper than [`MAX_DEPTH`] fail with
//! [`EngineError::DepthExceeded`].

use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::debug;

use crate::aggregate::base_total;
use crate::builder::{CategoryTree, DraftNode};
use crate::{CategoryId, CategoryNode, CategoryType, EngineError};

/// Number of levels a forest may have, counting the roots as the first.
pub const MAX_DEPTH: usize = 128;

/// Roll up every root of the tree, consuming it.
///
/// The returned forest keeps input order; see [`sort_forest`](crate::sort_forest).
pub fn rollup(tree: CategoryTree) -> Result<Vec<CategoryNode>, EngineError> {
    let category_type = tree.category_type();
    let mut walk = Walk {
        category_type,
        parents: tree.nodes.iter().map(|n| n.parent).collect(),
        ids: tree.nodes.iter().map(|n| n.category.id.clone()).collect(),
        drafts: tree.nodes.into_iter().map(Some).collect(),
    };

    let mut forest = Vec::with_capacity(tree.roots.len());
    for &root in &tree.roots {
        forest.push(walk.node(root, 0)?);
    }

    if let Some(unreached) = walk.drafts.iter().position(Option::is_some) {
        return Err(cycle_error(unreached, &walk.ids, &walk.parents));
    }

    debug!(%category_type, roots = forest.len(), "rolled up category forest");
    Ok(forest)
}

struct Walk {
    category_type: CategoryType,
    parents: Vec<Option<usize>>,
    ids: Vec<CategoryId>,
    /// Taken as each node is visited.
    drafts: Vec<Option<DraftNode>>,
}

impl Walk {
    fn node(&mut self, idx: usize, depth: usize) -> Result<CategoryNode, EngineError> {
        if depth >= MAX_DEPTH {
            return Err(EngineError::DepthExceeded {
                category: self.ids[idx].clone(),
                limit: MAX_DEPTH,
            });
        }
        let draft = self.drafts[idx]
            .take()
            .ok_or_else(|| cycle_error(idx, &self.ids, &self.parents))?;
        let overflow = || EngineError::overflow(&draft.category.id);

        let mut children = Vec::with_capacity(draft.children.len());
        for &child in &draft.children {
            children.push(self.node(child, depth + 1)?);
        }

        let mut total_by_currency = draft.seed_by_currency;
        let mut children_base = Decimal::ZERO;
        for child in &children {
            total_by_currency
                .checked_merge(&child.total_by_currency)
                .ok_or_else(overflow)?;
            children_base = children_base
                .checked_add(child.total_in_base_currency)
                .ok_or_else(overflow)?;
        }

        // No base from children: the own accounts alone make up the base total.
        let total_in_base_currency = if children_base.is_zero() && !draft.accounts.is_empty() {
            base_total(&draft.accounts)
        } else {
            draft.seed_in_base_currency.checked_add(children_base)
        };
        let total_in_base_currency = total_in_base_currency.ok_or_else(overflow)?;

        let category = draft.category;
        Ok(CategoryNode {
            id: category.id,
            name: category.name,
            category_type: self.category_type,
            parent_id: category.parent_id,
            order: category.order,
            children,
            accounts: draft.accounts,
            total_by_currency,
            total_in_base_currency,
        })
    }
}

/// Walk parent links from an unreached node until one repeats.
fn cycle_error(start: usize, ids: &[CategoryId], parents: &[Option<usize>]) -> EngineError {
    let mut seen: HashMap<usize, usize> = HashMap::new();
    let mut path = Vec::new();
    let mut current = Some(start);

    while let Some(idx) = current {
        if let Some(&pos) = seen.get(&idx) {
            path.drain(..pos);
            break;
        }
        seen.insert(idx, path.len());
        path.push(idx);
        current = parents[idx];
    }

    EngineError::CycleDetected {
        category: ids[start].clone(),
        cycle: path.into_iter().map(|i| ids[i].clone()).collect(),
    }
}
