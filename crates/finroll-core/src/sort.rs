//! Deterministic sibling ordering.

use crate::CategoryNode;

/// Sort a forest by `order`, recursively, keeping input order on ties.
#[must_use]
pub fn sort_forest(mut nodes: Vec<CategoryNode>) -> Vec<CategoryNode> {
    sort_in_place(&mut nodes);
    nodes
}

/// In-place variant of [`sort_forest`].
pub fn sort_in_place(nodes: &mut [CategoryNode]) {
    // `sort_by_key` is stable.
    nodes.sort_by_key(|n| n.order);
    for node in nodes.iter_mut() {
        sort_in_place(&mut node.children);
    }
}
