//! Engine error types.

use thiserror::Error;

use crate::CategoryId;

/// Error returned when a category forest cannot be aggregated.
///
/// Data-quality problems (missing type, dangling parent, missing conversion)
/// are absorbed by the engine and never surface here. Only structural
/// problems that the traversal cannot handle, and sums that leave the range
/// of `Decimal`, do.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A category's ancestor chain loops back on itself.
    #[error("category cycle detected at {category}: {}", format_cycle(.cycle))]
    CycleDetected {
        /// The first unreachable category the cycle was discovered from.
        category: CategoryId,
        /// The categories forming the loop, in parent order.
        cycle: Vec<CategoryId>,
    },

    /// A category sits deeper than [`MAX_DEPTH`](crate::MAX_DEPTH) levels.
    #[error("category {category} is nested deeper than {limit} levels")]
    DepthExceeded {
        /// The first category found below the limit.
        category: CategoryId,
        /// The depth limit in force.
        limit: usize,
    },

    /// A total left the range of `Decimal`.
    #[error("{} exceed the decimal range", overflow_scope(.category.as_ref()))]
    AmountOverflow {
        /// The category being totalled, or `None` for report-level totals.
        category: Option<CategoryId>,
    },
}

impl EngineError {
    pub(crate) fn overflow(category: &CategoryId) -> Self {
        Self::AmountOverflow {
            category: Some(category.clone()),
        }
    }
}

fn overflow_scope(category: Option<&CategoryId>) -> String {
    category.map_or_else(
        || "report totals".to_string(),
        |id| format!("totals of category {id}"),
    )
}

fn format_cycle(cycle: &[CategoryId]) -> String {
    let mut parts: Vec<&str> = cycle.iter().map(CategoryId::as_str).collect();
    if let Some(first) = cycle.first() {
        parts.push(first.as_str());
    }
    parts.join(" -> ")
}
