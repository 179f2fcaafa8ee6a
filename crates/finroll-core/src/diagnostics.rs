//! Data-quality checks for engine input.
//!
//! The engine absorbs incomplete input instead of failing; these checks make
//! the degraded spots visible so a caller can tell "legitimately zero" from
//! "data is incomplete".
//!
//! | Code | Description |
//! |------|-------------|
//! | E001 | Category is part of a parent cycle |
//! | E002 | Category is nested deeper than [`MAX_DEPTH`] |
//! | W001 | Category has no type |
//! | W002 | Parent id does not exist |
//! | W003 | Parent has a different type |
//! | W004 | Duplicate category id |
//! | W005 | Account has no base-currency amount |
//! | W006 | Aggregate for an unknown or untyped category |
//! | W007 | Supplied aggregate totals disagree with its accounts |

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::aggregate::{base_total, native_totals};
use crate::{AggregateMap, Category, CategoryId, MAX_DEPTH};

/// How bad a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Aggregation would fail.
    Error,
    /// Aggregation succeeds with a degraded result.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// Diagnostic codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    /// E001: Category is part of a parent cycle.
    ParentCycle,
    /// E002: Category is nested deeper than the rollup accepts.
    TooDeep,
    /// W001: Category has no type and is left out of every forest.
    MissingType,
    /// W002: Parent id does not exist; the category becomes a root.
    DanglingParent,
    /// W003: Parent has a different type; the category becomes a root.
    CrossTypeParent,
    /// W004: Duplicate category id; later occurrences are ignored.
    DuplicateCategory,
    /// W005: Account has no base-currency amount; counts as zero in base totals.
    MissingBaseAmount,
    /// W006: Aggregate for a category that no forest will contain.
    UnknownAggregate,
    /// W007: Supplied aggregate totals disagree with its accounts.
    SeedMismatch,
}

impl DiagnosticCode {
    /// Get the code string (e.g., "W002").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ParentCycle => "E001",
            Self::TooDeep => "E002",
            Self::MissingType => "W001",
            Self::DanglingParent => "W002",
            Self::CrossTypeParent => "W003",
            Self::DuplicateCategory => "W004",
            Self::MissingBaseAmount => "W005",
            Self::UnknownAggregate => "W006",
            Self::SeedMismatch => "W007",
        }
    }

    /// Severity of the code.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::ParentCycle | Self::TooDeep => Severity::Error,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single data-quality finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// What was found
    pub code: DiagnosticCode,
    /// Category concerned
    pub category: CategoryId,
    /// Account concerned, for account-level findings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    /// Human-readable description
    pub message: String,
}

impl Diagnostic {
    fn new(code: DiagnosticCode, category: &CategoryId, message: String) -> Self {
        Self {
            code,
            category: category.clone(),
            account: None,
            message,
        }
    }

    /// Severity of this finding.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity(), self.code, self.message)
    }
}

/// Check categories and aggregates for everything the engine would absorb.
///
/// Category findings come first in category order, then aggregate findings
/// ordered by category id.
#[must_use]
pub fn diagnose(categories: &[Category], aggregates: &AggregateMap) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let mut by_id: HashMap<&CategoryId, &Category> = HashMap::new();
    for category in categories {
        if by_id.contains_key(&category.id) {
            diagnostics.push(Diagnostic::new(
                DiagnosticCode::DuplicateCategory,
                &category.id,
                format!("duplicate category id '{}'", category.id),
            ));
        } else {
            by_id.insert(&category.id, category);
        }
    }

    for category in first_occurrences(categories) {
        let Some(category_type) = category.category_type else {
            diagnostics.push(Diagnostic::new(
                DiagnosticCode::MissingType,
                &category.id,
                format!("category '{}' has no type", category.name),
            ));
            continue;
        };
        let Some(parent_id) = &category.parent_id else {
            continue;
        };
        match by_id.get(parent_id) {
            None => diagnostics.push(Diagnostic::new(
                DiagnosticCode::DanglingParent,
                &category.id,
                format!(
                    "category '{}' refers to missing parent '{parent_id}'",
                    category.name
                ),
            )),
            Some(parent) if parent.category_type != Some(category_type) => {
                diagnostics.push(Diagnostic::new(
                    DiagnosticCode::CrossTypeParent,
                    &category.id,
                    format!(
                        "category '{}' ({category_type}) has parent '{}' of another type",
                        category.name, parent.name
                    ),
                ));
            }
            Some(_) => {}
        }
    }

    let cycles = find_cycles(categories, &by_id);
    for cycle in &cycles {
        let path: Vec<&str> = cycle.iter().map(|id| id.as_str()).collect();
        for id in cycle {
            diagnostics.push(Diagnostic::new(
                DiagnosticCode::ParentCycle,
                id,
                format!("category '{id}' is part of a parent cycle: {}", path.join(" -> ")),
            ));
        }
    }

    let cyclic: HashSet<&CategoryId> = cycles.iter().flatten().collect();
    for category in first_occurrences(categories) {
        if depth_of(category, &by_id, &cyclic) == Some(MAX_DEPTH) {
            diagnostics.push(Diagnostic::new(
                DiagnosticCode::TooDeep,
                &category.id,
                format!(
                    "category '{}' is nested deeper than {MAX_DEPTH} levels",
                    category.name
                ),
            ));
        }
    }

    let mut aggregate_ids: Vec<&CategoryId> = aggregates.keys().collect();
    aggregate_ids.sort();
    for id in aggregate_ids {
        let aggregate = &aggregates[id];
        let known = by_id.get(id).is_some_and(|c| c.category_type.is_some());
        if !known {
            diagnostics.push(Diagnostic::new(
                DiagnosticCode::UnknownAggregate,
                id,
                format!("aggregate for unknown or untyped category '{id}' is ignored"),
            ));
        }

        for account in aggregate.unconverted_accounts() {
            let mut diagnostic = Diagnostic::new(
                DiagnosticCode::MissingBaseAmount,
                id,
                format!(
                    "account '{}' ({}) has no base-currency amount",
                    account.name, account.currency.code
                ),
            );
            diagnostic.account = Some(account.account_id.clone());
            diagnostics.push(diagnostic);
        }

        let derived = native_totals(&aggregate.accounts);
        let native_mismatch = aggregate
            .total_by_currency
            .as_ref()
            .is_some_and(|t| !t.is_empty() && Some(t) != derived.as_ref());
        let base_mismatch = aggregate
            .total_in_base_currency
            .is_some_and(|t| Some(t) != base_total(&aggregate.accounts));
        if native_mismatch || base_mismatch {
            diagnostics.push(Diagnostic::new(
                DiagnosticCode::SeedMismatch,
                id,
                format!("supplied totals for '{id}' disagree with its accounts"),
            ));
        }
    }

    diagnostics
}

/// First occurrence of every id, in input order.
fn first_occurrences(categories: &[Category]) -> impl Iterator<Item = &Category> + '_ {
    let mut seen = HashSet::new();
    categories.iter().filter(move |c| seen.insert(&c.id))
}

/// The parent a category hangs under in its own partition, if any.
fn same_type_parent<'a>(
    category: &Category,
    by_id: &HashMap<&CategoryId, &'a Category>,
) -> Option<&'a CategoryId> {
    let parent: &'a Category = *by_id.get(category.parent_id.as_ref()?)?;
    (category.category_type.is_some() && parent.category_type == category.category_type)
        .then_some(&parent.id)
}

/// Levels above a category in its partition, counted up to one past
/// [`MAX_DEPTH`]. `None` when the chain runs into a cycle.
fn depth_of(
    category: &Category,
    by_id: &HashMap<&CategoryId, &Category>,
    cyclic: &HashSet<&CategoryId>,
) -> Option<usize> {
    let mut depth = 0;
    let mut current = category;
    while let Some(parent_id) = same_type_parent(current, by_id) {
        if cyclic.contains(parent_id) {
            return None;
        }
        let Some(&parent) = by_id.get(parent_id) else {
            break;
        };
        depth += 1;
        if depth > MAX_DEPTH {
            break;
        }
        current = parent;
    }
    Some(depth)
}

/// Cycles among same-type parent links, each listed once in parent order.
fn find_cycles<'a>(
    categories: &'a [Category],
    by_id: &HashMap<&CategoryId, &'a Category>,
) -> Vec<Vec<CategoryId>> {
    let mut done: HashSet<&CategoryId> = HashSet::new();
    let mut cycles = Vec::new();

    for start in first_occurrences(categories) {
        let mut path: Vec<&CategoryId> = Vec::new();
        let mut on_path: HashMap<&CategoryId, usize> = HashMap::new();
        let mut current = Some(&start.id);

        while let Some(id) = current {
            if done.contains(id) {
                break;
            }
            if let Some(&pos) = on_path.get(id) {
                cycles.push(path[pos..].iter().map(|&i| i.clone()).collect());
                break;
            }
            on_path.insert(id, path.len());
            path.push(id);
            current = by_id.get(id).and_then(|c| same_type_parent(c, by_id));
        }

        done.extend(path);
    }

    cycles
}
