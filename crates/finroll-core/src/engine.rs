//! One-call aggregation: build, attach, roll up, sort.

use tracing::debug_span;

use crate::{
    attach, rollup, sort_forest, AggregateMap, Category, CategoryNode, CategoryType,
    EngineError, TreeBuilder,
};

/// Build the sorted, fully rolled-up forest for one category type.
///
/// This is a pure function of its inputs: each call allocates its own forest
/// and nothing is shared between calls. It fails when the categories of the
/// partition contain a parent cycle or nest deeper than
/// [`MAX_DEPTH`](crate::MAX_DEPTH), and when a total overflows.
///
/// # Example
///
/// ```
/// use finroll_core::{build_aggregated_tree, AggregateMap, Category, CategoryType};
///
/// let categories = vec![
///     Category::new("food", "Food", CategoryType::Expense).with_order(2),
///     Category::new("rent", "Rent", CategoryType::Expense).with_order(1),
///     Category::new("salary", "Salary", CategoryType::Income),
/// ];
///
/// let forest =
///     build_aggregated_tree(&categories, &AggregateMap::new(), CategoryType::Expense).unwrap();
/// let names: Vec<_> = forest.iter().map(|n| n.name.as_str()).collect();
/// assert_eq!(names, vec!["Rent", "Food"]);
/// ```
pub fn build_aggregated_tree(
    categories: &[Category],
    aggregates: &AggregateMap,
    category_type: CategoryType,
) -> Result<Vec<CategoryNode>, EngineError> {
    let _span = debug_span!("build_aggregated_tree", %category_type).entered();

    let mut tree = TreeBuilder::build(categories, category_type);
    attach(&mut tree, aggregates)?;
    let forest = rollup(tree)?;
    Ok(sort_forest(forest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AccountBalance, CategoryAggregate, Currency};
    use rust_decimal_macros::dec;

    #[test]
    fn test_unknown_partition_is_empty() {
        let categories = vec![Category::new("a", "A", CategoryType::Asset)];
        let forest =
            build_aggregated_tree(&categories, &AggregateMap::new(), CategoryType::Income).unwrap();
        assert!(forest.is_empty());
    }

    #[test]
    fn test_same_input_same_output() {
        let categories = vec![
            Category::new("a", "A", CategoryType::Asset).with_order(1),
            Category::new("b", "B", CategoryType::Asset).with_parent("a"),
            Category::new("c", "C", CategoryType::Asset),
        ];
        let mut aggregates = AggregateMap::new();
        aggregates.insert(
            "b".into(),
            CategoryAggregate::from_accounts(vec![AccountBalance::new(
                "x",
                "X",
                Currency::new("USD", "$"),
                dec!(12.34),
            )
            .with_base_amount(dec!(12.34))]),
        );

        let first = build_aggregated_tree(&categories, &aggregates, CategoryType::Asset).unwrap();
        let second = build_aggregated_tree(&categories, &aggregates, CategoryType::Asset).unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0].id.as_str(), "c");
        assert_eq!(first[1].total_in_base_currency, dec!(12.34));
    }

    #[test]
    fn test_cycle_propagates() {
        let categories = vec![
            Category::new("a", "A", CategoryType::Liability).with_parent("b"),
            Category::new("b", "B", CategoryType::Liability).with_parent("a"),
        ];
        let result =
            build_aggregated_tree(&categories, &AggregateMap::new(), CategoryType::Liability);
        assert!(matches!(result, Err(EngineError::CycleDetected { .. })));

        // The other partitions are unaffected.
        assert!(
            build_aggregated_tree(&categories, &AggregateMap::new(), CategoryType::Asset).is_ok()
        );
    }
}
