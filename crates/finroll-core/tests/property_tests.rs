//! Property-based tests for the aggregation engine.
//!
//! Forests are generated acyclic by construction: a category may only name an
//! earlier category (or a missing one) as its parent.
//!
//! Run with: cargo test -p finroll-core --test `property_tests`

use std::collections::BTreeSet;

use finroll_core::{
    build_aggregated_tree, AccountBalance, AggregateMap, Category, CategoryAggregate,
    CategoryNode, CategoryType, Currency,
};
use proptest::prelude::*;
use rust_decimal::Decimal;

// ============================================================================
// Arbitrary generators
// ============================================================================

fn arb_decimal() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn arb_currency() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::new("USD", "$")),
        Just(Currency::new("EUR", "€")),
        Just(Currency::new("GBP", "£")),
        Just(Currency::new("JPY", "¥")),
    ]
}

fn arb_account() -> impl Strategy<Value = (Currency, Decimal, Option<Decimal>)> {
    (arb_currency(), arb_decimal(), prop::option::of(arb_decimal()))
}

#[derive(Debug, Clone)]
enum ParentChoice {
    Root,
    Earlier(usize),
    Missing,
}

fn arb_parent() -> impl Strategy<Value = ParentChoice> {
    prop_oneof![
        2 => Just(ParentChoice::Root),
        6 => any::<usize>().prop_map(ParentChoice::Earlier),
        1 => Just(ParentChoice::Missing),
    ]
}

#[derive(Debug, Clone)]
struct Input {
    categories: Vec<Category>,
    aggregates: AggregateMap,
    accounts: Vec<AccountBalance>,
}

fn arb_input() -> impl Strategy<Value = Input> {
    prop::collection::vec(
        (
            arb_parent(),
            -3i32..4,
            prop::collection::vec(arb_account(), 0..4),
        ),
        1..24,
    )
    .prop_map(|specs| {
        let mut categories = Vec::new();
        let mut aggregates = AggregateMap::new();
        let mut all_accounts = Vec::new();

        for (i, (parent, order, accounts)) in specs.into_iter().enumerate() {
            let id = format!("c{i}");
            let mut category =
                Category::new(id.as_str(), format!("Category {i}"), CategoryType::Asset)
                    .with_order(order);
            match parent {
                ParentChoice::Earlier(n) if i > 0 => {
                    category = category.with_parent(format!("c{}", n % i));
                }
                ParentChoice::Missing => category = category.with_parent("gone"),
                _ => {}
            }
            categories.push(category);

            if accounts.is_empty() {
                continue;
            }
            let accounts: Vec<AccountBalance> = accounts
                .into_iter()
                .enumerate()
                .map(|(j, (currency, amount, base))| {
                    let account =
                        AccountBalance::new(format!("{id}-a{j}"), "Acct", currency, amount);
                    match base {
                        Some(base) => account.with_base_amount(base),
                        None => account,
                    }
                })
                .collect();
            all_accounts.extend(accounts.iter().cloned());
            aggregates.insert(id.into(), CategoryAggregate::from_accounts(accounts));
        }

        Input {
            categories,
            aggregates,
            accounts: all_accounts,
        }
    })
}

fn build(input: &Input) -> Vec<CategoryNode> {
    build_aggregated_tree(&input.categories, &input.aggregates, CategoryType::Asset)
        .expect("generated forests are acyclic")
}

fn check_node(node: &CategoryNode) -> Result<(), TestCaseError> {
    let own_base: Decimal = node.accounts.iter().map(AccountBalance::base_amount_or_zero).sum();
    let children_base: Decimal = node.children.iter().map(|c| c.total_in_base_currency).sum();
    prop_assert_eq!(node.total_in_base_currency, own_base + children_base);

    let subtree = node.subtree_accounts();
    let expected: BTreeSet<&str> = subtree.iter().map(|a| a.currency.code.as_str()).collect();
    let actual: BTreeSet<&str> = node.total_by_currency.currencies().collect();
    prop_assert_eq!(actual, expected, "currency keys of {}", node.id);

    for (currency, total) in node.total_by_currency.iter() {
        let sum: Decimal = subtree
            .iter()
            .filter(|a| a.currency.code == currency)
            .map(|a| a.amount)
            .sum();
        prop_assert_eq!(total, sum, "{} total of {}", currency, node.id);
    }

    for pair in node.children.windows(2) {
        prop_assert!(pair[0].order <= pair[1].order);
    }
    for child in &node.children {
        check_node(child)?;
    }
    Ok(())
}

// ============================================================================
// Rollup Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Every account is counted exactly once in the root totals
    #[test]
    fn prop_base_total_conserved(input in arb_input()) {
        let forest = build(&input);
        let roots: Decimal = forest.iter().map(|n| n.total_in_base_currency).sum();
        let accounts: Decimal = input
            .accounts
            .iter()
            .map(AccountBalance::base_amount_or_zero)
            .sum();
        prop_assert_eq!(roots, accounts);
    }

    /// Per-currency totals are conserved the same way
    #[test]
    fn prop_currency_totals_conserved(input in arb_input()) {
        let forest = build(&input);
        for currency in ["USD", "EUR", "GBP", "JPY"] {
            let roots: Decimal = forest
                .iter()
                .filter_map(|n| n.total_by_currency.get(currency))
                .sum();
            let accounts: Decimal = input
                .accounts
                .iter()
                .filter(|a| a.currency.code == currency)
                .map(|a| a.amount)
                .sum();
            prop_assert_eq!(roots, accounts, "Currency {} mismatch", currency);
        }
    }

    /// Each node is its own accounts plus its children, with no extra keys
    /// and siblings in order
    #[test]
    fn prop_node_totals_consistent(input in arb_input()) {
        let forest = build(&input);
        for pair in forest.windows(2) {
            prop_assert!(pair[0].order <= pair[1].order);
        }
        for root in &forest {
            check_node(root)?;
        }
    }

    /// No category is lost or duplicated, orphans included
    #[test]
    fn prop_every_category_placed_once(input in arb_input()) {
        let forest = build(&input);
        let placed: usize = forest.iter().map(CategoryNode::subtree_len).sum();
        prop_assert_eq!(placed, input.categories.len());

        for category in &input.categories {
            prop_assert!(CategoryNode::find(&forest, category.id.as_str()).is_some());
        }

        let orphans = input
            .categories
            .iter()
            .filter(|c| c.parent_id.as_ref().is_some_and(|p| p.as_str() == "gone"))
            .count();
        let promoted = forest.iter().filter(|n| n.parent_id.is_some()).count();
        prop_assert_eq!(promoted, orphans);
    }

    /// Building twice gives the same forest
    #[test]
    fn prop_idempotent(input in arb_input()) {
        prop_assert_eq!(build(&input), build(&input));
    }
}
