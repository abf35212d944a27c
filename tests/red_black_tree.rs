use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use redwood::{NodeColor, RedBlackTree};
use simplelog::{Config, LevelFilter, TestLogger};

fn init_logging() {
    // several tests race to install it; only the first one wins
    let _ = TestLogger::init(LevelFilter::Trace, Config::default());
}

fn keys(tree: &RedBlackTree<i64>) -> Vec<i64> {
    tree.iter().copied().collect()
}

fn sample_tree() -> RedBlackTree<i64> {
    let mut tree = RedBlackTree::new();
    for key in [10, 20, 30, 15, 25, 5] {
        tree.insert(key);
    }
    tree
}

#[test]
fn insertion_scenario() {
    init_logging();
    let tree = sample_tree();
    let root = tree.root().expect("tree is not empty");

    assert_eq!(*root.key(), 20);
    assert_eq!(root.color(), NodeColor::Black);
    assert_eq!(keys(&tree), vec![5, 10, 15, 20, 25, 30]);
    assert!(tree.check_invariants().is_ok());
}

#[test]
fn deletion_scenario() {
    init_logging();
    let mut tree = sample_tree();

    // leaf
    tree.remove(&5);
    assert_eq!(keys(&tree), vec![10, 15, 20, 25, 30]);
    assert!(tree.check_invariants().is_ok());

    // one child
    tree.remove(&30);
    assert_eq!(keys(&tree), vec![10, 15, 20, 25]);
    assert!(tree.check_invariants().is_ok());

    // two children, at the root
    tree.remove(&20);
    assert_eq!(keys(&tree), vec![10, 15, 25]);
    assert_eq!(tree.root().map(|root| root.color()), Some(NodeColor::Black));
    assert!(tree.check_invariants().is_ok());

    let before = tree.clone();
    tree.remove(&99);
    assert_eq!(tree, before);
    assert_eq!(keys(&tree), vec![10, 15, 25]);
}

#[test]
fn ascending_insertions_stay_balanced() {
    let tree: RedBlackTree<i64> = (0..100).collect();
    let bound = 2.0 * 101f64.log2();

    assert_eq!(tree.len(), 100);
    assert!(tree.height() as f64 <= bound, "height {} exceeds {bound}", tree.height());
    assert!(tree.check_invariants().is_ok());
}

#[test]
fn descending_removals_stay_balanced() {
    let mut tree: RedBlackTree<i64> = (0..1000).collect();

    for key in (0..1000).rev().step_by(2) {
        assert!(tree.remove(&key));
        assert!(tree.check_invariants().is_ok(), "after removing {key}");
    }

    assert_eq!(tree.len(), 500);
    assert!(tree.iter().copied().eq((0..1000).step_by(2)));
}

#[test]
fn insert_then_remove_round_trips() {
    let mut tree: RedBlackTree<i64> = [8, 3, 12, 1, 6, 10, 14].into_iter().collect();
    let before = keys(&tree);

    tree.insert(7);
    tree.remove(&7);

    assert_eq!(keys(&tree), before);
    assert!(tree.check_invariants().is_ok());
}

#[derive(Debug, Clone)]
enum TreeOp {
    Insert(i64),
    Remove(i64),
    Contains(i64),
}

fn tree_op_strategy() -> impl Strategy<Value = TreeOp> {
    let key = -200i64..200i64;
    prop_oneof![
        5 => key.clone().prop_map(TreeOp::Insert),
        4 => key.clone().prop_map(TreeOp::Remove),
        1 => key.prop_map(TreeOp::Contains),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Replays random operations against a counted `BTreeMap` model and checks
    /// every red-black invariant after each step.
    #[test]
    fn tree_matches_multiset_model(ops in prop::collection::vec(tree_op_strategy(), 1..600)) {
        let mut tree = RedBlackTree::new();
        let mut model: BTreeMap<i64, usize> = BTreeMap::new();

        for op in &ops {
            match *op {
                TreeOp::Insert(key) => {
                    tree.insert(key);
                    *model.entry(key).or_default() += 1;
                }
                TreeOp::Remove(key) => {
                    let expected = match model.get_mut(&key) {
                        Some(count) if *count > 1 => {
                            *count -= 1;
                            true
                        }
                        Some(_) => {
                            model.remove(&key);
                            true
                        }
                        None => false,
                    };
                    prop_assert_eq!(tree.remove(&key), expected, "remove({})", key);
                }
                TreeOp::Contains(key) => {
                    prop_assert_eq!(tree.contains(&key), model.contains_key(&key));
                }
            }

            prop_assert!(tree.check_invariants().is_ok(), "{:?} after {:?}", tree.check_invariants(), op);
        }

        let expected: Vec<i64> = model
            .iter()
            .flat_map(|(&key, &count)| std::iter::repeat_n(key, count))
            .collect();
        prop_assert_eq!(tree.len(), expected.len());
        prop_assert_eq!(keys(&tree), expected);
    }

    #[test]
    fn height_respects_red_black_bound(mut values in prop::collection::vec(any::<i64>(), 1..2000)) {
        let mut tree: RedBlackTree<i64> = values.iter().copied().collect();
        let bound = 2.0 * ((tree.len() + 1) as f64).log2();
        prop_assert!(tree.height() as f64 <= bound);

        values.truncate(values.len() / 2);
        for value in &values {
            prop_assert!(tree.remove(value));
        }
        let bound = 2.0 * ((tree.len() + 1) as f64).log2();
        prop_assert!(tree.height() as f64 <= bound);
        prop_assert!(tree.check_invariants().is_ok());
    }
}
