//! Model-based checks of [`AvlTree`] against [`BTreeSet`] and a sorted `Vec`.
//!
//! The operation types derive [`Arbitrary`] for fuzzing and come with `proptest` strategies.

use std::{
    collections::BTreeSet,
    ops::Bound::{Excluded, Unbounded},
};

use arbitrary::Arbitrary;
use proptest::strategy::{Just, Strategy};

use crate::{AvlTree, NodeId};

type ModelTree = AvlTree<u32>;

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum ItemValue {
    Index(usize),
    Random(u32),
}

proptest::prop_compose! {
    fn index_strategy()(
        index in 0usize..1000,
    ) -> ItemValue {
        ItemValue::Index(index)
    }
}

proptest::prop_compose! {
    fn random_strategy()(
        random in 0u32..1000,
    ) -> ItemValue {
        ItemValue::Random(random)
    }
}

fn value_strategy() -> impl Strategy<Value = ItemValue> {
    proptest::prop_oneof![index_strategy(), random_strategy()]
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum Op {
    Insert(ItemValue),
    Search(ItemValue),
    Delete(ItemValue),
    Successor(ItemValue),
    First,
}

impl Op {
    fn finalize(self, sorted: &[u32]) -> FinalOp {
        fn get_value(v: &[u32], i: ItemValue) -> u32 {
            match i {
                ItemValue::Index(idx) => {
                    if v.is_empty() {
                        idx as u32
                    } else {
                        v[idx % v.len()]
                    }
                }
                ItemValue::Random(v) => v,
            }
        }

        match self {
            Op::Insert(item) => FinalOp::Insert(get_value(sorted, item)),
            Op::Search(item) => FinalOp::Search(get_value(sorted, item)),
            Op::Delete(item) => FinalOp::Delete(get_value(sorted, item)),
            Op::Successor(item) => FinalOp::Successor(get_value(sorted, item)),
            Op::First => FinalOp::First,
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum FinalOp {
    Insert(u32),
    Search(u32),
    Delete(u32),
    Successor(u32),
    First,
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    proptest::prop_oneof![
        value_strategy().prop_map(Op::Insert),
        value_strategy().prop_map(Op::Search),
        value_strategy().prop_map(Op::Delete),
        value_strategy().prop_map(Op::Successor),
        Just(Op::First),
    ]
}

fn item_of(tree: &ModelTree, id: Option<NodeId>) -> Option<u32> {
    id.and_then(|id| tree.item(id)).copied()
}

// Collects the tree's items by walking successors from the minimum.
fn successor_scan(tree: &ModelTree) -> Vec<u32> {
    let mut items = Vec::with_capacity(tree.len());

    let mut opt_cur = tree.first();
    while let Some(cur) = opt_cur {
        items.extend(tree.item(cur));
        opt_cur = tree.find_successor(cur);
    }

    items
}

pub fn run_btree_equivalence(ops: Vec<Op>) {
    let mut sorted_values = Vec::with_capacity(ops.len());
    let mut btree = BTreeSet::new();
    let mut avl = ModelTree::default();

    fn insert_sorted(v: &mut Vec<u32>, value: u32) {
        if let Err(idx) = v.binary_search(&value) {
            v.insert(idx, value);
        }
    }

    fn remove_sorted(v: &mut Vec<u32>, value: u32) {
        if let Ok(idx) = v.binary_search(&value) {
            v.remove(idx);
        }
    }

    for (op_id, op) in ops.into_iter().enumerate() {
        let final_op = op.finalize(&sorted_values);

        match final_op {
            FinalOp::Insert(value) => {
                insert_sorted(&mut sorted_values, value);

                let from_btree = btree.insert(value);
                let from_avl = match avl.insert(value) {
                    Ok(id) => {
                        assert_eq!(avl.item(id), Some(&value), "FinalOp #{op_id}: {final_op:?}");
                        true
                    }
                    Err(rejected) => {
                        assert_eq!(rejected, value, "FinalOp #{op_id}: {final_op:?}");
                        false
                    }
                };

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Search(value) => {
                let from_btree = btree.get(&value).copied();
                let from_avl = item_of(&avl, avl.search(&value));

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Delete(value) => {
                remove_sorted(&mut sorted_values, value);

                let from_btree = btree.take(&value);
                let from_avl = avl.delete(&value);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
                assert!(avl.search(&value).is_none(), "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Successor(value) => {
                let from_btree = btree
                    .contains(&value)
                    .then(|| btree.range((Excluded(value), Unbounded)).next().copied())
                    .flatten();
                let from_avl = item_of(
                    &avl,
                    avl.search(&value).and_then(|id| avl.find_successor(id)),
                );

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::First => {
                let from_btree = btree.first().copied();
                let from_avl = item_of(&avl, avl.first());

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }
        }

        avl.assert_invariants();
        assert_eq!(btree.len(), avl.len());
        assert!(btree.iter().copied().eq(successor_scan(&avl)));
    }
}

#[derive(Clone, Debug, Arbitrary)]
pub enum WalkOp {
    // The current item is compared on every loop iteration, so there is no separate "get".
    MoveNext,
    Restart,
    DeleteCurrent,
}

pub fn walk_op_strategy() -> impl Strategy<Value = WalkOp> {
    proptest::prop_oneof![
        Just(WalkOp::MoveNext),
        Just(WalkOp::Restart),
        Just(WalkOp::DeleteCurrent),
    ]
}

#[derive(Clone, Debug)]
pub struct WalkInput {
    pub values: Vec<u32>,
    pub ops: Vec<WalkOp>,
}

impl<'a> arbitrary::Arbitrary<'a> for WalkInput {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        fn value(u: &mut arbitrary::Unstructured<'_>) -> u32 {
            u32::arbitrary(u).unwrap_or(0)
        }

        fn op(u: &mut arbitrary::Unstructured<'_>) -> WalkOp {
            WalkOp::arbitrary(u).unwrap_or(WalkOp::MoveNext)
        }

        let num_values = u8::arbitrary(u)? % 100;
        let num_ops = u16::arbitrary(u)? % 1000;

        let values = core::iter::repeat_with(|| value(u))
            .take(num_values.into())
            .collect();

        let ops = core::iter::repeat_with(|| op(u))
            .take(num_ops.into())
            .collect();

        Ok(WalkInput { values, ops })
    }
}

/// Walks the tree with successor lookups, deleting items along the way, and checks the walk
/// against a sorted `Vec`.
///
/// Running off the end of the tree leaves the walk on a "ghost" position; moving on from there
/// starts over at the minimum.
pub fn run_successor_walk(mut values: Vec<u32>, ops: Vec<WalkOp>) {
    values.sort_unstable();
    values.dedup();

    let mut vec = Vec::new();
    let mut avl = ModelTree::with_capacity(Ord::cmp, values.len());

    for val in values {
        vec.push(val);
        avl.insert(val).expect("values are deduplicated");
    }

    fn vec_next(v: &[u32], curs: Option<usize>) -> Option<usize> {
        match curs {
            Some(i) => i.checked_add(1).filter(|&i| i < v.len()),
            None => (!v.is_empty()).then_some(0),
        }
    }

    let mut vec_curs = vec_next(&vec, None);
    let mut avl_curs = avl.first();

    assert_eq!(vec_curs.map(|i| vec[i]), item_of(&avl, avl_curs));

    for op in ops {
        match op {
            WalkOp::MoveNext => {
                vec_curs = vec_next(&vec, vec_curs);
                avl_curs = match avl_curs {
                    Some(cur) => avl.find_successor(cur),
                    None => avl.first(),
                };
            }

            WalkOp::Restart => {
                vec_curs = vec_next(&vec, None);
                avl_curs = avl.first();
            }

            WalkOp::DeleteCurrent => {
                let v = vec_curs.map(|i| vec.remove(i));

                if vec_curs == Some(vec.len()) {
                    vec_curs = None;
                }

                // Deleting an item with two children moves its successor's item into its node, so
                // the walk resumes by searching for the successor's item rather than its handle.
                let w = match avl_curs {
                    Some(cur) => {
                        let item = *avl.item(cur).expect("walk position must be live");
                        let next = item_of(&avl, avl.find_successor(cur));

                        let removed = avl.delete(&item);
                        avl_curs = next.and_then(|next| avl.search(&next));

                        removed
                    }
                    None => None,
                };

                assert_eq!(v, w);
            }
        }

        avl.assert_invariants();
        assert_eq!(vec_curs.map(|i| vec[i]), item_of(&avl, avl_curs));
    }
}
