//! Property-based tests for group tree and ordering invariants.
//!
//! Tests validate:
//! 1. depth(g) == ancestors(g).len() on any forest
//! 2. Reparenting that would close a cycle is rejected
//! 3. Regrouping places the row after the target scope's maximum
//! 4. set_index on a dense scope permutes indices and shifts only the span
//! 5. move_up then move_down restores scope order
//! 6. Field and leaf-group removal

use groupsheet::model::{FieldType, GroupId, RowId, SheetError};
use groupsheet::sheet::{FieldRegistry, GroupTree, RowStore};
use groupsheet::workbook::{AlwaysAnswer, Workbook};
use proptest::prelude::*;
use std::collections::BTreeMap;

/// Parent choices for a forest: entry `i` optionally points at an earlier
/// entry (taken modulo `i`).
fn forest_shape() -> impl Strategy<Value = Vec<Option<usize>>> {
    prop::collection::vec(prop::option::of(any::<usize>()), 1..12)
}

fn build_tree(shape: &[Option<usize>]) -> (GroupTree, Vec<GroupId>) {
    let mut tree = GroupTree::new();
    let mut ids = Vec::new();
    for (i, parent) in shape.iter().enumerate() {
        let parent = match parent {
            Some(p) if i > 0 => Some(ids[p % i]),
            _ => None,
        };
        let id = tree
            .add(&format!("G{i}"), &format!("S{i}"), parent)
            .expect("valid parent")
            .id;
        ids.push(id);
    }
    (tree, ids)
}

fn dense_scope(n: usize) -> (RowStore, Vec<RowId>) {
    let fields = FieldRegistry::default();
    let mut rows = RowStore::new();
    let ids = (0..n).map(|_| rows.create(None, &fields)).collect();
    (rows, ids)
}

fn indices(rows: &RowStore, ids: &[RowId]) -> Vec<i64> {
    ids.iter().map(|id| rows.get(*id).unwrap().index).collect()
}

// ===== Property 1: Depth =====

proptest! {
    #[test]
    fn depth_equals_ancestor_count(shape in forest_shape()) {
        let (tree, ids) = build_tree(&shape);
        for id in ids {
            prop_assert_eq!(tree.depth(id), tree.ancestors(id).len());
            prop_assert_eq!(tree.path(id).len(), tree.depth(id) + 1);
        }
    }

    #[test]
    fn depth_first_order_lists_every_group_once_parents_first(shape in forest_shape()) {
        let (tree, ids) = build_tree(&shape);
        let order = tree.depth_first_order();
        prop_assert_eq!(order.len(), ids.len());
        for id in &ids {
            if let Some(parent) = tree.parent_of(*id) {
                prop_assert!(tree.rank(parent.id) < tree.rank(*id));
            }
        }
    }
}

// ===== Property 2: Cycle Rejection =====

proptest! {
    #[test]
    fn reparenting_under_a_descendant_is_rejected(
        shape in forest_shape(),
        a in any::<usize>(),
        b in any::<usize>(),
    ) {
        let (mut tree, ids) = build_tree(&shape);
        let a = ids[a % ids.len()];
        let b = ids[b % ids.len()];
        prop_assume!(a != b);

        if tree.is_descendant_of(a, b) {
            let err = tree.update(b, "B", "SB", Some(a)).unwrap_err();
            prop_assert_eq!(err, SheetError::Cycle { group: b, parent: a });
        }
        let err = tree.update(a, "A", "SA", Some(a)).unwrap_err();
        prop_assert_eq!(err, SheetError::Cycle { group: a, parent: a });
    }
}

// ===== Property 3: Regroup Index =====

proptest! {
    #[test]
    fn regrouped_row_lands_after_scope_maximum(
        placements in prop::collection::vec((prop::option::of(0u32..3), -2i64..10), 1..20),
        pick in any::<usize>(),
        target in prop::option::of(0u32..3),
    ) {
        let mut rows = RowStore::new();
        let ids: Vec<RowId> = placements
            .iter()
            .map(|(g, index)| rows.push(g.map(GroupId::new), *index, BTreeMap::new()))
            .collect();
        let row = ids[pick % ids.len()];
        let target = target.map(GroupId::new);

        let expected = rows.max_index(target, Some(row)) + 1;
        rows.reassign_group(row, target).unwrap();

        let moved = rows.get(row).unwrap();
        prop_assert_eq!(moved.group_id, target);
        prop_assert_eq!(moved.index, expected);
    }
}

// ===== Property 4: set_index Permutation =====

proptest! {
    #[test]
    fn set_index_on_dense_scope_shifts_only_the_span(
        n in 1usize..12,
        pick in any::<usize>(),
        to in any::<usize>(),
    ) {
        let (mut rows, ids) = dense_scope(n);
        let k = pick % n;
        let new_index = (to % n) as i64 + 1;
        let old_index = (k + 1) as i64;

        rows.set_index(ids[k], new_index).unwrap();
        let after = indices(&rows, &ids);

        let mut sorted = after.clone();
        sorted.sort_unstable();
        prop_assert_eq!(sorted, (1..=n as i64).collect::<Vec<_>>());

        for (i, index) in after.iter().enumerate() {
            let before = (i + 1) as i64;
            let expected = if i == k {
                new_index
            } else if new_index < old_index && (new_index..old_index).contains(&before) {
                before + 1
            } else if new_index > old_index && (old_index + 1..=new_index).contains(&before) {
                before - 1
            } else {
                before
            };
            prop_assert_eq!(*index, expected, "row {} of {}", i, n);
        }
    }
}

// ===== Property 5: Up/Down Round-Trip =====

proptest! {
    #[test]
    fn move_up_then_down_restores_order(n in 1usize..10, pick in any::<usize>()) {
        let (mut rows, ids) = dense_scope(n);
        let row = ids[pick % n];
        let before = rows.ordered_scope(None);

        if rows.move_up(row).unwrap() {
            prop_assert!(rows.move_down(row).unwrap());
        }
        prop_assert_eq!(rows.ordered_scope(None), before);
        prop_assert_eq!(indices(&rows, &ids), (1..=n as i64).collect::<Vec<_>>());
    }
}

// ===== Property 6: Removal =====

proptest! {
    #[test]
    fn removed_field_leaves_no_values_behind(
        values in prop::collection::vec("[a-z]{0,6}", 1..8),
    ) {
        let mut wb = Workbook::new();
        wb.add_field("Extra", FieldType::Text, false).unwrap();
        for value in &values {
            let row = wb.add_row(None).unwrap();
            wb.set_value(row, "Extra", value).unwrap();
        }

        prop_assert!(wb.remove_field("Extra", &mut AlwaysAnswer(true)).unwrap());
        prop_assert!(wb.rows().iter().all(|r| r.value("Extra").is_none()));
        prop_assert!(!wb.fields().contains("Extra"));
    }

    #[test]
    fn leaf_group_without_rows_always_removes(shape in forest_shape()) {
        let (tree, ids) = build_tree(&shape);
        let mut wb = Workbook::from_parts(FieldRegistry::default(), tree, RowStore::new());
        for id in ids {
            if !wb.groups().has_children(id) {
                // No rows reference it, so no prompt is needed.
                prop_assert!(wb.remove_group(id, &mut AlwaysAnswer(false)).unwrap());
            }
        }
    }
}
