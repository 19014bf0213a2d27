//! Tests for the group forest.

use super::*;

fn gid(raw: u32) -> GroupId {
    GroupId::new(raw)
}

/// A(1) ─┬─ B(2) ── D(4)
///       └─ C(3)
/// E(5)
fn sample_tree() -> GroupTree {
    let mut tree = GroupTree::new();
    tree.add("A", "SA", None).unwrap();
    tree.add("B", "SB", Some(gid(1))).unwrap();
    tree.add("C", "SC", Some(gid(1))).unwrap();
    tree.add("D", "SD", Some(gid(2))).unwrap();
    tree.add("E", "SE", None).unwrap();
    tree
}

#[test]
fn add_assigns_sequential_ids_from_one() {
    let mut tree = GroupTree::new();
    let a = tree.add("A", "SA", None).unwrap().id;
    let b = tree.add("B", "SB", None).unwrap().id;
    assert_eq!(a, gid(1));
    assert_eq!(b, gid(2));
    assert_eq!(tree.next_id(), gid(3));
}

#[test]
fn add_trims_names() {
    let mut tree = GroupTree::new();
    let g = tree.add("  电机 ", " Motor ", None).unwrap();
    assert_eq!(g.name, "电机");
    assert_eq!(g.struct_name, "Motor");
}

#[test]
fn add_rejects_blank_names_without_consuming_an_id() {
    let mut tree = GroupTree::new();
    assert_eq!(
        tree.add("  ", "S", None).unwrap_err(),
        SheetError::EmptyInput { input: "group name" }
    );
    assert_eq!(
        tree.add("A", "", None).unwrap_err(),
        SheetError::EmptyInput {
            input: "struct name"
        }
    );
    assert!(tree.is_empty());
    assert_eq!(tree.next_id(), gid(1));
}

#[test]
fn add_rejects_unknown_parent() {
    let mut tree = GroupTree::new();
    assert_eq!(
        tree.add("A", "S", Some(gid(9))).unwrap_err(),
        SheetError::UnknownGroup(gid(9))
    );
}

#[test]
fn depth_first_order_visits_children_after_parent() {
    let tree = sample_tree();
    assert_eq!(
        tree.depth_first_order(),
        &[gid(1), gid(2), gid(4), gid(3), gid(5)]
    );
    assert_eq!(tree.rank(gid(4)), Some(2));
    assert_eq!(tree.rank(gid(99)), None);
}

#[test]
fn ancestors_run_from_parent_to_root() {
    let tree = sample_tree();
    let names: Vec<_> = tree.ancestors(gid(4)).iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, ["B", "A"]);
    assert!(tree.ancestors(gid(1)).is_empty());
    assert!(tree.ancestors(gid(42)).is_empty());
}

#[test]
fn depth_matches_ancestor_count() {
    let tree = sample_tree();
    for group in tree.iter() {
        assert_eq!(tree.depth(group.id), tree.ancestors(group.id).len());
    }
    assert_eq!(tree.depth(gid(4)), 2);
    assert_eq!(tree.max_depth(), Some(2));
    assert_eq!(GroupTree::new().max_depth(), None);
}

#[test]
fn path_and_group_at_level() {
    let tree = sample_tree();
    let path: Vec<_> = tree.path(gid(4)).iter().map(|g| g.id).collect();
    assert_eq!(path, [gid(1), gid(2), gid(4)]);
    assert_eq!(tree.group_at_level(gid(4), 1).map(|g| g.id), Some(gid(2)));
    assert_eq!(tree.group_at_level(gid(4), 3), None);
}

#[test]
fn is_descendant_of_walks_the_chain() {
    let tree = sample_tree();
    assert!(tree.is_descendant_of(gid(4), gid(1)));
    assert!(tree.is_descendant_of(gid(4), gid(2)));
    assert!(!tree.is_descendant_of(gid(1), gid(4)));
    assert!(!tree.is_descendant_of(gid(3), gid(2)));
    assert!(!tree.is_descendant_of(gid(1), gid(1)));
}

#[test]
fn update_rejects_self_parent() {
    let mut tree = sample_tree();
    assert_eq!(
        tree.update(gid(2), "B", "SB", Some(gid(2))).unwrap_err(),
        SheetError::Cycle {
            group: gid(2),
            parent: gid(2)
        }
    );
}

#[test]
fn update_rejects_parent_below_group() {
    let mut tree = sample_tree();
    let err = tree.update(gid(1), "A", "SA", Some(gid(4))).unwrap_err();
    assert_eq!(
        err,
        SheetError::Cycle {
            group: gid(1),
            parent: gid(4)
        }
    );
    assert_eq!(tree.get(gid(1)).unwrap().parent_id, None);
}

#[test]
fn update_reparents_and_reorders() {
    let mut tree = sample_tree();
    tree.update(gid(3), "C", "SC", Some(gid(5))).unwrap();
    assert_eq!(
        tree.depth_first_order(),
        &[gid(1), gid(2), gid(4), gid(5), gid(3)]
    );
}

#[test]
fn update_to_none_makes_group_top_level() {
    let mut tree = sample_tree();
    tree.update(gid(2), "B", "SB", None).unwrap();
    assert_eq!(tree.depth(gid(4)), 1);
    assert_eq!(
        tree.depth_first_order(),
        &[gid(1), gid(3), gid(2), gid(4), gid(5)]
    );
}

#[test]
fn update_unknown_group_is_not_found() {
    let mut tree = sample_tree();
    assert_eq!(
        tree.update(gid(77), "X", "Y", None).unwrap_err(),
        SheetError::UnknownGroup(gid(77))
    );
}

#[test]
fn remove_rejects_group_with_children() {
    let mut tree = sample_tree();
    assert_eq!(tree.remove(gid(1)).unwrap_err(), SheetError::HasChildren(gid(1)));
    assert_eq!(tree.len(), 5);
}

#[test]
fn remove_leaf_keeps_ids_monotonic() {
    let mut tree = sample_tree();
    let removed = tree.remove(gid(5)).unwrap();
    assert_eq!(removed.name, "E");
    assert!(!tree.contains(gid(5)));
    let next = tree.add("F", "SF", None).unwrap().id;
    assert_eq!(next, gid(6));
}

#[test]
fn from_groups_recomputes_stale_next_id() {
    let groups = vec![
        Group::new(gid(3), "A", "SA", None),
        Group::new(gid(8), "B", "SB", Some(gid(3))),
    ];
    let tree = GroupTree::from_groups(groups.clone(), Some(2));
    assert_eq!(tree.next_id(), gid(9));

    let tree = GroupTree::from_groups(groups, Some(20));
    assert_eq!(tree.next_id(), gid(20));

    assert_eq!(GroupTree::from_groups(Vec::new(), None).next_id(), gid(1));
}

#[test]
fn dangling_parent_orders_as_root_without_rewriting_data() {
    let groups = vec![
        Group::new(gid(1), "A", "SA", None),
        Group::new(gid(2), "Orphan", "SO", Some(gid(40))),
    ];
    let tree = GroupTree::from_groups(groups, None);
    assert_eq!(tree.depth_first_order(), &[gid(1), gid(2)]);
    assert_eq!(tree.get(gid(2)).unwrap().parent_id, Some(gid(40)));
    assert_eq!(tree.depth(gid(2)), 0);
}

#[test]
fn stored_cycle_does_not_hang_traversal() {
    let groups = vec![
        Group::new(gid(1), "Root", "R", None),
        Group::new(gid(2), "X", "SX", Some(gid(3))),
        Group::new(gid(3), "Y", "SY", Some(gid(2))),
    ];
    let tree = GroupTree::from_groups(groups, None);
    assert_eq!(tree.depth_first_order(), &[gid(1), gid(2), gid(3)]);
    assert_eq!(tree.ancestors(gid(2)).len(), 1);
}

#[test]
fn duplicate_stored_ids_keep_first() {
    let groups = vec![
        Group::new(gid(1), "First", "S", None),
        Group::new(gid(1), "Second", "S", None),
    ];
    let tree = GroupTree::from_groups(groups, None);
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.get(gid(1)).unwrap().name, "First");
}
