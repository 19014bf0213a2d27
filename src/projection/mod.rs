//! Ordered, grouped view of the sheet.
//!
//! One projection feeds both on-screen rendering and CSV export, so the two
//! can never disagree about row order.

use crate::model::{Field, Group, GroupId, Row, RowId};
use crate::sheet::{FieldRegistry, GroupTree, RowStore};

/// Sort key of a bucket of rows sharing a group id.
///
/// Known groups follow tree order; groups missing from the tree come next
/// (by id), and ungrouped rows always come last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum BucketKey {
    Ranked(usize),
    Unknown(GroupId),
    Ungrouped,
}

fn bucket_key(tree: &GroupTree, group_id: Option<GroupId>) -> BucketKey {
    match group_id {
        None => BucketKey::Ungrouped,
        Some(id) => tree
            .rank(id)
            .map_or(BucketKey::Unknown(id), BucketKey::Ranked),
    }
}

/// One row of the projection.
#[derive(Debug, Clone, Copy)]
pub struct ProjectedRow<'a> {
    /// 1-based position across the whole projection.
    pub position: usize,
    /// Group id as stored on the row, even when it no longer resolves.
    pub group_id: Option<GroupId>,
    /// True on the first row of each group bucket.
    pub header: bool,
    /// The resolved group, `None` when ungrouped or dangling.
    pub group: Option<&'a Group>,
    /// The resolved parent of `group`.
    pub parent: Option<&'a Group>,
    /// The underlying row.
    pub row: &'a Row,
}

/// The read-only, fully ordered view of all rows.
#[derive(Debug, Clone)]
pub struct Projection<'a> {
    columns: Vec<&'a Field>,
    rows: Vec<ProjectedRow<'a>>,
}

impl<'a> Projection<'a> {
    /// Order rows by group tree rank, then by index within each group.
    pub fn build(tree: &'a GroupTree, rows: &'a RowStore, fields: &'a FieldRegistry) -> Self {
        let mut keyed: Vec<(BucketKey, i64, &Row)> = rows
            .iter()
            .map(|row| (bucket_key(tree, row.group_id), row.index, row))
            .collect();
        // Stable: equal keys keep insertion order.
        keyed.sort_by_key(|(bucket, index, _)| (*bucket, *index));

        let mut projected = Vec::with_capacity(keyed.len());
        let mut previous: Option<BucketKey> = None;
        for (position, (bucket, _, row)) in (1..).zip(keyed) {
            let group = row.group_id.and_then(|id| tree.get(id));
            projected.push(ProjectedRow {
                position,
                group_id: row.group_id,
                header: previous != Some(bucket),
                group,
                parent: group.and_then(|g| tree.parent_of(g.id)),
                row,
            });
            previous = Some(bucket);
        }

        Self {
            columns: fields.visible_ordered(),
            rows: projected,
        }
    }

    /// Visible fields in display order.
    pub fn columns(&self) -> &[&'a Field] {
        &self.columns
    }

    /// Rows in display order.
    pub fn rows(&self) -> &[ProjectedRow<'a>] {
        &self.rows
    }

    /// Iterate rows in display order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectedRow<'a>> {
        self.rows.iter()
    }

    /// Number of projected rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there is nothing to show.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 1-based display position of `row`.
    pub fn position_of(&self, row: RowId) -> Option<usize> {
        self.rows
            .iter()
            .find(|p| p.row.id() == row)
            .map(|p| p.position)
    }

    /// Row ids in display order.
    pub fn row_ids(&self) -> Vec<RowId> {
        self.rows.iter().map(|p| p.row.id()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn gid(raw: u32) -> GroupId {
        GroupId::new(raw)
    }

    #[test]
    fn child_group_rows_follow_parent_rows_and_precede_ungrouped() {
        let mut tree = GroupTree::new();
        let a = tree.add("A", "SA", None).unwrap().id;
        let b = tree.add("B", "SB", Some(a)).unwrap().id;
        let fields = FieldRegistry::with_defaults();
        let mut rows = RowStore::new();
        let loose = rows.create(None, &fields);
        let in_b = rows.create(Some(b), &fields);
        let in_a = rows.create(Some(a), &fields);

        let projection = Projection::build(&tree, &rows, &fields);
        assert_eq!(projection.row_ids(), [in_a, in_b, loose]);
        let headers: Vec<_> = projection.iter().map(|p| p.header).collect();
        assert_eq!(headers, [true, true, true]);
        assert_eq!(projection.rows()[1].parent.map(|g| g.id), Some(a));
        assert_eq!(projection.position_of(loose), Some(3));
    }

    #[test]
    fn rows_within_bucket_sort_by_index_then_insertion() {
        let tree = GroupTree::new();
        let fields = FieldRegistry::with_defaults();
        let mut rows = RowStore::new();
        let a = rows.push(None, 3, BTreeMap::new());
        let b = rows.push(None, 1, BTreeMap::new());
        let c = rows.push(None, 3, BTreeMap::new());

        let projection = Projection::build(&tree, &rows, &fields);
        assert_eq!(projection.row_ids(), [b, a, c]);
        let headers: Vec<_> = projection.iter().map(|p| p.header).collect();
        assert_eq!(headers, [true, false, false]);
    }

    #[test]
    fn dangling_group_sorts_after_known_and_before_ungrouped() {
        let mut tree = GroupTree::new();
        let a = tree.add("A", "SA", None).unwrap().id;
        let fields = FieldRegistry::with_defaults();
        let mut rows = RowStore::new();
        let loose = rows.push(None, 1, BTreeMap::new());
        let ghost = rows.push(Some(gid(42)), 1, BTreeMap::new());
        let known = rows.push(Some(a), 1, BTreeMap::new());

        let projection = Projection::build(&tree, &rows, &fields);
        assert_eq!(projection.row_ids(), [known, ghost, loose]);
        assert!(projection.rows()[1].group.is_none());
        assert_eq!(projection.rows()[1].group_id, Some(gid(42)));
    }

    #[test]
    fn columns_are_visible_fields_in_order() {
        let tree = GroupTree::new();
        let rows = RowStore::new();
        let mut fields = FieldRegistry::with_defaults();
        fields.set_visible("物理意义", false).unwrap();
        let projection = Projection::build(&tree, &rows, &fields);
        assert!(projection.is_empty());
        let names: Vec<_> = projection.columns().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["变量名", "参数值", "数据类型", "备注"]);
    }
}
