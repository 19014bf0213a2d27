//! Per-scope sequence numbers.
//!
//! Each row carries its own `index`, unique within its group scope as a
//! target rather than a hard guarantee. Edits adjust only the rows they
//! displace; nothing renumbers a whole scope unless [`RowStore::renumber`] is
//! called explicitly.

use super::rows::RowStore;
use crate::model::{GroupId, RowId, SheetError};
use tracing::debug;

impl RowStore {
    /// Highest index in `group_id`'s scope, ignoring `exclude`. 0 when empty.
    pub fn max_index(&self, group_id: Option<GroupId>, exclude: Option<RowId>) -> i64 {
        self.scope(group_id)
            .filter(|r| Some(r.id()) != exclude)
            .map(|r| r.index)
            .fold(0, i64::max)
    }

    /// Index a row entering `group_id`'s scope should receive.
    pub fn next_index(&self, group_id: Option<GroupId>, exclude: Option<RowId>) -> i64 {
        self.max_index(group_id, exclude) + 1
    }

    /// Give `row` the next index of its scope if it has none (index ≤ 0).
    pub fn assign_on_insert(&mut self, row: RowId) -> Result<(), SheetError> {
        let (group_id, index) = {
            let r = self.get(row).ok_or(SheetError::UnknownRow(row))?;
            (r.group_id, r.index)
        };
        if index <= 0 {
            let next = self.next_index(group_id, Some(row));
            self.get_mut(row)?.index = next;
        }
        Ok(())
    }

    /// Move `row` into `group_id`'s scope, placing it last.
    pub fn reassign_group(&mut self, row: RowId, group_id: Option<GroupId>) -> Result<(), SheetError> {
        if self.get(row).is_none() {
            return Err(SheetError::UnknownRow(row));
        }
        let next = self.next_index(group_id, Some(row));
        let r = self.get_mut(row)?;
        r.group_id = group_id;
        r.index = next;
        debug!(row = %row, group = ?group_id.map(GroupId::get), index = next, "Row regrouped");
        Ok(())
    }

    /// Renumber `row` to `new_index`, shifting the siblings in between.
    ///
    /// Moving up pushes siblings in `[new, old)` down by one; moving down
    /// pulls siblings in `(old, new]` up by one, never below 1. Indices below
    /// 1 are clamped to 1.
    pub fn set_index(&mut self, row: RowId, new_index: i64) -> Result<(), SheetError> {
        let (scope, old) = {
            let r = self.get(row).ok_or(SheetError::UnknownRow(row))?;
            (r.group_id, if r.index > 0 { r.index } else { 1 })
        };
        let new_index = new_index.max(1);
        if new_index == old {
            self.get_mut(row)?.index = new_index;
            return Ok(());
        }

        let mut shifted = 0usize;
        for other in self
            .rows
            .iter_mut()
            .filter(|r| r.in_scope(scope) && r.id() != row)
        {
            if new_index < old && other.index >= new_index && other.index < old {
                other.index += 1;
                shifted += 1;
            } else if new_index > old && other.index > old && other.index <= new_index {
                other.index = (other.index - 1).max(1);
                shifted += 1;
            }
        }
        self.get_mut(row)?.index = new_index;
        debug!(row = %row, old, new = new_index, shifted, "Row renumbered");
        Ok(())
    }

    /// Swap `row`'s index with the previous sibling. Returns whether it moved.
    pub fn move_up(&mut self, row: RowId) -> Result<bool, SheetError> {
        self.swap_with_neighbor(row, Direction::Up)
    }

    /// Swap `row`'s index with the next sibling. Returns whether it moved.
    pub fn move_down(&mut self, row: RowId) -> Result<bool, SheetError> {
        self.swap_with_neighbor(row, Direction::Down)
    }

    /// Rows of a scope sorted by index; equal indices keep insertion order.
    pub fn ordered_scope(&self, group_id: Option<GroupId>) -> Vec<RowId> {
        let mut scope: Vec<(i64, RowId)> = self.scope(group_id).map(|r| (r.index, r.id())).collect();
        scope.sort_by_key(|(index, _)| *index);
        scope.into_iter().map(|(_, id)| id).collect()
    }

    /// Rewrite a scope's indices to `1..=n` in its current order.
    pub fn renumber(&mut self, group_id: Option<GroupId>) {
        let order = self.ordered_scope(group_id);
        for (id, index) in order.iter().zip(1..) {
            if let Ok(row) = self.get_mut(*id) {
                row.index = index;
            }
        }
        debug!(group = ?group_id.map(GroupId::get), rows = order.len(), "Scope renumbered");
    }

    /// Give every row without a valid index (≤ 0) the next index of its
    /// scope. Rows are visited per scope in index order.
    pub fn repair_indices(&mut self) -> usize {
        let mut scopes: Vec<Option<GroupId>> = Vec::new();
        for row in &self.rows {
            if row.index <= 0 && !scopes.contains(&row.group_id) {
                scopes.push(row.group_id);
            }
        }

        let mut repaired = 0;
        for scope in scopes {
            let mut next = self.next_index(scope, None);
            let pending: Vec<RowId> = self
                .ordered_scope(scope)
                .into_iter()
                .filter(|id| self.get(*id).is_some_and(|r| r.index <= 0))
                .collect();
            for id in pending {
                if let Ok(row) = self.get_mut(id) {
                    row.index = next;
                    next += 1;
                    repaired += 1;
                }
            }
        }
        if repaired > 0 {
            debug!(repaired, "Assigned missing row indices");
        }
        repaired
    }

    fn swap_with_neighbor(&mut self, row: RowId, direction: Direction) -> Result<bool, SheetError> {
        let scope = self.get(row).ok_or(SheetError::UnknownRow(row))?.group_id;
        let order = self.ordered_scope(scope);
        let Some(pos) = order.iter().position(|id| *id == row) else {
            return Ok(false);
        };
        let neighbor = match direction {
            Direction::Up if pos > 0 => order[pos - 1],
            Direction::Down if pos + 1 < order.len() => order[pos + 1],
            _ => return Ok(false),
        };

        let mine = self.get_mut(row)?.index;
        let theirs = self.get_mut(neighbor)?.index;
        self.get_mut(row)?.index = theirs;
        self.get_mut(neighbor)?.index = mine;
        debug!(row = %row, neighbor = %neighbor, ?direction, "Row swapped");
        Ok(true)
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Up,
    Down,
}

#[cfg(test)]
#[path = "ordering_tests.rs"]
mod tests;
