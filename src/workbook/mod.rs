//! The workbook: single owner of fields, groups and rows.
//!
//! Every user action enters through a `Workbook` method. Each one either
//! completes or returns a [`SheetError`] with the state left untouched.
//! `NotFound` errors are also logged as warnings, since front ends treat them
//! as no-ops.

pub mod confirm;

pub use confirm::{AlwaysAnswer, Confirm, ConfirmPrompt};

use crate::model::{is_default_field, ErrorKind, FieldType, GroupId, RowId, SheetError};
use crate::projection::Projection;
use crate::sheet::{FieldRegistry, GroupTree, RowStore};
use tracing::{info, warn};

fn warn_not_found(err: &SheetError) {
    if err.kind() == ErrorKind::NotFound {
        warn!(error = %err, "Ignoring action on stale reference");
    }
}

/// All state of one data-entry session.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    fields: FieldRegistry,
    groups: GroupTree,
    rows: RowStore,
}

impl Workbook {
    /// Empty workbook with the default fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a workbook from restored parts.
    ///
    /// Rows are conformed to the field registry and rows without a valid
    /// index are appended to the end of their scope.
    pub fn from_parts(fields: FieldRegistry, groups: GroupTree, mut rows: RowStore) -> Self {
        let dropped = rows.conform_to(&fields);
        let repaired = rows.repair_indices();
        if dropped > 0 || repaired > 0 {
            info!(dropped, repaired, "Normalized restored rows");
        }
        Self {
            fields,
            groups,
            rows,
        }
    }

    /// The field schema.
    pub fn fields(&self) -> &FieldRegistry {
        &self.fields
    }

    /// The group forest.
    pub fn groups(&self) -> &GroupTree {
        &self.groups
    }

    /// All rows, in insertion order.
    pub fn rows(&self) -> &RowStore {
        &self.rows
    }

    /// The ordered view used by rendering and export.
    pub fn projection(&self) -> Projection<'_> {
        Projection::build(&self.groups, &self.rows, &self.fields)
    }

    // ===== Groups =====

    /// Create a group under `parent` (a root when `None`).
    pub fn add_group(
        &mut self,
        name: &str,
        struct_name: &str,
        parent: Option<GroupId>,
    ) -> Result<GroupId, SheetError> {
        self.groups
            .add(name, struct_name, parent)
            .map(|g| g.id)
            .inspect_err(warn_not_found)
    }

    /// Rename and/or reparent a group. Cycles are rejected.
    pub fn update_group(
        &mut self,
        id: GroupId,
        name: &str,
        struct_name: &str,
        parent: Option<GroupId>,
    ) -> Result<(), SheetError> {
        self.groups
            .update(id, name, struct_name, parent)
            .inspect_err(warn_not_found)
    }

    /// Remove a leaf group.
    ///
    /// When rows still reference the group, `confirm` is asked first; on
    /// consent those rows move to the end of the ungrouped scope in their
    /// current order. Returns `Ok(false)` when the user declined.
    pub fn remove_group(
        &mut self,
        id: GroupId,
        confirm: &mut impl Confirm,
    ) -> Result<bool, SheetError> {
        if !self.groups.contains(id) {
            let err = SheetError::UnknownGroup(id);
            warn_not_found(&err);
            return Err(err);
        }
        if self.groups.has_children(id) {
            return Err(SheetError::HasChildren(id));
        }

        let affected = self.rows.ordered_scope(Some(id));
        if !affected.is_empty() {
            let prompt = ConfirmPrompt::RemoveGroupWithRows {
                group: id,
                rows: affected.len(),
            };
            if !confirm.confirm(&prompt) {
                info!(group = %id, "Group removal declined");
                return Ok(false);
            }
        }

        self.groups.remove(id)?;
        for row in affected {
            self.rows.reassign_group(row, None)?;
        }
        Ok(true)
    }

    // ===== Fields =====

    /// Define a new field; every row gains an empty value for it.
    pub fn add_field(
        &mut self,
        name: &str,
        field_type: FieldType,
        required: bool,
    ) -> Result<(), SheetError> {
        let change = self.fields.add(name, field_type, required)?;
        self.rows.apply_field_change(&change);
        Ok(())
    }

    /// Remove a user-defined field after confirmation, clearing its values.
    /// Returns `Ok(false)` when the user declined.
    pub fn remove_field(
        &mut self,
        name: &str,
        confirm: &mut impl Confirm,
    ) -> Result<bool, SheetError> {
        if is_default_field(name) {
            return Err(SheetError::Protected(name.to_string()));
        }
        if !self.fields.contains(name) {
            let err = SheetError::UnknownField(name.to_string());
            warn_not_found(&err);
            return Err(err);
        }
        let prompt = ConfirmPrompt::RemoveField {
            name: name.to_string(),
        };
        if !confirm.confirm(&prompt) {
            return Ok(false);
        }
        let change = self.fields.remove(name)?;
        self.rows.apply_field_change(&change);
        Ok(true)
    }

    /// Show or hide one field.
    pub fn set_field_visible(&mut self, name: &str, visible: bool) -> Result<(), SheetError> {
        self.fields
            .set_visible(name, visible)
            .inspect_err(warn_not_found)
    }

    /// Show or hide every field.
    pub fn toggle_all_fields(&mut self, visible: bool) {
        self.fields.toggle_all(visible);
    }

    // ===== Rows =====

    /// Add an empty row at the end of `group`'s scope.
    pub fn add_row(&mut self, group: Option<GroupId>) -> Result<RowId, SheetError> {
        self.check_group(group)?;
        Ok(self.rows.create(group, &self.fields))
    }

    /// Set one cell, checked against the field's type.
    pub fn set_value(&mut self, row: RowId, field: &str, value: &str) -> Result<(), SheetError> {
        self.rows
            .set_value(row, field, value, &self.fields)
            .inspect_err(warn_not_found)
    }

    /// Move `row` to the end of `group`'s scope.
    pub fn set_row_group(&mut self, row: RowId, group: Option<GroupId>) -> Result<(), SheetError> {
        self.check_group(group)?;
        self.rows
            .reassign_group(row, group)
            .inspect_err(warn_not_found)
    }

    /// Clear the row's group selection at tree `level`.
    ///
    /// Level 0 ungroups the row. A deeper level moves it up to its ancestor
    /// at `level - 1`, or ungroups it when its path is not that deep.
    pub fn clear_group_level(&mut self, row: RowId, level: usize) -> Result<(), SheetError> {
        let current = self
            .rows
            .get(row)
            .ok_or(SheetError::UnknownRow(row))
            .inspect_err(warn_not_found)?
            .group_id;

        let target = match (current, level) {
            (None, _) | (_, 0) => None,
            (Some(group), level) => {
                let path = self.groups.path(group);
                if path.len() > level {
                    Some(path[level - 1].id)
                } else {
                    None
                }
            }
        };
        self.rows.reassign_group(row, target)
    }

    /// Give `row` a new sequence number, shifting its siblings.
    pub fn set_row_index(&mut self, row: RowId, index: i64) -> Result<(), SheetError> {
        self.rows.set_index(row, index).inspect_err(warn_not_found)
    }

    /// Swap `row` with its previous sibling. `Ok(false)` at the top.
    pub fn move_row_up(&mut self, row: RowId) -> Result<bool, SheetError> {
        self.rows.move_up(row).inspect_err(warn_not_found)
    }

    /// Swap `row` with its next sibling. `Ok(false)` at the bottom.
    pub fn move_row_down(&mut self, row: RowId) -> Result<bool, SheetError> {
        self.rows.move_down(row).inspect_err(warn_not_found)
    }

    /// Delete the selected rows after confirmation. Returns how many rows
    /// were deleted (0 when declined).
    ///
    /// # Errors
    ///
    /// `EmptyInput` for an empty selection, `UnknownRow` (without a prompt)
    /// when none of the ids resolve.
    pub fn delete_rows(
        &mut self,
        ids: &[RowId],
        confirm: &mut impl Confirm,
    ) -> Result<usize, SheetError> {
        if ids.is_empty() {
            return Err(SheetError::EmptyInput {
                input: "row selection",
            });
        }
        let known: Vec<RowId> = ids
            .iter()
            .copied()
            .filter(|id| self.rows.get(*id).is_some())
            .collect();
        if known.is_empty() {
            let err = SheetError::UnknownRow(ids[0]);
            warn_not_found(&err);
            return Err(err);
        }
        let prompt = ConfirmPrompt::DeleteRows { rows: known };
        if !confirm.confirm(&prompt) {
            return Ok(0);
        }
        Ok(self.rows.remove(ids).len())
    }

    /// Rewrite one scope's indices to `1..=n`.
    pub fn renumber(&mut self, group: Option<GroupId>) -> Result<(), SheetError> {
        self.check_group(group)?;
        self.rows.renumber(group);
        Ok(())
    }

    /// Check that every required field is filled on every row.
    ///
    /// # Errors
    ///
    /// `MissingRequired` for the first gap in display order.
    pub fn validate_required(&self) -> Result<(), SheetError> {
        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect();
        for projected in self.projection().iter() {
            if let Some(field) = required
                .iter()
                .find(|name| projected.row.value_or_empty(name).is_empty())
            {
                return Err(SheetError::MissingRequired {
                    row: projected.row.id(),
                    position: projected.position,
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }

    fn check_group(&self, group: Option<GroupId>) -> Result<(), SheetError> {
        match group {
            Some(id) if !self.groups.contains(id) => {
                let err = SheetError::UnknownGroup(id);
                warn_not_found(&err);
                Err(err)
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "workbook_tests.rs"]
mod tests;
