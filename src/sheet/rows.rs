//! Row storage: an arena of rows with stable ids.
//!
//! Rows stay in insertion order, which is the tie-break for equal indices.
//! Sequence-number maintenance lives in [`super::ordering`].

use super::field_registry::{FieldChange, FieldRegistry};
use crate::model::{GroupId, Row, RowId, SheetError};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

/// All data rows of a workbook.
#[derive(Debug, Clone, Default)]
pub struct RowStore {
    pub(super) rows: Vec<Row>,
    next_row_id: u64,
}

impl RowStore {
    /// Empty store; the first row gets id 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// Look up a row by id.
    pub fn get(&self, id: RowId) -> Option<&Row> {
        self.rows.iter().find(|r| r.id() == id)
    }

    /// Rows of one scope, in insertion order.
    pub fn scope(&self, group_id: Option<GroupId>) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(move |r| r.in_scope(group_id))
    }

    /// Whether any row is tagged with `group_id`.
    pub fn has_rows(&self, group_id: GroupId) -> bool {
        self.scope(Some(group_id)).next().is_some()
    }

    /// Append a row exactly as given, without touching its index.
    ///
    /// Used when restoring persisted rows.
    pub fn push(
        &mut self,
        group_id: Option<GroupId>,
        index: i64,
        values: BTreeMap<String, String>,
    ) -> RowId {
        let id = self.allocate_id();
        let mut row = Row::new(id, group_id, index);
        for (field, value) in values {
            row.set_value(field, value);
        }
        self.rows.push(row);
        id
    }

    /// Create a row in `group_id` with an empty value for every field and the
    /// next free index of that scope.
    pub fn create(&mut self, group_id: Option<GroupId>, fields: &FieldRegistry) -> RowId {
        let values = fields
            .iter()
            .map(|f| (f.name.clone(), String::new()))
            .collect();
        let index = self.next_index(group_id, None);
        let id = self.push(group_id, index, values);
        info!(row = %id, group = ?group_id.map(GroupId::get), "Row added");
        id
    }

    /// Store `value` under `field` on `row`, checked against the registry.
    ///
    /// # Errors
    ///
    /// `UnknownRow`, `UnknownField`, or `InvalidValue` when the value does not
    /// parse as the field's type.
    pub fn set_value(
        &mut self,
        row: RowId,
        field: &str,
        value: &str,
        fields: &FieldRegistry,
    ) -> Result<(), SheetError> {
        let def = fields
            .get(field)
            .ok_or_else(|| SheetError::UnknownField(field.to_string()))?;
        if !def.field_type.accepts(value) {
            return Err(SheetError::InvalidValue {
                field: def.name.clone(),
                field_type: def.field_type,
                value: value.to_string(),
            });
        }
        let row = self.get_mut(row)?;
        row.set_value(field, value);
        debug!(row = %row.id(), field, "Row value set");
        Ok(())
    }

    /// Delete rows by id. Unknown ids are skipped with a warning.
    pub fn remove(&mut self, ids: &[RowId]) -> Vec<Row> {
        let wanted: HashSet<RowId> = ids.iter().copied().collect();
        for id in &wanted {
            if self.get(*id).is_none() {
                warn!(row = %id, "Skipping delete of unknown row");
            }
        }
        let (removed, kept): (Vec<Row>, Vec<Row>) = std::mem::take(&mut self.rows)
            .into_iter()
            .partition(|r| wanted.contains(&r.id()));
        self.rows = kept;
        info!(count = removed.len(), "Rows deleted");
        removed
    }

    /// Mirror a schema change onto every row.
    pub fn apply_field_change(&mut self, change: &FieldChange) {
        match change {
            FieldChange::Added(name) => {
                for row in &mut self.rows {
                    row.set_value(name.clone(), String::new());
                }
            }
            FieldChange::Removed(name) => {
                for row in &mut self.rows {
                    row.remove_value(name);
                }
            }
        }
    }

    /// Make every row carry exactly the registry's keys.
    ///
    /// Missing keys get an empty value; keys with no field are dropped.
    /// Returns the number of dropped keys.
    pub fn conform_to(&mut self, fields: &FieldRegistry) -> usize {
        let mut dropped = 0;
        for row in &mut self.rows {
            let stale: Vec<String> = row
                .values()
                .keys()
                .filter(|k| !fields.contains(k))
                .cloned()
                .collect();
            for key in stale {
                warn!(row = %row.id(), field = %key, "Dropping value of unknown field");
                row.remove_value(&key);
                dropped += 1;
            }
            for field in fields.iter() {
                if row.value(&field.name).is_none() {
                    row.set_value(field.name.clone(), String::new());
                }
            }
        }
        dropped
    }

    pub(super) fn get_mut(&mut self, id: RowId) -> Result<&mut Row, SheetError> {
        self.rows
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or(SheetError::UnknownRow(id))
    }

    fn allocate_id(&mut self) -> RowId {
        self.next_row_id += 1;
        RowId::new(self.next_row_id)
    }
}
