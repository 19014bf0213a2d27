//! Data rows.

use crate::model::{GroupId, RowId};
use std::collections::BTreeMap;

/// Keys a stored row object uses for its own metadata. Field values share
/// the same object, so no field may take one of these names.
pub const RESERVED_ROW_KEYS: [&str; 2] = ["groupId", "index"];

/// Whether `name` collides with a stored row's metadata keys.
pub fn is_reserved_key(name: &str) -> bool {
    RESERVED_ROW_KEYS.contains(&name)
}

/// One data row: a group tag, a per-group sequence number and a value per
/// field.
///
/// `index` is only meaningful relative to other rows with the same
/// `group_id`. Values below 1 mean "unassigned".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    id: RowId,
    /// Scope of the row; `None` for ungrouped.
    pub group_id: Option<GroupId>,
    /// Sequence number within the scope.
    pub index: i64,
    values: BTreeMap<String, String>,
}

impl Row {
    /// A row with no values.
    pub fn new(id: RowId, group_id: Option<GroupId>, index: i64) -> Self {
        Self {
            id,
            group_id,
            index,
            values: BTreeMap::new(),
        }
    }

    /// Stable identity of the row.
    pub fn id(&self) -> RowId {
        self.id
    }

    /// Value stored under `field`, if the row has that key.
    pub fn value(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    /// Value under `field`, or the empty string when absent.
    pub fn value_or_empty(&self, field: &str) -> &str {
        self.value(field).unwrap_or("")
    }

    /// All values, keyed by field name.
    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    pub(crate) fn set_value(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.values.insert(field.into(), value.into());
    }

    pub(crate) fn remove_value(&mut self, field: &str) -> Option<String> {
        self.values.remove(field)
    }

    /// Whether the row is in the scope of `group_id`.
    pub fn in_scope(&self, group_id: Option<GroupId>) -> bool {
        self.group_id == group_id
    }
}
