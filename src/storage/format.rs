//! On-disk document layout.
//!
//! ```json
//! { "fields": [...], "groups": [...], "data": [...],
//!   "nextGroupId": 3, "timestamp": "2024-05-01T08:00:00.000Z" }
//! ```
//!
//! A row is a flat object: `groupId`, `index`, plus one key per field.
//! Every top-level key is optional on read.

use crate::model::{Field, FieldType, Group, GroupId};
use crate::sheet::{FieldRegistry, GroupTree, RowStore};
use crate::workbook::Workbook;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The persisted document. Every section is optional on read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredWorkbook {
    /// Field schema; the defaults are used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<StoredField>>,
    /// Group records in insertion order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<Group>>,
    /// Rows in insertion order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<StoredRow>>,
    /// Persisted group id counter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_group_id: Option<u32>,
    /// RFC 3339 time of the last save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// A field as stored; `visible` and `order` may be missing in older data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredField {
    /// Field name.
    pub name: String,
    /// Type tag; unknown tags read as text.
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    /// Required flag.
    #[serde(default)]
    pub required: bool,
    /// Visibility, visible when missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    /// Display order, document position when missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

/// A row as stored: metadata keys next to one key per field.
///
/// Field names may not collide with `groupId` or `index`; see
/// [`crate::model::RESERVED_ROW_KEYS`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRow {
    /// Scope of the row.
    #[serde(default)]
    pub group_id: Option<GroupId>,
    /// Sequence number; missing or ≤ 0 is repaired on load.
    #[serde(default)]
    pub index: Option<i64>,
    /// Field values; numbers and booleans are read as text.
    #[serde(flatten)]
    pub values: BTreeMap<String, Value>,
}

impl StoredWorkbook {
    /// Snapshot `workbook`, stamped with `timestamp`.
    pub fn capture(workbook: &Workbook, timestamp: String) -> Self {
        let fields = workbook
            .fields()
            .iter()
            .map(|f| StoredField {
                name: f.name.clone(),
                field_type: f.field_type,
                required: f.required,
                visible: Some(f.visible),
                order: Some(f.order),
            })
            .collect();
        let data = workbook
            .rows()
            .iter()
            .map(|r| StoredRow {
                group_id: r.group_id,
                index: Some(r.index),
                values: r
                    .values()
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            })
            .collect();

        Self {
            fields: Some(fields),
            groups: Some(workbook.groups().iter().cloned().collect()),
            data: Some(data),
            next_group_id: Some(workbook.groups().next_id().get()),
            timestamp: Some(timestamp),
        }
    }

    /// Rebuild a workbook, applying defaults for anything missing.
    pub fn restore(self) -> Workbook {
        let fields = match self.fields {
            Some(stored) => FieldRegistry::from_fields(
                stored
                    .into_iter()
                    .zip(0..)
                    .map(|(f, position)| Field {
                        name: f.name,
                        field_type: f.field_type,
                        required: f.required,
                        visible: f.visible.unwrap_or(true),
                        order: f.order.unwrap_or(position),
                    })
                    .collect(),
            ),
            None => FieldRegistry::with_defaults(),
        };

        let groups = GroupTree::from_groups(self.groups.unwrap_or_default(), self.next_group_id);

        let mut rows = RowStore::new();
        for row in self.data.unwrap_or_default() {
            let values = row
                .values
                .into_iter()
                .map(|(k, v)| (k, value_to_text(v)))
                .collect();
            rows.push(row.group_id, row.index.unwrap_or(0), values);
        }

        Workbook::from_parts(fields, groups, rows)
    }
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
