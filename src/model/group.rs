//! Group records of the group tree.

use crate::model::GroupId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A node of the group forest.
///
/// `parent_id == None` marks a root. The parent may refer to a group that no
/// longer exists in stored data; such groups are ordered as roots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Unique, never reused within a workbook.
    pub id: GroupId,
    /// Display name.
    pub name: String,
    /// Name of the data structure the group maps to.
    pub struct_name: String,
    /// Parent group, `None` for a root.
    #[serde(default)]
    pub parent_id: Option<GroupId>,
}

impl Group {
    /// Build a group record; names are stored as given.
    pub fn new(
        id: GroupId,
        name: impl Into<String>,
        struct_name: impl Into<String>,
        parent_id: Option<GroupId>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            struct_name: struct_name.into(),
            parent_id,
        }
    }
}

/// Renders as `name (structName)`, the label used in group columns and export.
impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.struct_name)
    }
}
