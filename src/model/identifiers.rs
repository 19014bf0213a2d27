//! Core identifier newtypes.
//!
//! Group ids are persisted and user-visible; row ids are opaque handles that
//! stay stable for the lifetime of a loaded workbook.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a group in the group tree.
///
/// Assigned sequentially starting at 1. Serialized as a bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(u32);

impl GroupId {
    /// The first id handed out by an empty tree.
    pub const FIRST: GroupId = GroupId(1);

    /// Wrap a raw id.
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw id.
    pub fn get(self) -> u32 {
        self.0
    }

    /// The id following this one.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque, stable identity of a data row.
///
/// Never reused within a workbook, so deleting rows does not shift the
/// identity of the remaining ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowId(u64);

impl RowId {
    /// Wrap a raw id.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_id_next_increments() {
        assert_eq!(GroupId::FIRST.next(), GroupId::new(2));
    }

    #[test]
    fn group_id_serializes_as_bare_integer() {
        let json = serde_json::to_string(&GroupId::new(7)).unwrap();
        assert_eq!(json, "7");
        let back: GroupId = serde_json::from_str("7").unwrap();
        assert_eq!(back, GroupId::new(7));
    }

    #[test]
    fn row_id_display_has_hash_prefix() {
        assert_eq!(RowId::new(3).to_string(), "#3");
    }
}
