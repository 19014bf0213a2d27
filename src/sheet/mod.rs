//! Core sheet components: the group forest, the field schema and the row
//! store with its ordering engine.

pub mod field_registry;
pub mod group_tree;
pub mod ordering;
pub mod rows;

pub use field_registry::{FieldChange, FieldRegistry};
pub use group_tree::GroupTree;
pub use rows::RowStore;
