//! Domain model types (pure data).

pub mod error;
pub mod field;
pub mod group;
pub mod identifiers;
pub mod row;

pub use error::{AppError, ErrorKind, ExportError, SheetError, StoreError};
pub use field::{is_default_field, Field, FieldType, DEFAULT_FIELDS};
pub use group::Group;
pub use identifiers::{GroupId, RowId};
pub use row::{is_reserved_key, Row, RESERVED_ROW_KEYS};
