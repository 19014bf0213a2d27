//! Error types for groupsheet.
//!
//! Errors are split by layer using `thiserror`, composing via `?` and `From`:
//!
//! - [`SheetError`] - a workbook mutation was rejected (bad input, stale id,
//!   structural rule). State is unchanged whenever one is returned.
//! - [`StoreError`] - reading or writing the persisted workbook failed.
//! - [`ExportError`] - CSV export could not be produced.
//! - [`AppError`] - top-level error of the command-line front end.
//!
//! # Severity
//!
//! Every [`SheetError`] maps to an [`ErrorKind`]. Front ends show
//! `Validation`, `HasChildren` and `Protected` as blocking messages and log
//! `NotFound` as a warning, treating the action as a no-op.

use crate::config::ConfigError;
use crate::logging::LoggingError;
use crate::model::{FieldType, GroupId, RowId};
use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`SheetError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input rejected: empty name, duplicate name, cycle, malformed value,
    /// missing required value.
    Validation,
    /// A group, row or field reference no longer resolves.
    NotFound,
    /// A group with child groups cannot be removed.
    HasChildren,
    /// A default field cannot be removed.
    Protected,
}

/// A rejected workbook operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SheetError {
    /// A required text input was empty after trimming.
    ///
    /// `input` names the input ("group name", "struct name", "field name").
    #[error("{input} must not be empty")]
    EmptyInput {
        /// Human-readable name of the empty input.
        input: &'static str,
    },

    /// A field with this name already exists.
    #[error("field '{0}' already exists")]
    DuplicateName(String),

    /// The name collides with a key every stored row already uses.
    #[error("'{0}' is reserved for row metadata and cannot name a field")]
    ReservedName(String),

    /// Reparenting `group` under `parent` would make the group its own ancestor.
    #[error("group {group} cannot be placed under {parent}: it would become its own ancestor")]
    Cycle {
        /// Group being updated.
        group: GroupId,
        /// Proposed parent.
        parent: GroupId,
    },

    /// A value does not parse as the field's declared type.
    #[error("value '{value}' is not a valid {field_type} for field '{field}'")]
    InvalidValue {
        /// Field being edited.
        field: String,
        /// Declared type of the field.
        field_type: FieldType,
        /// Rejected input.
        value: String,
    },

    /// A required field is empty on some row.
    ///
    /// `position` is the row's 1-based position in display order.
    #[error("required field '{field}' is empty on row {position}")]
    MissingRequired {
        /// Offending row.
        row: RowId,
        /// 1-based display position of the row.
        position: usize,
        /// Name of the empty required field.
        field: String,
    },

    /// No group has this id.
    #[error("group {0} not found")]
    UnknownGroup(GroupId),

    /// No row has this id; it may have been deleted.
    #[error("row {0} not found")]
    UnknownRow(RowId),

    /// No field has this name.
    #[error("field '{0}' not found")]
    UnknownField(String),

    /// The group still has child groups; they must be removed first.
    #[error("group {0} still has child groups; remove them first")]
    HasChildren(GroupId),

    /// Default fields are part of the fixed schema.
    #[error("default field '{0}' cannot be removed")]
    Protected(String),
}

impl SheetError {
    /// Severity class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SheetError::EmptyInput { .. }
            | SheetError::DuplicateName(_)
            | SheetError::ReservedName(_)
            | SheetError::Cycle { .. }
            | SheetError::InvalidValue { .. }
            | SheetError::MissingRequired { .. } => ErrorKind::Validation,
            SheetError::UnknownGroup(_)
            | SheetError::UnknownRow(_)
            | SheetError::UnknownField(_) => ErrorKind::NotFound,
            SheetError::HasChildren(_) => ErrorKind::HasChildren,
            SheetError::Protected(_) => ErrorKind::Protected,
        }
    }
}

/// Errors reading or writing the persisted workbook.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store file exists but could not be read.
    #[error("failed to read {path:?}: {source}")]
    Read {
        /// Store path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The store file or its directory could not be written.
    #[error("failed to write {path:?}: {source}")]
    Write {
        /// Store path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is not a valid workbook document.
    #[error("invalid workbook data in {path:?}: {source}")]
    Parse {
        /// Store path.
        path: PathBuf,
        /// JSON error with line and column.
        #[source]
        source: serde_json::Error,
    },

    /// Serializing the workbook failed.
    #[error("failed to encode workbook: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Errors producing a CSV export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// There are no rows to export.
    #[error("no data to export")]
    NoRows,

    /// Writing the CSV file failed.
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level error of the command-line front end.
#[derive(Debug, Error)]
pub enum AppError {
    /// A workbook operation was rejected.
    #[error(transparent)]
    Sheet(#[from] SheetError),

    /// Loading or saving the store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// CSV export failed.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// The config file could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Log output could not be set up.
    #[error(transparent)]
    Logging(#[from] LoggingError),

    /// Any other I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
