//! Local persistence of a workbook as a JSON document.
//!
//! Reads tolerate partial documents (see [`format`]). Writes are plain,
//! synchronous and never retried; callers log failures.

pub mod format;

pub use format::{StoredField, StoredRow, StoredWorkbook};

use crate::model::{SheetError, StoreError};
use crate::workbook::Workbook;
use chrono::{SecondsFormat, Utc};
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};

/// Parse a workbook from JSON text.
pub fn from_json(text: &str) -> Result<Workbook, serde_json::Error> {
    let stored: StoredWorkbook = serde_json::from_str(text)?;
    Ok(stored.restore())
}

/// Serialize `workbook` as pretty JSON with a fresh timestamp.
pub fn to_json(workbook: &Workbook) -> Result<String, StoreError> {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let stored = StoredWorkbook::capture(workbook, timestamp);
    serde_json::to_string_pretty(&stored).map_err(StoreError::Encode)
}

/// Load the workbook stored at `path`.
///
/// Returns `Ok(None)` if the file does not exist.
///
/// # Errors
///
/// `Read` when the file cannot be read, `Parse` when it is not a workbook
/// document.
pub fn load(path: &Path) -> Result<Option<Workbook>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let workbook = from_json(&text).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), rows = workbook.rows().len(), "Workbook loaded");
    Ok(Some(workbook))
}

/// Load the stored workbook, falling back to a fresh one.
///
/// Read and parse failures are logged and treated as "no saved state".
pub fn load_or_default(path: &Path) -> Workbook {
    match load(path) {
        Ok(Some(workbook)) => workbook,
        Ok(None) => Workbook::new(),
        Err(err) => {
            error!(error = %err, "Failed to load saved workbook; starting fresh");
            Workbook::new()
        }
    }
}

/// Write `workbook` to `path`, creating parent directories.
pub fn save(path: &Path, workbook: &Workbook) -> Result<(), StoreError> {
    let json = to_json(workbook)?;
    let write_err = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    std::fs::write(path, json).map_err(write_err)?;
    info!(path = %path.display(), rows = workbook.rows().len(), "Workbook saved");
    Ok(())
}

/// Failure of [`save_validated`].
#[derive(Debug, Error)]
pub enum SaveError {
    /// A required field is empty; nothing was written.
    #[error(transparent)]
    Invalid(SheetError),
    /// Writing failed.
    #[error(transparent)]
    Store(StoreError),
}

/// Check required fields, then save.
pub fn save_validated(path: &Path, workbook: &Workbook) -> Result<(), SaveError> {
    workbook.validate_required().map_err(SaveError::Invalid)?;
    save(path, workbook).map_err(SaveError::Store)
}
