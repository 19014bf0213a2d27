//! Tracing subscriber initialization.
//!
//! Events go to a log file so stdout stays reserved for command output.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info";

/// Error type for logging initialization failures.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Failed to create log directory
    #[error("Failed to create log directory at {path:?}: {source}")]
    DirectoryCreation {
        /// The directory path that failed to be created
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Log file path has no usable file name
    #[error("Invalid log file path: {0:?}")]
    InvalidPath(PathBuf),

    /// Log path has no parent directory
    #[error("Log path has no parent directory: {0:?}")]
    NoParentDirectory(PathBuf),

    /// A global subscriber was installed earlier in this process
    #[error("Tracing subscriber already initialized")]
    SubscriberAlreadySet,
}

/// Split a log path into the directory and file name the appender needs,
/// creating the directory when missing.
fn prepare_target(log_path: &Path) -> Result<(&Path, &str), LoggingError> {
    let file_name = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| LoggingError::InvalidPath(log_path.to_path_buf()))?;

    let directory = log_path
        .parent()
        .ok_or_else(|| LoggingError::NoParentDirectory(log_path.to_path_buf()))?;

    // A bare file name has an empty parent: log next to the working directory.
    let directory = if directory.as_os_str().is_empty() {
        Path::new(".")
    } else {
        directory
    };

    std::fs::create_dir_all(directory).map_err(|source| LoggingError::DirectoryCreation {
        path: directory.to_path_buf(),
        source,
    })?;

    Ok((directory, file_name))
}

/// Initialize the tracing subscriber with file-based logging.
///
/// Respects `RUST_LOG`, defaulting to [`DEFAULT_FILTER`]. Creates the log
/// directory if it doesn't exist.
///
/// # Errors
///
/// Fails if the path is unusable, the directory can't be created, or a
/// global subscriber is already installed.
pub fn init(log_path: &Path) -> Result<(), LoggingError> {
    use tracing_subscriber::EnvFilter;

    let (directory, file_name) = prepare_target(log_path)?;
    let file_appender = tracing_appender::rolling::never(directory, file_name);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(file_appender)
        .with_ansi(false)
        .try_init()
        .map_err(|_| LoggingError::SubscriberAlreadySet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("groupsheet_logging_tests").join(name);
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn prepare_target_creates_nested_directory() {
        let dir = scratch("nested").join("a").join("b");
        let log_file = dir.join("sheet.log");

        let (directory, file_name) = prepare_target(&log_file).expect("target should prepare");

        assert_eq!(directory, dir.as_path());
        assert_eq!(file_name, "sheet.log");
        assert!(dir.is_dir(), "directory should be created: {:?}", dir);
        let _ = fs::remove_dir_all(scratch("nested"));
    }

    #[test]
    fn prepare_target_rejects_root_path() {
        let result = prepare_target(Path::new("/"));
        assert!(
            matches!(result, Err(LoggingError::InvalidPath(_))),
            "root has no file name, got: {:?}",
            result
        );
    }

    #[test]
    fn prepare_target_uses_current_dir_for_bare_file_name() {
        let (directory, file_name) =
            prepare_target(Path::new("groupsheet.log")).expect("bare name should work");
        assert_eq!(directory, Path::new("."));
        assert_eq!(file_name, "groupsheet.log");
    }

    #[test]
    #[serial(tracing_init)]
    fn init_creates_log_directory_even_when_subscriber_is_set() {
        let dir = scratch("init");
        let log_file = dir.join("groupsheet.log");

        // A previous test may already own the global subscriber.
        let _ = init(&log_file);

        assert!(dir.exists(), "Log directory should be created: {:?}", dir);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    #[serial(tracing_init)]
    fn second_init_reports_subscriber_already_set() {
        let dir = scratch("twice");
        let log_file = dir.join("groupsheet.log");

        let _ = init(&log_file);
        let second = init(&log_file);

        assert!(matches!(second, Err(LoggingError::SubscriberAlreadySet)));
        let _ = fs::remove_dir_all(&dir);
    }
}
