//! Configuration file loading with precedence handling.

use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "GROUPSHEET_CONFIG";

/// Environment variable overriding the workbook store path.
pub const STORE_ENV: &str = "GROUPSHEET_STORE";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (permission issues, not a file).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional; unspecified ones fall back to defaults.
/// Corresponds to `~/.config/groupsheet/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Where the workbook JSON document lives.
    #[serde(default)]
    pub store_path: Option<PathBuf>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,

    /// Directory CSV exports are written to when no explicit path is given.
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Workbook JSON document.
    pub store_path: PathBuf,
    /// Tracing output file.
    pub log_file_path: PathBuf,
    /// Directory for dated CSV exports.
    pub export_dir: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            log_file_path: default_log_path(),
            export_dir: default_export_dir(),
        }
    }
}

/// `~/.local/share/groupsheet/workbook.json` or the platform equivalent,
/// falling back to the current directory.
pub fn default_store_path() -> PathBuf {
    if let Some(data_dir) = dirs::data_dir() {
        data_dir.join("groupsheet").join("workbook.json")
    } else {
        PathBuf::from("workbook.json")
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/groupsheet/groupsheet.log` on Unix-like systems.
/// Platforms without a state directory fall back to the current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("groupsheet").join("groupsheet.log")
    } else {
        PathBuf::from("groupsheet.log")
    }
}

/// The working directory.
pub fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `None` if the config directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("groupsheet").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `GROUPSHEET_CONFIG` environment variable
/// 3. Default path `~/.config/groupsheet/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Merge config file into defaults to create resolved config.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        store_path: config.store_path.unwrap_or(defaults.store_path),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
        export_dir: config.export_dir.unwrap_or(defaults.export_dir),
    }
}

/// Apply environment variable overrides.
///
/// Checks `GROUPSHEET_STORE` for the store path.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(store) = std::env::var(STORE_ENV) {
        if !store.is_empty() {
            config.store_path = PathBuf::from(store);
        }
    }
    config
}

/// Apply CLI argument overrides; only flags the user actually set apply.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    store_override: Option<PathBuf>,
) -> ResolvedConfig {
    if let Some(store) = store_override {
        config.store_path = store;
    }
    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
