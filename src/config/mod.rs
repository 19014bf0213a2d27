//! Configuration: defaults, TOML file, environment and CLI overrides.

pub mod loader;

pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_config_path, default_export_dir,
    default_log_path, default_store_path, load_config_file, load_config_with_precedence,
    merge_config, ConfigError, ConfigFile, ResolvedConfig,
};
