//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::{MemoOptions, RecallConfig, RecallFile};
use std::path::Path;

/// Name of the configuration file looked up in a project directory.
pub const CONFIG_FILE_NAME: &str = "recall.toml";

/// Loads and validates `recall.toml` from a project directory.
pub fn load_config(project_dir: &Path) -> Result<RecallConfig, ConfigError> {
    load_config_file(&project_dir.join(CONFIG_FILE_NAME))
}

/// Loads and validates a configuration file at an explicit path.
pub fn load_config_file(path: &Path) -> Result<RecallConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a configuration from a string.
///
/// The hash mode is checked here so that a bad name fails before any
/// wrapper is built.
pub fn load_config_from_str(content: &str) -> Result<RecallConfig, ConfigError> {
    let file: RecallFile =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    let memo = MemoOptions::try_from(&file.memo)?;
    let cache_root = file.cache.root.filter(|root| !root.is_empty());
    Ok(RecallConfig { cache_root, memo })
}
