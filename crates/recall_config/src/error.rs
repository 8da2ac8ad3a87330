//! Error types for configuration loading and validation.

use std::path::PathBuf;

/// Errors that can occur while building or loading recall configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// The requested hash mode is not one of the supported names.
    #[error("hash mode must be one of digest, hash, readable; got '{0}'")]
    InvalidHashMode(String),

    /// The cache root could not be created.
    #[error("failed to create cache root {path}: {source}")]
    CacheRoot {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
