//! Configuration for the recall memoization layer.
//!
//! Provides the per-wrapper [`MemoOptions`], the cache root held by
//! [`CacheConfiguration`], and loading of both from a `recall.toml` file.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod root;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, CONFIG_FILE_NAME};
pub use root::{CacheConfiguration, DEFAULT_CACHE_ROOT};
pub use types::*;
