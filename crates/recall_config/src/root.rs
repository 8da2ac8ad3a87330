//! The cache root directory.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Cache root used when nothing else is configured.
pub const DEFAULT_CACHE_ROOT: &str = "./_cache";

/// Where cache entries are stored.
///
/// Passed explicitly to the cache store rather than held in global state, so
/// tests and callers can run against isolated roots side by side. Changing
/// the root redirects later lookups and writes; entries already written under
/// the old root are left where they are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfiguration {
    root: PathBuf,
}

impl CacheConfiguration {
    /// Uses `root` as the cache root, creating it and any missing parents.
    ///
    /// Succeeds silently if the directory already exists.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let root = root.into();
        ensure_dir(&root)?;
        Ok(Self { root })
    }

    /// Uses [`DEFAULT_CACHE_ROOT`].
    pub fn default_root() -> Result<Self, ConfigError> {
        Self::new(DEFAULT_CACHE_ROOT)
    }

    /// Redirects to a new root, creating it like [`CacheConfiguration::new`].
    pub fn set_root(&mut self, root: impl Into<PathBuf>) -> Result<(), ConfigError> {
        let root = root.into();
        ensure_dir(&root)?;
        self.root = root;
        Ok(())
    }

    /// The configured root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn ensure_dir(path: &Path) -> Result<(), ConfigError> {
    std::fs::create_dir_all(path).map_err(|source| ConfigError::CacheRoot {
        path: path.to_path_buf(),
        source,
    })
}
