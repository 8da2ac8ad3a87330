//! On-disk storage of archive entries, one file per cache key.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use recall_common::Value;
use recall_config::CacheConfiguration;

use crate::codec::{ArchiveCodec, ARCHIVE_EXT};
use crate::error::CacheError;

/// Outcome of reading an entry.
#[derive(Debug)]
pub enum Lookup {
    /// The entry exists and decoded cleanly.
    Hit(Value),
    /// No entry exists for the key.
    Absent,
    /// A file exists at the entry path but could not be decoded.
    Corrupt(CacheError),
}

/// Reads and writes entries directly under the configured cache root.
///
/// Entries live at `<root>/<key>.rcl` with no sharding. Writes replace the
/// whole file; there are no partial updates and no locking between writers.
#[derive(Debug, Clone)]
pub struct CacheStore {
    config: CacheConfiguration,
}

impl CacheStore {
    /// Creates a store over an existing configuration.
    pub fn new(config: CacheConfiguration) -> Self {
        Self { config }
    }

    /// Opens a store at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, CacheError> {
        Ok(Self::new(CacheConfiguration::new(root)?))
    }

    /// The store's configuration.
    pub fn config(&self) -> &CacheConfiguration {
        &self.config
    }

    /// The cache root directory.
    pub fn root(&self) -> &Path {
        self.config.root()
    }

    /// Points the store at a new root. Existing entries are not moved.
    pub fn set_root(&mut self, root: impl Into<PathBuf>) -> Result<(), CacheError> {
        self.config.set_root(root)?;
        Ok(())
    }

    /// The entry path for `key`. Pure: does not touch the filesystem.
    pub fn path(&self, key: &str) -> PathBuf {
        Self::path_in(self.root(), key)
    }

    /// The entry path for `key` under `root`, without opening a store.
    pub fn path_in(root: &Path, key: &str) -> PathBuf {
        root.join(format!("{key}.{ARCHIVE_EXT}"))
    }

    /// Rejects keys that would resolve outside the root.
    ///
    /// Keys produced by the hasher always pass; this guards keys that come
    /// from elsewhere, such as the command line.
    pub fn validate_key(key: &str) -> Result<(), CacheError> {
        let plain = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(&['/', '\\', '\0'][..]);
        if plain {
            Ok(())
        } else {
            Err(CacheError::InvalidKey {
                key: key.to_string(),
            })
        }
    }

    /// Returns `true` if a file exists at the entry path for `key`.
    pub fn exists(&self, key: &str) -> bool {
        self.path(key).is_file()
    }

    /// Reads and decodes the entry for `key`.
    ///
    /// A missing file is [`Lookup::Absent`] and an undecodable one is
    /// [`Lookup::Corrupt`]. Any other I/O failure, such as a permission
    /// error, is returned as `Err`.
    pub fn read(&self, key: &str) -> Result<Lookup, CacheError> {
        Self::validate_key(key)?;
        let path = self.path(key);
        let raw = match std::fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Lookup::Absent),
            Err(e) => return Err(CacheError::Io { path, source: e }),
        };
        match ArchiveCodec::default().deserialize(&raw) {
            Ok(value) => Ok(Lookup::Hit(value)),
            Err(e) if e.is_corruption() => Ok(Lookup::Corrupt(e)),
            Err(e) => Err(e),
        }
    }

    /// Encodes `value` with `codec` and writes it as the entry for `key`,
    /// replacing any existing file. Returns the entry path.
    pub fn write(&self, key: &str, value: &Value, codec: ArchiveCodec) -> Result<PathBuf, CacheError> {
        Self::validate_key(key)?;
        let bytes = codec.serialize(value)?;
        let path = self.path(key);
        std::fs::write(&path, &bytes).map_err(|e| CacheError::Io {
            path: path.clone(),
            source: e,
        })?;
        Ok(path)
    }

    /// Keys of every entry currently under the root, sorted.
    pub fn keys(&self) -> Result<Vec<String>, CacheError> {
        let dir = self.root();
        let entries = std::fs::read_dir(dir).map_err(|e| CacheError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CacheError::Io {
                path: dir.to_path_buf(),
                source: e,
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(ARCHIVE_EXT) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}
