//! Configuration types: hash modes, wrapper options, and the `recall.toml` schema.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// How a cache key is derived from a call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HashMode {
    /// Opaque fixed-length hex digest (default).
    #[default]
    Digest,
    /// Human-readable slug of the function name and arguments, with a short
    /// digest suffix.
    Readable,
}

impl HashMode {
    /// The canonical name of this mode.
    pub fn as_str(self) -> &'static str {
        match self {
            HashMode::Digest => "digest",
            HashMode::Readable => "readable",
        }
    }
}

impl FromStr for HashMode {
    type Err = ConfigError;

    /// Accepts `"digest"`, its older spelling `"hash"`, and `"readable"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "digest" | "hash" => Ok(HashMode::Digest),
            "readable" => Ok(HashMode::Readable),
            other => Err(ConfigError::InvalidHashMode(other.to_string())),
        }
    }
}

impl fmt::Display for HashMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options fixed when a function is wrapped.
///
/// They never change for the lifetime of the wrapper; build a new wrapper to
/// use different options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoOptions {
    /// When `false` the wrapper is a pass-through: no hashing, no storage.
    pub enabled: bool,
    /// Persist the result of a call that missed the cache.
    pub write_on_miss: bool,
    /// Skip lookup, always recompute and rewrite the entry.
    pub force_recompute: bool,
    /// Compress archive payloads.
    pub compress: bool,
    /// Key derivation mode.
    pub hash_mode: HashMode,
}

impl Default for MemoOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            write_on_miss: true,
            force_recompute: false,
            compress: true,
            hash_mode: HashMode::Digest,
        }
    }
}

impl MemoOptions {
    /// Default options with caching switched on or off.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    /// Sets whether a miss persists its result.
    pub fn write_on_miss(mut self, write_on_miss: bool) -> Self {
        self.write_on_miss = write_on_miss;
        self
    }

    /// Sets whether every call recomputes and rewrites.
    pub fn force_recompute(mut self, force_recompute: bool) -> Self {
        self.force_recompute = force_recompute;
        self
    }

    /// Sets archive compression.
    pub fn compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Sets the key derivation mode.
    pub fn hash_mode(mut self, hash_mode: HashMode) -> Self {
        self.hash_mode = hash_mode;
        self
    }

    /// Sets the key derivation mode by name, failing on an unknown name.
    pub fn hash_mode_named(self, name: &str) -> Result<Self, ConfigError> {
        Ok(self.hash_mode(name.parse()?))
    }
}

/// The top-level structure of a `recall.toml` file.
///
/// Every section and field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct RecallFile {
    /// Where cache entries live.
    #[serde(default)]
    pub cache: CacheSection,
    /// Default wrapper options.
    #[serde(default)]
    pub memo: MemoSection,
}

/// The `[cache]` section.
#[derive(Debug, Default, Deserialize)]
pub struct CacheSection {
    /// Cache root directory; relative paths resolve against the working directory.
    #[serde(default)]
    pub root: Option<String>,
}

/// The `[memo]` section, as written in the file.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MemoSection {
    /// See [`MemoOptions::enabled`].
    pub enabled: bool,
    /// See [`MemoOptions::write_on_miss`].
    pub write_on_miss: bool,
    /// See [`MemoOptions::force_recompute`].
    pub force_recompute: bool,
    /// See [`MemoOptions::compress`].
    pub compress: bool,
    /// Hash mode name; validated when converted to [`MemoOptions`].
    pub hash_mode: String,
}

impl Default for MemoSection {
    fn default() -> Self {
        let defaults = MemoOptions::default();
        Self {
            enabled: defaults.enabled,
            write_on_miss: defaults.write_on_miss,
            force_recompute: defaults.force_recompute,
            compress: defaults.compress,
            hash_mode: defaults.hash_mode.to_string(),
        }
    }
}

impl TryFrom<&MemoSection> for MemoOptions {
    type Error = ConfigError;

    fn try_from(section: &MemoSection) -> Result<Self, Self::Error> {
        Ok(MemoOptions {
            enabled: section.enabled,
            write_on_miss: section.write_on_miss,
            force_recompute: section.force_recompute,
            compress: section.compress,
            hash_mode: section.hash_mode.parse()?,
        })
    }
}

/// A validated `recall.toml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecallConfig {
    /// Configured cache root, if any.
    pub cache_root: Option<String>,
    /// Default wrapper options.
    pub memo: MemoOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_mode_names() {
        assert_eq!("digest".parse::<HashMode>().unwrap(), HashMode::Digest);
        assert_eq!("hash".parse::<HashMode>().unwrap(), HashMode::Digest);
        assert_eq!("readable".parse::<HashMode>().unwrap(), HashMode::Readable);
        assert!(matches!(
            "sha1".parse::<HashMode>(),
            Err(ConfigError::InvalidHashMode(name)) if name == "sha1"
        ));
    }

    #[test]
    fn hash_mode_display_roundtrip() {
        for mode in [HashMode::Digest, HashMode::Readable] {
            assert_eq!(mode.to_string().parse::<HashMode>().unwrap(), mode);
        }
    }

    #[test]
    fn default_options() {
        let opts = MemoOptions::default();
        assert!(opts.enabled);
        assert!(opts.write_on_miss);
        assert!(!opts.force_recompute);
        assert!(opts.compress);
        assert_eq!(opts.hash_mode, HashMode::Digest);
    }

    #[test]
    fn builder_chain() {
        let opts = MemoOptions::new(false)
            .write_on_miss(false)
            .force_recompute(true)
            .compress(false)
            .hash_mode(HashMode::Readable);
        assert!(!opts.enabled);
        assert!(!opts.write_on_miss);
        assert!(opts.force_recompute);
        assert!(!opts.compress);
        assert_eq!(opts.hash_mode, HashMode::Readable);
    }

    #[test]
    fn hash_mode_named_rejects_unknown() {
        assert!(MemoOptions::default().hash_mode_named("readable").is_ok());
        assert!(MemoOptions::default().hash_mode_named("fast").is_err());
    }

    #[test]
    fn section_defaults_match_options() {
        let opts = MemoOptions::try_from(&MemoSection::default()).unwrap();
        assert_eq!(opts, MemoOptions::default());
    }
}
