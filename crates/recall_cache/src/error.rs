//! Error types for cache operations.

use std::path::PathBuf;

use recall_config::ConfigError;

/// Errors that can occur during hashing, encoding, or storage.
///
/// Corruption-class variants (see [`CacheError::is_corruption`]) are
/// recovered inside the memoization wrapper by recomputing; the rest reach
/// the caller.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error other than "not found" while reading or writing an entry.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A payload could not be encoded, decoded, or (de)compressed.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },

    /// An archive has an invalid or missing header.
    #[error("invalid archive header: {reason}")]
    InvalidHeader {
        /// Description of the header problem.
        reason: String,
    },

    /// The stored checksum does not match the payload.
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// The checksum recorded in the header.
        expected: String,
        /// The checksum computed from the payload.
        actual: String,
    },

    /// The archive format version is not the current one.
    #[error("archive version mismatch: expected {expected}, got {actual}")]
    VersionMismatch {
        /// The supported format version.
        expected: u32,
        /// The version found in the archive.
        actual: u32,
    },

    /// A key that is not a plain file name, such as one containing a path
    /// separator.
    #[error("invalid cache key '{key}': keys must be plain file names")]
    InvalidKey {
        /// The rejected key.
        key: String,
    },

    /// Call arguments could not be bound to the function's parameters.
    #[error("cannot resolve arguments for `{function}`: {reason}")]
    SignatureResolution {
        /// The wrapped function's name.
        function: String,
        /// What went wrong while binding.
        reason: String,
    },

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl CacheError {
    /// Returns `true` for errors meaning "an entry exists but cannot be used".
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            CacheError::Serialization { .. }
                | CacheError::InvalidHeader { .. }
                | CacheError::ChecksumMismatch { .. }
                | CacheError::VersionMismatch { .. }
        )
    }

    pub(crate) fn signature(function: &str, reason: impl Into<String>) -> Self {
        CacheError::SignatureResolution {
            function: function.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn serialization(reason: impl ToString) -> Self {
        CacheError::Serialization {
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display() {
        let err = CacheError::Io {
            path: PathBuf::from("/tmp/_cache/abc.rcl"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("cache I/O error"));
        assert!(msg.contains("abc.rcl"));
        assert!(!err.is_corruption());
    }

    #[test]
    fn checksum_mismatch_display() {
        let err = CacheError::ChecksumMismatch {
            expected: "aabb".to_string(),
            actual: "ccdd".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("aabb"));
        assert!(msg.contains("ccdd"));
        assert!(err.is_corruption());
    }

    #[test]
    fn version_mismatch_display() {
        let err = CacheError::VersionMismatch {
            expected: 1,
            actual: 7,
        };
        assert!(err.to_string().contains("expected 1, got 7"));
        assert!(err.is_corruption());
    }

    #[test]
    fn signature_resolution_display() {
        let err = CacheError::signature("f", "missing required argument 'y'");
        assert_eq!(
            err.to_string(),
            "cannot resolve arguments for `f`: missing required argument 'y'"
        );
        assert!(!err.is_corruption());
    }

    #[test]
    fn invalid_key_display() {
        let err = CacheError::InvalidKey {
            key: "../x".to_string(),
        };
        assert!(err.to_string().contains("'../x'"));
        assert!(!err.is_corruption());
    }

    #[test]
    fn corruption_classification() {
        assert!(CacheError::serialization("bad bincode").is_corruption());
        assert!(CacheError::InvalidHeader {
            reason: "short".to_string()
        }
        .is_corruption());
        let config = CacheError::from(ConfigError::InvalidHashMode("x".to_string()));
        assert!(!config.is_corruption());
    }
}
