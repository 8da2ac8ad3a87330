//! Archive encoding for memoized results.
//!
//! A result is wrapped in a single envelope and written as one archive:
//!
//! ```text
//! [u32 LE header length][bincode ArchiveHeader][payload]
//! ```
//!
//! The payload is the bincode encoding of the envelope, zlib-compressed when
//! the header says so. Wrapping the whole value before encoding keeps nested
//! and mixed containers intact instead of forcing them into one uniform
//! array.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use recall_common::{ContentHash, Value};
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// File extension of archive entries.
pub const ARCHIVE_EXT: &str = "rcl";

/// Magic bytes identifying a recall archive.
const ARCHIVE_MAGIC: [u8; 4] = *b"RCLL";

/// Current archive format version. Increment on breaking changes to the
/// header or payload layout.
const ARCHIVE_FORMAT_VERSION: u32 = 1;

/// Header prepended to every archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveHeader {
    /// Magic bytes: must be `b"RCLL"`.
    pub magic: [u8; 4],

    /// Archive format version.
    pub format_version: u32,

    /// Whether the payload is zlib-compressed.
    pub compressed: bool,

    /// Content hash of the stored payload bytes.
    pub checksum: ContentHash,
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    value: &'a Value,
}

#[derive(Deserialize)]
struct Envelope {
    value: Value,
}

/// Encodes and decodes archives.
///
/// The compression setting only affects [`ArchiveCodec::serialize`]; reads
/// follow whatever the archive header records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveCodec {
    compress: bool,
}

impl ArchiveCodec {
    /// Creates a codec that writes compressed or plain payloads.
    pub fn new(compress: bool) -> Self {
        Self { compress }
    }

    /// Whether written payloads are compressed.
    pub fn compresses(&self) -> bool {
        self.compress
    }

    /// Encodes `value` into a complete archive.
    pub fn serialize(&self, value: &Value) -> Result<Vec<u8>, CacheError> {
        let encoded =
            bincode::serde::encode_to_vec(EnvelopeRef { value }, bincode::config::standard())
                .map_err(CacheError::serialization)?;

        let payload = if self.compress {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder
                .write_all(&encoded)
                .map_err(CacheError::serialization)?;
            encoder.finish().map_err(CacheError::serialization)?
        } else {
            encoded
        };

        let header = ArchiveHeader {
            magic: ARCHIVE_MAGIC,
            format_version: ARCHIVE_FORMAT_VERSION,
            compressed: self.compress,
            checksum: ContentHash::from_bytes(&payload),
        };
        let header_bytes = bincode::serde::encode_to_vec(&header, bincode::config::standard())
            .map_err(CacheError::serialization)?;

        let header_len = header_bytes.len() as u32;
        let mut output = Vec::with_capacity(4 + header_bytes.len() + payload.len());
        output.extend_from_slice(&header_len.to_le_bytes());
        output.extend_from_slice(&header_bytes);
        output.extend_from_slice(&payload);
        Ok(output)
    }

    /// Decodes an archive back into the value it wraps.
    ///
    /// Validates magic, format version and checksum before touching the
    /// payload. Every failure is a corruption-class [`CacheError`].
    pub fn deserialize(&self, raw: &[u8]) -> Result<Value, CacheError> {
        let (header, payload) = split_archive(raw)?;

        let actual = ContentHash::from_bytes(payload);
        if actual != header.checksum {
            return Err(CacheError::ChecksumMismatch {
                expected: header.checksum.to_string(),
                actual: actual.to_string(),
            });
        }

        let decompressed;
        let encoded = if header.compressed {
            let mut buf = Vec::new();
            ZlibDecoder::new(payload)
                .read_to_end(&mut buf)
                .map_err(CacheError::serialization)?;
            decompressed = buf;
            &decompressed[..]
        } else {
            payload
        };

        let (envelope, read): (Envelope, usize) =
            bincode::serde::decode_from_slice(encoded, bincode::config::standard())
                .map_err(CacheError::serialization)?;
        if read != encoded.len() {
            return Err(CacheError::serialization(format!(
                "{} trailing bytes after payload",
                encoded.len() - read
            )));
        }
        Ok(envelope.value)
    }
}

impl Default for ArchiveCodec {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Reads and validates only the header of an archive.
pub fn peek_header(raw: &[u8]) -> Result<ArchiveHeader, CacheError> {
    split_archive(raw).map(|(header, _)| header)
}

fn split_archive(raw: &[u8]) -> Result<(ArchiveHeader, &[u8]), CacheError> {
    let invalid = |reason: &str| CacheError::InvalidHeader {
        reason: reason.to_string(),
    };

    if raw.len() < 4 {
        return Err(invalid("missing header length"));
    }
    let mut len_bytes = [0u8; 4];
    len_bytes.copy_from_slice(&raw[..4]);
    let header_len = u32::from_le_bytes(len_bytes) as usize;
    if raw.len() - 4 < header_len {
        return Err(invalid("truncated header"));
    }

    let (header, _): (ArchiveHeader, usize) =
        bincode::serde::decode_from_slice(&raw[4..4 + header_len], bincode::config::standard())
            .map_err(|e| invalid(&e.to_string()))?;

    if header.magic != ARCHIVE_MAGIC {
        return Err(invalid("bad magic bytes"));
    }
    if header.format_version != ARCHIVE_FORMAT_VERSION {
        return Err(CacheError::VersionMismatch {
            expected: ARCHIVE_FORMAT_VERSION,
            actual: header.format_version,
        });
    }

    Ok((header, &raw[4 + header_len..]))
}
