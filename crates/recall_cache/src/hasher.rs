//! Cache key derivation from a function name and its bound arguments.
//!
//! Keys are computed over the bound arguments rather than the call as
//! written, so every spelling of the same call maps to one key. Arrays are
//! digested over their raw element bytes; every other leaf over its
//! canonical string form together with a type tag.

use recall_common::Value;
use recall_config::HashMode;
use sha2::{Digest, Sha256};

use crate::codec::ARCHIVE_EXT;
use crate::error::CacheError;
use crate::signature::{BoundArgs, CallArgs, Signature};

/// Upper bound on the file name length of a readable-mode entry.
pub const MAX_FILENAME_LEN: usize = 100;

/// Longest slice kept from each name or value in a readable slug.
pub const READABLE_PART_LEN: usize = 20;

/// Hex characters of the digest appended to a readable slug.
pub const READABLE_SUFFIX_LEN: usize = 6;

/// Characters left for the slug once `_<suffix>.<ext>` is reserved.
const SLUG_BUDGET: usize = MAX_FILENAME_LEN - READABLE_SUFFIX_LEN - 2 - ARCHIVE_EXT.len();

/// Variant tags fed to the digest ahead of each value.
mod tag {
    pub const NONE: u8 = 0;
    pub const BOOL: u8 = 1;
    pub const INT: u8 = 2;
    pub const FLOAT: u8 = 3;
    pub const STR: u8 = 4;
    pub const BYTES: u8 = 5;
    pub const LIST: u8 = 6;
    pub const TUPLE: u8 = 7;
    pub const MAP: u8 = 8;
    pub const ARRAY: u8 = 9;
}

/// Computes cache keys.
pub struct KeyHasher;

impl KeyHasher {
    /// Binds `args` against `signature` and derives the key for `mode`.
    pub fn compute_key(
        signature: &Signature,
        args: &CallArgs,
        mode: HashMode,
    ) -> Result<String, CacheError> {
        let bound = signature.bind(args)?;
        Ok(Self::key_for_bound(signature.name(), &bound, mode))
    }

    /// Derives the key for already bound arguments.
    pub fn key_for_bound(function: &str, bound: &BoundArgs, mode: HashMode) -> String {
        match mode {
            HashMode::Digest => Self::digest_key(function, bound),
            HashMode::Readable => Self::readable_key(function, bound),
        }
    }

    /// Opaque key: hex SHA-256 over the function name and the name-sorted
    /// `(parameter, value digest)` pairs.
    pub fn digest_key(function: &str, bound: &BoundArgs) -> String {
        let mut pairs: Vec<(&str, [u8; 32])> = bound
            .iter()
            .map(|(name, value)| (name, Self::value_digest(value)))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(b.0));

        let mut hasher = Sha256::new();
        write_framed(&mut hasher, function.as_bytes());
        hasher.update((pairs.len() as u64).to_le_bytes());
        for (name, digest) in &pairs {
            write_framed(&mut hasher, name.as_bytes());
            hasher.update(digest);
        }
        hex::encode(hasher.finalize())
    }

    /// Inspectable key: `<function>_<param>_<value>..._<suffix>`.
    ///
    /// Each name and value is reduced to ASCII alphanumerics and cut to
    /// [`READABLE_PART_LEN`] characters, the slug is cut to fit
    /// [`MAX_FILENAME_LEN`], and the first [`READABLE_SUFFIX_LEN`] characters
    /// of the digest key are appended. The suffix is what tells two calls
    /// apart once their slugs have been truncated to the same text.
    pub fn readable_key(function: &str, bound: &BoundArgs) -> String {
        let mut slug: String = function
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        for (name, value) in bound.iter() {
            slug.push('_');
            slug.push_str(&slug_part(name));
            slug.push('_');
            slug.push_str(&slug_part(&value.to_string()));
        }
        slug.truncate(SLUG_BUDGET);

        let digest = Self::digest_key(function, bound);
        format!("{slug}_{}", &digest[..READABLE_SUFFIX_LEN])
    }

    /// SHA-256 of a single value.
    ///
    /// Containers are digested recursively; map entries are ordered by the
    /// digest of their keys so that insertion order does not matter.
    pub fn value_digest(value: &Value) -> [u8; 32] {
        let mut hasher = Sha256::new();
        feed_value(&mut hasher, value);
        let mut out = [0u8; 32];
        out.copy_from_slice(&hasher.finalize());
        out
    }
}

fn slug_part(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_alphanumeric)
        .take(READABLE_PART_LEN)
        .collect()
}

fn write_framed(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

fn feed_value(hasher: &mut Sha256, value: &Value) {
    match value {
        Value::None => hasher.update([tag::NONE]),
        Value::Bool(_) => feed_leaf(hasher, tag::BOOL, value),
        Value::Int(_) => feed_leaf(hasher, tag::INT, value),
        Value::Float(_) => feed_leaf(hasher, tag::FLOAT, value),
        Value::Str(s) => {
            hasher.update([tag::STR]);
            write_framed(hasher, s.as_bytes());
        }
        Value::Bytes(b) => {
            hasher.update([tag::BYTES]);
            write_framed(hasher, b);
        }
        Value::List(items) | Value::Tuple(items) => {
            let t = if matches!(value, Value::List(_)) {
                tag::LIST
            } else {
                tag::TUPLE
            };
            hasher.update([t]);
            hasher.update((items.len() as u64).to_le_bytes());
            for item in items {
                feed_value(hasher, item);
            }
        }
        Value::Map(entries) => {
            let mut digested: Vec<([u8; 32], [u8; 32])> = entries
                .iter()
                .map(|(k, v)| (KeyHasher::value_digest(k), KeyHasher::value_digest(v)))
                .collect();
            digested.sort();
            hasher.update([tag::MAP]);
            hasher.update((digested.len() as u64).to_le_bytes());
            for (k, v) in &digested {
                hasher.update(k);
                hasher.update(v);
            }
        }
        Value::Array(array) => {
            hasher.update([tag::ARRAY]);
            write_framed(hasher, array.dtype().name().as_bytes());
            hasher.update((array.ndim() as u64).to_le_bytes());
            for dim in array.shape() {
                hasher.update((*dim as u64).to_le_bytes());
            }
            write_framed(hasher, array.as_bytes());
        }
    }
}

fn feed_leaf(hasher: &mut Sha256, t: u8, value: &Value) {
    hasher.update([t]);
    write_framed(hasher, value.to_string().as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use recall_common::NdArray;

    fn xy() -> Signature {
        Signature::with_params("f", &["x", "y"])
    }

    fn key(args: CallArgs, mode: HashMode) -> String {
        KeyHasher::compute_key(&xy(), &args, mode).unwrap()
    }

    #[test]
    fn digest_is_64_hex_chars() {
        let k = key(CallArgs::new().arg(2).arg(3), HashMode::Digest);
        assert_eq!(k.len(), 64);
        assert!(k.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn call_spellings_share_a_key() {
        for mode in [HashMode::Digest, HashMode::Readable] {
            let expected = key(CallArgs::new().arg(2).arg(3), mode);
            assert_eq!(key(CallArgs::new().arg(2).kwarg("y", 3), mode), expected);
            assert_eq!(key(CallArgs::new().kwarg("x", 2).kwarg("y", 3), mode), expected);
            assert_eq!(key(CallArgs::new().kwarg("y", 3).kwarg("x", 2), mode), expected);
        }
    }

    #[test]
    fn argument_values_matter() {
        let a = key(CallArgs::new().arg(2).arg(3), HashMode::Digest);
        let b = key(CallArgs::new().arg(3).arg(2), HashMode::Digest);
        assert_ne!(a, b);
    }

    #[test]
    fn function_name_matters() {
        let args = CallArgs::new().arg(2).arg(3);
        let f = KeyHasher::compute_key(&xy(), &args, HashMode::Digest).unwrap();
        let g = KeyHasher::compute_key(
            &Signature::with_params("g", &["x", "y"]),
            &args,
            HashMode::Digest,
        )
        .unwrap();
        assert_ne!(f, g);
    }

    #[test]
    fn int_and_float_do_not_collide() {
        let int = KeyHasher::value_digest(&Value::Int(1));
        let float = KeyHasher::value_digest(&Value::Float(1.0));
        let text = KeyHasher::value_digest(&Value::from("1"));
        assert_ne!(int, float);
        assert_ne!(int, text);
    }

    #[test]
    fn list_and_tuple_differ() {
        let list = KeyHasher::value_digest(&Value::List(vec![Value::Int(1)]));
        let tuple = KeyHasher::value_digest(&Value::Tuple(vec![Value::Int(1)]));
        assert_ne!(list, tuple);
    }

    #[test]
    fn map_order_is_ignored() {
        let a = Value::map([("a", 1), ("b", 2)]);
        let b = Value::map([("b", 2), ("a", 1)]);
        assert_eq!(KeyHasher::value_digest(&a), KeyHasher::value_digest(&b));
    }

    #[test]
    fn arrays_hash_every_element() {
        // The summarized Display of these two arrays is identical.
        let mut values: Vec<f64> = (0..10_000).map(f64::from).collect();
        let a = NdArray::from_vec(values.clone());
        values[5_000] += 1e-9;
        let b = NdArray::from_vec(values);
        assert_eq!(a.to_string(), b.to_string());
        assert_ne!(
            KeyHasher::value_digest(&Value::from(a)),
            KeyHasher::value_digest(&Value::from(b))
        );
    }

    #[test]
    fn array_shape_and_dtype_matter() {
        let flat = NdArray::from_vec(vec![1i32, 2, 3, 4]);
        let square = NdArray::from_shape_vec(vec![2, 2], vec![1i32, 2, 3, 4]).unwrap();
        let unsigned = NdArray::from_vec(vec![1u32, 2, 3, 4]);
        let d = |a: &NdArray| KeyHasher::value_digest(&Value::Array(a.clone()));
        assert_ne!(d(&flat), d(&square));
        assert_ne!(d(&flat), d(&unsigned));
    }

    #[test]
    fn readable_key_layout() {
        let k = key(CallArgs::new().arg(2).arg(3), HashMode::Readable);
        let digest = key(CallArgs::new().arg(2).arg(3), HashMode::Digest);
        assert_eq!(k, format!("f_x_2_y_3_{}", &digest[..6]));
    }

    #[test]
    fn readable_key_filters_and_truncates_parts() {
        let sig = Signature::with_params("load", &["path"]);
        let args = CallArgs::new().arg("/data/some-really-long-file-name.bin");
        let k = KeyHasher::compute_key(&sig, &args, HashMode::Readable).unwrap();
        assert!(k.starts_with("load_path_datasomereallylongfi_"));
        assert!(k.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    }

    #[test]
    fn readable_key_respects_filename_budget() {
        let names: Vec<String> = (0..20).map(|i| format!("parameter{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let sig = Signature::with_params("wide", &refs);
        let args = refs
            .iter()
            .fold(CallArgs::new(), |a, _| a.arg("a value that is long enough"));
        let k = KeyHasher::compute_key(&sig, &args, HashMode::Readable).unwrap();
        assert!(k.len() + 1 + ARCHIVE_EXT.len() <= MAX_FILENAME_LEN);
    }

    #[test]
    fn readable_suffix_separates_truncated_slugs() {
        let sig = Signature::with_params("f", &["x"]);
        let long = "y".repeat(40);
        let readable = |arg: String| {
            KeyHasher::compute_key(&sig, &CallArgs::new().arg(arg), HashMode::Readable).unwrap()
        };
        let a = readable(format!("{long}1"));
        let b = readable(format!("{long}2"));
        assert_eq!(a[..a.len() - 6], b[..b.len() - 6]);
        assert_ne!(a, b);
    }

    #[test]
    fn unbindable_call_errors() {
        let err = KeyHasher::compute_key(&xy(), &CallArgs::new().arg(1), HashMode::Digest)
            .unwrap_err();
        assert!(matches!(err, CacheError::SignatureResolution { .. }));
    }
}
