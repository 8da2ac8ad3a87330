//! Disk-backed memoization for deterministic functions.
//!
//! Wrap a function with [`Memoized`] and repeated calls with equal arguments
//! load the stored result instead of recomputing it. The crate is built from
//! four pieces:
//!
//! - [`signature`] binds positional and keyword arguments to declared
//!   parameters so that equivalent calls look identical,
//! - [`hasher`] turns a function name and bound arguments into a cache key,
//! - [`codec`] packs an arbitrary [`Value`](recall_common::Value) into a
//!   single archive and back,
//! - [`store`] maps keys to files under the cache root.
//!
//! ```no_run
//! use recall_cache::{BoundArgs, CacheStore, CallArgs, Memoized, Signature};
//! use recall_common::Value;
//! use recall_config::MemoOptions;
//!
//! let store = CacheStore::open("./_cache")?;
//! let mut area = Memoized::wrap(
//!     Signature::with_params("area", &["w", "h"]),
//!     MemoOptions::default(),
//!     store,
//!     |args: &BoundArgs| {
//!         let w = args.get("w").and_then(Value::as_float).unwrap_or(0.0);
//!         let h = args.get("h").and_then(Value::as_float).unwrap_or(0.0);
//!         Value::Float(w * h)
//!     },
//! );
//! let first = area.call(CallArgs::new().arg(2.0).arg(3.0))?;
//! let again = area.call(CallArgs::new().arg(2.0).kwarg("h", 3.0))?;
//! assert_eq!(first, again);
//! # Ok::<(), recall_cache::CacheError>(())
//! ```

#![warn(missing_docs)]

pub mod codec;
pub mod error;
pub mod hasher;
pub mod memo;
pub mod signature;
pub mod store;

pub use codec::{peek_header, ArchiveCodec, ArchiveHeader, ARCHIVE_EXT};
pub use error::CacheError;
pub use hasher::KeyHasher;
pub use memo::{CallState, Memoized};
pub use signature::{BoundArgs, CallArgs, Param, ParamKind, Signature};
pub use store::{CacheStore, Lookup};
