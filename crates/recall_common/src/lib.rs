//! Shared value types used across the recall memoization workspace.
//!
//! This crate provides the recursive [`Value`] model that flows through the
//! hasher and the archive codec, the raw-byte [`NdArray`] used for bulk
//! numeric data, and the [`ContentHash`] used to verify archive payloads.

#![warn(missing_docs)]

pub mod array;
pub mod hash;
pub mod value;

pub use array::{DType, Element, NdArray, ShapeError};
pub use hash::ContentHash;
pub use value::Value;
