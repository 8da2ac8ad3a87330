//! The memoizing wrapper around a function.
//!
//! [`Memoized`] owns the wrapped function, its [`Signature`], fixed
//! [`MemoOptions`], and a [`CacheStore`]. Each call walks a small state
//! machine:
//!
//! ```text
//! disabled ──────────────────────────────► call
//! enabled ─► key ─┬─ force ─► call ─► write
//!                 └─ lookup ─┬─ hit ─► stored value
//!                            └─ miss ─► call ─► write if write_on_miss
//! ```
//!
//! A corrupt entry is logged and handled as a miss. Caching never changes the
//! value a call returns, only whether the function runs and whether a file
//! is written.

use recall_common::Value;
use recall_config::MemoOptions;

use crate::codec::ArchiveCodec;
use crate::error::CacheError;
use crate::hasher::KeyHasher;
use crate::signature::{BoundArgs, CallArgs, Signature};
use crate::store::{CacheStore, Lookup};

/// The path a call took through the wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    /// Caching is off; the function ran and nothing was hashed or stored.
    Disabled,
    /// Lookup was skipped; the function ran and its result was written.
    Force,
    /// A stored entry was returned; the function did not run.
    Hit,
    /// No usable entry; the function ran.
    Miss,
}

/// A function wrapped with disk-backed memoization.
pub struct Memoized<F> {
    signature: Signature,
    options: MemoOptions,
    codec: ArchiveCodec,
    store: CacheStore,
    func: F,
}

impl<F> Memoized<F>
where
    F: FnMut(&BoundArgs) -> Value,
{
    /// Wraps `func`. The options are fixed for the wrapper's lifetime.
    pub fn wrap(signature: Signature, options: MemoOptions, store: CacheStore, func: F) -> Self {
        Self {
            signature,
            codec: ArchiveCodec::new(options.compress),
            options,
            store,
            func,
        }
    }

    /// Calls through the cache and returns the result.
    pub fn call(&mut self, args: CallArgs) -> Result<Value, CacheError> {
        self.call_traced(args).map(|(value, _)| value)
    }

    /// Like [`Memoized::call`], also reporting which path the call took.
    pub fn call_traced(&mut self, args: CallArgs) -> Result<(Value, CallState), CacheError> {
        let bound = self.signature.bind(&args)?;
        if !self.options.enabled {
            return Ok(((self.func)(&bound), CallState::Disabled));
        }

        let key = KeyHasher::key_for_bound(self.signature.name(), &bound, self.options.hash_mode);

        if self.options.force_recompute {
            tracing::debug!(function = self.signature.name(), key = %key, "cache: forcing update");
            let value = self.compute_and_store(&key, &bound, true)?;
            return Ok((value, CallState::Force));
        }

        match self.store.read(&key)? {
            Lookup::Hit(value) => {
                tracing::debug!(function = self.signature.name(), key = %key, "cache: found");
                Ok((value, CallState::Hit))
            }
            Lookup::Absent => {
                tracing::debug!(function = self.signature.name(), key = %key, "cache: not found");
                let value = self.compute_and_store(&key, &bound, self.options.write_on_miss)?;
                Ok((value, CallState::Miss))
            }
            Lookup::Corrupt(err) => {
                tracing::warn!(
                    function = self.signature.name(),
                    key = %key,
                    path = %self.store.path(&key).display(),
                    "cache: corrupted entry, ignoring: {err}"
                );
                let value = self.compute_and_store(&key, &bound, self.options.write_on_miss)?;
                Ok((value, CallState::Miss))
            }
        }
    }

    /// The key a call with `args` would use under this wrapper's hash mode.
    pub fn key_for(&self, args: &CallArgs) -> Result<String, CacheError> {
        KeyHasher::compute_key(&self.signature, args, self.options.hash_mode)
    }

    /// The wrapped function's signature.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// The options fixed at wrap time.
    pub fn options(&self) -> &MemoOptions {
        &self.options
    }

    /// The backing store.
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    fn compute_and_store(
        &mut self,
        key: &str,
        bound: &BoundArgs,
        persist: bool,
    ) -> Result<Value, CacheError> {
        let value = (self.func)(bound);
        if persist {
            let path = self.store.write(key, &value, self.codec)?;
            tracing::debug!(key, path = %path.display(), "cache: wrote entry");
        }
        Ok(value)
    }
}
