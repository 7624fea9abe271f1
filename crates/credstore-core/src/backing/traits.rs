//! Core traits and types for raw backing stores

use thiserror::Error;

use crate::codec::CodecError;
use crate::types::Blob;

/// Errors that can occur during store operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Store not available: {0}")]
    NotAvailable(String),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Raw key-value storage underneath a transforming store
///
/// Implementations must be safe to share between threads without external
/// locking. Each call is atomic on its own; sequences of calls are not.
///
/// Implementations:
/// - `MemoryBackingStore`: `HashMap` behind a lock, optionally process-wide
/// - `FileBackingStore`: one file per key in a directory
/// - `KeychainBackingStore`: the OS keychain
pub trait BackingStore<K, R>: Send + Sync {
    /// Human-readable name of this store
    fn name(&self) -> &str;

    /// Check if this store is usable in the current environment
    fn is_available(&self) -> bool {
        true
    }

    /// Look up the raw value for `key`
    fn get(&self, key: &K) -> StoreResult<Option<R>>;

    /// Insert or replace, returning the previous raw value
    fn put(&self, key: K, value: R) -> StoreResult<Option<R>>;

    /// Remove, returning the previous raw value
    fn remove(&self, key: &K) -> StoreResult<Option<R>>;

    fn contains_key(&self, key: &K) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Number of entries
    fn len(&self) -> StoreResult<usize>;

    fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Snapshot of the current key set
    fn keys(&self) -> StoreResult<Vec<K>>;

    /// Remove every entry
    fn clear(&self) -> StoreResult<()>;
}

/// Backing store for serialized credentials
pub type BlobStore = dyn BackingStore<String, Blob>;

pub(crate) fn validate_key(key: &str) -> StoreResult<()> {
    if key.is_empty() {
        Err(StoreError::invalid_argument("key must not be empty"))
    } else {
        Ok(())
    }
}
