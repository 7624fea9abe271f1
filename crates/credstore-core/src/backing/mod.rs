//! Raw backing stores
//!
//! This module provides the key→bytes layer underneath a transforming store:
//! - `BackingStore` trait for implementing custom stores
//! - Built-in implementations: `MemoryBackingStore`, `FileBackingStore`, `KeychainBackingStore`
//! - A registry for creating stores by name from configuration

mod traits;
mod memory_store;
mod file_store;
mod keychain_store;
mod registry;

pub use traits::{BackingStore, BlobStore, StoreError, StoreResult};
pub use memory_store::MemoryBackingStore;
pub use file_store::FileBackingStore;
pub use keychain_store::KeychainBackingStore;
pub use registry::{
    register_backing, create_backing, list_backings, has_backing, unregister_backing,
    BackingDefinition, BackingFactory,
};
