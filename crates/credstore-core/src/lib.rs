//! credstore core
//!
//! Key-value credential storage with pluggable backing stores and codecs.
//! A `TransformingStore` sits on top of a raw key→bytes store and converts
//! values through a codec on every read and write. Entries that fail to
//! decode are reported as absent with a warning instead of failing the call.
//!
//! ## Credential stores
//!
//! ```rust
//! use credstore_core::factory::CredentialStoreBuilder;
//! use credstore_core::types::{Credential, PlainCredential};
//!
//! let store = CredentialStoreBuilder::in_memory().build();
//! let key: Credential = PlainCredential::new("AKIA123", "secret").into();
//!
//! store.put("aws".to_string(), &key).unwrap();
//! assert_eq!(store.get(&"aws".to_string()).unwrap(), Some(key));
//! assert_eq!(store.len().unwrap(), 1);
//! ```
//!
//! ## Backing stores
//!
//! - `memory`: private in-process map
//! - `shared`: process-wide in-process map
//! - `file`: one file per key under a directory
//! - `keychain`: OS keychain entries under a service name
//!
//! Stores can also be built from `~/.config/credstore/config.yaml` via
//! [`CredentialStoreBuilder::from_user_config`].

pub mod types;
pub mod logging;
pub mod codec;
pub mod backing;
pub mod transform;
pub mod config;
pub mod factory;

// Re-export commonly used types
pub use types::{Blob, ByteSource, Credential, LoginCredential, PlainCredential};

pub use logging::{Logger, NoOpLogger, ConsoleLogger, MemoryLogger, SharedLogger};

pub use codec::{Codec, ByteCodec, CodecError, CodecResult, CredentialCodec, WireFormat};

pub use backing::{
    BackingStore, BlobStore, StoreError, StoreResult,
    MemoryBackingStore, FileBackingStore, KeychainBackingStore,
    register_backing, create_backing, list_backings,
};

pub use transform::{TransformingStore, Lookup};

pub use config::{StoreConfig, BackingConfig, ConfigError, ConfigResult};

pub use factory::{CredentialStore, CredentialStoreBuilder};
