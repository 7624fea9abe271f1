//! Credential store construction

use std::sync::Arc;

use crate::backing::{create_backing, has_backing, BlobStore, MemoryBackingStore};
use crate::codec::{Codec, CredentialCodec, WireFormat};
use crate::config::{ConfigError, ConfigResult, StoreConfig};
use crate::logging::{NoOpLogger, SharedLogger};
use crate::transform::TransformingStore;
use crate::types::{Blob, Credential};

/// Store of [`Credential`] values over serialized blobs
pub type CredentialStore = TransformingStore<String, Blob, Credential>;

/// Builds a [`CredentialStore`]
///
/// The backing store is always chosen explicitly: pass one with
/// [`with_backing`](Self::with_backing), ask for a private map with
/// [`in_memory`](Self::in_memory), or opt into the process-wide map with
/// [`shared_default`](Self::shared_default).
///
/// # Example
///
/// ```
/// use credstore_core::factory::CredentialStoreBuilder;
/// use credstore_core::types::{Credential, LoginCredential};
///
/// let store = CredentialStoreBuilder::in_memory().build();
/// let login: Credential = LoginCredential::builder("deploy").password("pw").build().into();
/// store.put("node-1".to_string(), &login).unwrap();
/// assert_eq!(store.get(&"node-1".to_string()).unwrap(), Some(login));
/// ```
pub struct CredentialStoreBuilder {
    backing: Arc<BlobStore>,
    codec: Option<Arc<dyn Codec<Blob, Credential>>>,
    format: WireFormat,
    logger: SharedLogger,
}

impl CredentialStoreBuilder {
    /// Use `backing` as the raw store
    pub fn with_backing(backing: Arc<BlobStore>) -> Self {
        Self {
            backing,
            codec: None,
            format: WireFormat::default(),
            logger: Arc::new(NoOpLogger::new()),
        }
    }

    /// Use a fresh in-memory map owned by this store
    pub fn in_memory() -> Self {
        Self::with_backing(Arc::new(MemoryBackingStore::<String, Blob>::new()))
    }

    /// Use the process-wide in-memory map
    ///
    /// Every store built this way sees the same entries.
    pub fn shared_default() -> Self {
        Self::with_backing(MemoryBackingStore::shared())
    }

    /// Build from a loaded configuration
    pub fn from_config(config: &StoreConfig) -> ConfigResult<Self> {
        if !has_backing(&config.backing.kind) {
            return Err(ConfigError::UnknownBacking(config.backing.kind.clone()));
        }
        let backing = create_backing(&config.backing)?;
        let logger = config.logging.build_logger()?;
        Ok(Self::with_backing(backing).format(config.format).logger(logger))
    }

    /// Build from the user config file plus `CREDSTORE_*` overrides
    pub fn from_user_config() -> ConfigResult<Self> {
        Self::from_config(&StoreConfig::load_user()?)
    }

    /// Output format for the default credential codec
    pub fn format(mut self, format: WireFormat) -> Self {
        self.format = format;
        self
    }

    /// Replace the credential codec entirely
    pub fn codec(mut self, codec: Arc<dyn Codec<Blob, Credential>>) -> Self {
        self.codec = Some(codec);
        self
    }

    pub fn logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn build(self) -> CredentialStore {
        let codec: Arc<dyn Codec<Blob, Credential>> = match self.codec {
            Some(codec) => codec,
            None => Arc::new(CredentialCodec::with_format(self.format)),
        };
        TransformingStore::new(self.backing, codec).with_logger(self.logger)
    }
}

impl std::fmt::Debug for CredentialStoreBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStoreBuilder")
            .field("backing", &self.backing.name())
            .field("custom_codec", &self.codec.is_some())
            .field("format", &self.format)
            .finish()
    }
}
