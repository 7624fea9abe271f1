//! Registry for creating backing stores by name

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use super::file_store::FileBackingStore;
use super::keychain_store::KeychainBackingStore;
use super::memory_store::MemoryBackingStore;
use super::traits::{BlobStore, StoreError, StoreResult};
use crate::config::BackingConfig;
use crate::types::Blob;

/// Factory function type for creating backing stores
pub type BackingFactory = Box<dyn Fn(&BackingConfig) -> StoreResult<Arc<BlobStore>> + Send + Sync>;

/// Definition of a registered backing store
pub struct BackingDefinition {
    /// Unique name for this backing
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Factory function to create instances
    pub factory: BackingFactory,
}

impl std::fmt::Debug for BackingDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackingDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

fn definition(name: &str, description: &str, factory: BackingFactory) -> (String, BackingDefinition) {
    (
        name.to_string(),
        BackingDefinition {
            name: name.to_string(),
            description: description.to_string(),
            factory,
        },
    )
}

/// Global registry of backing stores
static REGISTRY: Lazy<RwLock<HashMap<String, BackingDefinition>>> = Lazy::new(|| {
    let map = HashMap::from([
        definition(
            "memory",
            "Fresh in-memory map owned by the store",
            Box::new(|_| Ok(Arc::new(MemoryBackingStore::<String, Blob>::new()) as Arc<BlobStore>)),
        ),
        definition(
            "shared",
            "Process-wide in-memory map shared by every store that selects it",
            Box::new(|_| Ok(MemoryBackingStore::shared() as Arc<BlobStore>)),
        ),
        definition(
            "file",
            "One file per credential in a directory",
            Box::new(|config: &BackingConfig| {
                let dir = config.path.clone().unwrap_or_else(FileBackingStore::default_dir);
                Ok(Arc::new(FileBackingStore::open(dir)?) as Arc<BlobStore>)
            }),
        ),
        definition(
            "keychain",
            "System keychain (macOS Keychain, Windows Credential Manager, Linux Secret Service)",
            Box::new(|config: &BackingConfig| {
                let store = match &config.service {
                    Some(service) => KeychainBackingStore::with_service(service.clone()),
                    None => KeychainBackingStore::new(),
                };
                Ok(Arc::new(store) as Arc<BlobStore>)
            }),
        ),
    ]);

    RwLock::new(map)
});

/// Register a new backing store type, replacing any existing one with that name
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use credstore_core::backing::{register_backing, BlobStore, MemoryBackingStore};
/// use credstore_core::types::Blob;
///
/// register_backing(
///     "scratch",
///     "Throwaway store",
///     Box::new(|_| Ok(Arc::new(MemoryBackingStore::<String, Blob>::new()) as Arc<BlobStore>)),
/// );
/// ```
pub fn register_backing(name: &str, description: &str, factory: BackingFactory) {
    let mut registry = REGISTRY.write();
    let (key, def) = definition(name, description, factory);
    registry.insert(key, def);
}

/// Create a backing store from its configuration
///
/// Fails with `NotAvailable` if `config.kind` is not registered.
pub fn create_backing(config: &BackingConfig) -> StoreResult<Arc<BlobStore>> {
    let registry = REGISTRY.read();
    let def = registry
        .get(&config.kind)
        .ok_or_else(|| StoreError::NotAvailable(format!("unknown backing '{}'", config.kind)))?;
    (def.factory)(config)
}

/// List all registered backing stores as (name, description) pairs
pub fn list_backings() -> Vec<(String, String)> {
    let registry = REGISTRY.read();
    let mut list: Vec<_> = registry
        .values()
        .map(|def| (def.name.clone(), def.description.clone()))
        .collect();
    list.sort();
    list
}

/// Check if a backing is registered
pub fn has_backing(name: &str) -> bool {
    let registry = REGISTRY.read();
    registry.contains_key(name)
}

/// Unregister a backing (mainly for testing)
pub fn unregister_backing(name: &str) -> bool {
    let mut registry = REGISTRY.write();
    registry.remove(name).is_some()
}
