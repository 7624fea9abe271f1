//! System keychain backing store
//!
//! Uses the OS keychain for persistent storage:
//! - macOS: Keychain
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring, KWallet)
//!
//! Keychains cannot enumerate entries, so the store keeps the key set in a
//! reserved index entry of the same service.

use keyring::Entry;
use parking_lot::Mutex;

use super::traits::{validate_key, BackingStore, StoreError, StoreResult};
use crate::types::Blob;

const INDEX_KEY: &str = "__credstore_index__";

/// Backing store using the system keychain
///
/// # Example
///
/// ```no_run
/// use credstore_core::backing::{BackingStore, KeychainBackingStore};
/// use credstore_core::types::Blob;
///
/// let store = KeychainBackingStore::new();
/// store.put("deploy".to_string(), Blob::from("{}")).unwrap();
/// assert!(store.contains_key(&"deploy".to_string()).unwrap());
/// ```
pub struct KeychainBackingStore {
    service_name: String,
    index_lock: Mutex<()>,
}

impl KeychainBackingStore {
    /// Create a keychain store with the default service name "credstore"
    pub fn new() -> Self {
        Self::with_service("credstore")
    }

    /// Create a keychain store with a custom service name
    ///
    /// The service name namespaces entries in the keychain.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service_name: service.into(),
            index_lock: Mutex::new(()),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    fn entry(&self, key: &str) -> StoreResult<Entry> {
        Entry::new(&self.service_name, key)
            .map_err(|e| StoreError::backend(format!("Failed to create keychain entry: {}", e)))
    }

    fn checked_entry(&self, key: &str) -> StoreResult<Entry> {
        validate_key(key)?;
        if key == INDEX_KEY {
            return Err(StoreError::invalid_argument(format!("'{}' is reserved", INDEX_KEY)));
        }
        self.entry(key)
    }

    fn read_secret(entry: &Entry) -> StoreResult<Option<Vec<u8>>> {
        match entry.get_secret() {
            Ok(bytes) => Ok(Some(bytes)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(StoreError::backend(format!("Failed to read from keychain: {}", e))),
        }
    }

    fn load_index(&self) -> StoreResult<Vec<String>> {
        match Self::read_secret(&self.entry(INDEX_KEY)?)? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StoreError::backend(format!("Corrupt keychain index: {}", e))),
            None => Ok(Vec::new()),
        }
    }

    fn save_index(&self, keys: &[String]) -> StoreResult<()> {
        let entry = self.entry(INDEX_KEY)?;
        if keys.is_empty() {
            return match entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                Err(e) => Err(StoreError::backend(format!("Failed to update keychain index: {}", e))),
            };
        }
        let bytes = serde_json::to_vec(keys)
            .map_err(|e| StoreError::backend(format!("Failed to encode keychain index: {}", e)))?;
        entry
            .set_secret(&bytes)
            .map_err(|e| StoreError::backend(format!("Failed to update keychain index: {}", e)))
    }
}

impl Default for KeychainBackingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BackingStore<String, Blob> for KeychainBackingStore {
    fn name(&self) -> &str {
        "keychain"
    }

    fn is_available(&self) -> bool {
        // Fails on headless servers without a keychain daemon
        Entry::new(&self.service_name, "__credstore_availability_check__").is_ok()
    }

    fn get(&self, key: &String) -> StoreResult<Option<Blob>> {
        let entry = self.checked_entry(key)?;
        Ok(Self::read_secret(&entry)?.map(Blob::from_bytes))
    }

    fn put(&self, key: String, value: Blob) -> StoreResult<Option<Blob>> {
        let entry = self.checked_entry(&key)?;
        let bytes = value.read()?;

        let _guard = self.index_lock.lock();
        let previous = Self::read_secret(&entry)?;
        entry
            .set_secret(&bytes)
            .map_err(|e| StoreError::backend(format!("Failed to store in keychain: {}", e)))?;

        let mut index = self.load_index()?;
        if !index.contains(&key) {
            index.push(key);
            self.save_index(&index)?;
        }
        Ok(previous.map(Blob::from_bytes))
    }

    fn remove(&self, key: &String) -> StoreResult<Option<Blob>> {
        let entry = self.checked_entry(key)?;

        let _guard = self.index_lock.lock();
        let previous = Self::read_secret(&entry)?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => {}
            Err(e) => return Err(StoreError::backend(format!("Failed to delete from keychain: {}", e))),
        }

        let mut index = self.load_index()?;
        let before = index.len();
        index.retain(|k| k != key);
        if index.len() != before {
            self.save_index(&index)?;
        }
        Ok(previous.map(Blob::from_bytes))
    }

    fn len(&self) -> StoreResult<usize> {
        Ok(self.load_index()?.len())
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        self.load_index()
    }

    fn clear(&self) -> StoreResult<()> {
        let _guard = self.index_lock.lock();
        for key in self.load_index()? {
            match self.entry(&key)?.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(e) => return Err(StoreError::backend(format!("Failed to delete from keychain: {}", e))),
            }
        }
        self.save_index(&[])
    }
}

impl std::fmt::Debug for KeychainBackingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeychainBackingStore")
            .field("service_name", &self.service_name)
            .finish()
    }
}
