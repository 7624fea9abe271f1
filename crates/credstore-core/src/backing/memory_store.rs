//! In-memory backing store

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use super::traits::{BackingStore, StoreResult};
use crate::types::Blob;

/// Process-wide backing handed out by [`MemoryBackingStore::shared`]
static SHARED: Lazy<Arc<MemoryBackingStore<String, Blob>>> =
    Lazy::new(|| Arc::new(MemoryBackingStore::new()));

/// In-memory backing store
///
/// Entries are lost when the store is dropped.
///
/// # Thread Safety
///
/// The store uses `RwLock` internally and is safe to use from multiple threads.
///
/// # Example
///
/// ```
/// use credstore_core::backing::{BackingStore, MemoryBackingStore};
///
/// let store = MemoryBackingStore::<String, Vec<u8>>::new();
/// store.put("k".to_string(), b"v".to_vec()).unwrap();
/// assert_eq!(store.get(&"k".to_string()).unwrap(), Some(b"v".to_vec()));
/// ```
#[derive(Debug)]
pub struct MemoryBackingStore<K, R> {
    entries: RwLock<HashMap<K, R>>,
}

impl<K, R> Default for MemoryBackingStore<K, R> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, R> MemoryBackingStore<K, R>
where
    K: Eq + Hash,
{
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memory store with initial values
    pub fn with_entries(initial: HashMap<K, R>) -> Self {
        Self {
            entries: RwLock::new(initial),
        }
    }
}

impl MemoryBackingStore<String, Blob> {
    /// The process-wide credential backing
    ///
    /// Every caller gets the same instance, so stores built on it alias
    /// each other's data for the life of the process.
    pub fn shared() -> Arc<MemoryBackingStore<String, Blob>> {
        SHARED.clone()
    }
}

impl<K, R> BackingStore<K, R> for MemoryBackingStore<K, R>
where
    K: Eq + Hash + Clone + Send + Sync,
    R: Clone + Send + Sync,
{
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &K) -> StoreResult<Option<R>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&self, key: K, value: R) -> StoreResult<Option<R>> {
        Ok(self.entries.write().insert(key, value))
    }

    fn remove(&self, key: &K) -> StoreResult<Option<R>> {
        Ok(self.entries.write().remove(key))
    }

    fn contains_key(&self, key: &K) -> StoreResult<bool> {
        Ok(self.entries.read().contains_key(key))
    }

    fn len(&self) -> StoreResult<usize> {
        Ok(self.entries.read().len())
    }

    fn keys(&self) -> StoreResult<Vec<K>> {
        Ok(self.entries.read().keys().cloned().collect())
    }

    fn clear(&self) -> StoreResult<()> {
        self.entries.write().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(k: &str) -> String {
        k.to_string()
    }

    #[test]
    fn test_memory_store_name() {
        let store = MemoryBackingStore::<String, Blob>::new();
        assert_eq!(store.name(), "memory");
        assert!(store.is_available());
    }

    #[test]
    fn test_memory_store_crud() {
        let store = MemoryBackingStore::<String, String>::new();

        // Initially empty
        assert!(store.is_empty().unwrap());
        assert_eq!(store.get(&key("test")).unwrap(), None);

        // Insert
        assert_eq!(store.put(key("test"), "value".to_string()).unwrap(), None);
        assert_eq!(store.len().unwrap(), 1);
        assert!(store.contains_key(&key("test")).unwrap());

        // Replace returns the previous value
        let previous = store.put(key("test"), "new_value".to_string()).unwrap();
        assert_eq!(previous.as_deref(), Some("value"));
        assert_eq!(store.get(&key("test")).unwrap().as_deref(), Some("new_value"));

        // Remove returns the previous value
        let removed = store.remove(&key("test")).unwrap();
        assert_eq!(removed.as_deref(), Some("new_value"));
        assert!(!store.contains_key(&key("test")).unwrap());
        assert_eq!(store.remove(&key("test")).unwrap(), None);
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_memory_store_with_initial() {
        let mut initial = HashMap::new();
        initial.insert(key("key1"), 1u32);
        initial.insert(key("key2"), 2u32);

        let store = MemoryBackingStore::with_entries(initial);

        assert_eq!(store.len().unwrap(), 2);
        let mut keys = store.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["key1", "key2"]);
    }

    #[test]
    fn test_memory_store_clear() {
        let store = MemoryBackingStore::<String, u32>::new();
        store.put(key("a"), 1).unwrap();
        store.put(key("b"), 2).unwrap();
        store.clear().unwrap();
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_shared_store_is_one_instance() {
        let a = MemoryBackingStore::shared();
        let b = MemoryBackingStore::shared();
        assert!(Arc::ptr_eq(&a, &b));

        a.put(key("memory_store_shared_probe"), Blob::from("x")).unwrap();
        assert!(b.contains_key(&key("memory_store_shared_probe")).unwrap());
        b.remove(&key("memory_store_shared_probe")).unwrap();
    }

    #[test]
    fn test_memory_store_thread_safety() {
        use std::thread;

        let store = Arc::new(MemoryBackingStore::<String, String>::new());
        let mut handles = vec![];

        for i in 0..10 {
            let store_clone = Arc::clone(&store);
            let handle = thread::spawn(move || {
                let k = format!("key_{}", i);
                let v = format!("value_{}", i);
                store_clone.put(k.clone(), v.clone()).unwrap();
                assert_eq!(store_clone.get(&k).unwrap(), Some(v));
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len().unwrap(), 10);
    }
}
