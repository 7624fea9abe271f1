//! Map-like view over a backing store and a codec

use std::fmt;
use std::sync::Arc;

use super::lookup::Lookup;
use crate::backing::{BackingStore, StoreResult};
use crate::codec::Codec;
use crate::logging::{NoOpLogger, SharedLogger};

/// Key→value store layered on a key→raw backing store
///
/// Every operation delegates storage to the backing store; values are
/// encoded on the way in and decoded on the way out, never cached.
///
/// - Presence (`contains_key`, `len`, `keys`) is defined by the backing
///   store alone, so an undecodable entry is still counted.
/// - Decode failures never fail an operation. They log one warning and
///   read as absent from `get`/`put`/`remove`, or as
///   [`Lookup::Unreadable`] from [`lookup`](Self::lookup).
/// - Encode failures and backing store failures propagate.
///
/// No operation is atomic beyond the single backing call it makes.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use credstore_core::backing::MemoryBackingStore;
/// use credstore_core::codec::CredentialCodec;
/// use credstore_core::transform::TransformingStore;
/// use credstore_core::types::{Blob, Credential, PlainCredential};
///
/// let store: TransformingStore<String, Blob, Credential> = TransformingStore::new(
///     Arc::new(MemoryBackingStore::<String, Blob>::new()),
///     Arc::new(CredentialCodec::new()),
/// );
/// let cred = Credential::Plain(PlainCredential::new("id", "secret"));
/// store.put("acct".to_string(), &cred).unwrap();
/// assert_eq!(store.get(&"acct".to_string()).unwrap(), Some(cred));
/// assert_eq!(store.len().unwrap(), 1);
/// ```
pub struct TransformingStore<K, R, V> {
    backing: Arc<dyn BackingStore<K, R>>,
    codec: Arc<dyn Codec<R, V>>,
    logger: SharedLogger,
}

impl<K, R, V> TransformingStore<K, R, V>
where
    K: Clone + fmt::Debug,
{
    /// Create a store that logs nothing
    pub fn new(backing: Arc<dyn BackingStore<K, R>>, codec: Arc<dyn Codec<R, V>>) -> Self {
        Self {
            backing,
            codec,
            logger: Arc::new(NoOpLogger::new()),
        }
    }

    /// Use `logger` for decode warnings
    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn backing(&self) -> &Arc<dyn BackingStore<K, R>> {
        &self.backing
    }

    pub fn codec(&self) -> &Arc<dyn Codec<R, V>> {
        &self.codec
    }

    pub fn logger(&self) -> &SharedLogger {
        &self.logger
    }

    pub(crate) fn decode(&self, key: &K, raw: &R) -> Lookup<V> {
        match self.codec.decode(raw) {
            Ok(value) => Lookup::Present(value),
            Err(e) => {
                self.logger
                    .warn_error(&e, &format!("ignoring problem retrieving value for key {:?}", key));
                Lookup::Unreadable(e)
            }
        }
    }

    fn decode_previous(&self, key: &K, previous: Option<R>) -> Option<V> {
        previous.and_then(|raw| self.decode(key, &raw).into_option())
    }

    /// Decoded value for `key`; absent and undecodable entries both give `None`
    pub fn get(&self, key: &K) -> StoreResult<Option<V>> {
        Ok(self.lookup(key)?.into_option())
    }

    /// Like [`get`](Self::get) but distinguishes absent from undecodable
    pub fn lookup(&self, key: &K) -> StoreResult<Lookup<V>> {
        match self.backing.get(key)? {
            Some(raw) => Ok(self.decode(key, &raw)),
            None => Ok(Lookup::Absent),
        }
    }

    /// Store `value` under `key`, returning the previous value if it was decodable
    pub fn put(&self, key: K, value: &V) -> StoreResult<Option<V>> {
        let raw = self.codec.encode(value)?;
        let previous = self.backing.put(key.clone(), raw)?;
        Ok(self.decode_previous(&key, previous))
    }

    /// Remove `key`, returning the previous value if it was decodable
    pub fn remove(&self, key: &K) -> StoreResult<Option<V>> {
        let previous = self.backing.remove(key)?;
        Ok(self.decode_previous(key, previous))
    }

    pub fn contains_key(&self, key: &K) -> StoreResult<bool> {
        self.backing.contains_key(key)
    }

    /// Number of raw entries, including undecodable ones
    pub fn len(&self) -> StoreResult<usize> {
        self.backing.len()
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        self.backing.is_empty()
    }

    /// All keys, including those whose value is undecodable
    pub fn keys(&self) -> StoreResult<Vec<K>> {
        self.backing.keys()
    }

    /// Remove every entry from the backing store
    pub fn clear(&self) -> StoreResult<()> {
        self.backing.clear()
    }

    /// Lazily decode every entry
    ///
    /// The key set is captured up front; each value is fetched and decoded
    /// when the iterator reaches it. Undecodable entries are yielded as
    /// `(key, None)` after logging a warning. Keys removed after the
    /// snapshot are skipped.
    pub fn entries(&self) -> StoreResult<Entries<'_, K, R, V>> {
        Ok(Entries {
            store: self,
            keys: self.backing.keys()?.into_iter(),
        })
    }
}

impl<K, R, V> Clone for TransformingStore<K, R, V> {
    fn clone(&self) -> Self {
        Self {
            backing: Arc::clone(&self.backing),
            codec: Arc::clone(&self.codec),
            logger: Arc::clone(&self.logger),
        }
    }
}

impl<K, R, V> fmt::Debug for TransformingStore<K, R, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformingStore")
            .field("backing", &self.backing.name())
            .finish_non_exhaustive()
    }
}

/// Iterator returned by [`TransformingStore::entries`]
pub struct Entries<'a, K, R, V> {
    store: &'a TransformingStore<K, R, V>,
    keys: std::vec::IntoIter<K>,
}

impl<'a, K, R, V> Iterator for Entries<'a, K, R, V>
where
    K: Clone + fmt::Debug,
{
    type Item = StoreResult<(K, Option<V>)>;

    fn next(&mut self) -> Option<Self::Item> {
        for key in self.keys.by_ref() {
            match self.store.backing.get(&key) {
                Ok(Some(raw)) => {
                    let value = self.store.decode(&key, &raw).into_option();
                    return Some(Ok((key, value)));
                }
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.keys.len()))
    }
}
