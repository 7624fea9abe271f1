//! Directory-backed store
//!
//! Each entry is one file named after the hex encoding of its key, so any
//! string is a valid key regardless of file system restrictions. Keys too
//! long for a file name are stored under `h<sha256>` with the original key
//! kept in a `.key` file next to the entry.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use sha2::{Digest, Sha256};

use super::traits::{validate_key, BackingStore, StoreError, StoreResult};
use crate::types::Blob;

const ENTRY_EXTENSION: &str = "cred";
const KEY_EXTENSION: &str = "key";
const HASHED_PREFIX: &str = "h";

/// Longest key (in bytes) whose hex encoding is used directly as a file name
const MAX_INLINE_KEY_LEN: usize = 100;

/// Backing store persisting one file per key
///
/// `get` returns a blob that reads the file lazily, so an entry removed
/// on disk after lookup surfaces as an I/O failure when it is decoded.
/// Writes go through a uniquely named temporary file and a rename, so
/// several stores may share one directory.
///
/// # Example
///
/// ```no_run
/// use credstore_core::backing::{BackingStore, FileBackingStore};
/// use credstore_core::types::Blob;
///
/// let store = FileBackingStore::open("/var/lib/myapp/credentials").unwrap();
/// store.put("node-1".to_string(), Blob::from("{}")).unwrap();
/// ```
pub struct FileBackingStore {
    root_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileBackingStore {
    /// Open a store rooted at `root_dir`, creating the directory if needed
    pub fn open(root_dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let root_dir = root_dir.into();
        fs::create_dir_all(&root_dir).map_err(|e| {
            StoreError::backend(format!(
                "failed to create credential directory {}: {}",
                root_dir.display(),
                e
            ))
        })?;
        Ok(Self {
            root_dir,
            write_lock: Mutex::new(()),
        })
    }

    /// Default location under the platform data directory
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".local").join("share"))
            .join("credstore")
            .join("credentials")
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn is_hashed(key: &str) -> bool {
        key.len() > MAX_INLINE_KEY_LEN
    }

    /// The one file stem `key` is stored under
    fn file_stem(key: &str) -> String {
        if Self::is_hashed(key) {
            format!("{}{}", HASHED_PREFIX, hex::encode(Sha256::digest(key.as_bytes())))
        } else {
            hex::encode(key.as_bytes())
        }
    }

    fn path_for_key(&self, key: &str) -> StoreResult<PathBuf> {
        validate_key(key)?;
        Ok(self
            .root_dir
            .join(Self::file_stem(key))
            .with_extension(ENTRY_EXTENSION))
    }

    fn key_file(entry_path: &Path) -> PathBuf {
        entry_path.with_extension(KEY_EXTENSION)
    }

    fn key_for_path(path: &Path) -> Option<String> {
        if path.extension()? != ENTRY_EXTENSION {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        let key = if stem.starts_with(HASHED_PREFIX) {
            fs::read_to_string(Self::key_file(path)).ok()?
        } else {
            String::from_utf8(hex::decode(stem).ok()?).ok()?
        };
        // Names that are not the canonical encoding of their key are foreign
        (Self::file_stem(&key) == stem).then_some(key)
    }

    fn entry_paths(&self) -> StoreResult<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.root_dir)? {
            let path = entry?.path();
            if path.is_file() && Self::key_for_path(&path).is_some() {
                paths.push(path);
            }
        }
        Ok(paths)
    }

    /// Capture the current contents of `path` before it is replaced or deleted
    fn snapshot(path: &Path) -> Option<Blob> {
        match fs::read(path) {
            Ok(bytes) => Some(Blob::from_bytes(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => Some(Blob::unreadable(e)),
        }
    }

    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut tmp = tempfile::Builder::new()
            .prefix(".")
            .suffix(".tmp")
            .tempfile_in(&self.root_dir)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file().set_permissions(fs::Permissions::from_mode(0o600))?;
        }
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn remove_if_present(path: &Path) -> io::Result<bool> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl BackingStore<String, Blob> for FileBackingStore {
    fn name(&self) -> &str {
        "file"
    }

    fn is_available(&self) -> bool {
        self.root_dir.is_dir()
    }

    fn get(&self, key: &String) -> StoreResult<Option<Blob>> {
        let path = self.path_for_key(key)?;
        if path.is_file() {
            Ok(Some(Blob::from_file(path)))
        } else {
            Ok(None)
        }
    }

    fn put(&self, key: String, value: Blob) -> StoreResult<Option<Blob>> {
        let path = self.path_for_key(&key)?;
        let bytes = value.read()?;

        let _guard = self.write_lock.lock();
        let previous = Self::snapshot(&path);
        // The key file goes first so a visible entry always has its key
        if Self::is_hashed(&key) {
            self.write_atomic(&Self::key_file(&path), key.as_bytes())?;
        }
        self.write_atomic(&path, &bytes)?;
        Ok(previous)
    }

    fn remove(&self, key: &String) -> StoreResult<Option<Blob>> {
        let path = self.path_for_key(key)?;

        let _guard = self.write_lock.lock();
        let previous = Self::snapshot(&path);
        let removed = Self::remove_if_present(&path)?;
        if Self::is_hashed(key) {
            Self::remove_if_present(&Self::key_file(&path))?;
        }
        Ok(if removed { previous } else { None })
    }

    fn contains_key(&self, key: &String) -> StoreResult<bool> {
        Ok(self.path_for_key(key)?.is_file())
    }

    fn len(&self) -> StoreResult<usize> {
        Ok(self.entry_paths()?.len())
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        Ok(self
            .entry_paths()?
            .iter()
            .filter_map(|path| Self::key_for_path(path))
            .collect())
    }

    fn clear(&self) -> StoreResult<()> {
        let _guard = self.write_lock.lock();
        for path in self.entry_paths()? {
            Self::remove_if_present(&path)?;
            Self::remove_if_present(&Self::key_file(&path))?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for FileBackingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileBackingStore")
            .field("root_dir", &self.root_dir)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use tempfile::tempdir;

    fn read(blob: Option<Blob>) -> Option<Vec<u8>> {
        blob.map(|b| b.read().unwrap())
    }

    fn file_names(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_file_store_crud() {
        let dir = tempdir().unwrap();
        let store = FileBackingStore::open(dir.path().join("creds")).unwrap();
        let key = "acct1".to_string();

        assert_eq!(store.name(), "file");
        assert!(store.is_available());
        assert!(store.is_empty().unwrap());
        assert!(store.get(&key).unwrap().is_none());

        assert!(store.put(key.clone(), Blob::from("one")).unwrap().is_none());
        assert!(store.contains_key(&key).unwrap());
        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(read(store.get(&key).unwrap()), Some(b"one".to_vec()));

        let previous = store.put(key.clone(), Blob::from("two")).unwrap();
        assert_eq!(read(previous), Some(b"one".to_vec()));
        assert_eq!(read(store.get(&key).unwrap()), Some(b"two".to_vec()));

        let removed = store.remove(&key).unwrap();
        assert_eq!(read(removed), Some(b"two".to_vec()));
        assert!(!store.contains_key(&key).unwrap());
        assert!(store.remove(&key).unwrap().is_none());
    }

    #[test]
    fn test_keys_survive_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = FileBackingStore::open(dir.path()).unwrap();
            store.put("node/1".to_string(), Blob::from("a")).unwrap();
            store.put("ünïcode key".to_string(), Blob::from("b")).unwrap();
        }

        let reopened = FileBackingStore::open(dir.path()).unwrap();
        let mut keys = reopened.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["node/1", "ünïcode key"]);
        assert_eq!(reopened.len().unwrap(), 2);
    }

    #[test]
    fn test_long_keys() {
        let dir = tempdir().unwrap();
        let store = FileBackingStore::open(dir.path()).unwrap();
        let key = format!("https://vault.example.com/v1/secret/data/{}", "segment/".repeat(40));
        assert!(key.len() > 255);

        assert!(store.put(key.clone(), Blob::from("v1")).unwrap().is_none());
        assert_eq!(read(store.get(&key).unwrap()), Some(b"v1".to_vec()));
        assert!(store.contains_key(&key).unwrap());
        assert_eq!(store.keys().unwrap(), vec![key.clone()]);
        assert_eq!(store.len().unwrap(), 1);
        assert!(file_names(dir.path()).iter().all(|name| name.len() < 255));

        let reopened = FileBackingStore::open(dir.path()).unwrap();
        assert_eq!(reopened.keys().unwrap(), vec![key.clone()]);

        let previous = store.put(key.clone(), Blob::from("v2")).unwrap();
        assert_eq!(read(previous), Some(b"v1".to_vec()));

        assert_eq!(read(store.remove(&key).unwrap()), Some(b"v2".to_vec()));
        assert!(store.is_empty().unwrap());
        assert!(file_names(dir.path()).is_empty());
    }

    #[test]
    fn test_foreign_files_are_ignored() {
        let dir = tempdir().unwrap();
        let store = FileBackingStore::open(dir.path()).unwrap();
        store.put("k".to_string(), Blob::from("v")).unwrap();

        fs::write(dir.path().join("README"), "not an entry").unwrap();
        fs::write(dir.path().join("zz.cred"), "bad hex name").unwrap();
        // Same key as "6b.cred" but not its canonical name
        fs::write(dir.path().join("6B.cred"), "shadow").unwrap();
        // Hashed name without a matching key file
        fs::write(dir.path().join(format!("h{}.cred", "0".repeat(64))), "orphan").unwrap();

        assert_eq!(store.keys().unwrap(), vec!["k"]);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_two_stores_share_a_directory() {
        let dir = tempdir().unwrap();
        let writers: Vec<_> = (0..2)
            .map(|i| {
                let store = Arc::new(FileBackingStore::open(dir.path()).unwrap());
                thread::spawn(move || {
                    for n in 0..200 {
                        let value = format!("writer{}-{}", i, n);
                        store.put("k".to_string(), Blob::from(value.as_str())).unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let store = FileBackingStore::open(dir.path()).unwrap();
        let value = String::from_utf8(store.get(&"k".to_string()).unwrap().unwrap().read().unwrap()).unwrap();
        assert!(value.ends_with("-199"));
        assert_eq!(file_names(dir.path()), vec!["6b.cred"]);
    }

    #[test]
    fn test_lazy_blob_sees_deleted_file() {
        let dir = tempdir().unwrap();
        let store = FileBackingStore::open(dir.path()).unwrap();
        let key = "gone".to_string();
        store.put(key.clone(), Blob::from("v")).unwrap();

        let blob = store.get(&key).unwrap().unwrap();
        fs::remove_file(store.path_for_key(&key).unwrap()).unwrap();
        assert!(blob.read().is_err());
    }

    #[test]
    fn test_empty_key_rejected() {
        let dir = tempdir().unwrap();
        let store = FileBackingStore::open(dir.path()).unwrap();
        let err = store.put(String::new(), Blob::from("v")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));
    }

    #[test]
    fn test_clear() {
        let dir = tempdir().unwrap();
        let store = FileBackingStore::open(dir.path()).unwrap();
        store.put("a".to_string(), Blob::from("1")).unwrap();
        store.put("b".repeat(MAX_INLINE_KEY_LEN + 1), Blob::from("2")).unwrap();
        store.clear().unwrap();
        assert!(store.is_empty().unwrap());
        assert!(file_names(dir.path()).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_entry_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let store = FileBackingStore::open(dir.path()).unwrap();
        store.put("secret".to_string(), Blob::from("v")).unwrap();
        let path = store.path_for_key("secret").unwrap();
        let mode = fs::metadata(path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
