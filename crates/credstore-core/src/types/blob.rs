//! Raw byte values held by backing stores

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Something that can produce a byte sequence on demand
///
/// Reads are synchronous and may fail (for example when the source is a
/// file that was removed after it was listed).
pub trait ByteSource: Send + Sync + fmt::Debug {
    /// Read the full contents of the source
    fn read(&self) -> io::Result<Vec<u8>>;
}

#[derive(Debug)]
struct FileSource(PathBuf);

impl ByteSource for FileSource {
    fn read(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.0)
    }
}

/// Source whose read failed when the blob was captured
#[derive(Debug)]
struct FailedSource {
    kind: io::ErrorKind,
    message: String,
}

impl ByteSource for FailedSource {
    fn read(&self) -> io::Result<Vec<u8>> {
        Err(io::Error::new(self.kind, self.message.clone()))
    }
}

/// Immutable handle to an encoded value
///
/// Cloning is cheap; the underlying bytes (or file reference) are shared.
#[derive(Clone)]
pub struct Blob {
    repr: Repr,
}

#[derive(Clone)]
enum Repr {
    Inline(Arc<[u8]>),
    Source(Arc<dyn ByteSource>),
}

impl Blob {
    /// Wrap bytes held in memory
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        Self {
            repr: Repr::Inline(Arc::from(bytes)),
        }
    }

    /// Reference a file; the contents are read lazily on each `read`
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        Self::from_source(Arc::new(FileSource(path.as_ref().to_path_buf())))
    }

    /// Wrap a custom byte source
    pub fn from_source(source: Arc<dyn ByteSource>) -> Self {
        Self {
            repr: Repr::Source(source),
        }
    }

    /// A blob whose every read reports `err`
    ///
    /// Used when a previous value existed but could not be read before it
    /// was replaced.
    pub fn unreadable(err: io::Error) -> Self {
        Self::from_source(Arc::new(FailedSource {
            kind: err.kind(),
            message: err.to_string(),
        }))
    }

    /// Read the bytes of this blob
    pub fn read(&self) -> io::Result<Vec<u8>> {
        match &self.repr {
            Repr::Inline(bytes) => Ok(bytes.to_vec()),
            Repr::Source(source) => source.read(),
        }
    }

    /// Borrow the bytes if they are held in memory
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.repr {
            Repr::Inline(bytes) => Some(&bytes[..]),
            Repr::Source(_) => None,
        }
    }
}

impl From<Vec<u8>> for Blob {
    fn from(value: Vec<u8>) -> Self {
        Blob::from_bytes(value)
    }
}

impl From<&[u8]> for Blob {
    fn from(value: &[u8]) -> Self {
        Blob::from_bytes(value.to_vec())
    }
}

impl From<&str> for Blob {
    fn from(value: &str) -> Self {
        Blob::from_bytes(value.as_bytes().to_vec())
    }
}

// Contents are never printed, they hold serialized secrets.
impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Inline(bytes) => f.debug_struct("Blob").field("len", &bytes.len()).finish(),
            Repr::Source(source) => f.debug_struct("Blob").field("source", source).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_blob() {
        let blob = Blob::from("hello");
        assert_eq!(blob.read().unwrap(), b"hello");
        assert_eq!(blob.as_bytes(), Some(&b"hello"[..]));

        let cloned = blob.clone();
        assert_eq!(cloned.read().unwrap(), b"hello");
    }

    #[test]
    fn test_file_blob_reads_lazily() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("value");
        let blob = Blob::from_file(&path);

        // Missing file surfaces as an io error on read, not on construction
        assert!(blob.read().is_err());
        assert!(blob.as_bytes().is_none());

        fs::write(&path, b"{}").unwrap();
        assert_eq!(blob.read().unwrap(), b"{}");
    }

    #[test]
    fn test_unreadable_blob() {
        let blob = Blob::unreadable(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        let err = blob.read().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert_eq!(blob.clone().read().unwrap_err().to_string(), "denied");
    }

    #[test]
    fn test_debug_hides_contents() {
        let blob = Blob::from("{\"password\":\"secret\"}");
        let out = format!("{:?}", blob);
        assert!(!out.contains("secret"));
        assert!(out.contains("len"));
    }
}
