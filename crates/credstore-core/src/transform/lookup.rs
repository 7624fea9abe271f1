//! Outcome of reading one entry through a codec

use crate::codec::CodecError;

/// Result of looking up a key in a transforming store
///
/// Separates "no entry" from "entry present but undecodable", which
/// [`TransformingStore::get`](super::TransformingStore::get) folds together.
#[derive(Debug)]
pub enum Lookup<V> {
    /// The backing store holds no entry for the key
    Absent,
    /// The entry decoded successfully
    Present(V),
    /// The entry exists but could not be decoded
    Unreadable(CodecError),
}

impl<V> Lookup<V> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Lookup::Absent)
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Lookup::Present(_))
    }

    pub fn is_unreadable(&self) -> bool {
        matches!(self, Lookup::Unreadable(_))
    }

    /// Whether the backing store holds an entry, decodable or not
    pub fn exists(&self) -> bool {
        !self.is_absent()
    }

    pub fn value(&self) -> Option<&V> {
        match self {
            Lookup::Present(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_option(self) -> Option<V> {
        match self {
            Lookup::Present(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(V) -> U>(self, f: F) -> Lookup<U> {
        match self {
            Lookup::Absent => Lookup::Absent,
            Lookup::Present(value) => Lookup::Present(f(value)),
            Lookup::Unreadable(err) => Lookup::Unreadable(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_states() {
        let absent: Lookup<u32> = Lookup::Absent;
        assert!(absent.is_absent());
        assert!(!absent.exists());
        assert_eq!(absent.into_option(), None);

        let present = Lookup::Present(7u32);
        assert!(present.is_present());
        assert!(present.exists());
        assert_eq!(present.value(), Some(&7));
        assert_eq!(present.map(|v| v * 2).into_option(), Some(14));

        let unreadable: Lookup<u32> = Lookup::Unreadable(CodecError::Other("bad".to_string()));
        assert!(unreadable.is_unreadable());
        assert!(unreadable.exists());
        assert!(unreadable.value().is_none());
        assert!(unreadable.map(|v| v + 1).is_unreadable());
    }
}
