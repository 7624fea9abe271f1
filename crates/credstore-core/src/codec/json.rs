//! Generic serde JSON codec

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::traits::{Codec, CodecResult};
use crate::types::Blob;

/// Byte codec for any serde type, encoded as compact JSON
///
/// Useful for stores holding values other than credentials, for example
/// per-account metadata kept next to the credentials.
pub struct JsonCodec<T> {
    pretty: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonCodec<T> {
    pub fn new() -> Self {
        Self {
            pretty: false,
            _marker: PhantomData,
        }
    }

    /// Write indented JSON instead of compact JSON
    pub fn pretty() -> Self {
        Self {
            pretty: true,
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonCodec<T> {
    fn clone(&self) -> Self {
        Self {
            pretty: self.pretty,
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for JsonCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonCodec")
            .field("type", &std::any::type_name::<T>())
            .field("pretty", &self.pretty)
            .finish()
    }
}

impl<T> Codec<Blob, T> for JsonCodec<T>
where
    T: Serialize + DeserializeOwned,
{
    fn encode(&self, value: &T) -> CodecResult<Blob> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(value)?
        } else {
            serde_json::to_vec(value)?
        };
        Ok(Blob::from_bytes(bytes))
    }

    fn decode(&self, raw: &Blob) -> CodecResult<T> {
        let bytes = raw.read()?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecError;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct AccountMeta {
        region: String,
        rotations: u32,
    }

    #[test]
    fn test_json_codec_roundtrip() {
        let codec = JsonCodec::<AccountMeta>::new();
        let meta = AccountMeta {
            region: "eu-west-1".to_string(),
            rotations: 3,
        };
        let blob = codec.encode(&meta).unwrap();
        assert_eq!(
            blob.as_bytes(),
            Some(&br#"{"region":"eu-west-1","rotations":3}"#[..])
        );
        assert_eq!(codec.decode(&blob).unwrap(), meta);
    }

    #[test]
    fn test_json_codec_pretty() {
        let codec = JsonCodec::<AccountMeta>::pretty();
        let blob = codec
            .encode(&AccountMeta {
                region: "us".to_string(),
                rotations: 0,
            })
            .unwrap();
        let text = String::from_utf8(blob.read().unwrap()).unwrap();
        assert!(text.contains('\n'));
    }

    #[test]
    fn test_json_codec_structural_mismatch() {
        let codec = JsonCodec::<AccountMeta>::new();
        let err = codec.decode(&Blob::from(r#"{"region":1}"#)).unwrap_err();
        assert!(matches!(err, CodecError::Json(_)));
    }
}
