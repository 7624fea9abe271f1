//! Codec assembled from a pair of closures

use std::fmt;

use super::traits::{Codec, CodecResult};

type EncodeFn<R, V> = Box<dyn Fn(&V) -> CodecResult<R> + Send + Sync>;
type DecodeFn<R, V> = Box<dyn Fn(&R) -> CodecResult<V> + Send + Sync>;

/// A codec built from an encode function and its inverse
///
/// # Example
///
/// ```
/// use credstore_core::codec::{Codec, FnCodec};
///
/// let codec = FnCodec::new(
///     |v: &u32| Ok(v.to_string()),
///     |raw: &String| raw.parse::<u32>().map_err(|e| credstore_core::codec::CodecError::Other(e.to_string())),
/// );
/// assert_eq!(codec.encode(&7).unwrap(), "7");
/// assert_eq!(codec.decode(&"42".to_string()).unwrap(), 42);
/// ```
pub struct FnCodec<R, V> {
    encode: EncodeFn<R, V>,
    decode: DecodeFn<R, V>,
}

impl<R, V> FnCodec<R, V> {
    pub fn new<E, D>(encode: E, decode: D) -> Self
    where
        E: Fn(&V) -> CodecResult<R> + Send + Sync + 'static,
        D: Fn(&R) -> CodecResult<V> + Send + Sync + 'static,
    {
        Self {
            encode: Box::new(encode),
            decode: Box::new(decode),
        }
    }
}

impl<R, V> Codec<R, V> for FnCodec<R, V> {
    fn encode(&self, value: &V) -> CodecResult<R> {
        (self.encode)(value)
    }

    fn decode(&self, raw: &R) -> CodecResult<V> {
        (self.decode)(raw)
    }
}

impl<R, V> fmt::Debug for FnCodec<R, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCodec").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecError;
    use crate::logging::MemoryLogger;

    fn upper_codec() -> FnCodec<String, String> {
        FnCodec::new(
            |v: &String| Ok(v.to_uppercase()),
            |raw: &String| {
                if raw.chars().any(|c| c.is_lowercase()) {
                    Err(CodecError::Other("expected upper case".to_string()))
                } else {
                    Ok(raw.to_lowercase())
                }
            },
        )
    }

    #[test]
    fn test_fn_codec_delegates() {
        let codec = upper_codec();
        assert_eq!(codec.encode(&"abc".to_string()).unwrap(), "ABC");
        assert_eq!(codec.decode(&"ABC".to_string()).unwrap(), "abc");
    }

    #[test]
    fn test_fn_codec_failure_is_soft() {
        let codec = upper_codec();
        let logger = MemoryLogger::new();
        assert!(codec.decode_or_warn(&"abc".to_string(), &logger).is_none());
        assert_eq!(logger.warning_count(), 1);
    }
}
