//! Core traits and types for value codecs

use thiserror::Error;

use crate::logging::Logger;
use crate::types::Blob;

/// Errors that can occur while encoding or decoding a value
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Codec error: {0}")]
    Other(String),
}

impl CodecError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

pub type CodecResult<T> = Result<T, CodecError>;

/// A pair of inverse functions between a raw representation `R` and a value `V`
///
/// `decode` reports failures as `CodecError`. Callers that want the
/// fail-soft behaviour (no value plus a logged warning) use
/// [`Codec::decode_or_warn`].
pub trait Codec<R, V>: Send + Sync {
    /// Convert a value into its raw representation
    fn encode(&self, value: &V) -> CodecResult<R>;

    /// Convert a raw representation back into a value
    fn decode(&self, raw: &R) -> CodecResult<V>;

    /// Decode, turning any failure into `None` and exactly one warning on `logger`
    fn decode_or_warn(&self, raw: &R, logger: &dyn Logger) -> Option<V> {
        match self.decode(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                logger.warn_error(&e, "ignoring problem decoding stored value");
                None
            }
        }
    }
}

/// A codec whose raw side is a [`Blob`]
pub trait ByteCodec<V>: Codec<Blob, V> {}

impl<V, T: Codec<Blob, V> + ?Sized> ByteCodec<V> for T {}
