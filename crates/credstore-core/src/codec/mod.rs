//! Value codecs
//!
//! A codec is a pair of inverse functions between the representation a
//! backing store holds and the value callers work with:
//! - `Codec<R, V>` / `ByteCodec<V>` traits
//! - `CredentialCodec` for [`crate::types::Credential`]
//! - `JsonCodec<T>` for arbitrary serde types
//! - `FnCodec` built from two closures

mod traits;
mod credential;
mod json;
mod func;

pub use traits::{Codec, ByteCodec, CodecError, CodecResult};
pub use credential::{CredentialCodec, WireFormat};
pub use json::JsonCodec;
pub use func::FnCodec;
