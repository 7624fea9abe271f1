//! Core types
//!
//! Credential values and the opaque blobs they are serialized into.

mod credential;
mod blob;

pub use credential::{Credential, PlainCredential, LoginCredential, LoginCredentialBuilder};
pub use blob::{Blob, ByteSource};
