//! Composition root for credential stores
//!
//! Wires a backing store, the credential codec and a logger into a
//! `CredentialStore`, either explicitly or from `StoreConfig`.

mod builder;

pub use builder::{CredentialStore, CredentialStoreBuilder};
