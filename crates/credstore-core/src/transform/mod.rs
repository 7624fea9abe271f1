//! Transforming store
//!
//! `TransformingStore` composes a raw `BackingStore` with a `Codec` and
//! exposes a map-like interface over decoded values.

mod lookup;
mod store;

pub use lookup::Lookup;
pub use store::{TransformingStore, Entries};
