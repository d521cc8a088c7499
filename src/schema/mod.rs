//! Record schemas.
//!
//! A schema tells a collection how to pull a key and vectors out of its
//! records, and which descriptor the collection is stored under. Key access is
//! resolved at compile time for typed records and by property name for
//! schema-less ones.

pub mod dynamic;
pub mod typed;

use crate::error::StoreError;
use crate::metadata::Descriptor;
use crate::types::RecordKey;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::borrow::Cow;

pub use dynamic::{DynamicRecord, DynamicSchema};
pub use typed::{Record, TypedSchema};

/// Shape of the records held by one collection.
pub trait RecordSchema: Clone + Send + Sync + 'static {
    type Key: RecordKey;
    type Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Descriptor persisted next to the collection directory.
    fn descriptor(&self) -> Descriptor;

    /// Name of the key property, used in diagnostics.
    fn key_property(&self) -> &str;

    fn key_of(&self, record: &Self::Record) -> Result<Self::Key, StoreError>;

    /// Vector stored under `property`, or the record's default vector when `None`.
    fn vector_of<'r>(&self, record: &'r Self::Record, property: Option<&str>)
        -> Option<Cow<'r, [f32]>>;

    fn strip_vectors(&self, record: &mut Self::Record);
}
