//! Statically-typed records.

use super::RecordSchema;
use crate::error::StoreError;
use crate::metadata::Descriptor;
use crate::types::RecordKey;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

/// A record type stored in a typed collection.
///
/// # Example
///
/// ```
/// use filemem::Record;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Serialize, Deserialize)]
/// struct Hotel {
///     id: u64,
///     name: String,
///     embedding: Option<Vec<f32>>,
/// }
///
/// impl Record for Hotel {
///     type Key = u64;
///     const TYPE_NAME: &'static str = "Hotel";
///
///     fn key(&self) -> u64 {
///         self.id
///     }
///
///     fn vector(&self, _property: Option<&str>) -> Option<&[f32]> {
///         self.embedding.as_deref()
///     }
///
///     fn clear_vectors(&mut self) {
///         self.embedding = None;
///     }
/// }
/// ```
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Key: RecordKey;

    /// Record type name written into the collection descriptor.
    const TYPE_NAME: &'static str;

    const KEY_PROPERTY: &'static str = "id";

    fn key(&self) -> Self::Key;

    fn vector(&self, property: Option<&str>) -> Option<&[f32]> {
        let _ = property;
        None
    }

    fn clear_vectors(&mut self) {}
}

/// Schema for a typed collection of `R`.
pub struct TypedSchema<R> {
    _record: PhantomData<fn() -> R>,
}

impl<R> TypedSchema<R> {
    pub fn new() -> Self {
        Self {
            _record: PhantomData,
        }
    }
}

impl<R> Default for TypedSchema<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for TypedSchema<R> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for TypedSchema<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedSchema")
            .field("record", &std::any::type_name::<R>())
            .finish()
    }
}

impl<R: Record> RecordSchema for TypedSchema<R> {
    type Key = R::Key;
    type Record = R;

    fn descriptor(&self) -> Descriptor {
        Descriptor::typed(<R::Key as RecordKey>::TYPE_NAME, R::TYPE_NAME)
    }

    fn key_property(&self) -> &str {
        R::KEY_PROPERTY
    }

    fn key_of(&self, record: &R) -> Result<R::Key, StoreError> {
        Ok(record.key())
    }

    fn vector_of<'r>(&self, record: &'r R, property: Option<&str>) -> Option<Cow<'r, [f32]>> {
        record.vector(property).map(Cow::Borrowed)
    }

    fn strip_vectors(&self, record: &mut R) {
        record.clear_vectors();
    }
}
