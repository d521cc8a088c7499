//! Schema-less records: JSON objects keyed by a named property.

use super::RecordSchema;
use crate::error::StoreError;
use crate::metadata::Descriptor;
use crate::types::DynamicKey;
use serde_json::{Map, Value};
use std::borrow::Cow;

/// A schema-less record.
pub type DynamicRecord = Map<String, Value>;

const DEFAULT_KEY_PROPERTY: &str = "id";

/// Key and vector layout of a schema-less collection.
///
/// Only the key property is persisted in the descriptor; vector properties
/// are a read-side concern and may change between opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicSchema {
    key_property: String,
    vector_properties: Vec<String>,
}

impl DynamicSchema {
    pub fn new(key_property: impl Into<String>) -> Self {
        Self {
            key_property: key_property.into(),
            vector_properties: Vec::new(),
        }
    }

    /// Declare a property holding an embedding. The first declared one is the default.
    pub fn with_vector_property(mut self, property: impl Into<String>) -> Self {
        self.vector_properties.push(property.into());
        self
    }

    pub fn vector_properties(&self) -> &[String] {
        &self.vector_properties
    }
}

impl Default for DynamicSchema {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PROPERTY)
    }
}

impl RecordSchema for DynamicSchema {
    type Key = DynamicKey;
    type Record = DynamicRecord;

    fn descriptor(&self) -> Descriptor {
        Descriptor::dynamic(self.key_property.clone())
    }

    fn key_property(&self) -> &str {
        &self.key_property
    }

    fn key_of(&self, record: &DynamicRecord) -> Result<DynamicKey, StoreError> {
        let value = match record.get(&self.key_property) {
            None | Some(Value::Null) => {
                return Err(StoreError::MissingKeyField {
                    property: self.key_property.clone(),
                })
            }
            Some(value) => value,
        };
        match DynamicKey::from_value(value) {
            Some(DynamicKey::Str(s)) if s.is_empty() => Err(StoreError::MissingKeyField {
                property: self.key_property.clone(),
            }),
            Some(key) => Ok(key),
            None => Err(StoreError::InvalidKey {
                key: value.to_string(),
                reason: format!(
                    "property '{}' must hold a string or an integer",
                    self.key_property
                ),
            }),
        }
    }

    fn vector_of<'r>(
        &self,
        record: &'r DynamicRecord,
        property: Option<&str>,
    ) -> Option<Cow<'r, [f32]>> {
        let property = property.or_else(|| self.vector_properties.first().map(String::as_str))?;
        let values = record.get(property)?.as_array()?;
        values
            .iter()
            .map(|v| v.as_f64().map(|f| f as f32))
            .collect::<Option<Vec<f32>>>()
            .map(Cow::Owned)
    }

    fn strip_vectors(&self, record: &mut DynamicRecord) {
        for property in &self.vector_properties {
            record.remove(property);
        }
    }
}
