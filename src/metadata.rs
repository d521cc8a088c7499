//! Collection Metadata Guard
//!
//! Each collection has one descriptor file recording the shape it was created
//! with. Reopening a collection under a different shape is refused.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Declared shape of a collection, as persisted in its descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Descriptor {
    /// Statically-typed collection.
    Typed {
        #[serde(rename = "KeyType")]
        key_type: String,
        #[serde(rename = "RecordType")]
        record_type: String,
    },
    /// Schema-less collection keyed by a named property.
    Dynamic {
        #[serde(rename = "KeyProperty")]
        key_property: String,
    },
}

impl Descriptor {
    pub fn typed(key_type: impl Into<String>, record_type: impl Into<String>) -> Self {
        Descriptor::Typed {
            key_type: key_type.into(),
            record_type: record_type.into(),
        }
    }

    pub fn dynamic(key_property: impl Into<String>) -> Self {
        Descriptor::Dynamic {
            key_property: key_property.into(),
        }
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Descriptor::Typed {
                key_type,
                record_type,
            } => write!(f, "key type '{}' and data type '{}'", key_type, record_type),
            Descriptor::Dynamic { key_property } => write!(f, "key property '{}'", key_property),
        }
    }
}

/// Reads, writes and validates one collection descriptor file.
#[derive(Debug, Clone)]
pub struct MetadataGuard {
    path: PathBuf,
}

impl MetadataGuard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read the descriptor, if one has been written.
    pub fn read(&self) -> Result<Option<Descriptor>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| StoreError::CorruptDescriptor {
                path: self.path.clone(),
                source,
            })
    }

    /// Write the descriptor. The parent directory must already exist.
    pub fn write(&self, descriptor: &Descriptor) -> Result<(), StoreError> {
        let content = serde_json::to_string(descriptor)?;
        std::fs::write(&self.path, content).map_err(|e| StoreError::io(&self.path, e))
    }

    /// Validate `declared` against the stored descriptor, writing it on first open.
    pub fn open(&self, collection: &str, declared: &Descriptor) -> Result<(), StoreError> {
        match self.read()? {
            None => {
                self.write(declared)?;
                info!(
                    collection,
                    path = %self.path.display(),
                    shape = %declared,
                    "Created collection descriptor"
                );
                Ok(())
            }
            Some(existing) if &existing == declared => {
                debug!(collection, shape = %declared, "Collection descriptor matches");
                Ok(())
            }
            Some(existing) => Err(StoreError::ShapeConflict {
                collection: collection.to_string(),
                existing,
                requested: declared.clone(),
            }),
        }
    }

    /// Remove the descriptor file. Missing files are not an error.
    pub fn remove(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(&self.path, e)),
        }
    }
}
