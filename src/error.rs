//! Error types for file-backed collections.

use crate::metadata::Descriptor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by the store, its collections, and the in-memory index.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A collection already carries a descriptor for a different shape.
    #[error("Collection '{collection}' already exists with {existing} so cannot be re-created with {requested}")]
    ShapeConflict {
        collection: String,
        existing: Descriptor,
        requested: Descriptor,
    },

    #[error("Record key property '{property}' is missing or empty")]
    MissingKeyField { property: String },

    #[error("Invalid record key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("Invalid collection name '{name}': {reason}")]
    InvalidCollectionName { name: String, reason: String },

    /// One record file could not be read back. Only ever logged during load.
    #[error("Failed to load record from {}: {reason}", path.display())]
    RecordLoadFailure { path: PathBuf, reason: String },

    #[error("Storage I/O failure at {}: {source}", path.display())]
    StorageIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize record: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Collection descriptor {} is unreadable: {source}", path.display())]
    CorruptDescriptor {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The in-memory index accepted a mutation that the durable store did not.
    #[error("Collection '{collection}' diverged from disk for key '{key}': {source}")]
    PartialConsistency {
        collection: String,
        key: String,
        #[source]
        source: Box<StoreError>,
    },

    #[error("Collection '{collection}' failed to load: {source}")]
    LoadFailed {
        collection: String,
        #[source]
        source: Arc<StoreError>,
    },

    #[error("Collection '{collection}' does not exist")]
    CollectionMissing { collection: String },

    #[error("Invalid search query: {0}")]
    InvalidQuery(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StoreError {
    /// Wrap an I/O error with the path it happened at.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        StoreError::StorageIo {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn is_shape_conflict(&self) -> bool {
        matches!(self, StoreError::ShapeConflict { .. })
    }
}

impl From<config::ConfigError> for StoreError {
    fn from(err: config::ConfigError) -> Self {
        StoreError::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
