//! On-disk layout of a store root.
//!
//! ```text
//! <root>/
//!   <collection>/          one directory per collection
//!     <key>.json           one file per record
//!   <collection>.json      descriptor, next to the directory
//! ```

use crate::codec::RECORD_EXTENSION;
use crate::error::StoreError;
use std::path::{Path, PathBuf};

/// Paths belonging to one collection under a store root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionLayout {
    name: String,
    dir: PathBuf,
    descriptor: PathBuf,
}

impl CollectionLayout {
    pub fn new(root: &Path, name: &str) -> Result<Self, StoreError> {
        validate_collection_name(name)?;
        Ok(Self {
            name: name.to_string(),
            dir: root.join(name),
            descriptor: root.join(format!("{}.{}", name, RECORD_EXTENSION)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn descriptor_path(&self) -> &Path {
        &self.descriptor
    }
}

/// Collection names become directory names, so they must stay one path segment.
///
/// A name ending in `.json` would land on another collection's descriptor.
pub fn validate_collection_name(name: &str) -> Result<(), StoreError> {
    let descriptor_suffix = format!(".{}", RECORD_EXTENSION);
    let reason = if name.is_empty() {
        Some("name cannot be empty")
    } else if name == "." || name == ".." {
        Some("name cannot be a relative path component")
    } else if name.contains(|c| matches!(c, '/' | '\\' | '\0')) {
        Some("name cannot contain path separators")
    } else if name.to_ascii_lowercase().ends_with(&descriptor_suffix) {
        Some("name cannot end with the descriptor extension")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(StoreError::InvalidCollectionName {
            name: name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}
