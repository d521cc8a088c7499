//! Record Codec
//!
//! Maps a record key to its file name and a record payload to file text.
//! One record per file, pretty-printed JSON, named `<key>.json`.

use crate::error::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::ffi::OsStr;
use std::fmt::Display;
use std::path::Path;

/// Extension shared by record files and collection descriptors.
pub const RECORD_EXTENSION: &str = "json";

/// Render a key as a file stem.
///
/// The stem is the key's display form with no escaping. Keys that would
/// escape the collection directory are rejected.
pub fn file_stem(key: &impl Display, key_property: &str) -> Result<String, StoreError> {
    let stem = key.to_string();
    if stem.is_empty() {
        return Err(StoreError::MissingKeyField {
            property: key_property.to_string(),
        });
    }
    if stem == "." || stem == ".." {
        return Err(StoreError::InvalidKey {
            key: stem,
            reason: "relative path components are not valid keys".to_string(),
        });
    }
    if stem.contains(|c| matches!(c, '/' | '\\' | '\0')) {
        return Err(StoreError::InvalidKey {
            key: stem,
            reason: "keys must not contain path separators".to_string(),
        });
    }
    Ok(stem)
}

pub fn file_name(key: &impl Display, key_property: &str) -> Result<String, StoreError> {
    Ok(format!("{}.{}", file_stem(key, key_property)?, RECORD_EXTENSION))
}

pub fn encode<R: Serialize>(record: &R) -> Result<String, StoreError> {
    Ok(serde_json::to_string_pretty(record)?)
}

pub fn decode<R: DeserializeOwned>(text: &str) -> Result<R, serde_json::Error> {
    serde_json::from_str(text)
}

/// Whether a directory entry looks like a record file.
pub fn is_record_file(path: &Path) -> bool {
    path.extension() == Some(OsStr::new(RECORD_EXTENSION))
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| !n.starts_with('.'))
            .unwrap_or(false)
}
