//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::FileMemConfig;
use crate::error::StoreError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from `path` if given, otherwise from `filemem.toml` in the working directory.
    pub fn load(path: Option<&Path>) -> Result<FileMemConfig, StoreError> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Ok(MergeService::load(Path::new("."))?),
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<FileMemConfig, StoreError> {
        Ok(MergeService::load_from_file(path)?)
    }

    /// Load from `filemem.toml` in `dir`, if it has one.
    pub fn load_from_dir(dir: &Path) -> Result<FileMemConfig, StoreError> {
        Ok(MergeService::load(dir)?)
    }
}
