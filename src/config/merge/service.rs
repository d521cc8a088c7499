//! MergeService: stacks sources in precedence order and deserializes to FileMemConfig.

use crate::config::sources::{environment, file};
use crate::config::FileMemConfig;
use config::{Config, ConfigError};
use std::path::Path;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Precedence: defaults (lowest) -> `filemem.toml` in `dir` if present -> environment (highest).
    pub fn load(dir: &Path) -> Result<FileMemConfig, ConfigError> {
        let builder = Config::builder();
        let builder = file::add_to_builder(builder, &dir.join(file::DEFAULT_CONFIG_FILE), false);
        let builder = environment::add_to_builder(builder);
        builder.build()?.try_deserialize()
    }

    /// Load an explicit config file, which must exist, with the environment overlay.
    pub fn load_from_file(path: &Path) -> Result<FileMemConfig, ConfigError> {
        let builder = file::add_to_builder(Config::builder(), path, true);
        let builder = environment::add_to_builder(builder);
        builder.build()?.try_deserialize()
    }
}
