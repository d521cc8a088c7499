//! Environment variable source: FILEMEM prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

/// Add the environment overlay, e.g. `FILEMEM__STORAGE__ROOT=/data`.
pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("FILEMEM")
            .separator("__")
            .try_parsing(true),
    )
}
