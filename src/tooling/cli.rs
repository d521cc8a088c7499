//! CLI Tooling
//!
//! Command-line interface for inspecting and deleting collections under a
//! store root.

use crate::config::FileMemConfig;
use crate::error::StoreError;
use crate::logging::LoggingConfig;
use crate::store::{CollectionSummary, FileStore};
use crate::tooling::format::{format_collection_info_text, format_collection_list_text};
use clap::{Parser, Subcommand};
use futures::TryStreamExt;
use std::path::PathBuf;
use tracing::info;

/// filemem CLI - file-backed record collections
#[derive(Parser)]
#[command(name = "filemem")]
#[command(about = "Inspect and manage file-backed record collections")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Store root directory (overrides storage.root from config)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Apply `--log-*` flags on top of the configured logging section.
    pub fn logging_config(&self, base: &LoggingConfig) -> LoggingConfig {
        let mut config = base.clone();
        if let Some(level) = &self.log_level {
            config.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.file = Some(file.clone());
        }
        config
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List collections with their shape and record count
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show one collection
    Info {
        /// Collection name
        name: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Delete a collection directory and its descriptor
    Delete {
        /// Collection name
        name: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

/// Store and runtime shared by every command.
pub struct CliContext {
    store: FileStore,
    runtime: tokio::runtime::Runtime,
}

impl CliContext {
    pub fn from_config(config: &FileMemConfig) -> Result<Self, StoreError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| StoreError::Runtime(format!("Failed to start runtime: {}", e)))?;
        Ok(Self {
            store: FileStore::from_config(config)?,
            runtime,
        })
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// Run `command` and return its rendered output.
    pub fn execute(&self, command: &Commands) -> Result<String, StoreError> {
        match command {
            Commands::List { format } => self.handle_list(format),
            Commands::Info { name, format } => self.handle_info(name, format),
            Commands::Delete { name, yes } => self.handle_delete(name, *yes),
        }
    }

    fn handle_list(&self, format: &str) -> Result<String, StoreError> {
        let summaries = self.runtime.block_on(async {
            let mut names: Vec<String> = self.store.list_collection_names().try_collect().await?;
            names.sort();
            let mut summaries = Vec::with_capacity(names.len());
            for name in names {
                // Directories whose names are not valid collection names are not ours.
                match self.store.describe_collection(&name).await {
                    Ok(Some(summary)) => summaries.push(summary),
                    Ok(None) | Err(StoreError::InvalidCollectionName { .. }) => {}
                    Err(e) => return Err(e),
                }
            }
            Ok::<_, StoreError>(summaries)
        })?;

        match format {
            "json" => Ok(serde_json::to_string_pretty(&summaries)?),
            "text" => Ok(format_collection_list_text(self.store.root(), &summaries)),
            other => Err(invalid_format(other)),
        }
    }

    fn handle_info(&self, name: &str, format: &str) -> Result<String, StoreError> {
        let summary: CollectionSummary = self
            .runtime
            .block_on(self.store.describe_collection(name))?
            .ok_or_else(|| StoreError::CollectionMissing {
                collection: name.to_string(),
            })?;

        match format {
            "json" => Ok(serde_json::to_string_pretty(&summary)?),
            "text" => Ok(format_collection_info_text(
                &self.store.root().join(name),
                &summary,
            )),
            other => Err(invalid_format(other)),
        }
    }

    fn handle_delete(&self, name: &str, yes: bool) -> Result<String, StoreError> {
        if !self.store.collection_exists(name)? {
            return Ok(format!("Collection '{}' does not exist", name));
        }
        if !yes {
            use dialoguer::Confirm;
            let confirmed = Confirm::new()
                .with_prompt(format!(
                    "Delete collection '{}' and all of its records?",
                    name
                ))
                .interact()
                .map_err(|e| StoreError::ConfigError(format!("Failed to get user input: {}", e)))?;

            if !confirmed {
                return Ok("Deletion cancelled".to_string());
            }
        }

        self.runtime.block_on(self.store.delete_collection(name))?;
        info!(collection = name, "Collection deleted from CLI");
        Ok(format!("Deleted collection '{}'", name))
    }
}

fn invalid_format(format: &str) -> StoreError {
    StoreError::ConfigError(format!(
        "Invalid output format: {} (must be 'text' or 'json')",
        format
    ))
}
