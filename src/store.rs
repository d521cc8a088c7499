//! Store façade.
//!
//! A store is a root directory holding any number of collections. It hands
//! out collection façades and answers questions about what is on disk.

use crate::collection::{Collection, FileCollection, FileDynamicCollection};
use crate::config::FileMemConfig;
use crate::error::StoreError;
use crate::index::{DistanceMetric, EmbeddingGenerator, InMemoryIndex, RecordIndex};
use crate::metadata::{Descriptor, MetadataGuard};
use crate::schema::{DynamicSchema, Record, RecordSchema, TypedSchema};
use crate::storage::{count_record_files, CollectionLayout};
use futures::stream::{self, BoxStream, StreamExt};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::ReadDir;
use tracing::info;

/// Options for opening a [`FileStore`].
#[derive(Clone)]
pub struct StoreOptions {
    pub root: PathBuf,
    /// Metric used by the indexes this store creates.
    pub metric: DistanceMetric,
    /// Default generator for value searches on every collection.
    pub embedding_generator: Option<Arc<dyn EmbeddingGenerator>>,
}

impl StoreOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            metric: DistanceMetric::default(),
            embedding_generator: None,
        }
    }

    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_embedding_generator(mut self, generator: Arc<dyn EmbeddingGenerator>) -> Self {
        self.embedding_generator = Some(generator);
        self
    }
}

impl fmt::Debug for StoreOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreOptions")
            .field("root", &self.root)
            .field("metric", &self.metric)
            .field("embedding_generator", &self.embedding_generator.is_some())
            .finish()
    }
}

/// What is on disk for one collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionSummary {
    pub name: String,
    pub descriptor: Option<Descriptor>,
    pub record_files: usize,
}

/// Root directory of file-backed collections.
#[derive(Clone)]
pub struct FileStore {
    root: PathBuf,
    metric: DistanceMetric,
    embedding_generator: Option<Arc<dyn EmbeddingGenerator>>,
}

impl fmt::Debug for FileStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileStore")
            .field("root", &self.root)
            .field("metric", &self.metric)
            .finish_non_exhaustive()
    }
}

impl FileStore {
    /// Open a store, creating the root directory if needed.
    pub fn open(options: StoreOptions) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&options.root).map_err(|e| StoreError::io(&options.root, e))?;
        Ok(Self {
            root: options.root,
            metric: options.metric,
            embedding_generator: options.embedding_generator,
        })
    }

    pub fn from_config(config: &FileMemConfig) -> Result<Self, StoreError> {
        Self::open(StoreOptions::new(config.storage.root.clone()).with_metric(config.index.metric))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Typed collection of `R`, indexed in memory.
    pub fn collection<R: Record>(&self, name: &str) -> Result<FileCollection<R>, StoreError> {
        self.collection_with_schema(name, TypedSchema::new())
    }

    /// Schema-less collection, indexed in memory.
    pub fn dynamic_collection(
        &self,
        name: &str,
        schema: DynamicSchema,
    ) -> Result<FileDynamicCollection, StoreError> {
        self.collection_with_schema(name, schema)
    }

    /// Collection kept in sync with a caller-supplied index.
    pub fn collection_with_index<S: RecordSchema>(
        &self,
        name: &str,
        schema: S,
        index: Arc<dyn RecordIndex<S>>,
    ) -> Result<Collection<S>, StoreError> {
        let collection = Collection::open(&self.root, name, schema, index)?;
        Ok(match &self.embedding_generator {
            Some(generator) => collection.with_embedding_generator(Arc::clone(generator)),
            None => collection,
        })
    }

    fn collection_with_schema<S: RecordSchema>(
        &self,
        name: &str,
        schema: S,
    ) -> Result<Collection<S>, StoreError> {
        let index = InMemoryIndex::new(name, schema.clone(), self.metric);
        self.collection_with_index(name, schema, Arc::new(index))
    }

    /// Whether a directory exists for `name`.
    pub fn collection_exists(&self, name: &str) -> Result<bool, StoreError> {
        Ok(CollectionLayout::new(&self.root, name)?.dir().is_dir())
    }

    /// Remove the collection directory and its descriptor. Missing is fine.
    pub async fn delete_collection(&self, name: &str) -> Result<(), StoreError> {
        let layout = CollectionLayout::new(&self.root, name)?;
        match tokio::fs::remove_dir_all(layout.dir()).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(StoreError::io(layout.dir(), e)),
        }
        MetadataGuard::new(layout.descriptor_path()).remove()?;
        info!(collection = name, "Deleted collection");
        Ok(())
    }

    /// Summary of a collection on disk, or `None` if it has no directory.
    pub async fn describe_collection(
        &self,
        name: &str,
    ) -> Result<Option<CollectionSummary>, StoreError> {
        let layout = CollectionLayout::new(&self.root, name)?;
        if !layout.dir().is_dir() {
            return Ok(None);
        }
        let descriptor = MetadataGuard::new(layout.descriptor_path()).read()?;
        let record_files = count_record_files(layout.dir()).await?;
        Ok(Some(CollectionSummary {
            name: name.to_string(),
            descriptor,
            record_files,
        }))
    }

    /// Names of the immediate subdirectories of the root, in directory order.
    pub fn list_collection_names(&self) -> BoxStream<'static, Result<String, StoreError>> {
        let root = self.root.clone();
        stream::try_unfold(None::<ReadDir>, move |entries| {
            let root = root.clone();
            async move {
                let mut entries = match entries {
                    Some(entries) => entries,
                    None => match tokio::fs::read_dir(&root).await {
                        Ok(entries) => entries,
                        Err(e) => return Err(StoreError::io(&root, e)),
                    },
                };
                loop {
                    let entry = match entries.next_entry().await {
                        Ok(Some(entry)) => entry,
                        Ok(None) => return Ok(None),
                        Err(e) => return Err(StoreError::io(&root, e)),
                    };
                    let is_dir = match entry.file_type().await {
                        Ok(file_type) => file_type.is_dir(),
                        Err(e) => return Err(StoreError::io(entry.path(), e)),
                    };
                    if is_dir {
                        let name = entry.file_name().to_string_lossy().into_owned();
                        return Ok(Some((name, Some(entries))));
                    }
                }
            }
        })
        .boxed()
    }
}
