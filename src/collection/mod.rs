//! Collection façade.
//!
//! A collection pairs a directory of record files with an in-memory index.
//! Opening one validates its descriptor, then loads every record file into
//! the index on a background task. Every operation waits for that load before
//! touching the index, and every mutation is applied to both sides before it
//! returns.

mod barrier;

pub use barrier::LoadStats;

use crate::codec;
use crate::error::StoreError;
use crate::index::{EmbeddingGenerator, RecordIndex, ScanOptions, ScoredRecord, SearchOptions};
use crate::schema::{DynamicSchema, RecordSchema, TypedSchema};
use crate::storage::DurableStore;
use barrier::LoadBarrier;
use futures::stream::{BoxStream, TryStreamExt};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Records handed to the index per batch while loading.
const LOAD_BATCH_SIZE: usize = 128;

/// Typed collection of `R`.
pub type FileCollection<R> = Collection<TypedSchema<R>>;

/// Schema-less collection of JSON objects.
pub type FileDynamicCollection = Collection<DynamicSchema>;

/// Options for [`Collection::get`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetOptions {
    /// Accepted for contract compatibility. Stored vectors are always
    /// returned: the file payload carries them and the index mirrors it.
    pub include_vectors: bool,
}

/// One named collection backed by a directory and an in-memory index.
#[derive(Clone)]
pub struct Collection<S: RecordSchema> {
    store: Arc<DurableStore<S>>,
    index: Arc<dyn RecordIndex<S>>,
    ready: LoadBarrier,
    embedder: Option<Arc<dyn EmbeddingGenerator>>,
}

impl<S: RecordSchema> Collection<S> {
    /// Open `root/name`, creating it if needed, and start loading it into `index`.
    ///
    /// Fails without spawning anything if the descriptor on disk declares a
    /// different shape, or if no Tokio runtime is running.
    pub fn open(
        root: &Path,
        name: &str,
        schema: S,
        index: Arc<dyn RecordIndex<S>>,
    ) -> Result<Self, StoreError> {
        let runtime = barrier::current_runtime(name)?;
        let store = Arc::new(DurableStore::new(root, name, schema)?);
        store.ensure_exists()?;
        store.open_descriptor()?;
        debug!(collection = name, path = %store.dir().display(), "Opened collection");

        let ready = LoadBarrier::spawn(
            &runtime,
            name,
            load_collection(Arc::clone(&store), Arc::clone(&index)),
        );
        Ok(Self {
            store,
            index,
            ready,
            embedder: None,
        })
    }

    /// Use `generator` to turn values passed to [`search_value`](Self::search_value)
    /// into query vectors.
    pub fn with_embedding_generator(mut self, generator: Arc<dyn EmbeddingGenerator>) -> Self {
        self.embedder = Some(generator);
        self
    }

    pub fn name(&self) -> &str {
        self.store.name()
    }

    /// Directory holding the record files.
    pub fn path(&self) -> &Path {
        self.store.dir()
    }

    pub fn schema(&self) -> &S {
        self.store.schema()
    }

    pub fn is_loaded(&self) -> bool {
        self.ready.is_ready()
    }

    /// Wait for the initial load and report what it found.
    pub async fn wait_ready(&self, cancel: &CancellationToken) -> Result<LoadStats, StoreError> {
        self.ready.wait(cancel).await
    }

    /// Make sure the directory, descriptor and index collection all exist.
    pub async fn ensure_exists(&self, cancel: &CancellationToken) -> Result<(), StoreError> {
        self.ready.wait(cancel).await?;
        self.store.ensure_exists()?;
        self.store.restore_descriptor()?;
        self.index.ensure_exists().await
    }

    /// Remove every record from disk and from the index, along with the
    /// directory and descriptor. Safe on a collection that is already gone.
    pub async fn ensure_deleted(&self, cancel: &CancellationToken) -> Result<(), StoreError> {
        self.ready.wait(cancel).await?;
        self.store.destroy().await?;
        self.index.destroy().await?;
        info!(collection = self.name(), "Deleted collection");
        Ok(())
    }

    /// Whether the collection directory exists. Disk is authoritative.
    pub async fn exists(&self, cancel: &CancellationToken) -> Result<bool, StoreError> {
        self.ready.wait(cancel).await?;
        Ok(self.store.exists())
    }

    /// Number of records in the index.
    pub async fn len(&self, cancel: &CancellationToken) -> Result<usize, StoreError> {
        self.ready.wait(cancel).await?;
        self.index.len().await
    }

    /// Insert or replace a record. Returns its key.
    pub async fn upsert(
        &self,
        record: S::Record,
        cancel: &CancellationToken,
    ) -> Result<S::Key, StoreError> {
        self.ready.wait(cancel).await?;

        let key = self.schema().key_of(&record)?;
        let path = self.store.record_path(&key)?;
        let payload = codec::encode(&record)?;

        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        self.index.upsert(record).await?;
        self.store
            .write_encoded(&path, payload)
            .await
            .map_err(|e| self.diverged(&key, e))?;

        debug!(collection = self.name(), key = %key, "Upserted record");
        Ok(key)
    }

    /// Upsert each record in order, stopping at the first failure.
    pub async fn upsert_batch(
        &self,
        records: impl IntoIterator<Item = S::Record>,
        cancel: &CancellationToken,
    ) -> Result<Vec<S::Key>, StoreError> {
        let mut keys = Vec::new();
        for record in records {
            keys.push(self.upsert(record, cancel).await?);
        }
        Ok(keys)
    }

    pub async fn get(
        &self,
        key: &S::Key,
        _options: GetOptions,
        cancel: &CancellationToken,
    ) -> Result<Option<S::Record>, StoreError> {
        self.ready.wait(cancel).await?;
        self.index.get(key, true).await
    }

    /// Records found for `keys`, in request order. Missing keys are left out.
    pub async fn get_batch(
        &self,
        keys: impl IntoIterator<Item = S::Key>,
        options: GetOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<S::Record>, StoreError> {
        let mut found = Vec::new();
        for key in keys {
            if let Some(record) = self.get(&key, options, cancel).await? {
                found.push(record);
            }
        }
        Ok(found)
    }

    /// Remove a record from the index and its file from disk. Absent keys are fine.
    pub async fn delete(&self, key: &S::Key, cancel: &CancellationToken) -> Result<(), StoreError> {
        self.ready.wait(cancel).await?;
        self.store.record_path(key)?;

        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        self.index.delete(key).await?;
        let removed = self
            .store
            .delete(key)
            .await
            .map_err(|e| self.diverged(key, e))?;

        debug!(collection = self.name(), key = %key, removed, "Deleted record");
        Ok(())
    }

    pub async fn delete_batch(
        &self,
        keys: impl IntoIterator<Item = S::Key>,
        cancel: &CancellationToken,
    ) -> Result<(), StoreError> {
        for key in keys {
            self.delete(&key, cancel).await?;
        }
        Ok(())
    }

    /// Records matching `predicate`, at most `max_results` of them.
    pub async fn scan(
        &self,
        predicate: impl Fn(&S::Record) -> bool + Send + Sync + 'static,
        max_results: usize,
        options: ScanOptions,
        cancel: &CancellationToken,
    ) -> Result<BoxStream<'static, S::Record>, StoreError> {
        self.ready.wait(cancel).await?;
        self.index
            .scan(Arc::new(predicate), max_results, options)
            .await
    }

    /// Records closest to `query`, best first.
    pub async fn search(
        &self,
        query: &[f32],
        max_results: usize,
        options: SearchOptions<S::Record>,
        cancel: &CancellationToken,
    ) -> Result<BoxStream<'static, ScoredRecord<S::Record>>, StoreError> {
        self.ready.wait(cancel).await?;
        self.index.search(query, max_results, options).await
    }

    /// Embed `value` with the collection's generator, then search with the result.
    pub async fn search_value(
        &self,
        value: &str,
        max_results: usize,
        options: SearchOptions<S::Record>,
        cancel: &CancellationToken,
    ) -> Result<BoxStream<'static, ScoredRecord<S::Record>>, StoreError> {
        let generator = self.embedder.as_ref().ok_or_else(|| {
            StoreError::InvalidQuery(format!(
                "collection '{}' has no embedding generator",
                self.name()
            ))
        })?;
        self.ready.wait(cancel).await?;
        let query = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(StoreError::Cancelled),
            query = generator.embed(value) => query?,
        };
        self.index.search(&query, max_results, options).await
    }

    fn diverged(&self, key: &S::Key, source: StoreError) -> StoreError {
        error!(
            collection = self.name(),
            key = %key,
            error = %source,
            "Index updated but record file was not"
        );
        StoreError::PartialConsistency {
            collection: self.name().to_string(),
            key: key.to_string(),
            source: Box::new(source),
        }
    }
}

/// Load every readable record file into the index.
async fn load_collection<S: RecordSchema>(
    store: Arc<DurableStore<S>>,
    index: Arc<dyn RecordIndex<S>>,
) -> Result<LoadStats, StoreError> {
    index.ensure_exists().await?;

    let mut loaded = 0;
    let mut batch = Vec::with_capacity(LOAD_BATCH_SIZE);
    let mut records = std::pin::pin!(store.enumerate());
    while let Some((_, record)) = records.try_next().await? {
        batch.push(record);
        if batch.len() == LOAD_BATCH_SIZE {
            loaded += index.upsert_batch(std::mem::take(&mut batch)).await?.len();
        }
    }
    if !batch.is_empty() {
        loaded += index.upsert_batch(batch).await?.len();
    }

    let skipped = store.count_files().await?.saturating_sub(loaded);
    info!(collection = store.name(), loaded, skipped, "Loaded collection");
    Ok(LoadStats { loaded, skipped })
}
