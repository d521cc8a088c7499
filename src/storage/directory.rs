//! Directory-backed record store for one collection.

use super::layout::CollectionLayout;
use crate::codec;
use crate::error::StoreError;
use crate::metadata::MetadataGuard;
use crate::schema::RecordSchema;
use futures::stream::{self, Stream};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tokio::fs::ReadDir;
use tracing::{debug, warn};

/// One collection's record files plus its descriptor.
pub struct DurableStore<S: RecordSchema> {
    layout: CollectionLayout,
    guard: MetadataGuard,
    schema: S,
}

impl<S: RecordSchema> DurableStore<S> {
    pub fn new(root: &Path, name: &str, schema: S) -> Result<Self, StoreError> {
        let layout = CollectionLayout::new(root, name)?;
        let guard = MetadataGuard::new(layout.descriptor_path());
        Ok(Self {
            layout,
            guard,
            schema,
        })
    }

    pub fn name(&self) -> &str {
        self.layout.name()
    }

    pub fn dir(&self) -> &Path {
        self.layout.dir()
    }

    pub fn descriptor_path(&self) -> &Path {
        self.guard.path()
    }

    pub fn schema(&self) -> &S {
        &self.schema
    }

    /// Create the collection directory if absent.
    pub fn ensure_exists(&self) -> Result<(), StoreError> {
        std::fs::create_dir_all(self.dir()).map_err(|e| StoreError::io(self.dir(), e))
    }

    /// Validate or write the descriptor for this store's schema.
    ///
    /// The directory must exist first so the descriptor has a parent.
    pub fn open_descriptor(&self) -> Result<(), StoreError> {
        self.guard.open(self.name(), &self.schema.descriptor())
    }

    /// Rewrite the descriptor if it has gone missing.
    pub fn restore_descriptor(&self) -> Result<(), StoreError> {
        if !self.guard.exists() {
            self.guard.write(&self.schema.descriptor())?;
        }
        Ok(())
    }

    pub fn exists(&self) -> bool {
        self.dir().is_dir()
    }

    /// Remove the directory with every record file, then the descriptor.
    pub async fn destroy(&self) -> Result<(), StoreError> {
        match tokio::fs::remove_dir_all(self.dir()).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(StoreError::io(self.dir(), e)),
        }
        self.guard.remove()?;
        debug!(collection = self.name(), "Destroyed collection directory");
        Ok(())
    }

    /// Path of the file holding `key`.
    pub fn record_path(&self, key: &S::Key) -> Result<PathBuf, StoreError> {
        let file_name = codec::file_name(key, self.schema.key_property())?;
        Ok(self.dir().join(file_name))
    }

    /// Serialize and write one record, replacing any previous file for its key.
    pub async fn write(&self, key: &S::Key, record: &S::Record) -> Result<PathBuf, StoreError> {
        let path = self.record_path(key)?;
        let payload = codec::encode(record)?;
        self.write_encoded(&path, payload).await?;
        Ok(path)
    }

    /// Write an already-encoded payload to `path`.
    pub async fn write_encoded(&self, path: &Path, payload: String) -> Result<(), StoreError> {
        tokio::fs::write(path, payload)
            .await
            .map_err(|e| StoreError::io(path, e))
    }

    /// Remove the file for `key`. Returns whether a file was removed.
    pub async fn delete(&self, key: &S::Key) -> Result<bool, StoreError> {
        let path = self.record_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(&path, e)),
        }
    }

    /// Lazily read every record file in the collection directory.
    ///
    /// Files that cannot be read or parsed are logged and skipped; only a
    /// failure to list the directory itself ends the stream with an error.
    pub fn enumerate(&self) -> impl Stream<Item = Result<(S::Key, S::Record), StoreError>> + '_ {
        stream::try_unfold(None::<ReadDir>, move |entries| async move {
            let mut entries = match entries {
                Some(entries) => entries,
                None => match tokio::fs::read_dir(self.dir()).await {
                    Ok(entries) => entries,
                    Err(e) => return Err(StoreError::io(self.dir(), e)),
                },
            };

            loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => return Ok(None),
                    Err(e) => return Err(StoreError::io(self.dir(), e)),
                };
                let path = entry.path();
                if !codec::is_record_file(&path) {
                    continue;
                }
                match self.load(&path).await {
                    Ok(item) => return Ok(Some((item, Some(entries)))),
                    Err(err) => {
                        warn!(
                            collection = self.name(),
                            path = %path.display(),
                            error = %err,
                            "Skipping unreadable record file"
                        );
                    }
                }
            }
        })
    }

    /// Number of record files currently on disk.
    pub async fn count_files(&self) -> Result<usize, StoreError> {
        count_record_files(self.dir()).await
    }

    async fn load(&self, path: &Path) -> Result<(S::Key, S::Record), StoreError> {
        let failure = |reason: String| StoreError::RecordLoadFailure {
            path: path.to_path_buf(),
            reason,
        };
        if !tokio::fs::metadata(path)
            .await
            .map_err(|e| failure(e.to_string()))?
            .is_file()
        {
            return Err(failure("not a regular file".to_string()));
        }
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| failure(e.to_string()))?;
        let record: S::Record = codec::decode(&text).map_err(|e| failure(e.to_string()))?;
        let key = self
            .schema
            .key_of(&record)
            .map_err(|e| failure(e.to_string()))?;
        let expected = codec::file_name(&key, self.schema.key_property())
            .map_err(|e| failure(e.to_string()))?;
        if path.file_name() != Some(OsStr::new(&expected)) {
            return Err(failure(format!(
                "record key '{}' belongs in {}",
                key, expected
            )));
        }
        Ok((key, record))
    }
}

/// Count record files in `dir` without parsing them. A missing directory has none.
pub async fn count_record_files(dir: &Path) -> Result<usize, StoreError> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(StoreError::io(dir, e)),
    };
    let mut count = 0;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| StoreError::io(dir, e))?
    {
        if codec::is_record_file(&entry.path()) {
            count += 1;
        }
    }
    Ok(count)
}
