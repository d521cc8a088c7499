//! filemem: file-backed record collections
//!
//! Every collection is a directory holding one JSON file per record, plus a
//! descriptor file next to it recording the key and record shape the
//! collection was created with. Records are mirrored into an in-memory index
//! that serves lookups, predicate scans and brute-force vector search; the
//! files are the durable copy and are only read back when a collection opens.
//!
//! ```no_run
//! use filemem::{FileStore, GetOptions, Record, StoreOptions};
//! use serde::{Deserialize, Serialize};
//! use tokio_util::sync::CancellationToken;
//!
//! #[derive(Clone, Serialize, Deserialize)]
//! struct Hotel {
//!     id: u64,
//!     name: String,
//! }
//!
//! impl Record for Hotel {
//!     type Key = u64;
//!     const TYPE_NAME: &'static str = "Hotel";
//!
//!     fn key(&self) -> u64 {
//!         self.id
//!     }
//! }
//!
//! # async fn run() -> filemem::Result<()> {
//! let store = FileStore::open(StoreOptions::new("./vector_collections"))?;
//! let hotels = store.collection::<Hotel>("hotels")?;
//! let cancel = CancellationToken::new();
//!
//! hotels.upsert(Hotel { id: 1, name: "Fjord".into() }, &cancel).await?;
//! let hotel = hotels.get(&1, GetOptions::default(), &cancel).await?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod collection;
pub mod config;
pub mod error;
pub mod index;
pub mod logging;
pub mod metadata;
pub mod schema;
pub mod storage;
pub mod store;
pub mod tooling;
pub mod types;

pub use collection::{Collection, FileCollection, FileDynamicCollection, GetOptions, LoadStats};
pub use config::{FileMemConfig, IndexConfig, StorageConfig};
pub use error::{Result, StoreError};
pub use index::{
    DistanceMetric, EmbeddingGenerator, InMemoryIndex, RecordIndex, RecordPredicate, ScanOptions,
    ScoredRecord, SearchOptions,
};
pub use metadata::Descriptor;
pub use schema::{DynamicRecord, DynamicSchema, Record, RecordSchema, TypedSchema};
pub use store::{CollectionSummary, FileStore, StoreOptions};
pub use types::{DynamicKey, RecordKey};
