//! In-memory record indexes.

pub mod contract;
pub mod distance;
pub mod embedding;
pub mod memory;

pub use contract::{RecordIndex, RecordPredicate, ScanOptions, ScoredRecord, SearchOptions};
pub use distance::DistanceMetric;
pub use embedding::EmbeddingGenerator;
pub use memory::InMemoryIndex;
