//! Durable Record Store
//!
//! File-system side of a collection: a directory of record files and a
//! sibling descriptor.

pub mod directory;
pub mod layout;

pub use directory::{count_record_files, DurableStore};
pub use layout::{validate_collection_name, CollectionLayout};
