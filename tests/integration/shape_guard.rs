use crate::support::{store, Hotel, Review};
use filemem::{DynamicSchema, StoreError};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_reopen_with_other_record_shape_fails() {
    let temp = TempDir::new().unwrap();
    let store = store(&temp);
    store
        .collection::<Hotel>("stays")
        .unwrap()
        .wait_ready(&CancellationToken::new())
        .await
        .unwrap();

    let err = store.collection::<Review>("stays").err().unwrap();
    match &err {
        StoreError::ShapeConflict {
            collection,
            existing,
            requested,
        } => {
            assert_eq!(collection, "stays");
            assert_eq!(existing.to_string(), "key type 'u64' and data type 'Hotel'");
            assert_eq!(requested.to_string(), "key type 'u64' and data type 'Review'");
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(err.to_string().contains("Hotel"));
    assert!(err.to_string().contains("Review"));

    // The original shape still opens.
    store.collection::<Hotel>("stays").unwrap();
}

#[tokio::test]
async fn test_typed_and_dynamic_shapes_conflict() {
    let temp = TempDir::new().unwrap();
    let store = store(&temp);
    store
        .dynamic_collection("notes", DynamicSchema::new("id"))
        .unwrap();

    let err = store.collection::<Hotel>("notes").err().unwrap();
    assert!(err.is_shape_conflict());

    let err = store
        .dynamic_collection("notes", DynamicSchema::new("slug"))
        .err()
        .unwrap();
    assert!(err.is_shape_conflict());
}

#[tokio::test]
async fn test_corrupt_descriptor_is_reported() {
    let temp = TempDir::new().unwrap();
    let store = store(&temp);
    std::fs::write(store.root().join("broken.json"), "not json").unwrap();

    let err = store.collection::<Hotel>("broken").err().unwrap();
    assert!(matches!(err, StoreError::CorruptDescriptor { .. }));
}
