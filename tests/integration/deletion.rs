use crate::support::{hotel, store, Hotel, Review};
use filemem::GetOptions;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_delete_missing_key_is_a_no_op() {
    let temp = TempDir::new().unwrap();
    let cancel = CancellationToken::new();
    let hotels = store(&temp).collection::<Hotel>("hotels").unwrap();
    hotels
        .upsert_batch(
            vec![hotel(1, "A", "Oslo", None), hotel(2, "B", "Oslo", None)],
            &cancel,
        )
        .await
        .unwrap();

    hotels.delete(&99, &cancel).await.unwrap();
    hotels.delete(&99, &cancel).await.unwrap();

    assert_eq!(hotels.len(&cancel).await.unwrap(), 2);
    assert_eq!(std::fs::read_dir(hotels.path()).unwrap().count(), 2);
}

#[tokio::test]
async fn test_delete_twice() {
    let temp = TempDir::new().unwrap();
    let cancel = CancellationToken::new();
    let hotels = store(&temp).collection::<Hotel>("hotels").unwrap();
    hotels
        .upsert(hotel(1, "A", "Oslo", None), &cancel)
        .await
        .unwrap();

    hotels.delete(&1, &cancel).await.unwrap();
    hotels.delete(&1, &cancel).await.unwrap();

    assert!(hotels
        .get(&1, GetOptions::default(), &cancel)
        .await
        .unwrap()
        .is_none());
    assert!(!hotels.path().join("1.json").exists());

    let reopened = store(&temp).collection::<Hotel>("hotels").unwrap();
    assert_eq!(reopened.len(&cancel).await.unwrap(), 0);
}

#[tokio::test]
async fn test_deleted_collection_reopens_with_new_shape() {
    let temp = TempDir::new().unwrap();
    let cancel = CancellationToken::new();
    let store = store(&temp);
    let hotels = store.collection::<Hotel>("x").unwrap();
    hotels
        .upsert(hotel(1, "A", "Oslo", None), &cancel)
        .await
        .unwrap();
    assert!(store.collection_exists("x").unwrap());

    store.delete_collection("x").await.unwrap();
    assert!(!store.collection_exists("x").unwrap());
    assert!(!store.root().join("x.json").exists());

    let reviews = store.collection::<Review>("x").unwrap();
    assert_eq!(reviews.wait_ready(&cancel).await.unwrap().loaded, 0);
    assert!(store.collection_exists("x").unwrap());
}

#[tokio::test]
async fn test_ensure_deleted_on_missing_collection() {
    let temp = TempDir::new().unwrap();
    let cancel = CancellationToken::new();
    let store = store(&temp);
    let hotels = store.collection::<Hotel>("gone").unwrap();

    hotels.ensure_deleted(&cancel).await.unwrap();
    hotels.ensure_deleted(&cancel).await.unwrap();
    assert!(!store.collection_exists("gone").unwrap());
    assert!(!hotels.exists(&cancel).await.unwrap());
}
