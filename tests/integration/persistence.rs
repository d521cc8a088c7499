use crate::support::{hotel, store, Hotel};
use filemem::{GetOptions, ScanOptions};
use futures::StreamExt;
use serde_json::json;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_records_survive_reopen() {
    let temp = TempDir::new().unwrap();
    let cancel = CancellationToken::new();
    let original = hotel(42, "Harbour View", "Bergen", Some(vec![0.25, -1.5, 3.0]));

    {
        let hotels = store(&temp).collection::<Hotel>("hotels").unwrap();
        assert_eq!(hotels.upsert(original.clone(), &cancel).await.unwrap(), 42);
    }

    let hotels = store(&temp).collection::<Hotel>("hotels").unwrap();
    let reloaded = hotels
        .get(&42, GetOptions::default(), &cancel)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded, original);
}

#[tokio::test]
async fn test_file_layout() {
    let temp = TempDir::new().unwrap();
    let store = store(&temp);
    let hotels = store.collection::<Hotel>("hotels").unwrap();
    hotels
        .upsert(hotel(7, "Pier", "Oslo", Some(vec![1.0])), &CancellationToken::new())
        .await
        .unwrap();

    let descriptor: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(store.root().join("hotels.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(descriptor, json!({"KeyType": "u64", "RecordType": "Hotel"}));

    let record: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(store.root().join("hotels").join("7.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(
        record,
        json!({"id": 7, "name": "Pier", "city": "Oslo", "embedding": [1.0]})
    );
}

#[tokio::test]
async fn test_upsert_replaces_existing_record() {
    let temp = TempDir::new().unwrap();
    let cancel = CancellationToken::new();
    let hotels = store(&temp).collection::<Hotel>("hotels").unwrap();

    hotels
        .upsert(hotel(1, "Old Name", "Rome", None), &cancel)
        .await
        .unwrap();
    hotels
        .upsert(hotel(1, "New Name", "Rome", None), &cancel)
        .await
        .unwrap();

    let all: Vec<Hotel> = hotels
        .scan(|_: &Hotel| true, 10, ScanOptions::default(), &cancel)
        .await
        .unwrap()
        .collect()
        .await;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "New Name");
    assert_eq!(std::fs::read_dir(hotels.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn test_get_returns_vectors_even_when_excluded() {
    let temp = TempDir::new().unwrap();
    let cancel = CancellationToken::new();
    let hotels = store(&temp).collection::<Hotel>("hotels").unwrap();
    hotels
        .upsert(hotel(3, "Loft", "Lima", Some(vec![0.5, 0.5])), &cancel)
        .await
        .unwrap();

    let got = hotels
        .get(
            &3,
            GetOptions {
                include_vectors: false,
            },
            &cancel,
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(got.embedding, Some(vec![0.5, 0.5]));
}

#[tokio::test]
async fn test_search_over_typed_records() {
    let temp = TempDir::new().unwrap();
    let cancel = CancellationToken::new();
    let hotels = store(&temp).collection::<Hotel>("hotels").unwrap();
    hotels
        .upsert_batch(
            vec![
                hotel(1, "North", "Oslo", Some(vec![0.0, 1.0])),
                hotel(2, "East", "Oslo", Some(vec![1.0, 0.0])),
                hotel(3, "Nowhere", "Oslo", None),
            ],
            &cancel,
        )
        .await
        .unwrap();

    let hits: Vec<_> = hotels
        .search(&[0.9, 0.1], 5, Default::default(), &cancel)
        .await
        .unwrap()
        .collect()
        .await;
    let ids: Vec<u64> = hits.iter().map(|h| h.record.id).collect();
    assert_eq!(ids, vec![2, 1]);
    assert!(hits.iter().all(|h| h.record.embedding.is_none()));
}
