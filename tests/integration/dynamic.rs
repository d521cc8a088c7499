use crate::support::store;
use filemem::{
    DynamicKey, DynamicRecord, DynamicSchema, GetOptions, LoadStats, SearchOptions, StoreError,
};
use futures::StreamExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn record(value: Value) -> DynamicRecord {
    value.as_object().cloned().unwrap()
}

fn schema() -> DynamicSchema {
    DynamicSchema::new("slug").with_vector_property("embedding")
}

#[tokio::test]
async fn test_dynamic_round_trip() {
    let temp = TempDir::new().unwrap();
    let cancel = CancellationToken::new();
    let original = record(json!({
        "slug": "fjord-lodge",
        "rating": 4.5,
        "tags": ["quiet", "view"],
        "embedding": [0.1, 0.2]
    }));
    {
        let docs = store(&temp).dynamic_collection("docs", schema()).unwrap();
        let key = docs.upsert(original.clone(), &cancel).await.unwrap();
        assert_eq!(key, DynamicKey::from("fjord-lodge"));
    }

    let docs = store(&temp).dynamic_collection("docs", schema()).unwrap();
    let got = docs
        .get(&DynamicKey::from("fjord-lodge"), GetOptions::default(), &cancel)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(got, original);
    assert!(store(&temp).root().join("docs").join("fjord-lodge.json").is_file());
}

#[tokio::test]
async fn test_missing_key_property_is_rejected() {
    let temp = TempDir::new().unwrap();
    let cancel = CancellationToken::new();
    let docs = store(&temp).dynamic_collection("docs", schema()).unwrap();

    for bad in [json!({"title": "none"}), json!({"slug": ""}), json!({"slug": null})] {
        let err = docs.upsert(record(bad), &cancel).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingKeyField { .. }), "{}", err);
    }
    assert_eq!(docs.len(&cancel).await.unwrap(), 0);
}

#[tokio::test]
async fn test_dynamic_search_with_filter() {
    let temp = TempDir::new().unwrap();
    let cancel = CancellationToken::new();
    let docs = store(&temp).dynamic_collection("docs", schema()).unwrap();
    docs.upsert_batch(
        vec![
            record(json!({"slug": "a", "lang": "en", "embedding": [1.0, 0.0]})),
            record(json!({"slug": "b", "lang": "no", "embedding": [1.0, 0.1]})),
            record(json!({"slug": "c", "lang": "en", "embedding": [0.0, 1.0]})),
        ],
        &cancel,
    )
    .await
    .unwrap();

    let options = SearchOptions::default()
        .with_filter(|r: &DynamicRecord| r.get("lang") == Some(&json!("en")));
    let hits: Vec<_> = docs
        .search(&[1.0, 0.0], 10, options, &cancel)
        .await
        .unwrap()
        .collect()
        .await;
    let slugs: Vec<_> = hits.iter().map(|h| h.record["slug"].clone()).collect();
    assert_eq!(slugs, vec![json!("a"), json!("c")]);
}

#[tokio::test]
async fn test_string_and_integer_keys_share_one_record() {
    let temp = TempDir::new().unwrap();
    let cancel = CancellationToken::new();
    let docs = store(&temp).dynamic_collection("docs", schema()).unwrap();

    docs.upsert(record(json!({"slug": "1", "v": "text"})), &cancel)
        .await
        .unwrap();
    docs.upsert(record(json!({"slug": 1, "v": "number"})), &cancel)
        .await
        .unwrap();
    assert_eq!(docs.len(&cancel).await.unwrap(), 1);
    assert_eq!(std::fs::read_dir(docs.path()).unwrap().count(), 1);

    let got = docs
        .get(&DynamicKey::from("1"), GetOptions::default(), &cancel)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(got["v"], json!("number"));

    docs.delete(&DynamicKey::Int(1), &cancel).await.unwrap();
    assert_eq!(docs.len(&cancel).await.unwrap(), 0);
    assert!(!docs.path().join("1.json").exists());

    let reopened = store(&temp).dynamic_collection("docs", schema()).unwrap();
    assert_eq!(reopened.len(&cancel).await.unwrap(), 0);
}

#[tokio::test]
async fn test_file_whose_name_disagrees_with_its_key_is_skipped() {
    let temp = TempDir::new().unwrap();
    let cancel = CancellationToken::new();
    {
        let docs = store(&temp).dynamic_collection("docs", schema()).unwrap();
        docs.upsert(record(json!({"slug": "a"})), &cancel)
            .await
            .unwrap();
        std::fs::write(docs.path().join("x.json"), r#"{"slug": "b"}"#).unwrap();
    }

    let docs = store(&temp).dynamic_collection("docs", schema()).unwrap();
    let stats = docs.wait_ready(&cancel).await.unwrap();
    assert_eq!(stats, LoadStats { loaded: 1, skipped: 1 });
    assert!(docs
        .get(&DynamicKey::from("b"), GetOptions::default(), &cancel)
        .await
        .unwrap()
        .is_none());
}
