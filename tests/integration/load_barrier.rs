use crate::support::{hotel, store, Hotel};
use filemem::{GetOptions, LoadStats, StoreError};
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

const RECORDS: u64 = 300;

async fn populate(temp: &TempDir) {
    let hotels = store(temp).collection::<Hotel>("hotels").unwrap();
    hotels
        .upsert_batch(
            (0..RECORDS).map(|id| {
                hotel(id, &format!("Hotel {}", id), "Oslo", Some(vec![id as f32]))
            }),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_first_reads_see_every_existing_record() {
    let temp = TempDir::new().unwrap();
    populate(&temp).await;

    let hotels = store(&temp).collection::<Hotel>("hotels").unwrap();
    let readers: Vec<_> = [0, RECORDS / 2, RECORDS - 1]
        .into_iter()
        .map(|id| {
            let hotels = hotels.clone();
            tokio::spawn(async move {
                let cancel = CancellationToken::new();
                let found = hotels
                    .get(&id, GetOptions::default(), &cancel)
                    .await
                    .unwrap();
                let count = hotels.len(&cancel).await.unwrap();
                (found, count)
            })
        })
        .collect();

    for reader in readers {
        let (found, count) = reader.await.unwrap();
        assert!(found.is_some());
        assert_eq!(count, RECORDS as usize);
    }
}

#[tokio::test]
async fn test_get_right_after_open_waits_for_load() {
    let temp = TempDir::new().unwrap();
    populate(&temp).await;

    let hotels = store(&temp).collection::<Hotel>("hotels").unwrap();
    let last = hotels
        .get(&(RECORDS - 1), GetOptions::default(), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(last.unwrap().name, format!("Hotel {}", RECORDS - 1));
    assert!(hotels.is_loaded());
}

#[tokio::test]
async fn test_is_loaded_without_waiting() {
    let temp = TempDir::new().unwrap();
    let hotels = store(&temp).collection::<Hotel>("hotels").unwrap();

    for _ in 0..200 {
        if hotels.is_loaded() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(hotels.is_loaded());
}

#[tokio::test]
async fn test_corrupt_file_is_skipped() {
    let temp = TempDir::new().unwrap();
    let cancel = CancellationToken::new();
    {
        let hotels = store(&temp).collection::<Hotel>("hotels").unwrap();
        for id in 1..=3 {
            hotels
                .upsert(hotel(id, "Valid", "Oslo", None), &cancel)
                .await
                .unwrap();
        }
        std::fs::write(hotels.path().join("4.json"), "{\"id\": 4, \"name\": ").unwrap();
    }

    let hotels = store(&temp).collection::<Hotel>("hotels").unwrap();
    let stats = hotels.wait_ready(&cancel).await.unwrap();
    assert_eq!(stats, LoadStats { loaded: 3, skipped: 1 });
    assert_eq!(hotels.len(&cancel).await.unwrap(), 3);
    assert!(hotels
        .get(&4, GetOptions::default(), &cancel)
        .await
        .unwrap()
        .is_none());

    // Upserting the key again repairs the file.
    hotels
        .upsert(hotel(4, "Repaired", "Oslo", None), &cancel)
        .await
        .unwrap();
    let reopened = store(&temp).collection::<Hotel>("hotels").unwrap();
    assert_eq!(
        reopened.wait_ready(&cancel).await.unwrap(),
        LoadStats { loaded: 4, skipped: 0 }
    );
}

#[tokio::test]
async fn test_cancelled_wait_does_not_block() {
    let temp = TempDir::new().unwrap();
    populate(&temp).await;

    let hotels = store(&temp).collection::<Hotel>("hotels").unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = hotels
        .get(&1, GetOptions::default(), &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Cancelled));

    // Other callers still get the loaded collection.
    let stats = hotels.wait_ready(&CancellationToken::new()).await.unwrap();
    assert_eq!(stats.loaded, RECORDS as usize);
}

#[test]
fn test_open_outside_runtime_fails() {
    let temp = TempDir::new().unwrap();
    let err = store(&temp).collection::<Hotel>("hotels").err().unwrap();
    assert!(matches!(err, StoreError::Runtime(_)));
    assert!(!temp.path().join("collections").join("hotels").exists());
}
