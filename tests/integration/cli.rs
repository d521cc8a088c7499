use crate::support::{hotel, Hotel};
use filemem::tooling::cli::{CliContext, Commands};
use filemem::{FileMemConfig, StoreError};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn config(temp: &TempDir) -> FileMemConfig {
    let mut config = FileMemConfig::default();
    config.storage.root = temp.path().join("collections");
    config
}

/// Write two records into `hotels` using a throwaway runtime.
fn seed(context: &CliContext) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    runtime.block_on(async {
        let hotels = context.store().collection::<Hotel>("hotels").unwrap();
        hotels
            .upsert_batch(
                vec![hotel(1, "A", "Oslo", None), hotel(2, "B", "Rome", None)],
                &CancellationToken::new(),
            )
            .await
            .unwrap();
    });
}

#[test]
fn test_list_json() {
    let temp = TempDir::new().unwrap();
    let context = CliContext::from_config(&config(&temp)).unwrap();
    seed(&context);

    let output = context
        .execute(&Commands::List {
            format: "json".to_string(),
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(
        parsed,
        serde_json::json!([{
            "name": "hotels",
            "descriptor": {"KeyType": "u64", "RecordType": "Hotel"},
            "record_files": 2
        }])
    );
}

#[test]
fn test_list_text_and_info() {
    let temp = TempDir::new().unwrap();
    let context = CliContext::from_config(&config(&temp)).unwrap();

    let empty = context
        .execute(&Commands::List {
            format: "text".to_string(),
        })
        .unwrap();
    assert!(empty.contains("No collections found."));

    seed(&context);
    let listed = context
        .execute(&Commands::List {
            format: "text".to_string(),
        })
        .unwrap();
    assert!(listed.contains("hotels"));
    assert!(listed.contains("data type 'Hotel'"));

    let info = context
        .execute(&Commands::Info {
            name: "hotels".to_string(),
            format: "text".to_string(),
        })
        .unwrap();
    assert!(info.contains("Record files: 2"));
}

#[test]
fn test_info_missing_collection() {
    let temp = TempDir::new().unwrap();
    let context = CliContext::from_config(&config(&temp)).unwrap();
    let err = context
        .execute(&Commands::Info {
            name: "nope".to_string(),
            format: "text".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, StoreError::CollectionMissing { .. }));
}

#[test]
fn test_delete_with_yes() {
    let temp = TempDir::new().unwrap();
    let context = CliContext::from_config(&config(&temp)).unwrap();
    seed(&context);

    let output = context
        .execute(&Commands::Delete {
            name: "hotels".to_string(),
            yes: true,
        })
        .unwrap();
    assert_eq!(output, "Deleted collection 'hotels'");
    assert!(!context.store().collection_exists("hotels").unwrap());
    assert!(!context.store().root().join("hotels.json").exists());

    let again = context
        .execute(&Commands::Delete {
            name: "hotels".to_string(),
            yes: true,
        })
        .unwrap();
    assert_eq!(again, "Collection 'hotels' does not exist");
}

#[test]
fn test_unknown_output_format() {
    let temp = TempDir::new().unwrap();
    let context = CliContext::from_config(&config(&temp)).unwrap();
    assert!(matches!(
        context.execute(&Commands::List {
            format: "yaml".to_string()
        }),
        Err(StoreError::ConfigError(_))
    ));
}
