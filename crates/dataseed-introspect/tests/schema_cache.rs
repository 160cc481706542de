use std::cell::Cell;
use std::fs;
use std::path::PathBuf;

use dataseed_core::{ColumnSchema, SourceSchema, TableSchema};
use dataseed_introspect::{CacheError, SchemaCache};

fn temp_cache_dir(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("dataseed_cache_{label}_{}", uuid::Uuid::new_v4()))
}

fn sample_schema() -> SourceSchema {
    let mut schema = SourceSchema::new("postgres");
    schema.database = Some("app".to_string());
    schema.tables.push(TableSchema {
        schema: "public".to_string(),
        name: "customers".to_string(),
        columns: vec![ColumnSchema {
            ordinal_position: 1,
            name: "id".to_string(),
            data_type: "integer".to_string(),
            max_length: None,
            numeric_precision: Some(32),
            numeric_scale: Some(0),
            is_nullable: false,
            is_primary_key: true,
            is_foreign_key: false,
            is_identity: true,
            is_computed: false,
            default: None,
        }],
    });
    schema
}

#[test]
fn put_then_load_round_trips() {
    let dir = temp_cache_dir("round_trip");
    let cache = SchemaCache::with_dir(&dir);
    let key = SchemaCache::cache_key("postgres://localhost/app");

    assert!(cache.load(&key).unwrap().is_none());
    cache.put(&key, &sample_schema()).unwrap();
    assert_eq!(cache.load(&key).unwrap(), Some(sample_schema()));
    assert_eq!(cache.get(&key), Some(sample_schema()));

    let leftovers: Vec<_> = fs::read_dir(&dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());

    assert!(cache.invalidate(&key).unwrap());
    assert!(!cache.invalidate(&key).unwrap());
    assert!(cache.get(&key).is_none());

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn corrupt_artifact_is_a_miss() {
    let dir = temp_cache_dir("corrupt");
    let cache = SchemaCache::with_dir(&dir);
    let key = SchemaCache::cache_key("corrupt");
    fs::create_dir_all(&dir).unwrap();
    fs::write(cache.artifact_path(&key).unwrap(), "{ not json").unwrap();

    assert!(matches!(cache.load(&key), Err(CacheError::Corrupt { .. })));
    assert!(cache.get(&key).is_none());

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn version_mismatch_is_a_miss() {
    let dir = temp_cache_dir("version");
    let cache = SchemaCache::with_dir(&dir);
    let key = SchemaCache::cache_key("version");
    let mut stale = sample_schema();
    stale.schema_version = "0.0-old".to_string();
    cache.put(&key, &stale).unwrap();

    assert!(matches!(
        cache.load(&key),
        Err(CacheError::VersionMismatch { .. })
    ));
    assert!(cache.get(&key).is_none());

    let _ = fs::remove_dir_all(dir);
}

#[tokio::test]
async fn get_or_fetch_fetches_once_then_hits() {
    let dir = temp_cache_dir("fetch");
    let cache = SchemaCache::with_dir(&dir);
    let key = SchemaCache::cache_key("fetch");
    let calls = Cell::new(0);
    let counter = &calls;

    for _ in 0..2 {
        let schema = cache
            .get_or_fetch(&key, false, move || async move {
                counter.set(counter.get() + 1);
                Ok::<_, CacheError>(sample_schema())
            })
            .await
            .unwrap();
        assert_eq!(schema, sample_schema());
    }
    assert_eq!(calls.get(), 1);

    cache
        .get_or_fetch(&key, true, move || async move {
            counter.set(counter.get() + 1);
            Ok::<_, CacheError>(sample_schema())
        })
        .await
        .unwrap();
    assert_eq!(calls.get(), 2);

    let _ = fs::remove_dir_all(dir);
}

#[tokio::test]
async fn failed_fetch_is_returned_and_nothing_is_cached() {
    let dir = temp_cache_dir("fetch_error");
    let cache = SchemaCache::with_dir(&dir);
    let key = SchemaCache::cache_key("fetch_error");

    let result = cache
        .get_or_fetch(&key, false, || async {
            Err::<SourceSchema, _>(dataseed_core::Error::Db("connection refused".to_string()))
        })
        .await;
    assert!(result.is_err());
    assert!(cache.load(&key).unwrap().is_none());

    let _ = fs::remove_dir_all(dir);
}
