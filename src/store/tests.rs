use super::*;
use crate::error::Error;
use crate::record::{InventorySnapshot, StatRange};
use crate::testing::canonical;
use pretty_assertions::assert_eq;
use std::collections::{BTreeMap, BTreeSet};
use tempfile::TempDir;

fn ids(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

fn snapshot(total: u64) -> InventorySnapshot {
    InventorySnapshot {
        term: BTreeMap::new(),
        stat: BTreeMap::from([(
            "price".to_string(),
            StatRange {
                min: 9_990.0,
                max: 54_900.0,
            },
        )]),
        total_items: Some(total),
        captured_at: None,
    }
}

// ============================================================================
// MemoryStore
// ============================================================================

#[tokio::test]
async fn test_memory_upsert_inserts_and_replaces() {
    let store = MemoryStore::new();
    assert_eq!(store.upsert_many(&[canonical(1), canonical(2)]).await.unwrap(), 2);

    let mut changed = canonical(1);
    changed.attributes.name = "Renamed".to_string();
    store.upsert_many(&[changed.clone()]).await.unwrap();

    let documents = store.documents().await;
    assert_eq!(documents.len(), 2);
    assert_eq!(documents["1"], changed);
}

#[tokio::test]
async fn test_memory_delete_ignores_unknown_identifiers() {
    let store = MemoryStore::with_records([canonical(1), canonical(2)]);
    let removed = store.delete_many(&ids(&["2", "99"])).await.unwrap();

    assert_eq!(removed, 1);
    assert_eq!(store.all_identifiers().await.unwrap(), ids(&["1"]));
}

#[tokio::test]
async fn test_memory_records_operations_in_order() {
    let store = MemoryStore::new();
    store.upsert_many(&[]).await.unwrap();
    store.all_identifiers().await.unwrap();
    store.delete_many(&BTreeSet::new()).await.unwrap();
    store.replace_snapshot(&snapshot(0)).await.unwrap();

    assert_eq!(
        store.operations().await,
        vec![
            StoreOp::Upsert(0),
            StoreOp::ListIdentifiers,
            StoreOp::Delete(0),
            StoreOp::ReplaceSnapshot,
        ]
    );

    store.clear_operations().await;
    assert!(store.operations().await.is_empty());
}

#[tokio::test]
async fn test_memory_injected_upsert_failure_fires_once() {
    let store = MemoryStore::new();
    store.fail_next_upsert();

    let err = store.upsert_many(&[canonical(1)]).await.unwrap_err();
    assert!(matches!(err, Error::Persistence { .. }));
    assert!(store.documents().await.is_empty());

    store.upsert_many(&[canonical(1)]).await.unwrap();
    assert_eq!(store.documents().await.len(), 1);
}

#[tokio::test]
async fn test_memory_injected_delete_failure_keeps_data() {
    let store = MemoryStore::with_records([canonical(1)]);
    store.fail_next_delete();

    let err = store.delete_many(&ids(&["1"])).await.unwrap_err();
    assert!(matches!(err, Error::Persistence { .. }));
    assert!(store.get("1").await.is_some());
}

#[tokio::test]
async fn test_memory_snapshot_is_replaced() {
    let store = MemoryStore::new();
    assert!(store.snapshot().await.is_none());

    store.replace_snapshot(&snapshot(10)).await.unwrap();
    store.replace_snapshot(&snapshot(12)).await.unwrap();
    assert_eq!(store.snapshot().await.unwrap().total_items, Some(12));
}

// ============================================================================
// DuckDbStore
// ============================================================================

#[tokio::test]
async fn test_duckdb_upsert_and_list() {
    let store = DuckDbStore::open_in_memory().unwrap();
    assert!(store.all_identifiers().await.unwrap().is_empty());

    let written = store
        .upsert_many(&[canonical(1), canonical(2), canonical(3)])
        .await
        .unwrap();

    assert_eq!(written, 3);
    assert_eq!(store.count().unwrap(), 3);
    assert_eq!(store.all_identifiers().await.unwrap(), ids(&["1", "2", "3"]));
}

#[tokio::test]
async fn test_duckdb_upsert_replaces_whole_document() {
    let store = DuckDbStore::open_in_memory().unwrap();
    store.upsert_many(&[canonical(7)]).await.unwrap();

    let mut changed = canonical(7);
    changed.attributes.pricing.price_inc_tax = None;
    changed.attributes.brand = "Dacia".to_string();
    store.upsert_many(&[changed.clone()]).await.unwrap();

    assert_eq!(store.count().unwrap(), 1);
    assert_eq!(store.record("7").unwrap(), Some(changed));
}

#[tokio::test]
async fn test_duckdb_document_is_canonical_json() {
    let store = DuckDbStore::open_in_memory().unwrap();
    store.upsert_many(&[canonical(4)]).await.unwrap();

    let document = store.document("4").unwrap().unwrap();
    assert_eq!(document, canonical(4).to_document().unwrap());
    assert!(store.document("5").unwrap().is_none());
}

#[tokio::test]
async fn test_duckdb_delete_many() {
    let store = DuckDbStore::open_in_memory().unwrap();
    store
        .upsert_many(&[canonical(1), canonical(2), canonical(3)])
        .await
        .unwrap();

    let removed = store.delete_many(&ids(&["1", "3", "42"])).await.unwrap();

    assert_eq!(removed, 2);
    assert_eq!(store.all_identifiers().await.unwrap(), ids(&["2"]));
}

#[tokio::test]
async fn test_duckdb_empty_batches_are_noops() {
    let store = DuckDbStore::open_in_memory().unwrap();
    store.upsert_many(&[canonical(1)]).await.unwrap();

    assert_eq!(store.upsert_many(&[]).await.unwrap(), 0);
    assert_eq!(store.delete_many(&BTreeSet::new()).await.unwrap(), 0);
    assert_eq!(store.count().unwrap(), 1);
}

#[tokio::test]
async fn test_duckdb_snapshot_replaced_under_single_key() {
    let store = DuckDbStore::open_in_memory().unwrap();
    assert!(store.snapshot().unwrap().is_none());

    store.replace_snapshot(&snapshot(10)).await.unwrap();
    store.replace_snapshot(&snapshot(11)).await.unwrap();

    assert_eq!(store.snapshot().unwrap(), Some(snapshot(11)));
}

#[tokio::test]
async fn test_duckdb_file_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stock.duckdb");

    {
        let store = DuckDbStore::open(&path).unwrap();
        store.upsert_many(&[canonical(1), canonical(2)]).await.unwrap();
    }

    let store = DuckDbStore::open(&path).unwrap();
    assert_eq!(store.location(), path.display().to_string());
    assert_eq!(store.all_identifiers().await.unwrap(), ids(&["1", "2"]));
}

#[test]
fn test_duckdb_memory_path() {
    let store = DuckDbStore::open(":memory:").unwrap();
    assert_eq!(store.location(), ":memory:");
}

#[test]
fn test_duckdb_open_in_missing_directory_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("stock.duckdb");

    let err = DuckDbStore::open(&path).unwrap_err();
    assert!(matches!(err, Error::Persistence { .. }));
}
