//! In-memory store

use super::types::StoreGateway;
use crate::error::{Error, Result};
use crate::record::{CanonicalRecord, InventorySnapshot};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// One gateway call, as recorded by [`MemoryStore::operations`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    /// `upsert_many` with this many records
    Upsert(usize),
    /// `delete_many` with this many identifiers
    Delete(usize),
    /// `all_identifiers`
    ListIdentifiers,
    /// `replace_snapshot`
    ReplaceSnapshot,
}

#[derive(Debug, Default)]
struct Contents {
    documents: BTreeMap<String, CanonicalRecord>,
    snapshot: Option<InventorySnapshot>,
    operations: Vec<StoreOp>,
}

/// Store backed by a map, with call recording and fault injection
#[derive(Debug, Default)]
pub struct MemoryStore {
    contents: RwLock<Contents>,
    fail_next_upsert: AtomicBool,
    fail_next_delete: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `records`
    pub fn with_records(records: impl IntoIterator<Item = CanonicalRecord>) -> Self {
        let documents = records
            .into_iter()
            .map(|record| (record.identifier.clone(), record))
            .collect();
        Self {
            contents: RwLock::new(Contents {
                documents,
                ..Contents::default()
            }),
            ..Self::default()
        }
    }

    /// Make the next `upsert_many` fail without writing anything
    pub fn fail_next_upsert(&self) {
        self.fail_next_upsert.store(true, Ordering::SeqCst);
    }

    /// Make the next `delete_many` fail without removing anything
    pub fn fail_next_delete(&self) {
        self.fail_next_delete.store(true, Ordering::SeqCst);
    }

    /// Copy of every stored record
    pub async fn documents(&self) -> BTreeMap<String, CanonicalRecord> {
        self.contents.read().await.documents.clone()
    }

    /// Stored record for `identifier`
    pub async fn get(&self, identifier: &str) -> Option<CanonicalRecord> {
        self.contents.read().await.documents.get(identifier).cloned()
    }

    /// Stored inventory snapshot
    pub async fn snapshot(&self) -> Option<InventorySnapshot> {
        self.contents.read().await.snapshot.clone()
    }

    /// Every gateway call so far, in order
    pub async fn operations(&self) -> Vec<StoreOp> {
        self.contents.read().await.operations.clone()
    }

    /// Forget recorded calls, keeping the data
    pub async fn clear_operations(&self) {
        self.contents.write().await.operations.clear();
    }
}

#[async_trait]
impl StoreGateway for MemoryStore {
    async fn upsert_many(&self, records: &[CanonicalRecord]) -> Result<usize> {
        let mut contents = self.contents.write().await;
        contents.operations.push(StoreOp::Upsert(records.len()));
        if self.fail_next_upsert.swap(false, Ordering::SeqCst) {
            return Err(Error::persistence("injected upsert failure"));
        }
        for record in records {
            contents
                .documents
                .insert(record.identifier.clone(), record.clone());
        }
        Ok(records.len())
    }

    async fn delete_many(&self, identifiers: &BTreeSet<String>) -> Result<usize> {
        let mut contents = self.contents.write().await;
        contents.operations.push(StoreOp::Delete(identifiers.len()));
        if self.fail_next_delete.swap(false, Ordering::SeqCst) {
            return Err(Error::persistence("injected delete failure"));
        }
        let removed = identifiers
            .iter()
            .filter_map(|id| contents.documents.remove(id))
            .count();
        Ok(removed)
    }

    async fn all_identifiers(&self) -> Result<BTreeSet<String>> {
        let mut contents = self.contents.write().await;
        contents.operations.push(StoreOp::ListIdentifiers);
        Ok(contents.documents.keys().cloned().collect())
    }

    async fn replace_snapshot(&self, snapshot: &InventorySnapshot) -> Result<()> {
        let mut contents = self.contents.write().await;
        contents.operations.push(StoreOp::ReplaceSnapshot);
        contents.snapshot = Some(snapshot.clone());
        Ok(())
    }
}
