//! Store gateway trait

use crate::error::Result;
use crate::record::{CanonicalRecord, InventorySnapshot};
use async_trait::async_trait;
use std::collections::BTreeSet;

/// Key the inventory snapshot is stored under
pub const SNAPSHOT_KEY: &str = "latest";

/// Bulk operations on the document store
///
/// Empty input to [`upsert_many`](Self::upsert_many) or
/// [`delete_many`](Self::delete_many) succeeds without touching the backend.
/// Every failure is reported as [`Error::Persistence`](crate::Error::Persistence).
#[async_trait]
pub trait StoreGateway: Send + Sync {
    /// Insert or fully replace each record by identifier. Returns the number
    /// of records written.
    async fn upsert_many(&self, records: &[CanonicalRecord]) -> Result<usize>;

    /// Remove every record whose identifier is in the set. Identifiers that
    /// are not stored are ignored. Returns the number of records removed.
    async fn delete_many(&self, identifiers: &BTreeSet<String>) -> Result<usize>;

    /// Identifiers of every stored record
    async fn all_identifiers(&self) -> Result<BTreeSet<String>>;

    /// Replace the stored inventory snapshot
    async fn replace_snapshot(&self, snapshot: &InventorySnapshot) -> Result<()>;
}
