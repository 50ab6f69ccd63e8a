//! DuckDB document store
//!
//! Records are kept as JSON documents keyed by identifier:
//!
//! ```text
//! vehicle_stocks(id VARCHAR PRIMARY KEY, document VARCHAR)
//! inventory_snapshots(key VARCHAR PRIMARY KEY, document VARCHAR)
//! ```
//!
//! Each bulk call runs in a single transaction, so a failed batch leaves the
//! store as it was.

use super::types::{StoreGateway, SNAPSHOT_KEY};
use crate::error::{Error, Result};
use crate::record::{CanonicalRecord, InventorySnapshot};
use async_trait::async_trait;
use duckdb::{params, Connection, OptionalExt};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS vehicle_stocks (
    id VARCHAR PRIMARY KEY,
    document VARCHAR NOT NULL
);
CREATE TABLE IF NOT EXISTS inventory_snapshots (
    key VARCHAR PRIMARY KEY,
    document VARCHAR NOT NULL
);
";

const UPSERT_RECORD: &str = "INSERT INTO vehicle_stocks (id, document) VALUES (?, ?)
     ON CONFLICT (id) DO UPDATE SET document = excluded.document";

const UPSERT_SNAPSHOT: &str = "INSERT INTO inventory_snapshots (key, document) VALUES (?, ?)
     ON CONFLICT (key) DO UPDATE SET document = excluded.document";

/// Store gateway over an embedded DuckDB database
pub struct DuckDbStore {
    /// DuckDB connection
    conn: Mutex<Connection>,
    /// Database file, or `:memory:` (for logging)
    location: String,
}

impl DuckDbStore {
    /// Open (or create) the database file at `path` and ensure the schema
    ///
    /// A path of `:memory:` opens a private in-memory database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str() == ":memory:" {
            return Self::open_in_memory();
        }

        let conn = Connection::open(path).map_err(|e| {
            Error::persistence(format!("Failed to open DuckDB at {}: {e}", path.display()))
        })?;
        Self::init(conn, path.display().to_string())
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::persistence(format!("Failed to create DuckDB connection: {e}")))?;
        Self::init(conn, ":memory:".to_string())
    }

    fn init(conn: Connection, location: String) -> Result<Self> {
        conn.execute_batch(SCHEMA)
            .map_err(|e| Error::persistence(format!("Failed to create schema: {e}")))?;
        debug!("Opened document store at {location}");
        Ok(Self {
            conn: Mutex::new(conn),
            location,
        })
    }

    /// Where the database lives
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Stored JSON document for `identifier`
    pub fn document(&self, identifier: &str) -> Result<Option<Value>> {
        let conn = self.connection()?;
        let document: Option<String> = conn
            .query_row(
                "SELECT document FROM vehicle_stocks WHERE id = ?",
                params![identifier],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| Error::persistence(format!("Failed to read record {identifier}: {e}")))?;

        document
            .map(|text| serde_json::from_str(&text))
            .transpose()
            .map_err(|e| Error::persistence(format!("Stored record {identifier} is corrupt: {e}")))
    }

    /// Stored record for `identifier`, decoded back to its typed form
    pub fn record(&self, identifier: &str) -> Result<Option<CanonicalRecord>> {
        self.document(identifier)?
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| Error::persistence(format!("Stored record {identifier} is corrupt: {e}")))
    }

    /// Stored inventory snapshot
    pub fn snapshot(&self) -> Result<Option<InventorySnapshot>> {
        let conn = self.connection()?;
        let document: Option<String> = conn
            .query_row(
                "SELECT document FROM inventory_snapshots WHERE key = ?",
                params![SNAPSHOT_KEY],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| Error::persistence(format!("Failed to read snapshot: {e}")))?;

        document
            .map(|text| serde_json::from_str(&text))
            .transpose()
            .map_err(|e| Error::persistence(format!("Stored snapshot is corrupt: {e}")))
    }

    /// Number of stored records
    pub fn count(&self) -> Result<usize> {
        let conn = self.connection()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM vehicle_stocks", [], |row| row.get(0))
            .map_err(|e| Error::persistence(format!("Failed to count records: {e}")))?;
        usize::try_from(count)
            .map_err(|_| Error::persistence(format!("Record count {count} is out of range")))
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::persistence("DuckDB connection lock poisoned"))
    }
}

#[async_trait]
impl StoreGateway for DuckDbStore {
    async fn upsert_many(&self, records: &[CanonicalRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut conn = self.connection()?;
        let tx = conn
            .transaction()
            .map_err(|e| Error::persistence(format!("Failed to begin transaction: {e}")))?;
        {
            let mut stmt = tx
                .prepare(UPSERT_RECORD)
                .map_err(|e| Error::persistence(format!("Failed to prepare upsert: {e}")))?;
            for record in records {
                let document = serde_json::to_string(record).map_err(|e| {
                    Error::persistence(format!("Failed to encode {}: {e}", record.identifier))
                })?;
                stmt.execute(params![record.identifier, document])
                    .map_err(|e| {
                        Error::persistence(format!("Failed to upsert {}: {e}", record.identifier))
                    })?;
            }
        }
        tx.commit()
            .map_err(|e| Error::persistence(format!("Failed to commit upsert: {e}")))?;

        debug!("Upserted {} records into {}", records.len(), self.location);
        Ok(records.len())
    }

    async fn delete_many(&self, identifiers: &BTreeSet<String>) -> Result<usize> {
        if identifiers.is_empty() {
            return Ok(0);
        }

        let mut conn = self.connection()?;
        let tx = conn
            .transaction()
            .map_err(|e| Error::persistence(format!("Failed to begin transaction: {e}")))?;
        let mut removed = 0;
        {
            let mut stmt = tx
                .prepare("DELETE FROM vehicle_stocks WHERE id = ?")
                .map_err(|e| Error::persistence(format!("Failed to prepare delete: {e}")))?;
            for identifier in identifiers {
                removed += stmt
                    .execute(params![identifier])
                    .map_err(|e| Error::persistence(format!("Failed to delete {identifier}: {e}")))?;
            }
        }
        tx.commit()
            .map_err(|e| Error::persistence(format!("Failed to commit delete: {e}")))?;

        debug!("Deleted {removed} records from {}", self.location);
        Ok(removed)
    }

    async fn all_identifiers(&self) -> Result<BTreeSet<String>> {
        let conn = self.connection()?;
        let mut stmt = conn
            .prepare("SELECT id FROM vehicle_stocks")
            .map_err(|e| Error::persistence(format!("Failed to prepare query: {e}")))?;

        let identifiers = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| Error::persistence(format!("Failed to list identifiers: {e}")))?
            .collect::<duckdb::Result<BTreeSet<_>>>()
            .map_err(|e| Error::persistence(format!("Failed to read identifier: {e}")))?;

        Ok(identifiers)
    }

    async fn replace_snapshot(&self, snapshot: &InventorySnapshot) -> Result<()> {
        let document = serde_json::to_string(snapshot)
            .map_err(|e| Error::persistence(format!("Failed to encode snapshot: {e}")))?;

        let conn = self.connection()?;
        conn.execute(UPSERT_SNAPSHOT, params![SNAPSHOT_KEY, document])
            .map_err(|e| Error::persistence(format!("Failed to store snapshot: {e}")))?;
        Ok(())
    }
}

impl std::fmt::Debug for DuckDbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuckDbStore")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}
