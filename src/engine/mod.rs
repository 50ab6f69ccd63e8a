//! Synchronization engine
//!
//! One run mirrors the feed into the store:
//!
//! 1. Drain the pagination driver, normalizing every record. Invalid records
//!    are logged and skipped.
//! 2. Read every stored identifier.
//! 3. Upsert all valid records, then delete the stored identifiers the feed
//!    no longer lists.
//! 4. Replace the inventory snapshot.
//!
//! Any fetch error aborts the run before the store is touched. The delete
//! never runs unless the upsert succeeded.

mod types;

pub use types::{SyncConfig, SyncResult};

use crate::error::{Error, Result};
use crate::pagination::PaginationDriver;
use crate::record::{normalize, CanonicalRecord, InventorySnapshot};
use crate::store::StoreGateway;
use crate::types::{JsonValue, RawRecord};
use futures::TryStreamExt;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Sync engine for mirroring the feed into a store
pub struct SyncEngine {
    /// Pagination driver over the source
    driver: PaginationDriver,
    /// Target store
    store: Arc<dyn StoreGateway>,
    /// Sync configuration
    config: SyncConfig,
}

/// Everything read from the source in one traversal
#[derive(Debug, Default)]
struct Harvest {
    pages: usize,
    fetched: usize,
    validation_failures: usize,
    duplicates: usize,
    records: BTreeMap<String, CanonicalRecord>,
    total_items: Option<u64>,
    aggregations: Option<JsonValue>,
}

impl SyncEngine {
    /// Create a new sync engine
    pub fn new(driver: PaginationDriver, store: Arc<dyn StoreGateway>) -> Self {
        Self {
            driver,
            store,
            config: SyncConfig::default(),
        }
    }

    /// Set sync configuration
    #[must_use]
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Run one synchronization
    pub async fn synchronize(&self) -> Result<SyncResult> {
        let start = Instant::now();
        match self.run(start).await {
            Ok(result) => {
                info!("Synchronization finished: {result}");
                Ok(result)
            }
            Err(e) => {
                error!("Synchronization aborted: {e}");
                Err(e)
            }
        }
    }

    async fn run(&self, start: Instant) -> Result<SyncResult> {
        let harvest = self.harvest().await?;
        self.check_harvest(&harvest)?;

        if let Some(total) = harvest.total_items {
            if total != harvest.fetched as u64 {
                warn!(
                    "Source advertised {total} records but {} were fetched",
                    harvest.fetched
                );
            }
        }

        let stored = self.store.all_identifiers().await?;
        let stale: BTreeSet<String> = stored
            .into_iter()
            .filter(|id| !harvest.records.contains_key(id))
            .collect();

        let batch: Vec<CanonicalRecord> = harvest.records.into_values().collect();
        debug!("Upserting {} records, {} stale", batch.len(), stale.len());

        let upserted = self.store.upsert_many(&batch).await?;
        let deleted = self.store.delete_many(&stale).await?;

        let captured_at = batch
            .iter()
            .filter_map(|record| record.attributes.availability.entered_stock_on)
            .max();
        self.replace_snapshot(harvest.aggregations.as_ref(), harvest.total_items, captured_at)
            .await;

        Ok(SyncResult {
            pages: harvest.pages,
            fetched: harvest.fetched,
            upserted,
            deleted,
            validation_failures: harvest.validation_failures,
            duplicates: harvest.duplicates,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Drain the driver and normalize every record
    async fn harvest(&self) -> Result<Harvest> {
        let mut harvest = Harvest::default();
        let pages = self.driver.pages();
        futures::pin_mut!(pages);

        while let Some(page) = pages.try_next().await? {
            harvest.pages += 1;
            if page.total_items.is_some() {
                harvest.total_items = page.total_items;
            }
            if page.aggregations.is_some() {
                harvest.aggregations = page.aggregations;
            }

            for raw in &page.records {
                harvest.fetched += 1;
                match normalize(raw) {
                    Ok(record) => {
                        let identifier = record.identifier.clone();
                        if harvest.records.insert(identifier.clone(), record).is_some() {
                            warn!("Duplicate record {identifier}, keeping the later copy");
                            harvest.duplicates += 1;
                        }
                    }
                    Err(e) => {
                        warn!("Skipping record {}: {e}", describe(raw));
                        harvest.validation_failures += 1;
                    }
                }
            }
        }

        Ok(harvest)
    }

    /// Refuse to touch the store when the harvest looks like a broken source
    fn check_harvest(&self, harvest: &Harvest) -> Result<()> {
        if harvest.fetched == 0 {
            if self.config.allow_empty_feed {
                warn!("Source returned no records, the store will be emptied");
                return Ok(());
            }
            return Err(Error::fatal(
                "Source returned no records and empty feeds are not allowed",
            ));
        }

        if harvest.records.is_empty() {
            return Err(Error::fatal(format!(
                "All {} fetched records failed validation, the source schema may have changed",
                harvest.fetched
            )));
        }

        if let Some(max) = self.config.max_failure_ratio {
            let ratio = harvest.validation_failures as f64 / harvest.fetched as f64;
            if ratio > max {
                return Err(Error::fatal(format!(
                    "{} of {} records failed validation ({:.1}%, limit {:.1}%)",
                    harvest.validation_failures,
                    harvest.fetched,
                    ratio * 100.0,
                    max * 100.0
                )));
            }
        }

        Ok(())
    }

    /// Store the facet snapshot. Problems here never fail the run.
    async fn replace_snapshot(
        &self,
        aggregations: Option<&JsonValue>,
        total_items: Option<u64>,
        captured_at: Option<chrono::NaiveDate>,
    ) {
        let Some(aggregations) = aggregations else {
            warn!("Source sent no aggregations, inventory snapshot not updated");
            return;
        };

        let parsed = InventorySnapshot::from_aggregations(aggregations, total_items, captured_at);
        let snapshot = match parsed {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Malformed aggregations, inventory snapshot not updated: {e}");
                return;
            }
        };

        if let Err(e) = self.store.replace_snapshot(&snapshot).await {
            warn!("Failed to store inventory snapshot: {e}");
        }
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("driver", &self.driver)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Short label for a raw record in log lines
fn describe(raw: &RawRecord) -> String {
    match raw.get("id") {
        Some(JsonValue::String(id)) => id.clone(),
        Some(id) if !id.is_null() => id.to_string(),
        _ => "<no id>".to_string(),
    }
}
