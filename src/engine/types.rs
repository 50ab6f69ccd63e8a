//! Engine types
//!
//! Run configuration and the per-run summary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for a synchronization run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Abort when the share of invalid records exceeds this ratio (0.0 to 1.0).
    /// A run where every fetched record is invalid always aborts.
    pub max_failure_ratio: Option<f64>,
    /// Whether an empty feed may empty the store.
    ///
    /// On by default so the store always equals the feed, including when the
    /// inventory really is empty. A single empty response from a failing
    /// upstream then deletes every stored record; set this to `false` when
    /// the feed is known never to be empty.
    pub allow_empty_feed: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_failure_ratio: None,
            allow_empty_feed: true,
        }
    }
}

impl SyncConfig {
    /// Create a new sync config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the failure ratio threshold
    #[must_use]
    pub fn with_max_failure_ratio(mut self, ratio: f64) -> Self {
        self.max_failure_ratio = Some(ratio);
        self
    }

    /// Allow or refuse an empty feed
    #[must_use]
    pub fn with_allow_empty_feed(mut self, allow: bool) -> Self {
        self.allow_empty_feed = allow;
        self
    }
}

/// Summary of one synchronization run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    /// Pages fetched
    pub pages: usize,
    /// Raw records fetched, valid or not
    pub fetched: usize,
    /// Records written to the store
    pub upserted: usize,
    /// Stale records removed from the store
    pub deleted: usize,
    /// Records rejected by validation
    pub validation_failures: usize,
    /// Records dropped because a later record had the same identifier
    pub duplicates: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl fmt::Display for SyncResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} records over {} pages: {} upserted, {} deleted, {} invalid, {} duplicates ({} ms)",
            self.fetched,
            self.pages,
            self.upserted,
            self.deleted,
            self.validation_failures,
            self.duplicates,
            self.duration_ms
        )
    }
}
