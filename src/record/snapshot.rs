//! Inventory snapshot
//!
//! The feed repeats the same facet aggregations on every page. The last page's
//! copy is parsed once per run and stored as a single "latest" document.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One term bucket, e.g. `{"key": "Diesel", "count": 42}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermBucket {
    /// Bucket key. The feed mixes strings and integers here.
    pub key: Value,
    pub count: u64,
    /// Hex colour for colour buckets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Observed bounds of a numeric facet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatRange {
    pub min: f64,
    pub max: f64,
}

/// Facet aggregations as published by the source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Aggregations {
    #[serde(default)]
    term: BTreeMap<String, Vec<TermBucket>>,
    #[serde(default)]
    stat: BTreeMap<String, StatRange>,
}

/// Facet summary of the whole inventory at the time of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    /// Term facets keyed by field name
    pub term: BTreeMap<String, Vec<TermBucket>>,
    /// Numeric facets keyed by metric name
    pub stat: BTreeMap<String, StatRange>,
    /// `hydra:totalItems` as advertised by the source
    pub total_items: Option<u64>,
    /// Most recent stock entry date among the synchronized records
    pub captured_at: Option<NaiveDate>,
}

impl InventorySnapshot {
    /// Parse the raw `aggregations` object of a page
    pub fn from_aggregations(
        raw: &Value,
        total_items: Option<u64>,
        captured_at: Option<NaiveDate>,
    ) -> serde_json::Result<Self> {
        let aggregations = Aggregations::deserialize(raw)?;
        Ok(Self {
            term: aggregations.term,
            stat: aggregations.stat,
            total_items,
            captured_at,
        })
    }
}
