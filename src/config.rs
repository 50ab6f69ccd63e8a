//! Runtime configuration
//!
//! Loaded from a YAML file, then overridden from the environment:
//!
//! ```yaml
//! source:
//!   base_url: https://api.retail-renault-group.fr/car_stocks
//!   items_per_page: 500
//!   timeout_secs: 30
//!   requests_per_second: 4
//!   headers:
//!     Accept: application/ld+json
//! store:
//!   path: stock.duckdb
//! sync:
//!   max_pages: 1000
//!   max_failure_ratio: 0.05
//!   allow_empty_feed: false
//! ```

use crate::engine::SyncConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::pagination::{PaginationGuard, DEFAULT_MAX_PAGES};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Environment variable overriding `source.base_url`
pub const ENV_SOURCE_URL: &str = "STOCK_SYNC_SOURCE_URL";
/// Environment variable overriding `store.path`
pub const ENV_STORE_PATH: &str = "STOCK_SYNC_STORE_PATH";

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Remote feed
    #[serde(default)]
    pub source: SourceConfig,

    /// Document store
    #[serde(default)]
    pub store: StoreConfig,

    /// Run behaviour
    #[serde(default)]
    pub sync: SyncSettings,
}

// ============================================================================
// Sections
// ============================================================================

/// Remote feed settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Collection URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Page size requested from the source
    #[serde(default = "default_items_per_page")]
    pub items_per_page: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Client-side rate limit, unlimited when unset
    #[serde(default)]
    pub requests_per_second: Option<u32>,

    /// Extra headers sent with every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            items_per_page: default_items_per_page(),
            timeout_secs: default_timeout(),
            requests_per_second: None,
            headers: BTreeMap::new(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.retail-renault-group.fr/car_stocks".to_string()
}

fn default_items_per_page() -> u32 {
    500
}

fn default_timeout() -> u64 {
    30
}

/// Document store settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// DuckDB database file, or `:memory:`
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> String {
    "stock.duckdb".to_string()
}

/// Run settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Loop guard: most pages one run may fetch
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Highest tolerated share of invalid records
    #[serde(default)]
    pub max_failure_ratio: Option<f64>,

    /// Whether an empty feed may empty the store
    #[serde(default = "default_true")]
    pub allow_empty_feed: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            max_failure_ratio: None,
            allow_empty_feed: true,
        }
    }
}

fn default_max_pages() -> usize {
    DEFAULT_MAX_PAGES
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Loading
// ============================================================================

impl Config {
    /// Load from an optional file, apply environment overrides and validate
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML file, without overrides or validation
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse a YAML document, without overrides or validation
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty file means all defaults
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Apply overrides from `lookup`, usually the process environment.
    /// Blank values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = value(ENV_SOURCE_URL) {
            self.source.base_url = url;
        }
        if let Some(path) = value(ENV_STORE_PATH) {
            self.store.path = path;
        }
    }

    /// Check every value the run depends on
    pub fn validate(&self) -> Result<()> {
        if self.source.base_url.trim().is_empty() {
            return Err(Error::invalid_value("source.base_url", "cannot be empty"));
        }
        Url::parse(&self.source.base_url)
            .map_err(|e| Error::invalid_value("source.base_url", e.to_string()))?;

        if self.source.items_per_page == 0 {
            return Err(Error::invalid_value(
                "source.items_per_page",
                "must be positive",
            ));
        }
        if self.source.timeout_secs == 0 {
            return Err(Error::invalid_value("source.timeout_secs", "must be positive"));
        }
        if self.source.requests_per_second == Some(0) {
            return Err(Error::invalid_value(
                "source.requests_per_second",
                "must be positive when set",
            ));
        }
        if self.store.path.trim().is_empty() {
            return Err(Error::invalid_value("store.path", "cannot be empty"));
        }
        if self.sync.max_pages == 0 {
            return Err(Error::invalid_value("sync.max_pages", "must be positive"));
        }
        if let Some(ratio) = self.sync.max_failure_ratio {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(Error::invalid_value(
                    "sync.max_failure_ratio",
                    format!("must be between 0 and 1, got {ratio}"),
                ));
            }
        }
        Ok(())
    }

    // ========================================================================
    // Derived settings
    // ========================================================================

    /// HTTP client settings for the source
    pub fn http_client_config(&self) -> HttpClientConfig {
        let mut builder =
            HttpClientConfig::builder().timeout(Duration::from_secs(self.source.timeout_secs));
        if let Some(rps) = self.source.requests_per_second {
            builder = builder.rate_limit(RateLimiterConfig::per_second(rps));
        }
        for (key, value) in &self.source.headers {
            builder = builder.header(key, value);
        }
        builder.build()
    }

    /// Engine settings
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            max_failure_ratio: self.sync.max_failure_ratio,
            allow_empty_feed: self.sync.allow_empty_feed,
        }
    }

    /// Pagination loop guard
    pub fn pagination_guard(&self) -> PaginationGuard {
        PaginationGuard::new(self.sync.max_pages)
    }
}
