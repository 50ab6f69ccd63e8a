// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # stock-sync
//!
//! Mirrors a paginated Hydra/JSON-LD vehicle stock feed into a document
//! store. Every run leaves the store holding exactly the records the source
//! currently lists: new and changed vehicles are upserted, vehicles gone from
//! the feed are deleted.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stock_sync::{
//!     DuckDbStore, HttpClient, HttpClientConfig, HydraFetcher, PaginationDriver, SyncEngine,
//! };
//!
//! #[tokio::main]
//! async fn main() -> stock_sync::Result<()> {
//!     let client = HttpClient::with_config(HttpClientConfig::default())?;
//!     let fetcher = HydraFetcher::new(client, "https://api.retail-renault-group.fr/car_stocks", 500)?;
//!     let store = Arc::new(DuckDbStore::open("stock.duckdb")?);
//!
//!     let engine = SyncEngine::new(PaginationDriver::new(Arc::new(fetcher)), store);
//!     let result = engine.synchronize().await?;
//!     println!("{result}");
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   pages    ┌────────────┐  records  ┌────────────┐
//! │ HydraFetcher │ ─────────▶ │ Pagination │ ────────▶ │ SyncEngine │
//! │  (http)      │            │   Driver   │           │            │
//! └──────────────┘            └────────────┘           └─────┬──────┘
//!                                   normalize ▲              │ upsert, delete
//!                                 ┌───────────┴──┐     ┌─────▼────────┐
//!                                 │ record model │     │ StoreGateway │
//!                                 └──────────────┘     └──────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Record validation and normalization
pub mod record;

/// HTTP client with rate limiting
pub mod http;

/// Page fetching and traversal
pub mod pagination;

/// Document store gateway
pub mod store;

/// Synchronization engine
pub mod engine;

/// Runtime configuration
pub mod config;

/// Command-line interface
pub mod cli;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use config::Config;
pub use engine::{SyncConfig, SyncEngine, SyncResult};
pub use http::{HttpClient, HttpClientConfig};
pub use pagination::{HydraFetcher, Page, PageCursor, PageFetcher, PaginationDriver};
pub use record::{normalize, CanonicalRecord, InventorySnapshot, ValidationError};
pub use store::{DuckDbStore, MemoryStore, StoreGateway};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
