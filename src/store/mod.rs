//! Store gateway
//!
//! Document store the engine mirrors the feed into. Records are keyed by
//! their canonical identifier; the latest inventory snapshot lives beside
//! them as a single document.
//!
//! # Overview
//!
//! - `StoreGateway` - Bulk upsert, bulk delete and identifier listing
//! - `DuckDbStore` - Embedded DuckDB file (or in-memory database)
//! - `MemoryStore` - In-process map with fault injection, for tests and dry runs

mod database;
mod memory;
mod types;

pub use database::DuckDbStore;
pub use memory::{MemoryStore, StoreOp};
pub use types::{StoreGateway, SNAPSHOT_KEY};

#[cfg(test)]
mod tests;
