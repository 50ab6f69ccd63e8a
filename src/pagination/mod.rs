//! Pagination module
//!
//! Page fetching and traversal of the remote feed.
//!
//! # Overview
//!
//! - `PageFetcher` - retrieves one page for an opaque `PageCursor`
//! - `HydraFetcher` - `PageFetcher` for JSON-LD/Hydra collections
//! - `PaginationDriver` - lazy stream over every page or record, with a loop
//!   guard and a single retry of transiently failing pages

mod driver;
mod fetcher;
mod types;

pub use driver::PaginationDriver;
pub use fetcher::{HydraFetcher, PAGE_PARAM, PAGE_SIZE_PARAM};
pub use types::{Page, PageCursor, PageFetcher, PaginationGuard, DEFAULT_MAX_PAGES};
