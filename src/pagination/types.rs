//! Pagination types and traits
//!
//! Defines the core pagination abstractions shared by fetchers and the driver.

use crate::error::Result;
use crate::types::{JsonValue, RawRecord};
use async_trait::async_trait;
use std::fmt;

/// Default ceiling on pages fetched in one traversal
pub const DEFAULT_MAX_PAGES: usize = 1000;

/// Opaque position in the source's pagination
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum PageCursor {
    /// The well-known first page
    #[default]
    First,
    /// Continuation token handed out by the source (a URL for Hydra feeds)
    Token(String),
}

impl PageCursor {
    /// Create a continuation cursor
    pub fn token(value: impl Into<String>) -> Self {
        Self::Token(value.into())
    }

    /// Check if this is the first-page cursor
    pub fn is_first(&self) -> bool {
        matches!(self, Self::First)
    }
}

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => f.write_str("<first>"),
            Self::Token(token) => f.write_str(token),
        }
    }
}

/// One page of raw records
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Records on this page, in source order
    pub records: Vec<RawRecord>,
    /// Cursor for the following page, `None` when this is the last page
    pub next: Option<PageCursor>,
    /// Total number of records the source claims to hold
    pub total_items: Option<u64>,
    /// Source-provided facet aggregations, untouched
    pub aggregations: Option<JsonValue>,
}

impl Page {
    /// Create a page with records and a next cursor
    pub fn new(records: Vec<RawRecord>, next: Option<PageCursor>) -> Self {
        Self {
            records,
            next,
            ..Default::default()
        }
    }

    /// Check if this is the last page
    pub fn is_last(&self) -> bool {
        self.next.is_none()
    }
}

/// Retrieves one page of raw records from the remote source
///
/// Implementations report [`Error::TransientFetch`](crate::Error::TransientFetch)
/// for failures worth one more attempt and
/// [`Error::FatalFetch`](crate::Error::FatalFetch) for everything that will not
/// clear up by repeating the request.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page at `cursor`
    async fn fetch_page(&self, cursor: &PageCursor) -> Result<Page>;
}

/// Guards against sources that never stop paginating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationGuard {
    /// Maximum pages in one traversal
    pub max_pages: usize,
}

impl Default for PaginationGuard {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

impl PaginationGuard {
    /// Create a guard with a page ceiling
    pub fn new(max_pages: usize) -> Self {
        Self { max_pages }
    }
}
