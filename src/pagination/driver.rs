//! Pagination driver
//!
//! Walks a [`PageFetcher`] from the first page until the source reports no
//! next cursor, as a lazy stream. Each call to [`PaginationDriver::pages`] or
//! [`PaginationDriver::fetch_all`] starts a fresh traversal.

use super::types::{Page, PageCursor, PageFetcher, PaginationGuard};
use crate::error::{Error, Result};
use crate::types::RawRecord;
use futures::stream::{self, Stream, TryStreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Drives a page fetcher to the end of the data
#[derive(Clone)]
pub struct PaginationDriver {
    fetcher: Arc<dyn PageFetcher>,
    guard: PaginationGuard,
}

/// Where one traversal stands
struct Traversal {
    next: Option<PageCursor>,
    seen: HashSet<PageCursor>,
    pages: usize,
}

impl PaginationDriver {
    /// Create a driver with the default guard
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            guard: PaginationGuard::default(),
        }
    }

    /// Set the loop guard
    #[must_use]
    pub fn with_guard(mut self, guard: PaginationGuard) -> Self {
        self.guard = guard;
        self
    }

    /// Stream every page, first to last
    ///
    /// The stream ends after the page whose next cursor is `None`, or right
    /// after yielding the first error.
    pub fn pages(&self) -> impl Stream<Item = Result<Page>> + Send + '_ {
        let start = Traversal {
            next: Some(PageCursor::First),
            seen: HashSet::new(),
            pages: 0,
        };

        stream::try_unfold(start, move |mut state| async move {
            let Some(cursor) = state.next.take() else {
                return Ok(None);
            };

            if state.pages >= self.guard.max_pages {
                return Err(Error::pagination_loop(format!(
                    "source still had pages after {} pages (next cursor: {cursor})",
                    self.guard.max_pages
                )));
            }
            if !state.seen.insert(cursor.clone()) {
                return Err(Error::pagination_loop(format!(
                    "cursor {cursor} was returned twice"
                )));
            }

            let number = state.pages + 1;
            info!("Fetching page {number} ({cursor})");
            let page = self.fetch_with_retry(&cursor, number).await?;
            info!("Retrieved {} records on page {number}", page.records.len());

            state.pages = number;
            state.next = page.next.clone();
            Ok(Some((page, state)))
        })
    }

    /// Stream every raw record across all pages, in source order
    pub fn fetch_all(&self) -> impl Stream<Item = Result<RawRecord>> + Send + '_ {
        self.pages()
            .map_ok(|page| stream::iter(page.records.into_iter().map(Ok)))
            .try_flatten()
    }

    /// Fetch one page, repeating the request once on a transient failure
    async fn fetch_with_retry(&self, cursor: &PageCursor, number: usize) -> Result<Page> {
        match self.fetcher.fetch_page(cursor).await {
            Err(e) if e.is_transient() => {
                warn!("Page {number} failed ({e}), retrying once");
                self.fetcher.fetch_page(cursor).await.map_err(|retry| {
                    if retry.is_transient() {
                        Error::fatal(format!("page {number} failed twice: {retry}"))
                    } else {
                        retry
                    }
                })
            }
            other => other,
        }
    }
}

impl std::fmt::Debug for PaginationDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginationDriver")
            .field("guard", &self.guard)
            .finish_non_exhaustive()
    }
}
