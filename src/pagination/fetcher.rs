//! Hydra collection fetcher
//!
//! Reads JSON-LD/Hydra collections of the form:
//!
//! ```text
//! {
//!   "hydra:totalItems": 1234,
//!   "hydra:member": [ {...}, {...} ],
//!   "hydra:view": { "hydra:next": "/car_stocks?page=2&itemsPerPage=500" },
//!   "aggregations": { "term": {...}, "stat": {...} }
//! }
//! ```
//!
//! The first page is requested with explicit page parameters; every later page
//! follows the `hydra:next` link, resolved against the base URL.

use super::types::{Page, PageCursor, PageFetcher};
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use url::Url;

/// Query parameter carrying the page number
pub const PAGE_PARAM: &str = "page";
/// Query parameter carrying the page size
pub const PAGE_SIZE_PARAM: &str = "itemsPerPage";

/// Page fetcher for Hydra collections
#[derive(Debug)]
pub struct HydraFetcher {
    client: HttpClient,
    base_url: Url,
    items_per_page: u32,
}

impl HydraFetcher {
    /// Create a fetcher for the collection at `base_url`
    pub fn new(client: HttpClient, base_url: &str, items_per_page: u32) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if items_per_page == 0 {
            return Err(Error::invalid_value("items_per_page", "must be positive"));
        }
        Ok(Self {
            client,
            base_url,
            items_per_page,
        })
    }

    /// Collection URL the first page is requested from
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl PageFetcher for HydraFetcher {
    async fn fetch_page(&self, cursor: &PageCursor) -> Result<Page> {
        let body = match cursor {
            PageCursor::First => {
                let request = RequestConfig::new()
                    .query(PAGE_PARAM, "1")
                    .query(PAGE_SIZE_PARAM, self.items_per_page.to_string());
                self.client
                    .get_json(self.base_url.as_str(), &request)
                    .await?
            }
            PageCursor::Token(url) => self.client.get_json(url, &RequestConfig::new()).await?,
        };

        let page = parse_page(&self.base_url, body)?;
        debug!(
            "Parsed {} records from {cursor}, next: {:?}",
            page.records.len(),
            page.next
        );
        Ok(page)
    }
}

/// Split a Hydra collection body into a [`Page`]
pub(crate) fn parse_page(base_url: &Url, body: Value) -> Result<Page> {
    let Value::Object(mut body) = body else {
        return Err(Error::fatal("Response is not a Hydra collection object"));
    };

    let members = match body.remove("hydra:member") {
        Some(Value::Array(members)) => members,
        Some(_) => return Err(Error::fatal("'hydra:member' is not an array")),
        None => {
            return Err(Error::fatal(
                "Response is not a Hydra collection: missing 'hydra:member'",
            ))
        }
    };

    let records = members
        .into_iter()
        .enumerate()
        .map(|(index, member)| match member {
            Value::Object(record) => Ok(record),
            _ => Err(Error::fatal(format!(
                "'hydra:member' entry {index} is not an object"
            ))),
        })
        .collect::<Result<Vec<_>>>()?;

    let next = body
        .get("hydra:view")
        .and_then(|view| view.get("hydra:next"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|link| !link.is_empty())
        .map(|link| base_url.join(link))
        .transpose()?
        .map(|url| PageCursor::Token(url.into()));

    Ok(Page {
        records,
        next,
        total_items: body.get("hydra:totalItems").and_then(Value::as_u64),
        aggregations: body.remove("aggregations").filter(|v| !v.is_null()),
    })
}
