//! Test doubles shared by unit tests

use crate::error::{Error, Result};
use crate::pagination::{Page, PageCursor, PageFetcher};
use crate::record::{normalize, CanonicalRecord};
use crate::types::RawRecord;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Canned answer for one fetch
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Page(Page),
    Transient(&'static str),
    Fatal(&'static str),
}

impl Reply {
    fn into_result(self) -> Result<Page> {
        match self {
            Reply::Page(page) => Ok(page),
            Reply::Transient(message) => Err(Error::transient(message)),
            Reply::Fatal(message) => Err(Error::fatal(message)),
        }
    }
}

/// Page fetcher answering from a script. Replies for a cursor are consumed in
/// order; the last one repeats forever.
#[derive(Debug, Default)]
pub(crate) struct ScriptedFetcher {
    replies: Mutex<HashMap<PageCursor, VecDeque<Reply>>>,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Chain of pages `First -> page-2 -> page-3 ...`, the last with no next cursor
    pub(crate) fn chain(pages: Vec<Vec<Value>>) -> Self {
        let fetcher = Self::new();
        let count = pages.len().max(1);
        let mut pages = pages.into_iter();
        for index in 0..count {
            let records = pages.next().unwrap_or_default();
            let next = (index + 1 < count).then(|| cursor(index + 2));
            fetcher.push(cursor(index + 1), Reply::Page(page(records, next)));
        }
        fetcher
    }

    /// Queue a reply for `cursor`
    pub(crate) fn push(&self, cursor: PageCursor, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry(cursor)
            .or_default()
            .push_back(reply);
    }

    /// Builder form of [`push`](Self::push)
    pub(crate) fn reply(self, cursor: PageCursor, reply: Reply) -> Self {
        self.push(cursor, reply);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch_page(&self, cursor: &PageCursor) -> Result<Page> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut replies = self.replies.lock().unwrap();
        let queue = replies
            .get_mut(cursor)
            .unwrap_or_else(|| panic!("no reply scripted for {cursor}"));
        let reply = if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().unwrap()
        };
        reply.into_result()
    }
}

/// Cursor of the 1-based page `number` in a [`ScriptedFetcher::chain`]
pub(crate) fn cursor(number: usize) -> PageCursor {
    if number <= 1 {
        PageCursor::First
    } else {
        PageCursor::token(format!("page-{number}"))
    }
}

pub(crate) fn page(records: Vec<Value>, next: Option<PageCursor>) -> Page {
    Page::new(records.into_iter().map(object).collect(), next)
}

pub(crate) fn object(value: Value) -> RawRecord {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

/// A raw vehicle that passes validation
pub(crate) fn vehicle(id: u64) -> Value {
    json!({
        "id": id,
        "name": format!("Vehicle {id}"),
        "brand": "Renault",
        "model": "Megane",
        "vehicleIdentificationNumber": format!("VF1{id:014}"),
        "dateVehicleFirstRegistered": "2020-05-04T00:00:00+02:00",
        "vehiclePriceIncTax": 10_000.0 + id as f64,
        "mileageFromOdometer": 1_000 * id,
        "dateOfEntryIntoStock": "2024-03-01"
    })
}

/// A raw vehicle that fails validation (no brand)
pub(crate) fn broken_vehicle(id: u64) -> Value {
    let mut value = vehicle(id);
    value
        .as_object_mut()
        .expect("vehicle is an object")
        .remove("brand");
    value
}

/// Canonical form of [`vehicle`]
pub(crate) fn canonical(id: u64) -> CanonicalRecord {
    normalize(&object(vehicle(id))).expect("vehicle fixture is valid")
}
