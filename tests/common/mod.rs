//! Shared fixtures for integration tests.
//!
//! # Available Fixtures
//!
//! - `engine`: a [`TestEngine`] with [`feed`] loaded, an in-memory blocklist
//!   and buffered telemetry
//! - `blocklist_dir`: a temporary directory for file-backed blocklists
//!
//! Queries that depend on the clock should go through `query_at` with
//! [`noon`] so timestamp placeholders render deterministically.

#![allow(dead_code)] // Helpers are shared across integration test crates

use chrono::{NaiveDate, NaiveDateTime};
use quicksuggest::SuggestError;
use quicksuggest::blocklist::{BlockStore, Blocklist, FileStore, MemoryStore};
use quicksuggest::suggest::FeedBatch;
use quicksuggest::telemetry::MemoryTelemetry;
use quicksuggest::{Payload, QueryContext, QuickSuggest, ResultItem, SuggestConfig};
use rstest::fixture;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

pub type TestEngine = QuickSuggest<MemoryStore, MemoryTelemetry>;

pub const SPONSORED_URL: &str = "http://example.com/amp";
pub const NONSPONSORED_URL: &str = "http://example.com/wikipedia";
pub const TIMESTAMP_URL: &str = "http://example.com/timestamp-%YYYYMMDDHH%";
/// `TIMESTAMP_URL` as stamped at [`noon`].
pub const TIMESTAMP_URL_AT_NOON: &str = "http://example.com/timestamp-2013051112";

/// Feed with a sponsored, a non-sponsored and a timestamped record in the
/// default batch, plus one record under an alternate data type.
pub fn feed() -> Vec<FeedBatch> {
    let value = json!([
        {
            "type": "data",
            "attachment": [
                {
                    "id": 1,
                    "url": SPONSORED_URL,
                    "title": "AMP Suggestion",
                    "keywords": ["amp", "amp and wikipedia"],
                    "click_url": "http://example.com/amp-click",
                    "impression_url": "http://example.com/amp-impression",
                    "advertiser": "Amp",
                    "iab_category": "22 - Shopping",
                },
                {
                    "id": 2,
                    "url": NONSPONSORED_URL,
                    "title": "Wikipedia Suggestion",
                    "keywords": ["wikipedia", "amp and wikipedia"],
                    "click_url": "http://example.com/wikipedia-click",
                    "impression_url": "http://example.com/wikipedia-impression",
                    "advertiser": "Wikipedia",
                    "iab_category": "5 - Education",
                },
                {
                    "id": 3,
                    "url": TIMESTAMP_URL,
                    "title": "Timestamp Suggestion",
                    "keywords": ["timestamp"],
                    "click_url": "http://example.com/timestamp-click-%YYYYMMDDHH%",
                    "advertiser": "Stamp",
                    "iab_category": "22 - Shopping",
                },
                { "id": 4, "title": "No URL", "keywords": ["amp"], "advertiser": "Broken" },
            ],
        },
        {
            "type": "test-data-type",
            "attachment": [{
                "id": 10,
                "url": "http://example.com/test-data-type",
                "title": "Test Data Type Suggestion",
                "keywords": ["test data type"],
                "advertiser": "Test",
                "iab_category": "22 - Shopping",
            }],
        },
    ]);
    serde_json::from_value(value).expect("feed fixture should deserialize")
}

/// 2013-05-11 12:00, the fixed clock for timestamp tests.
pub fn noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2013, 5, 11)
        .and_then(|date| date.and_hms_opt(12, 0, 0))
        .expect("valid fixed time")
}

#[fixture]
pub fn engine() -> TestEngine {
    let engine = QuickSuggest::with_telemetry(
        Blocklist::new(MemoryStore::new()),
        MemoryTelemetry::new(),
    );
    engine.load_feed(Ok(feed()), "data");
    engine
}

/// Run one query at [`noon`] and return the merged output.
pub fn query(
    engine: &TestEngine,
    search: &str,
    config: &SuggestConfig,
    general: Vec<ResultItem>,
) -> Vec<ResultItem> {
    let ctx = QueryContext::new(search, config);
    engine
        .query_at(&ctx, general, noon(), &CancellationToken::new())
        .expect("query should succeed")
}

/// One label per result: suggestion and visit titles, search suggestion text,
/// and `heuristic` for the heuristic result.
pub fn labels(items: &[ResultItem]) -> Vec<String> {
    items
        .iter()
        .map(|item| match &item.payload {
            Payload::Search {
                suggestion: Some(suggestion),
                ..
            } => suggestion.clone(),
            Payload::Search { .. } => "heuristic".to_string(),
            Payload::Url { title, .. } => title.clone(),
            Payload::Suggestion(suggestion) => suggestion.title.clone(),
        })
        .collect()
}

/// A temporary directory holding a file-backed blocklist.
pub struct BlocklistDir {
    _temp: TempDir,
    path: PathBuf,
}

impl BlocklistDir {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn store(&self) -> FileStore {
        FileStore::new(&self.path)
    }

    /// Overwrite the persisted slot as another process would.
    pub fn write_raw(&self, content: &str) {
        std::fs::write(&self.path, content).expect("Failed to write blocklist file");
    }

    pub fn read_raw(&self) -> Option<String> {
        std::fs::read_to_string(&self.path).ok()
    }
}

#[fixture]
pub fn blocklist_dir() -> BlocklistDir {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let path = temp.path().join("blocked-digests.json");
    BlocklistDir { _temp: temp, path }
}

/// A memory slot whose writes can be made to fail.
#[derive(Debug, Default)]
pub struct FailingStore {
    inner: MemoryStore,
    fail_writes: AtomicBool,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn get(&self) -> Option<String> {
        self.inner.get()
    }
}

impl BlockStore for FailingStore {
    async fn read(&self) -> Result<Option<String>, SuggestError> {
        self.inner.read().await
    }

    async fn write(&self, value: &str) -> Result<(), SuggestError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SuggestError::StoreIo {
                path: PathBuf::from("failing-store"),
                source: std::io::Error::other("disk full"),
            });
        }
        self.inner.write(value).await
    }
}
