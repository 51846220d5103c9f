//! Snapshot store for suggestion records.

use super::record::{FeedBatch, SuggestionRecord};
use crate::error::SuggestError;
use ahash::AHashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// One immutable feed snapshot with its keyword index.
#[derive(Debug, Default)]
pub struct Snapshot {
    records: Vec<Arc<SuggestionRecord>>,
    /// Normalized keyword → indices into `records`, ascending (feed order).
    keywords: AHashMap<String, Vec<usize>>,
    generation: u64,
}

impl Snapshot {
    fn build(records: Vec<SuggestionRecord>, generation: u64) -> Self {
        let mut keywords: AHashMap<String, Vec<usize>> = AHashMap::new();
        for (index, record) in records.iter().enumerate() {
            for keyword in &record.keywords {
                keywords.entry(keyword.clone()).or_default().push(index);
            }
        }
        Self {
            records: records.into_iter().map(Arc::new).collect(),
            keywords,
            generation,
        }
    }

    /// Records whose keyword set contains `normalized_query`, in feed order.
    pub fn lookup(&self, normalized_query: &str) -> Vec<Arc<SuggestionRecord>> {
        self.keywords
            .get(normalized_query)
            .map(|indices| {
                indices
                    .iter()
                    .map(|&index| Arc::clone(&self.records[index]))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn records(&self) -> &[Arc<SuggestionRecord>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Load counter; 0 until the first load.
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// Holds the current feed snapshot.
///
/// Loads swap the whole snapshot behind a lock; readers clone the `Arc` and
/// never observe a half-applied load.
#[derive(Debug, Default)]
pub struct SuggestionStore {
    current: RwLock<Arc<Snapshot>>,
}

impl SuggestionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The snapshot visible right now.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Replace all records atomically.
    pub fn load(&self, records: Vec<SuggestionRecord>) {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let generation = guard.generation + 1;
        let snapshot = Snapshot::build(records, generation);
        tracing::info!(
            "Loaded suggestion snapshot {} ({} records, {} keywords)",
            generation,
            snapshot.records.len(),
            snapshot.keywords.len()
        );
        *guard = Arc::new(snapshot);
    }

    /// Decode and load the batches tagged with `data_type`.
    ///
    /// Malformed records are dropped individually. Returns the number of
    /// records loaded.
    pub fn load_batches(&self, batches: &[FeedBatch], data_type: &str) -> usize {
        let mut records = Vec::new();
        for batch in batches.iter().filter(|batch| batch.data_type == data_type) {
            for value in &batch.attachment {
                match SuggestionRecord::from_value(value) {
                    Ok(record) => records.push(record),
                    Err(e) => tracing::debug!("Dropping feed record: {}", e),
                }
            }
        }
        let count = records.len();
        self.load(records);
        count
    }

    /// Apply the outcome of an external feed fetch.
    ///
    /// A failed fetch keeps the last good snapshot; queries keep working on
    /// stale data.
    pub fn load_feed(
        &self,
        fetched: Result<Vec<FeedBatch>, SuggestError>,
        data_type: &str,
    ) -> Option<usize> {
        match fetched {
            Ok(batches) => Some(self.load_batches(&batches, data_type)),
            Err(e) => {
                tracing::warn!(
                    "Feed unavailable, keeping snapshot {}: {}",
                    self.snapshot().generation(),
                    e
                );
                None
            }
        }
    }

    /// Parse a feed document (a JSON array of batches).
    pub fn parse_feed(content: &str) -> Result<Vec<FeedBatch>, SuggestError> {
        serde_json::from_str(content).map_err(SuggestError::Feed)
    }

    /// Records matching `normalized_query` in the current snapshot.
    pub fn lookup(&self, normalized_query: &str) -> Vec<Arc<SuggestionRecord>> {
        self.snapshot().lookup(normalized_query)
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.snapshot().generation()
    }
}
