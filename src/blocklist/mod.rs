//! Persisted set of blocked suggestion URLs.
//!
//! The in-memory set is authoritative for queries. Every mutation is written
//! through to a [`BlockStore`] first and only takes effect once the write
//! succeeds. Any external change to the store is folded back in with
//! [`resync`].

mod digest;
mod store;

pub use digest::{Digest, ParseDigestError};
pub use store::{BlockStore, FileStore, MemoryStore};

use crate::error::SuggestError;
use ahash::AHashSet;
use std::sync::{PoisonError, RwLock};
use tokio::sync::Mutex;

/// Set of digests that remembers insertion order for persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestSet {
    order: Vec<Digest>,
    members: AHashSet<Digest>,
}

impl DigestSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a digest. Returns false if it was already present.
    pub fn insert(&mut self, digest: Digest) -> bool {
        if self.members.insert(digest) {
            self.order.push(digest);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, digest: &Digest) -> bool {
        self.members.contains(digest)
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Digest> {
        self.order.iter()
    }

    /// Persisted form: a JSON array of hex digests in insertion order.
    pub fn to_json(&self) -> Result<String, SuggestError> {
        serde_json::to_string(&self.order).map_err(|source| SuggestError::Serialize {
            what: "blocklist",
            source,
        })
    }
}

impl FromIterator<Digest> for DigestSet {
    fn from_iter<I: IntoIterator<Item = Digest>>(iter: I) -> Self {
        let mut set = Self::new();
        for digest in iter {
            set.insert(digest);
        }
        set
    }
}

/// What a resync did to the in-memory set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResyncOutcome {
    /// The store was absent or empty; nothing is blocked.
    Cleared,
    /// The store held a valid array; the set now mirrors it.
    Replaced { count: usize, skipped: usize },
    /// The store held something unparsable; the set is untouched.
    Malformed,
}

/// Compute the digest set implied by a raw persisted value.
///
/// A valid array replaces the set wholesale. A malformed value leaves the
/// current set in force so that corruption never unblocks anything. Array
/// entries that are not digest strings are skipped.
pub fn resync(current: &DigestSet, raw: Option<&str>) -> (DigestSet, ResyncOutcome) {
    let raw = match raw.map(str::trim) {
        None | Some("") => return (DigestSet::new(), ResyncOutcome::Cleared),
        Some(raw) => raw,
    };

    let entries: Vec<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(entries) => entries,
        Err(_) => return (current.clone(), ResyncOutcome::Malformed),
    };

    let mut skipped = 0;
    let set: DigestSet = entries
        .iter()
        .filter_map(|entry| {
            let parsed = entry.as_str().and_then(|s| s.parse::<Digest>().ok());
            if parsed.is_none() {
                skipped += 1;
            }
            parsed
        })
        .collect();
    let count = set.len();
    (set, ResyncOutcome::Replaced { count, skipped })
}

/// Blocked suggestions, persisted through `S`.
#[derive(Debug)]
pub struct Blocklist<S> {
    store: S,
    digests: RwLock<DigestSet>,
    /// Serializes mutations with their persistence. Holds the value this
    /// blocklist last wrote, to recognize its own change notifications.
    last_written: Mutex<Option<String>>,
}

impl<S: BlockStore> Blocklist<S> {
    /// An empty blocklist. Call [`Blocklist::load`] to pick up persisted state.
    pub fn new(store: S) -> Self {
        Self {
            store,
            digests: RwLock::new(DigestSet::new()),
            last_written: Mutex::new(None),
        }
    }

    /// Create a blocklist and load its persisted state.
    pub async fn open(store: S) -> Result<Self, SuggestError> {
        let blocklist = Self::new(store);
        blocklist.load().await?;
        Ok(blocklist)
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Re-read the store and resync from it.
    pub async fn load(&self) -> Result<ResyncOutcome, SuggestError> {
        let mut last_written = self.last_written.lock().await;
        let raw = self.store.read().await?;
        *last_written = None;
        Ok(self.apply(raw.as_deref()))
    }

    /// Block `url`. Returns once the store reflects the change.
    pub async fn add(&self, url: &str) -> Result<(), SuggestError> {
        let mut last_written = self.last_written.lock().await;
        let digest = Digest::of(url);
        let mut next = self.read_digests().clone();
        if !next.insert(digest) {
            tracing::debug!("Suggestion already blocked: {}", digest);
        }
        let json = next.to_json()?;
        self.store.write(&json).await?;
        *self.write_digests() = next;
        tracing::info!("Blocked suggestion {}", digest);
        *last_written = Some(json);
        Ok(())
    }

    /// Whether `url` is blocked.
    pub fn has(&self, url: &str) -> bool {
        self.contains(&Digest::of(url))
    }

    /// Whether a digest is blocked.
    pub fn contains(&self, digest: &Digest) -> bool {
        self.read_digests().contains(digest)
    }

    /// Unblock everything. Returns once the store reflects the change.
    pub async fn clear(&self) -> Result<(), SuggestError> {
        let mut last_written = self.last_written.lock().await;
        let next = DigestSet::new();
        let json = next.to_json()?;
        self.store.write(&json).await?;
        *self.write_digests() = next;
        tracing::info!("Cleared blocked suggestions");
        *last_written = Some(json);
        Ok(())
    }

    /// Notification hook for the host: the store now holds `new_value`.
    ///
    /// A value equal to what this blocklist last wrote is its own echo and is
    /// ignored. Anything else is resynced.
    pub async fn on_external_store_changed(&self, new_value: Option<&str>) -> ResyncOutcome {
        let mut last_written = self.last_written.lock().await;
        if new_value.is_some() && new_value == last_written.as_deref() {
            tracing::debug!("Ignoring blocklist change notification for our own write");
            return ResyncOutcome::Replaced {
                count: self.len(),
                skipped: 0,
            };
        }
        *last_written = None;
        self.apply(new_value)
    }

    /// Snapshot of the blocked digests in insertion order.
    pub fn digests(&self) -> Vec<Digest> {
        self.read_digests().iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.read_digests().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_digests().is_empty()
    }

    fn apply(&self, raw: Option<&str>) -> ResyncOutcome {
        let mut digests = self.write_digests();
        let (next, outcome) = resync(&digests, raw);
        match outcome {
            ResyncOutcome::Malformed => {
                tracing::warn!(
                    "Ignoring malformed blocklist value; keeping {} blocked suggestions",
                    digests.len()
                );
            }
            ResyncOutcome::Replaced { count, skipped } => {
                if skipped > 0 {
                    tracing::warn!("Skipped {} invalid blocklist entries", skipped);
                }
                tracing::debug!("Blocklist synced from store ({} entries)", count);
            }
            ResyncOutcome::Cleared => tracing::debug!("Blocklist store empty; nothing blocked"),
        }
        *digests = next;
        outcome
    }

    fn read_digests(&self) -> std::sync::RwLockReadGuard<'_, DigestSet> {
        self.digests.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_digests(&self) -> std::sync::RwLockWriteGuard<'_, DigestSet> {
        self.digests.write().unwrap_or_else(PoisonError::into_inner)
    }
}
