//! Persistence slots for the blocklist.
//!
//! A slot holds one string. The blocklist writes a JSON array of digests into
//! it; anything else may overwrite it at any time.

use crate::error::SuggestError;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// A single string-valued persisted slot.
pub trait BlockStore: Send + Sync {
    /// Current value, `None` when the slot was never written or was cleared.
    fn read(&self) -> impl Future<Output = Result<Option<String>, SuggestError>> + Send;

    /// Durably replace the value. Returns once the write is persisted.
    fn write(&self, value: &str) -> impl Future<Output = Result<(), SuggestError>> + Send;
}

/// In-memory slot, for hosts that persist elsewhere and for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    value: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value without going through the async interface.
    pub fn get(&self) -> Option<String> {
        self.value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Overwrite the slot as an external party would. `None` clears it.
    pub fn set(&self, value: Option<&str>) {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = value.map(str::to_string);
    }
}

impl BlockStore for MemoryStore {
    async fn read(&self) -> Result<Option<String>, SuggestError> {
        Ok(self.get())
    }

    async fn write(&self, value: &str) -> Result<(), SuggestError> {
        self.set(Some(value));
        Ok(())
    }
}

/// File-backed slot. Writes go through a temporary file and a rename so a
/// crash never leaves a truncated value behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/quicksuggest/blocked-digests.json`, if the platform has a data dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("quicksuggest").join("blocked-digests.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SuggestError {
        SuggestError::StoreIo {
            path: self.path.clone(),
            source,
        }
    }
}

impl BlockStore for FileStore {
    async fn read(&self) -> Result<Option<String>, SuggestError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    async fn write(&self, value: &str) -> Result<(), SuggestError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        tracing::debug!("Persisted blocklist to {}", self.path.display());
        Ok(())
    }
}
