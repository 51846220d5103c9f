//! Error handling types and utilities.

use std::path::PathBuf;

/// A specialized Result type for application-level operations (config loading, CLI).
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` methods.
pub type Result<T> = anyhow::Result<T>;

/// Errors surfaced by the suggestion engine.
///
/// None of these ever reach query output: malformed records and malformed
/// persisted blocklist values are absorbed where they occur. What remains are
/// persistence failures, caller cancellation and bad configuration.
#[derive(Debug, thiserror::Error)]
pub enum SuggestError {
    /// Reading or writing the persisted blocklist slot failed.
    #[error("blocklist store I/O failed at {path}: {source}")]
    StoreIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Serializing state for persistence failed.
    #[error("failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    /// The external feed could not be decoded at all.
    #[error("feed could not be decoded: {0}")]
    Feed(#[source] serde_json::Error),
    /// Configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// The caller abandoned the query.
    #[error("query cancelled")]
    Cancelled,
}
