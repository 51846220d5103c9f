//! Suggestion records, their store and per-query resolution.

pub mod keyword;
pub mod record;
pub mod resolver;
pub mod store;
pub mod timestamp;

pub use record::{FeedBatch, RecordError, SuggestionKind, SuggestionRecord};
pub use resolver::{LiveSuggestion, MatchResolver, QueryContext};
pub use store::{Snapshot, SuggestionStore};
pub use timestamp::{Stamped, TimestampTemplate};
