pub mod blocklist;
pub mod cli;
pub mod config;
pub mod error;
pub mod merge;
pub mod natural_sort;
pub mod provider;
pub mod result;
pub mod suggest;
pub mod telemetry;
pub mod tracing;

pub use blocklist::{BlockStore, Blocklist, Digest, FileStore, MemoryStore, ResyncOutcome};
pub use config::SuggestConfig;
pub use error::SuggestError;
pub use natural_sort::{SortOptions, SortValue, natural_compare, sort_naturally};
pub use provider::QuickSuggest;
pub use result::{Payload, ResultItem, ResultSource, ResultType};
pub use suggest::{QueryContext, SuggestionKind, SuggestionRecord, SuggestionStore};
pub use telemetry::{Action, TelemetryEvent, TelemetrySink};
