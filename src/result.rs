//! Output items of a query: a shared header and a kind-specific payload.

use crate::blocklist::Digest;
use crate::merge::CanonicalUrl;
use crate::suggest::{LiveSuggestion, SuggestionKind};
use serde::Serialize;

/// Coarse result type, as a consumer lays results out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultType {
    Search,
    Url,
}

/// Where a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    Search,
    History,
    Bookmarks,
    QuickSuggest,
}

/// Fields every result carries regardless of payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultHeader {
    pub source: ResultSource,
    /// The always-first result echoing the query as typed.
    pub heuristic: bool,
    pub best_match: bool,
    /// Output index requested by priority placement.
    pub suggested_index: Option<usize>,
    /// Comparison form of the result's URL, for payloads that have one.
    #[serde(skip)]
    pub canonical: Option<CanonicalUrl>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Payload {
    Search {
        engine: String,
        query: String,
        /// Set for search suggestions; `None` for a plain search.
        suggestion: Option<String>,
    },
    Url {
        url: String,
        title: String,
    },
    Suggestion(SuggestionPayload),
}

/// Display and telemetry data of a quick suggestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionPayload {
    pub id: i64,
    pub kind: SuggestionKind,
    pub url: String,
    /// Unsubstituted feed URL; blocking applies to this.
    pub original_url: String,
    pub title: String,
    pub full_keyword: String,
    pub click_url: String,
    pub impression_url: String,
    pub advertiser: String,
    pub iab_category: String,
    pub url_timestamp_index: Option<usize>,
    pub position: Option<usize>,
    #[serde(skip)]
    pub block_digest: Digest,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultItem {
    #[serde(flatten)]
    pub header: ResultHeader,
    pub payload: Payload,
}

impl ResultItem {
    fn new(source: ResultSource, payload: Payload) -> Self {
        let canonical = match &payload {
            Payload::Search { .. } => None,
            Payload::Url { url, .. } => Some(CanonicalUrl::new(url)),
            Payload::Suggestion(suggestion) => Some(CanonicalUrl::new(&suggestion.url)),
        };
        Self {
            header: ResultHeader {
                source,
                heuristic: false,
                best_match: false,
                suggested_index: None,
                canonical,
            },
            payload,
        }
    }

    /// The heuristic search result for `query`.
    pub fn heuristic_search(engine: impl Into<String>, query: impl Into<String>) -> Self {
        let mut item = Self::new(
            ResultSource::Search,
            Payload::Search {
                engine: engine.into(),
                query: query.into(),
                suggestion: None,
            },
        );
        item.header.heuristic = true;
        item
    }

    pub fn search_suggestion(
        engine: impl Into<String>,
        query: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::new(
            ResultSource::Search,
            Payload::Search {
                engine: engine.into(),
                query: query.into(),
                suggestion: Some(suggestion.into()),
            },
        )
    }

    /// A history visit.
    pub fn visit(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(
            ResultSource::History,
            Payload::Url {
                url: url.into(),
                title: title.into(),
            },
        )
    }

    pub fn bookmark(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(
            ResultSource::Bookmarks,
            Payload::Url {
                url: url.into(),
                title: title.into(),
            },
        )
    }

    pub fn from_suggestion(live: &LiveSuggestion) -> Self {
        let record = &live.record;
        Self::new(
            ResultSource::QuickSuggest,
            Payload::Suggestion(SuggestionPayload {
                id: record.id,
                kind: live.kind,
                url: live.url.clone(),
                original_url: record.url.clone(),
                title: record.title.clone(),
                full_keyword: live.full_keyword.clone(),
                click_url: live.click_url.clone(),
                impression_url: record.impression_url.clone(),
                advertiser: record.advertiser.clone(),
                iab_category: record.iab_category.clone(),
                url_timestamp_index: live.url_timestamp_index,
                position: record.position,
                block_digest: live.block_digest,
            }),
        )
    }

    pub const fn result_type(&self) -> ResultType {
        match self.payload {
            Payload::Search { .. } => ResultType::Search,
            Payload::Url { .. } | Payload::Suggestion(_) => ResultType::Url,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match &self.payload {
            Payload::Search { .. } => None,
            Payload::Url { url, .. } => Some(url),
            Payload::Suggestion(suggestion) => Some(&suggestion.url),
        }
    }

    pub const fn suggestion(&self) -> Option<&SuggestionPayload> {
        match &self.payload {
            Payload::Suggestion(suggestion) => Some(suggestion),
            _ => None,
        }
    }

    /// A non-heuristic search suggestion.
    pub const fn is_search_suggestion(&self) -> bool {
        !self.header.heuristic
            && matches!(
                self.payload,
                Payload::Search {
                    suggestion: Some(_),
                    ..
                }
            )
    }

    /// Telemetry type tag for this result.
    pub const fn telemetry_type(&self) -> &'static str {
        match &self.payload {
            Payload::Suggestion(suggestion) => suggestion.kind.telemetry_type(),
            Payload::Search {
                suggestion: Some(_),
                ..
            } => "search_suggest",
            Payload::Search { .. } => "search_engine",
            Payload::Url { .. } => match self.header.source {
                ResultSource::Bookmarks => "bookmark",
                _ => "history",
            },
        }
    }

    /// Feed id a block of this result refers to. Only suggestions can be blocked.
    pub fn block_id(&self) -> Option<i64> {
        self.suggestion().map(|suggestion| suggestion.id)
    }
}
