//! Query entry point tying the store, blocklist, resolver and merger together.

use crate::blocklist::{BlockStore, Blocklist};
use crate::error::SuggestError;
use crate::merge::merge;
use crate::result::ResultItem;
use crate::suggest::{FeedBatch, MatchResolver, QueryContext, SuggestionStore, TimestampTemplate};
use crate::telemetry::{Action, TelemetryEvent, TelemetrySink, TracingTelemetry};
use chrono::{Local, NaiveDateTime};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// The quick suggest engine.
///
/// Queries only read shared state and may run concurrently with each other,
/// with feed loads and with blocklist mutations.
#[derive(Debug)]
pub struct QuickSuggest<S, T = TracingTelemetry> {
    store: SuggestionStore,
    blocklist: Blocklist<S>,
    telemetry: T,
}

impl<S: BlockStore> QuickSuggest<S> {
    pub fn new(blocklist: Blocklist<S>) -> Self {
        Self::with_telemetry(blocklist, TracingTelemetry)
    }
}

impl<S: BlockStore, T: TelemetrySink> QuickSuggest<S, T> {
    pub fn with_telemetry(blocklist: Blocklist<S>, telemetry: T) -> Self {
        Self {
            store: SuggestionStore::new(),
            blocklist,
            telemetry,
        }
    }

    pub const fn store(&self) -> &SuggestionStore {
        &self.store
    }

    pub const fn blocklist(&self) -> &Blocklist<S> {
        &self.blocklist
    }

    pub const fn telemetry(&self) -> &T {
        &self.telemetry
    }

    /// Apply a feed fetch outcome, selecting batches by `data_type`.
    pub fn load_feed(
        &self,
        fetched: Result<Vec<FeedBatch>, SuggestError>,
        data_type: &str,
    ) -> Option<usize> {
        self.store.load_feed(fetched, data_type)
    }

    /// Run one query at the current local time.
    pub fn query(
        &self,
        ctx: &QueryContext<'_>,
        general: Vec<ResultItem>,
        cancel: &CancellationToken,
    ) -> Result<Vec<ResultItem>, SuggestError> {
        self.query_at(ctx, general, Local::now().naive_local(), cancel)
    }

    /// Run one query with timestamps rendered from `now`.
    ///
    /// Returns [`SuggestError::Cancelled`] if `cancel` fires before the merge
    /// completes. An unusable timestamp configuration only drops the quick
    /// suggestions; general results are still merged and returned. Queries
    /// have no side effects besides telemetry.
    pub fn query_at(
        &self,
        ctx: &QueryContext<'_>,
        general: Vec<ResultItem>,
        now: NaiveDateTime,
        cancel: &CancellationToken,
    ) -> Result<Vec<ResultItem>, SuggestError> {
        if cancel.is_cancelled() {
            return Err(SuggestError::Cancelled);
        }
        let template = match TimestampTemplate::new(&ctx.config.timestamp) {
            Ok(template) => template,
            Err(e) => {
                tracing::warn!("Skipping quick suggestions: {}", e);
                return Ok(merge(&[], general, ctx.config, &TimestampTemplate::default()));
            }
        };

        let started = Instant::now();
        let resolver = MatchResolver::new(&self.store, &self.blocklist, &template);
        let live = resolver.resolve(ctx, now);
        if ctx.is_active() {
            self.telemetry.record(TelemetryEvent::FeedLatency {
                elapsed: started.elapsed(),
                generation: self.store.generation(),
                matched: live.len(),
            });
        }

        if cancel.is_cancelled() {
            tracing::debug!("Query cancelled after resolution");
            return Err(SuggestError::Cancelled);
        }
        Ok(merge(&live, general, ctx.config, &template))
    }

    /// Report a user action on a result shown at `position`.
    pub fn record_action(&self, action: Action, item: &ResultItem, position: usize) {
        self.telemetry.record(TelemetryEvent::action(action, item, position));
    }

    /// Block the suggestion behind `item`. Returns false if `item` is not a
    /// quick suggestion.
    pub async fn block(&self, item: &ResultItem, position: usize) -> Result<bool, SuggestError> {
        let Some(suggestion) = item.suggestion() else {
            return Ok(false);
        };
        self.blocklist.add(&suggestion.original_url).await?;
        self.record_action(Action::Block, item, position);
        Ok(true)
    }
}
