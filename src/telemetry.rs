//! Structured events a host can forward to its telemetry transport.

use crate::result::{ResultItem, ResultSource};
use serde::Serialize;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// A user action on a shown result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Block,
    Move,
    Send,
    Copy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// Time spent resolving one query against the feed snapshot.
    FeedLatency {
        #[serde(rename = "elapsed_us", serialize_with = "as_micros")]
        elapsed: Duration,
        generation: u64,
        matched: usize,
    },
    Action {
        action: Action,
        telemetry_type: &'static str,
        source: ResultSource,
        /// Output index of the result the action was taken on.
        position: usize,
        block_id: Option<i64>,
        advertiser: Option<String>,
        best_match: bool,
    },
}

impl TelemetryEvent {
    /// Describe `action` on `item`, shown at output index `position`.
    pub fn action(action: Action, item: &ResultItem, position: usize) -> Self {
        let suggestion = item.suggestion();
        Self::Action {
            action,
            telemetry_type: item.telemetry_type(),
            source: item.header.source,
            position,
            block_id: item.block_id(),
            advertiser: suggestion.map(|s| s.advertiser.clone()),
            best_match: item.header.best_match,
        }
    }
}

fn as_micros<S: serde::Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX))
}

/// Receives telemetry events. Implementations must not block.
pub trait TelemetrySink: Send + Sync {
    fn record(&self, event: TelemetryEvent);
}

/// Emits events as `tracing` records under the `quicksuggest::telemetry` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTelemetry;

impl TelemetrySink for TracingTelemetry {
    fn record(&self, event: TelemetryEvent) {
        match serde_json::to_string(&event) {
            Ok(json) => tracing::info!(target: "quicksuggest::telemetry", "{}", json),
            Err(e) => tracing::warn!("Failed to serialize telemetry event: {}", e),
        }
    }
}

/// Buffers events in memory, for hosts that batch and for tests.
#[derive(Debug, Default)]
pub struct MemoryTelemetry {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl MemoryTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything recorded so far.
    pub fn take(&self) -> Vec<TelemetryEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl TelemetrySink for MemoryTelemetry {
    fn record(&self, event: TelemetryEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
