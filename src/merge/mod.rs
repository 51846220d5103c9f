//! Blends live suggestions into the general result list.
//!
//! Output layout, before priority placement:
//!
//! ```text
//! suggestions_first:   heuristic, search suggestions, general, quick suggest
//! otherwise:           heuristic, general, quick suggest, search suggestions
//! ```
//!
//! A prioritized sponsored suggestion is then inserted at its target index,
//! never ahead of the heuristic result.

mod canonical;

pub use canonical::{CanonicalUrl, DedupeKey, UrlPrefix, prefix_rank};

use crate::config::SuggestConfig;
use crate::result::ResultItem;
use crate::suggest::{LiveSuggestion, TimestampTemplate};

/// Whether a general result at `canonical` duplicates `kept` without
/// outranking it.
fn is_discarded_by(
    kept: &DedupeKey,
    canonical: &CanonicalUrl,
    template: &TimestampTemplate,
) -> bool {
    canonical.rank() <= kept.canonical.rank() && kept.matches(canonical, template)
}

/// Merge live suggestions with `general` results under `config`.
///
/// `general` is in the order its source produced it and may contain the
/// heuristic result and search suggestions. Only the first heuristic result is
/// kept.
pub fn merge(
    suggestions: &[LiveSuggestion],
    general: Vec<ResultItem>,
    config: &SuggestConfig,
    template: &TimestampTemplate,
) -> Vec<ResultItem> {
    let mut heuristic: Option<ResultItem> = None;
    let mut search_suggestions = Vec::new();
    let mut urls = Vec::new();

    let mut kept: Vec<DedupeKey> = suggestions
        .iter()
        .map(|live| DedupeKey::stamped(&live.url, live.url_timestamp_index))
        .collect();

    for item in general {
        if item.header.heuristic {
            if heuristic.is_none() {
                heuristic = Some(item);
            } else {
                tracing::debug!("Dropping extra heuristic result");
            }
            continue;
        }
        if item.is_search_suggestion() {
            search_suggestions.push(item);
            continue;
        }

        let Some(canonical) = item.header.canonical.clone() else {
            urls.push(item);
            continue;
        };
        if kept.iter().any(|key| is_discarded_by(key, &canonical, template)) {
            tracing::debug!("Dropping duplicate result {}", item.url().unwrap_or_default());
            continue;
        }
        kept.push(DedupeKey::plain(canonical));
        urls.push(item);
    }

    let mut placed = Vec::new();
    let mut prioritized = Vec::new();
    for live in suggestions {
        let mut item = ResultItem::from_suggestion(live);
        if live.kind.is_sponsored() && config.sponsored_priority {
            let index = live
                .record
                .position
                .filter(|_| config.honor_position)
                .unwrap_or(config.sponsored_index);
            item.header.best_match = true;
            prioritized.push((index, item));
        } else {
            placed.push(item);
        }
    }

    // Slot 0 stays with the heuristic result.
    let first_free = usize::from(heuristic.is_some());
    let mut output: Vec<ResultItem> = heuristic.into_iter().collect();
    if config.suggestions_first {
        output.extend(search_suggestions);
        output.extend(urls);
        output.extend(placed);
    } else {
        output.extend(urls);
        output.extend(placed);
        output.extend(search_suggestions);
    }

    for (index, mut item) in prioritized {
        let index = index.max(first_free).min(output.len());
        item.header.suggested_index = Some(index);
        output.insert(index, item);
    }

    output
}
