//! Per-query selection of live suggestions.

use super::keyword::{full_keyword, normalize};
use super::record::{SuggestionKind, SuggestionRecord};
use super::store::SuggestionStore;
use super::timestamp::TimestampTemplate;
use crate::blocklist::{BlockStore, Blocklist, Digest};
use crate::config::SuggestConfig;
use chrono::NaiveDateTime;
use std::sync::Arc;

/// Input to one match/merge cycle.
#[derive(Debug, Clone, Copy)]
pub struct QueryContext<'a> {
    /// The search string exactly as typed.
    pub search_string: &'a str,
    pub is_private: bool,
    /// Flags sourced once for this query.
    pub config: &'a SuggestConfig,
}

impl<'a> QueryContext<'a> {
    pub const fn new(search_string: &'a str, config: &'a SuggestConfig) -> Self {
        Self {
            search_string,
            is_private: false,
            config,
        }
    }

    #[must_use]
    pub const fn private(mut self, is_private: bool) -> Self {
        self.is_private = is_private;
        self
    }

    /// Trimmed, lowercased, whitespace-collapsed search string.
    pub fn normalized_query(&self) -> String {
        normalize(self.search_string)
    }

    /// Whether a query in this context may produce any suggestion at all.
    pub fn is_active(&self) -> bool {
        if self.is_private && self.config.suppress_in_private {
            return false;
        }
        self.config.any_kind_enabled() && !self.search_string.trim().is_empty()
    }

    pub const fn kind_enabled(&self, kind: SuggestionKind) -> bool {
        match kind {
            SuggestionKind::Sponsored => self.config.sponsored_enabled,
            SuggestionKind::NonSponsored => self.config.nonsponsored_enabled,
        }
    }
}

/// A record that survived resolution, with its placeholders filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveSuggestion {
    pub record: Arc<SuggestionRecord>,
    pub kind: SuggestionKind,
    /// `record.url` with the timestamp placeholder substituted.
    pub url: String,
    /// `record.click_url` with the timestamp placeholder substituted.
    pub click_url: String,
    /// Byte offset of the substituted timestamp in `url`.
    pub url_timestamp_index: Option<usize>,
    /// Keyword phrase that completes the query, for display.
    pub full_keyword: String,
    /// Blocklist identity: digest of the unsubstituted URL.
    pub block_digest: Digest,
}

impl LiveSuggestion {
    /// The feed URL before substitution; what a block applies to.
    pub fn original_url(&self) -> &str {
        &self.record.url
    }
}

/// Selects at most one live suggestion per kind for a query.
#[derive(Debug)]
pub struct MatchResolver<'a, S> {
    store: &'a SuggestionStore,
    blocklist: &'a Blocklist<S>,
    timestamp: &'a TimestampTemplate,
}

impl<'a, S: BlockStore> MatchResolver<'a, S> {
    pub const fn new(
        store: &'a SuggestionStore,
        blocklist: &'a Blocklist<S>,
        timestamp: &'a TimestampTemplate,
    ) -> Self {
        Self {
            store,
            blocklist,
            timestamp,
        }
    }

    /// Resolve `ctx` against the current snapshot, stamping URLs with `now`.
    ///
    /// Candidates are considered in feed order; the first survivor of each
    /// kind wins. The result is in feed order as well.
    pub fn resolve(&self, ctx: &QueryContext<'_>, now: NaiveDateTime) -> Vec<LiveSuggestion> {
        if !ctx.is_active() {
            return Vec::new();
        }

        let query = ctx.normalized_query();
        let candidates = self.store.lookup(&query);
        if candidates.is_empty() {
            return Vec::new();
        }

        let stamp = self.timestamp.render(now);
        let categories = &ctx.config.nonsponsored_iab_categories;
        let mut live: Vec<LiveSuggestion> = Vec::with_capacity(2);

        for record in candidates {
            let kind = record.kind(categories);
            if !ctx.kind_enabled(kind) || live.iter().any(|s| s.kind == kind) {
                continue;
            }

            let block_digest = Digest::of(&record.url);
            if self.blocklist.contains(&block_digest) {
                tracing::debug!("Skipping blocked suggestion {}", record.id);
                continue;
            }

            let stamped = self.timestamp.substitute(&record.url, &stamp);
            let click_url = self.timestamp.substitute(&record.click_url, &stamp).url;
            live.push(LiveSuggestion {
                kind,
                url: stamped.url,
                click_url,
                url_timestamp_index: stamped.timestamp_index,
                full_keyword: full_keyword(&query, &record.keywords),
                block_digest,
                record,
            });

            if live.len() == 2 {
                break;
            }
        }

        live
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocklist::MemoryStore;
    use crate::suggest::record::FeedBatch;
    use assert2::check;
    use chrono::NaiveDate;
    use rstest::{fixture, rstest};
    use serde_json::json;

    struct Fixture {
        store: SuggestionStore,
        blocklist: Blocklist<MemoryStore>,
        timestamp: TimestampTemplate,
    }

    impl Fixture {
        fn resolve(&self, query: &str, config: &SuggestConfig) -> Vec<LiveSuggestion> {
            let ctx = QueryContext::new(query, config);
            MatchResolver::new(&self.store, &self.blocklist, &self.timestamp).resolve(&ctx, noon())
        }
    }

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2013, 5, 11)
            .unwrap()
            .and_hms_opt(13, 30, 0)
            .unwrap()
    }

    #[fixture]
    fn fixture() -> Fixture {
        let store = SuggestionStore::new();
        store.load_batches(
            &[FeedBatch {
                data_type: "data".to_string(),
                attachment: vec![
                    json!({
                        "id": 1,
                        "url": "http://example.com/amp",
                        "title": "AMP Suggestion",
                        "keywords": ["amp", "amp store"],
                        "click_url": "http://example.com/amp-click",
                        "advertiser": "Amp",
                        "iab_category": "22 - Shopping",
                    }),
                    json!({
                        "id": 2,
                        "url": "http://example.com/wikipedia",
                        "title": "Wikipedia Suggestion",
                        "keywords": ["wikipedia", "amp"],
                        "advertiser": "Wikipedia",
                        "iab_category": "5 - Education",
                    }),
                    json!({
                        "id": 3,
                        "url": "http://example.com/amp-second",
                        "title": "Second AMP",
                        "keywords": ["amp"],
                        "advertiser": "Amp",
                        "iab_category": "22 - Shopping",
                    }),
                    json!({
                        "id": 4,
                        "url": "http://example.com/timestamp-%YYYYMMDDHH%",
                        "title": "Timestamp",
                        "keywords": ["timestamp"],
                        "click_url": "http://example.com/click-%YYYYMMDDHH%",
                        "advertiser": "Stamp",
                        "iab_category": "22 - Shopping",
                    }),
                ],
            }],
            "data",
        );
        Fixture {
            store,
            blocklist: Blocklist::new(MemoryStore::new()),
            timestamp: TimestampTemplate::default(),
        }
    }

    #[rstest]
    fn test_one_per_kind_in_feed_order(fixture: Fixture) {
        let live = fixture.resolve("amp", &SuggestConfig::default());
        let ids: Vec<i64> = live.iter().map(|s| s.record.id).collect();
        check!(ids == vec![1, 2]);
        check!(live[0].kind == SuggestionKind::Sponsored);
        check!(live[1].kind == SuggestionKind::NonSponsored);
    }

    #[rstest]
    #[case("  AMP")]
    #[case("Amp")]
    #[case("amp   ")]
    fn test_case_and_leading_space_insensitive(fixture: Fixture, #[case] query: &str) {
        check!(fixture.resolve(query, &SuggestConfig::default()).len() == 2);
    }

    #[rstest]
    fn test_disabled_kind_dropped(fixture: Fixture) {
        let config = SuggestConfig {
            sponsored_enabled: false,
            ..SuggestConfig::default()
        };
        let live = fixture.resolve("amp", &config);
        check!(live.len() == 1);
        check!(live[0].record.id == 2);
    }

    #[rstest]
    fn test_both_disabled_is_empty(fixture: Fixture) {
        let config = SuggestConfig {
            sponsored_enabled: false,
            nonsponsored_enabled: false,
            ..SuggestConfig::default()
        };
        check!(fixture.resolve("amp", &config).is_empty());
        check!(fixture.resolve("wikipedia", &config).is_empty());
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("am")]
    #[case("amp stor")]
    fn test_no_partial_matches(fixture: Fixture, #[case] query: &str) {
        check!(fixture.resolve(query, &SuggestConfig::default()).is_empty());
    }

    #[rstest]
    fn test_private_context(fixture: Fixture) {
        let config = SuggestConfig::default();
        let ctx = QueryContext::new("amp", &config).private(true);
        let resolver = MatchResolver::new(&fixture.store, &fixture.blocklist, &fixture.timestamp);
        check!(!ctx.is_active());
        check!(resolver.resolve(&ctx, noon()).is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_blocked_falls_through_to_next_record(fixture: Fixture) {
        fixture.blocklist.add("http://example.com/amp").await.unwrap();
        let live = fixture.resolve("amp", &SuggestConfig::default());
        let ids: Vec<i64> = live.iter().map(|s| s.record.id).collect();
        check!(ids == vec![2, 3]);
    }

    #[rstest]
    fn test_timestamp_substituted(fixture: Fixture) {
        let live = fixture.resolve("timestamp", &SuggestConfig::default());
        check!(live.len() == 1);
        check!(live[0].url == "http://example.com/timestamp-2013051113");
        check!(live[0].click_url == "http://example.com/click-2013051113");
        check!(live[0].url_timestamp_index == Some("http://example.com/timestamp-".len()));
        check!(live[0].original_url() == "http://example.com/timestamp-%YYYYMMDDHH%");
        check!(live[0].block_digest == Digest::of("http://example.com/timestamp-%YYYYMMDDHH%"));
    }

    #[rstest]
    fn test_full_keyword(fixture: Fixture) {
        let live = fixture.resolve("amp", &SuggestConfig::default());
        check!(live[0].full_keyword == "amp");
    }
}
