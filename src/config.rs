//! Feature flags and tunables consumed by a query.
//!
//! The host application reads its settings once per query and passes a
//! [`SuggestConfig`] in explicitly; nothing in the engine consults global state.

use crate::error::Result;
use crate::suggest::TimestampTemplate;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Feed batch type used when no override is configured.
pub const DEFAULT_DATA_TYPE: &str = "data";

/// IAB categories whose records are non-sponsored unless they say otherwise.
pub const DEFAULT_NONSPONSORED_IAB_CATEGORIES: &[&str] = &["5 - Education"];

/// Placeholder token embedded in suggestion URLs.
pub const DEFAULT_TIMESTAMP_TEMPLATE: &str = "%YYYYMMDDHH%";

/// chrono format used to render the current time into the placeholder.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y%m%d%H";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SuggestConfig {
    /// Show sponsored suggestions.
    pub sponsored_enabled: bool,
    /// Show non-sponsored suggestions.
    pub nonsponsored_enabled: bool,
    /// Never suggest in private browsing contexts.
    pub suppress_in_private: bool,
    /// Promote sponsored suggestions to best match at `sponsored_index`.
    pub sponsored_priority: bool,
    /// Output index of a prioritized sponsored suggestion. Index 0 is the heuristic slot.
    pub sponsored_index: usize,
    /// Let a record's own `position` override `sponsored_index`.
    pub honor_position: bool,
    /// Search suggestions come before general results.
    pub suggestions_first: bool,
    /// Feed batch `type` to load. `None` selects [`DEFAULT_DATA_TYPE`].
    pub data_type: Option<String>,
    /// Categories treated as non-sponsored when a record has no explicit flag.
    pub nonsponsored_iab_categories: Vec<String>,
    pub timestamp: TimestampConfig,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            sponsored_enabled: true,
            nonsponsored_enabled: true,
            suppress_in_private: true,
            sponsored_priority: false,
            sponsored_index: 1,
            honor_position: false,
            suggestions_first: true,
            data_type: None,
            nonsponsored_iab_categories: DEFAULT_NONSPONSORED_IAB_CATEGORIES
                .iter()
                .map(ToString::to_string)
                .collect(),
            timestamp: TimestampConfig::default(),
        }
    }
}

/// Shape of the timestamp placeholder shared with the feed producer.
///
/// The field width is whatever `format` renders to; it is not fixed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimestampConfig {
    pub template: String,
    pub format: String,
}

impl Default for TimestampConfig {
    fn default() -> Self {
        Self {
            template: DEFAULT_TIMESTAMP_TEMPLATE.to_string(),
            format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

impl SuggestConfig {
    /// The feed batch type this configuration selects.
    pub fn data_type(&self) -> &str {
        self.data_type.as_deref().unwrap_or(DEFAULT_DATA_TYPE)
    }

    /// True when at least one suggestion kind may be shown.
    pub const fn any_kind_enabled(&self) -> bool {
        self.sponsored_enabled || self.nonsponsored_enabled
    }

    /// Parse a TOML document. Missing keys fall back to defaults.
    ///
    /// The `[timestamp]` table is validated here so a bad format is reported
    /// at load time rather than on every query.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).context("Failed to parse suggest configuration")?;
        TimestampTemplate::new(&config.timestamp)
            .context("Invalid [timestamp] configuration")?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config at {}", path.display()))
    }
}
