//! Timestamp placeholders in suggestion URLs.
//!
//! Feed URLs may embed a template token that is replaced with the current time
//! at query time. A URL recorded in history keeps whatever time it was stamped
//! with, so deduplication needs to recognize "same URL, different stamp".

use crate::config::TimestampConfig;
use crate::error::SuggestError;
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampTemplate {
    template: String,
    format: String,
    width: usize,
}

/// A URL after placeholder substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamped {
    pub url: String,
    /// Byte offset of the substituted field, if the URL had a placeholder.
    pub timestamp_index: Option<usize>,
}

impl TimestampTemplate {
    /// Build a template from configuration.
    ///
    /// The format must render to a non-empty run of ASCII digits; its rendered
    /// length becomes the field width.
    pub fn new(config: &TimestampConfig) -> Result<Self, SuggestError> {
        if config.template.is_empty() {
            return Err(SuggestError::Config(
                "timestamp template must not be empty".to_string(),
            ));
        }

        // Any fixed instant works; all numeric specifiers are zero padded.
        let reference = NaiveDate::from_ymd_opt(2013, 5, 11)
            .and_then(|date| date.and_hms_opt(13, 0, 0))
            .ok_or_else(|| SuggestError::Config("invalid reference time".to_string()))?;
        let sample = render_with(&config.format, reference).ok_or_else(|| {
            SuggestError::Config(format!("invalid timestamp format '{}'", config.format))
        })?;
        if sample.is_empty() || !sample.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SuggestError::Config(format!(
                "timestamp format '{}' must render digits only, got '{}'",
                config.format, sample
            )));
        }

        Ok(Self {
            template: config.template.clone(),
            format: config.format.clone(),
            width: sample.len(),
        })
    }

    /// The placeholder token.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Width of a rendered timestamp field.
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Render `now` as a timestamp field.
    pub fn render(&self, now: NaiveDateTime) -> String {
        // The format was validated in `new`.
        render_with(&self.format, now).unwrap_or_default()
    }

    /// Replace the first placeholder in `url` with `stamp`.
    ///
    /// A URL carries at most one timestamp field; later occurrences of the
    /// token are left as they are and take part in deduplication as plain text.
    pub fn substitute(&self, url: &str, stamp: &str) -> Stamped {
        let timestamp_index = url.find(&self.template);
        let url = match timestamp_index {
            Some(_) => url.replacen(&self.template, stamp, 1),
            None => url.to_string(),
        };
        Stamped {
            url,
            timestamp_index,
        }
    }

    /// Whether `field` is a syntactically valid rendered timestamp.
    pub fn is_timestamp(&self, field: &str) -> bool {
        field.len() == self.width && field.bytes().all(|b| b.is_ascii_digit())
    }
}

impl Default for TimestampTemplate {
    fn default() -> Self {
        Self {
            template: crate::config::DEFAULT_TIMESTAMP_TEMPLATE.to_string(),
            format: crate::config::DEFAULT_TIMESTAMP_FORMAT.to_string(),
            width: 10,
        }
    }
}

fn render_with(format: &str, time: NaiveDateTime) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", time.format(format)).ok()?;
    Some(out)
}
