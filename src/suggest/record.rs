//! Suggestion records as delivered by the configuration feed.

use super::keyword::normalize;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One batch of the feed. Only batches whose `type` matches the configured
/// data type are loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedBatch {
    #[serde(rename = "type")]
    pub data_type: String,
    /// Records are kept as raw JSON so that one malformed record does not
    /// poison the whole batch.
    #[serde(default)]
    pub attachment: Vec<Value>,
}

/// Whether a suggestion is paid placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    Sponsored,
    NonSponsored,
}

impl SuggestionKind {
    /// Telemetry type tag reported for results of this kind.
    pub const fn telemetry_type(self) -> &'static str {
        match self {
            Self::Sponsored => "adm_sponsored",
            Self::NonSponsored => "adm_nonsponsored",
        }
    }

    pub const fn is_sponsored(self) -> bool {
        matches!(self, Self::Sponsored)
    }
}

/// An immutable candidate suggestion from one feed snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionRecord {
    pub id: i64,
    /// Destination URL. May contain the timestamp placeholder.
    pub url: String,
    pub title: String,
    /// Normalized keywords, in feed order.
    pub keywords: Vec<String>,
    pub click_url: String,
    pub impression_url: String,
    pub advertiser: String,
    pub iab_category: String,
    pub is_sponsored: Option<bool>,
    /// Placement hint, honored only when configuration allows it.
    pub position: Option<usize>,
    pub score: Option<f64>,
}

impl SuggestionRecord {
    /// Resolve the record's kind. An explicit flag wins; otherwise the IAB
    /// category decides.
    pub fn kind(&self, nonsponsored_categories: &[String]) -> SuggestionKind {
        let sponsored = self.is_sponsored.unwrap_or_else(|| {
            !nonsponsored_categories
                .iter()
                .any(|category| category == &self.iab_category)
        });
        if sponsored {
            SuggestionKind::Sponsored
        } else {
            SuggestionKind::NonSponsored
        }
    }

    /// Decode one feed record, rejecting it if a required field is missing.
    pub fn from_value(value: &Value) -> Result<Self, RecordError> {
        let raw = RawRecord::deserialize(value).map_err(RecordError::Invalid)?;

        let id = raw.id.ok_or(RecordError::MissingField("id"))?;
        let url = raw
            .url
            .filter(|url| !url.is_empty())
            .ok_or(RecordError::MissingField("url"))?;
        let title = raw.title.ok_or(RecordError::MissingField("title"))?;
        let advertiser = raw.advertiser.ok_or(RecordError::MissingField("advertiser"))?;

        let mut keywords: Vec<String> = Vec::new();
        for keyword in raw.keywords.unwrap_or_default() {
            let keyword = normalize(&keyword);
            if !keyword.is_empty() && !keywords.contains(&keyword) {
                keywords.push(keyword);
            }
        }
        if keywords.is_empty() {
            return Err(RecordError::MissingField("keywords"));
        }

        Ok(Self {
            id,
            url,
            title,
            keywords,
            click_url: raw.click_url.unwrap_or_default(),
            impression_url: raw.impression_url.unwrap_or_default(),
            advertiser,
            iab_category: raw.iab_category.unwrap_or_default(),
            is_sponsored: raw.is_sponsored,
            position: raw.position,
            score: raw.score,
        })
    }
}

/// Why a feed record was dropped.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("malformed record: {0}")]
    Invalid(#[source] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    id: Option<i64>,
    url: Option<String>,
    title: Option<String>,
    keywords: Option<Vec<String>>,
    click_url: Option<String>,
    impression_url: Option<String>,
    advertiser: Option<String>,
    iab_category: Option<String>,
    is_sponsored: Option<bool>,
    position: Option<usize>,
    score: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use rstest::rstest;
    use serde_json::json;

    fn amp() -> Value {
        json!({
            "id": 1,
            "url": "http://example.com/amp",
            "title": "AMP Suggestion",
            "keywords": ["amp", "  AMP  ", "amp store"],
            "click_url": "http://example.com/amp-click",
            "impression_url": "http://example.com/amp-impression",
            "advertiser": "Amp",
            "iab_category": "22 - Shopping",
        })
    }

    #[test]
    fn test_decode_normalizes_keywords() {
        let record = SuggestionRecord::from_value(&amp()).unwrap();
        check!(record.id == 1);
        check!(record.keywords == vec!["amp".to_string(), "amp store".to_string()]);
        check!(record.position.is_none());
    }

    #[rstest]
    #[case("id")]
    #[case("url")]
    #[case("title")]
    #[case("keywords")]
    #[case("advertiser")]
    fn test_missing_required_field(#[case] field: &str) {
        let mut value = amp();
        value.as_object_mut().unwrap().remove(field);
        let_assert!(Err(RecordError::MissingField(missing)) = SuggestionRecord::from_value(&value));
        check!(missing == field);
    }

    #[test]
    fn test_wrong_type_is_invalid() {
        let mut value = amp();
        value["id"] = json!("one");
        let_assert!(Err(RecordError::Invalid(_)) = SuggestionRecord::from_value(&value));
    }

    #[test]
    fn test_blank_keywords_rejected() {
        let mut value = amp();
        value["keywords"] = json!(["   ", ""]);
        let_assert!(
            Err(RecordError::MissingField("keywords")) = SuggestionRecord::from_value(&value)
        );
    }

    #[rstest]
    #[case("22 - Shopping", None, SuggestionKind::Sponsored)]
    #[case("5 - Education", None, SuggestionKind::NonSponsored)]
    #[case("5 - Education", Some(true), SuggestionKind::Sponsored)]
    #[case("22 - Shopping", Some(false), SuggestionKind::NonSponsored)]
    fn test_kind(
        #[case] category: &str,
        #[case] flag: Option<bool>,
        #[case] expected: SuggestionKind,
    ) {
        let mut value = amp();
        value["iab_category"] = json!(category);
        if let Some(flag) = flag {
            value["is_sponsored"] = json!(flag);
        }
        let record = SuggestionRecord::from_value(&value).unwrap();
        let categories = vec!["5 - Education".to_string()];
        check!(record.kind(&categories) == expected);
    }

    #[test]
    fn test_telemetry_type() {
        check!(SuggestionKind::Sponsored.telemetry_type() == "adm_sponsored");
        check!(SuggestionKind::NonSponsored.telemetry_type() == "adm_nonsponsored");
    }
}
