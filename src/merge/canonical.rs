//! URL canonicalization for deduplication.

use crate::suggest::TimestampTemplate;

/// A recognized URL prefix. Variants are declared in rank order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UrlPrefix {
    HttpWww,
    Http,
    HttpsWww,
    Https,
}

impl UrlPrefix {
    /// Longest prefixes first so `http://www.` wins over `http://`.
    const ALL: [Self; 4] = [Self::HttpsWww, Self::Https, Self::HttpWww, Self::Http];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HttpWww => "http://www.",
            Self::Http => "http://",
            Self::HttpsWww => "https://www.",
            Self::Https => "https://",
        }
    }

    pub const fn rank(self) -> i8 {
        match self {
            Self::HttpWww => 0,
            Self::Http => 1,
            Self::HttpsWww => 2,
            Self::Https => 3,
        }
    }

    /// Split `url` into its recognized prefix and the remainder.
    pub fn split(url: &str) -> (Option<Self>, &str) {
        for prefix in Self::ALL {
            if let Some(rest) = url.strip_prefix(prefix.as_str()) {
                return (Some(prefix), rest);
            }
        }
        (None, url)
    }
}

/// Rank of an optional prefix. Unrecognized prefixes rank below all others.
pub fn prefix_rank(prefix: Option<UrlPrefix>) -> i8 {
    prefix.map_or(-1, UrlPrefix::rank)
}

/// A URL reduced to its comparison form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalUrl {
    pub prefix: Option<UrlPrefix>,
    /// The URL without its prefix, trailing `?` and trailing `/`.
    pub stripped: String,
}

impl CanonicalUrl {
    pub fn new(url: &str) -> Self {
        let (prefix, rest) = UrlPrefix::split(url);
        let rest = rest.strip_suffix('?').unwrap_or(rest);
        let rest = rest.strip_suffix('/').unwrap_or(rest);
        Self {
            prefix,
            stripped: rest.to_string(),
        }
    }

    pub fn rank(&self) -> i8 {
        prefix_rank(self.prefix)
    }

    /// Byte length of the stripped prefix.
    pub fn prefix_len(&self) -> usize {
        self.prefix.map_or(0, |prefix| prefix.as_str().len())
    }
}

/// A comparison target for general results: a canonical URL and, for a
/// stamped suggestion, where its timestamp field sits in `stripped`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupeKey {
    pub canonical: CanonicalUrl,
    pub timestamp_index: Option<usize>,
}

impl DedupeKey {
    pub const fn plain(canonical: CanonicalUrl) -> Self {
        Self {
            canonical,
            timestamp_index: None,
        }
    }

    /// Key for a stamped URL whose field starts at byte `url_timestamp_index`
    /// of the full (unstripped) URL.
    pub fn stamped(url: &str, url_timestamp_index: Option<usize>) -> Self {
        let canonical = CanonicalUrl::new(url);
        let timestamp_index =
            url_timestamp_index.and_then(|index| index.checked_sub(canonical.prefix_len()));
        Self {
            canonical,
            timestamp_index,
        }
    }

    /// Whether `other` names the same logical item.
    ///
    /// Equal canonical forms always match. Otherwise, when this key carries a
    /// timestamp field, `other` matches if it differs only inside that field
    /// and what it has there is a well-formed timestamp.
    pub fn matches(&self, other: &CanonicalUrl, template: &TimestampTemplate) -> bool {
        let ours = &self.canonical.stripped;
        let theirs = &other.stripped;
        if ours == theirs {
            return true;
        }

        let Some(index) = self.timestamp_index else {
            return false;
        };
        if ours.len() != theirs.len() {
            return false;
        }
        let end = index + template.width();
        let (Some(our_head), Some(their_head)) = (ours.get(..index), theirs.get(..index)) else {
            return false;
        };
        let (Some(our_tail), Some(their_tail)) = (ours.get(end..), theirs.get(end..)) else {
            return false;
        };
        our_head == their_head
            && our_tail == their_tail
            && theirs
                .get(index..end)
                .is_some_and(|field| template.is_timestamp(field))
    }
}
