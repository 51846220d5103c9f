//! Ordering of mixed numbers, numeric strings, dates and text "the way a
//! human would".
//!
//! Values are compared in three stages:
//!
//! 1. A value that is a whole `0x` hex literal, or a multi-chunk value that
//!    reads as a date, compares by that value against another such value. The
//!    session sentinel sorts before any of them.
//! 2. Otherwise both values are split into number/text chunks and compared
//!    position by position: numbers before text, numbers numerically, text
//!    lexicographically (or with an accent-folding collation when non-ASCII).
//! 3. [`SortValue::Missing`] sorts after everything.
//!
//! [`sort_naturally`] is stable, so values that compare equal keep their
//! input order.

mod chunk;
mod date;

pub use date::parse_date;

use chrono::{DateTime, Utc};
use chunk::{Chunk, hex_value, tokenize};
use std::cmp::Ordering;

/// One value to be sorted.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Number(f64),
    Text(String),
    Date(DateTime<Utc>),
    Missing,
}

impl SortValue {
    /// The string the comparator sees for this value.
    fn render(&self) -> Option<String> {
        match self {
            Self::Number(n) => Some(format_number(*n)),
            Self::Text(s) => Some(s.clone()),
            Self::Date(d) => Some(d.format("%a %b %d %Y %H:%M:%S GMT+0000").to_string()),
            Self::Missing => None,
        }
    }
}

impl std::fmt::Display for SortValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.render().as_deref().unwrap_or("undefined"))
    }
}

impl From<f64> for SortValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for SortValue {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for SortValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for SortValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<DateTime<Utc>> for SortValue {
    fn from(d: DateTime<Utc>) -> Self {
        Self::Date(d)
    }
}

impl<T: Into<Self>> From<Option<T>> for SortValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Missing, Into::into)
    }
}

/// Comparator options.
#[derive(Debug, Clone, Default)]
pub struct SortOptions {
    /// Sentinel (e.g. an "expires: session" label) that is never read as a
    /// date and sorts before every date.
    pub session: Option<String>,
    pub case_insensitive: bool,
}

impl SortOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }

    #[must_use]
    pub const fn case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }

    fn prepare(&self, value: &str) -> String {
        let trimmed = value.trim();
        if self.case_insensitive {
            trimmed.to_lowercase()
        } else {
            trimmed.to_string()
        }
    }
}

/// Render a number the way it reads in text; zero is always `0`.
pub(crate) fn format_number(n: f64) -> String {
    if n == 0.0 {
        "0".to_string()
    } else if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n < 0.0 { "-" } else { "" };
        format!("{sign}Infinity")
    } else {
        n.to_string()
    }
}

/// Compare two values under `options`.
pub fn natural_compare(a: &SortValue, b: &SortValue, options: &SortOptions) -> Ordering {
    match (a.render(), b.render()) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => {
            let session = options.session.as_deref().map(|s| options.prepare(s));
            compare_text(&options.prepare(&x), &options.prepare(&y), session.as_deref())
        }
    }
}

/// Compare two strings under `options`.
pub fn natural_compare_str(a: &str, b: &str, options: &SortOptions) -> Ordering {
    natural_compare(&SortValue::from(a), &SortValue::from(b), options)
}

/// Hex literal or date value, if non-zero. The sentinel is never a date.
fn hex_or_date(value: &str, chunk_count: usize, session: Option<&str>) -> Option<f64> {
    let hex = hex_value(value);
    let number = if hex.is_some() {
        hex
    } else if chunk_count != 1 && Some(value) != session {
        parse_date(value).map(|d| d.timestamp_millis() as f64)
    } else {
        None
    };
    number.filter(|n| *n != 0.0)
}

/// Compare two prepared (trimmed, case-folded) strings.
fn compare_text(a: &str, b: &str, session: Option<&str>) -> Ordering {
    let a_chunks = tokenize(a);
    let b_chunks = tokenize(b);
    let a_value = hex_or_date(a, a_chunks.len(), session);
    let b_value = hex_or_date(b, b_chunks.len(), session);

    if a_value.is_some() || b_value.is_some() {
        if Some(a) == session {
            return Ordering::Less;
        }
        if Some(b) == session {
            return Ordering::Greater;
        }
    }
    if let (Some(x), Some(y)) = (a_value, b_value) {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }

    for i in 0..a_chunks.len().max(b_chunks.len()) {
        let a_chunk = Chunk::normalize(a_chunks.get(i).copied().unwrap_or(""), a_chunks.len());
        let b_chunk = Chunk::normalize(b_chunks.get(i).copied().unwrap_or(""), b_chunks.len());
        if let Some(ordering) = chunk::compare(&a_chunk, &b_chunk) {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Sort `values` in place under `options`, keeping equal values in input order.
pub fn sort_naturally(values: &mut Vec<SortValue>, options: &SortOptions) {
    let items = std::mem::take(values);
    *values = merge_sort(items, &|a, b| natural_compare(a, b, options));
}

/// Stable top-down merge sort. Tolerates comparators that are not a strict
/// total order, which `slice::sort_by` may reject at runtime.
fn merge_sort<T>(mut items: Vec<T>, compare: &impl Fn(&T, &T) -> Ordering) -> Vec<T> {
    if items.len() <= 1 {
        return items;
    }
    let right = items.split_off(items.len() / 2);
    let mut left = merge_sort(items, compare).into_iter().peekable();
    let mut right = merge_sort(right, compare).into_iter().peekable();

    let mut merged = Vec::with_capacity(left.len() + right.len());
    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => compare(r, l) == Ordering::Less,
            _ => break,
        };
        merged.extend(if take_right { right.next() } else { left.next() });
    }
    merged.extend(left);
    merged.extend(right);
    merged
}
