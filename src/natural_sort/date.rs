//! Recognition of common date/time spellings.
//!
//! Accepted forms:
//!
//! - ISO: `2009-06-15`, `2009-06-15T13:45:30.2`, `2010-06-15 13:45:30Z`
//! - US numeric: `10/12/2008`, `2/15/2009 1:45 PM`
//! - RFC 1123: `Mon, 15 Jun 2009 20:45:30 GMT`
//! - JavaScript `Date.toString()`: `Wed Jan 01 2010 00:00:00 GMT-0800 (PST)`
//! - Long form: `Saturday, July 3, 2010 1:45:30 PM`
//!
//! Times without a zone are read as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use regex::Regex;
use std::sync::LazyLock;

static ISO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)
        ^(\d{4})-(\d{1,2})-(\d{1,2})
        (?:[t\ ](\d{1,2}):(\d{2})(?::(\d{2})(?:\.(\d{1,9}))?)?)?
        \s*(z|[+\-]\d{2}:?\d{2})?$",
    )
    .expect("iso date regex should compile")
});

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("comment regex should compile"));

static NUMERIC_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{1,4})$").expect("numeric date regex should compile")
});

static TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{2})(?::(\d{2}))?$").expect("time regex should compile")
});

static OFFSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:gmt|utc|ut|z)?([+\-])(\d{2})(\d{2})$")
        .expect("offset regex should compile")
});

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Parse `input` as a date, or `None` if it is not one of the accepted forms.
pub fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    parse_iso(input).or_else(|| parse_words(input))
}

fn parse_iso(input: &str) -> Option<DateTime<Utc>> {
    let caps = ISO.captures(input)?;
    let number = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

    let date = NaiveDate::from_ymd_opt(caps[1].parse().ok()?, number(2)?, number(3)?)?;
    let nanos = caps.get(7).map_or(Some(0), |m| {
        // Right-pad the fraction to nanoseconds.
        format!("{:0<9}", m.as_str()).parse::<u32>().ok()
    })?;
    let time = date.and_hms_nano_opt(
        number(4).unwrap_or(0),
        number(5).unwrap_or(0),
        number(6).unwrap_or(0),
        nanos,
    )?;

    let offset_minutes = match caps.get(8).map(|m| m.as_str()) {
        None => 0,
        Some(zone) if zone.eq_ignore_ascii_case("z") => 0,
        Some(zone) => {
            let sign = if zone.starts_with('-') { -1 } else { 1 };
            let digits: String = zone[1..].chars().filter(char::is_ascii_digit).collect();
            let hours: i64 = digits.get(..2)?.parse().ok()?;
            let minutes: i64 = digits.get(2..)?.parse().ok()?;
            sign * (hours * 60 + minutes)
        }
    };
    to_utc(time, offset_minutes)
}

#[derive(Default)]
struct Parts {
    year: Option<(i32, usize)>,
    month: Option<u32>,
    day: Option<u32>,
    time: Option<(u32, u32, u32)>,
    meridiem: Option<bool>,
    offset_minutes: Option<i64>,
    numbers: Vec<(u32, usize)>,
}

/// Word-by-word parse of the US numeric, RFC 1123, `toString()` and long forms.
fn parse_words(input: &str) -> Option<DateTime<Utc>> {
    let stripped = COMMENT.replace_all(input, " ");
    let mut parts = Parts::default();

    for word in stripped
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|w| !w.is_empty())
    {
        let lower = word.to_ascii_lowercase();
        if let Some(caps) = NUMERIC_DATE.captures(word) {
            if parts.month.is_some() {
                return None;
            }
            parts.month = Some(caps[1].parse().ok()?);
            parts.day = Some(caps[2].parse().ok()?);
            parts.year = Some((caps[3].parse().ok()?, caps[3].len()));
        } else if let Some(caps) = TIME.captures(word) {
            let seconds = caps.get(3).map_or(Some(0), |m| m.as_str().parse().ok())?;
            parts.time = Some((caps[1].parse().ok()?, caps[2].parse().ok()?, seconds));
        } else if lower == "am" || lower == "pm" {
            parts.meridiem = Some(lower == "pm");
        } else if let Some(caps) = OFFSET.captures(word) {
            let sign = if &caps[1] == "-" { -1 } else { 1 };
            let hours: i64 = caps[2].parse().ok()?;
            let minutes: i64 = caps[3].parse().ok()?;
            parts.offset_minutes = Some(sign * (hours * 60 + minutes));
        } else if let Some(offset) = named_zone(&lower) {
            parts.offset_minutes = Some(offset);
        } else if word.bytes().all(|b| b.is_ascii_digit()) {
            parts.numbers.push((word.parse().ok()?, word.len()));
        } else if let Some(month) = name_index(&lower, &MONTHS) {
            if parts.month.is_some() {
                return None;
            }
            parts.month = Some(month + 1);
        } else if name_index(&lower, &WEEKDAYS).is_none() {
            return None;
        }
    }

    // A named month takes its day and year from the bare numbers.
    if parts.day.is_none() {
        let [(day, _), (year, digits)] = parts.numbers[..] else {
            return None;
        };
        parts.day = Some(day);
        parts.year = Some((i32::try_from(year).ok()?, digits));
    } else if !parts.numbers.is_empty() {
        return None;
    }

    let (year, digits) = parts.year?;
    let date = NaiveDate::from_ymd_opt(expand_year(year, digits), parts.month?, parts.day?)?;

    let (mut hour, minute, second) = parts.time.unwrap_or((0, 0, 0));
    match parts.meridiem {
        Some(_) if parts.time.is_none() || hour == 0 || hour > 12 => return None,
        Some(pm) => hour = hour % 12 + if pm { 12 } else { 0 },
        None => {}
    }
    let time = date.and_hms_opt(hour, minute, second)?;
    to_utc(time, parts.offset_minutes.unwrap_or(0))
}

/// Offset in minutes of a named zone.
fn named_zone(word: &str) -> Option<i64> {
    let hours = match word {
        "gmt" | "utc" | "ut" | "z" => 0,
        "est" => -5,
        "edt" | "cst" => -6 + i64::from(word == "edt"),
        "cdt" | "mst" => -7 + i64::from(word == "cdt"),
        "mdt" | "pst" => -8 + i64::from(word == "mdt"),
        "pdt" => -7,
        _ => return None,
    };
    Some(hours * 60)
}

/// Index of the name `word` abbreviates (three letters or more).
fn name_index(word: &str, names: &[&str]) -> Option<u32> {
    if word.len() < 3 {
        return None;
    }
    names
        .iter()
        .position(|name| name.starts_with(word))
        .and_then(|i| u32::try_from(i).ok())
}

/// Years written with one or two digits land in 1950..=2049.
const fn expand_year(year: i32, digits: usize) -> i32 {
    if digits > 2 {
        year
    } else if year < 50 {
        year + 2000
    } else {
        year + 1900
    }
}

fn to_utc(local: NaiveDateTime, offset_minutes: i64) -> Option<DateTime<Utc>> {
    local
        .checked_sub_signed(TimeDelta::minutes(offset_minutes))
        .map(|utc| utc.and_utc())
}
