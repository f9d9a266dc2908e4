//! Value classification and sequence encoding
//!
//! Classification is an explicit ordered policy: try a numeric parse,
//! then a date parse; when both succeed the value is `NumericAndDate`
//! and numeric takes precedence for the field-kind proposal. The
//! canonical string form is stored regardless of the outcome.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use folio_core::{DuckType, Timestamp};

/// Width of an encoded sequence index
pub const SEQ_WIDTH: usize = 10;

/// Terminator byte appended to every encoded sequence value
///
/// Forces exact trailing-character comparison on backends that would
/// otherwise trim or pad fixed-width text.
pub const SEQ_TERMINATOR: char = '#';

/// Encode a sub-collection index as a stored sequence value
pub fn encode_seq(index: usize) -> String {
    format!("{:0width$}{}", index, SEQ_TERMINATOR, width = SEQ_WIDTH)
}

/// Decode a stored sequence value back to its index
///
/// Rejects anything that is not exactly `SEQ_WIDTH` digits plus the
/// terminator.
pub fn decode_seq(value: &str) -> Option<usize> {
    let digits = value.strip_suffix(SEQ_TERMINATOR)?;
    if digits.len() != SEQ_WIDTH || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Numeric parse over the trimmed input
///
/// Finite f64 values only; `inf`/`nan` spellings are opaque strings.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Epoch-second strings this long are accepted as dates
const EPOCH_DIGITS: std::ops::RangeInclusive<usize> = 9..=10;

/// Date parse over the trimmed input
///
/// Accepted forms, in order: RFC 3339, `YYYY-MM-DD HH:MM:SS`,
/// `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD`, `DD Mon YYYY - HH:MM`,
/// `DD Mon YYYY`, and 9-10 digit epoch seconds. Epoch seconds are the
/// one form that also parses numerically, which is what makes the
/// `NumericAndDate` classification reachable.
pub fn parse_date(raw: &str) -> Option<Timestamp> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(Timestamp::from_datetime(dt.with_timezone(&Utc)));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d %b %Y - %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(Timestamp::from_datetime(naive.and_utc()));
        }
    }
    for format in ["%Y-%m-%d", "%d %b %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            let naive = date.and_hms_opt(0, 0, 0)?;
            return Some(Timestamp::from_datetime(naive.and_utc()));
        }
    }
    if EPOCH_DIGITS.contains(&trimmed.len()) && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return trimmed.parse::<u64>().ok().map(Timestamp::from_secs);
    }
    None
}

/// Classify a scalar value
///
/// The ordered policy: numeric first, date second; both succeeding is
/// `NumericAndDate`. The classification decides which projections are
/// written; the text projection is written in every case.
pub fn classify(raw: &str) -> DuckType {
    let numeric = parse_numeric(raw).is_some();
    let date = parse_date(raw).is_some();
    match (numeric, date) {
        (true, true) => DuckType::NumericAndDate,
        (true, false) => DuckType::Numeric,
        (false, true) => DuckType::Date,
        (false, false) => DuckType::Opaque,
    }
}
