//! Date normalization and pairwise comparison.
//!
//! Extractors hand us dates in several shapes: ISO 8601 text with or
//! without fractional seconds and offsets, PDF `D:YYYYMMDDHHmmSS` strings,
//! and values they already parsed. Everything is reduced to a naive
//! `NaiveDateTime`. No timezone conversion happens anywhere in this module;
//! offsets are dropped, not applied.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::record::MetaValue;

/// Tolerance used when a caller has no better value.
pub const DEFAULT_TOLERANCE_SECS: u64 = 60;

/// Tolerance used for filesystem vs document cross-checks.
pub const DOCUMENT_TOLERANCE_SECS: u64 = 300;

/// ISO-style layouts, tried in order against the first 19 characters.
const ISO_LAYOUTS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

const DATE_ONLY_LAYOUT: &str = "%Y-%m-%d";

/// Width of `YYYY-MM-DDTHH:MM:SS`.
const ISO_PREFIX_CHARS: usize = 19;

lazy_static! {
    /// PDF date: `D:` followed by year, month, day, hour, minute, second.
    /// Anything after the seconds (usually an offset like `+01'00'`) is ignored.
    static ref PDF_DATE_PATTERN: Regex = Regex::new(
        r"^D:([0-9]{4})([0-9]{2})([0-9]{2})([0-9]{2})([0-9]{2})([0-9]{2})"
    ).unwrap();
}

/// Normalize a raw metadata value to a point in time.
///
/// Returns `None` for anything that is not a date; this is an outcome,
/// not an error.
pub fn normalize_date(value: &MetaValue) -> Option<NaiveDateTime> {
    match value {
        MetaValue::DateTime(dt) => Some(*dt),
        MetaValue::Text(s) => normalize_str(s),
        _ => None,
    }
}

/// Normalize an optional raw value. Missing values are unparseable.
pub fn normalize_opt(value: Option<&MetaValue>) -> Option<NaiveDateTime> {
    value.and_then(normalize_date)
}

/// Normalize a date string.
pub fn normalize_str(raw: &str) -> Option<NaiveDateTime> {
    parse_iso(raw).or_else(|| parse_pdf(raw))
}

fn parse_iso(raw: &str) -> Option<NaiveDateTime> {
    let head = match raw.char_indices().nth(ISO_PREFIX_CHARS) {
        Some((idx, _)) => &raw[..idx],
        None => raw,
    };

    // chrono tolerates leading whitespace and a signed year; a date must
    // open with its first year digit.
    if !head.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }

    for layout in ISO_LAYOUTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(head, layout) {
            // chrono encodes a leap second (:60) as nanosecond >= 1e9
            return (dt.nanosecond() < 1_000_000_000).then_some(dt);
        }
    }

    NaiveDate::parse_from_str(head, DATE_ONLY_LAYOUT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn parse_pdf(raw: &str) -> Option<NaiveDateTime> {
    let caps = PDF_DATE_PATTERN.captures(raw)?;
    let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

    let year = i32::try_from(field(1)?).ok()?;
    NaiveDate::from_ymd_opt(year, field(2)?, field(3)?)?.and_hms_opt(field(4)?, field(5)?, field(6)?)
}

/// Which operand of a comparison is the later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaterOperand {
    /// The first date is later: possible backdating of the second.
    First,
    Second,
}

/// Outcome of comparing two raw date values under a tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DateComparison {
    /// At least one operand did not normalize. Raw values kept for diagnostics.
    Incomplete {
        message: String,
        date1: Option<MetaValue>,
        date2: Option<MetaValue>,
    },

    Consistent {
        message: String,
        difference_seconds: f64,
    },

    Anomaly {
        later: LaterOperand,
        message: String,
        difference_seconds: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        warning: Option<String>,
    },
}

impl DateComparison {
    pub fn is_anomaly(&self) -> bool {
        matches!(self, DateComparison::Anomaly { .. })
    }

    pub fn is_consistent(&self) -> bool {
        matches!(self, DateComparison::Consistent { .. })
    }

    pub fn is_incomplete(&self) -> bool {
        matches!(self, DateComparison::Incomplete { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            DateComparison::Incomplete { message, .. }
            | DateComparison::Consistent { message, .. }
            | DateComparison::Anomaly { message, .. } => message,
        }
    }

    /// Absolute difference in seconds, when both sides parsed.
    pub fn difference_seconds(&self) -> Option<f64> {
        match self {
            DateComparison::Incomplete { .. } => None,
            DateComparison::Consistent {
                difference_seconds, ..
            }
            | DateComparison::Anomaly {
                difference_seconds, ..
            } => Some(*difference_seconds),
        }
    }
}

/// Compare two raw date values.
///
/// The tolerance is inclusive: a difference of exactly `tolerance_secs`
/// is consistent regardless of which side is later.
pub fn compare_dates(
    first: Option<&MetaValue>,
    second: Option<&MetaValue>,
    tolerance_secs: u64,
) -> DateComparison {
    let (d1, d2) = match (normalize_opt(first), normalize_opt(second)) {
        (Some(d1), Some(d2)) => (d1, d2),
        _ => {
            return DateComparison::Incomplete {
                message: "One or both dates could not be parsed".to_string(),
                date1: first.cloned(),
                date2: second.cloned(),
            }
        }
    };

    let delta = d1 - d2;
    let diff = match delta.num_microseconds() {
        Some(us) => (us as f64 / 1_000_000.0).abs(),
        None => (delta.num_seconds() as f64).abs(),
    };

    if diff <= tolerance_secs as f64 {
        DateComparison::Consistent {
            message: "Dates are within acceptable tolerance".to_string(),
            difference_seconds: diff,
        }
    } else if d1 > d2 {
        DateComparison::Anomaly {
            later: LaterOperand::First,
            message: format!(
                "Date1 is {:.0} seconds later than Date2 (possible backdating)",
                diff
            ),
            difference_seconds: diff,
            warning: Some("File system date is newer than document creation date".to_string()),
        }
    } else {
        DateComparison::Anomaly {
            later: LaterOperand::Second,
            message: format!("Date2 is {:.0} seconds later than Date1", diff),
            difference_seconds: diff,
            warning: None,
        }
    }
}
