use chrono::{NaiveDate, NaiveDateTime};

use super::types::Scalar;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%d-%m-%Y",
];

/// Numeric coercion. Native numbers pass through, strings attempt a float
/// parse, everything else is excluded. Non-finite results are excluded too
/// so they can never leak into aggregates.
pub fn parse_number(value: &Scalar) -> Option<f64> {
    match value {
        Scalar::Number(n) if n.is_finite() => Some(*n),
        Scalar::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Calendar-date coercion for string cells, returning epoch milliseconds.
/// Goes through a real date parser; numeric coercion alone never makes a
/// value a date.
pub fn parse_date_millis(s: &str) -> Option<i64> {
    let s = s.trim();

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis());
        }
    }

    None
}

/// Date coercion lifted to cells: only string cells can be dates.
pub fn scalar_date_millis(value: &Scalar) -> Option<i64> {
    match value {
        Scalar::Text(s) => parse_date_millis(s),
        _ => None,
    }
}

/// Truncates to `limit` chars and appends `marker`, or returns the string
/// unchanged if it fits. Char-based so multi-byte text never splits.
pub fn truncate_with(s: &str, limit: usize, marker: &str) -> String {
    if s.chars().count() > limit {
        let mut truncated: String = s.chars().take(limit).collect();
        truncated.push_str(marker);
        truncated
    } else {
        s.to_string()
    }
}
