//! Date parsing and length-of-stay arithmetic.
//!
//! PetPoint writes timestamps in US report formats; spreadsheet round
//! trips occasionally reformat them. Everything is naive local time - the
//! exports carry no zone, and the Python boundary rejects aware datetimes.

use chrono::{NaiveDate, NaiveDateTime};

/// Datetime formats seen in PetPoint exports, tried in order.
const DATETIME_FORMATS: [&str; 4] = [
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Date-only formats; parsed values get a midnight time component.
const DATE_FORMATS: [&str; 2] = ["%m/%d/%Y", "%Y-%m-%d"];

/// Parse a PetPoint timestamp. Returns `None` for blank or unparseable
/// values - callers surface that as a null derived column, not an error.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }
    parse_date(trimmed).and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parse a PetPoint date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(d);
        }
    }
    None
}

/// Whole days between intake and now, floored. A half day counts as zero;
/// a future intake comes back negative rather than panicking.
pub fn los_days(intake: NaiveDateTime, now: NaiveDateTime) -> i64 {
    (now - intake).num_seconds().div_euclid(86_400)
}
