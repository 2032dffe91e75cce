// src/time_parse.rs
//
// Lenient parsers for the string encodings found in attendance exports.
// All of them are total: malformed or empty input yields `None`, which
// downstream rules read as "insufficient information", never as zero.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

static TIME_OF_DAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2}):(\d{2})(?::\d{2})?").expect("valid time-of-day regex"));

// Wall-clock datetime shapes without an offset.
const NAIVE_DATETIME_FORMATS: [&str; 8] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %I:%M:%S %p",
];

// Datetime shapes carrying an explicit offset, beyond what RFC 3339 covers.
const OFFSET_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%z"];

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%m/%d/%Y", "%d-%b-%y", "%b %d, %Y", "%d %b %Y"];

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("n/a") {
        None
    } else {
        Some(trimmed)
    }
}

/// Extracts the first `H:MM[:SS]` occurring anywhere in `value` and returns
/// it as minutes past midnight.
///
/// `"09:00:00"` and `"2025-11-17T09:00:00+10:00"` both yield `540`. Hour and
/// minute ranges are not validated.
pub fn parse_time_of_day(value: &str) -> Option<u32> {
    let value = non_empty(value)?;
    let caps = TIME_OF_DAY_RE.captures(value)?;
    let hours: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minutes: u32 = caps.get(2)?.as_str().parse().ok()?;
    Some(hours * 60 + minutes)
}

/// Parses a full calendar datetime into a wall-clock instant.
///
/// An explicit UTC offset is honoured only to locate the wall-clock reading
/// it was written in; the offset itself is dropped. A bare date resolves to
/// midnight. A bare time of day is not an instant and yields `None`.
pub fn parse_instant(value: &str) -> Option<NaiveDateTime> {
    let value = non_empty(value)?;

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    for fmt in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, fmt) {
            return Some(dt.naive_local());
        }
    }
    if let Ok(dt) = value.parse::<NaiveDateTime>() {
        return Some(dt);
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
    }
    parse_date_only(value).and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parses a `H:MM:SS` duration into fractional minutes.
///
/// Exactly three colon-separated numeric parts are required, so `"8:00"`
/// is rejected while `"2:50:02"` yields `170.0333..`.
pub fn parse_duration_minutes(value: &str) -> Option<f64> {
    let value = non_empty(value)?;
    let parts: Vec<&str> = value.split(':').collect();
    if parts.len() != 3 {
        return None;
    }

    let mut nums = [0.0_f64; 3];
    for (slot, part) in nums.iter_mut().zip(&parts) {
        let n: f64 = part.trim().parse().ok()?;
        if !n.is_finite() {
            return None;
        }
        *slot = n;
    }
    let [h, m, s] = nums;
    Some(h * 60.0 + m + s / 60.0)
}

/// Parses the calendar date of a shift for ordering purposes.
///
/// Accepts the date shapes seen in exports plus full datetimes, whose date
/// part is used.
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    let value = non_empty(value)?;
    parse_date_only(value).or_else(|| parse_instant(value).map(|dt| dt.date()))
}

fn parse_date_only(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

/// Minutes past midnight of a wall-clock instant.
pub fn minutes_of_day(instant: &NaiveDateTime) -> u32 {
    instant.hour() * 60 + instant.minute()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_of_day_bare_and_iso() {
        assert_eq!(parse_time_of_day("09:00:00"), Some(540));
        assert_eq!(parse_time_of_day("9:05"), Some(545));
        assert_eq!(parse_time_of_day("2025-11-17T09:00:00+10:00"), Some(540));
        assert_eq!(parse_time_of_day("  17:30  "), Some(1050));
    }

    #[test]
    fn test_time_of_day_missing() {
        assert_eq!(parse_time_of_day(""), None);
        assert_eq!(parse_time_of_day("   "), None);
        assert_eq!(parse_time_of_day("N/A"), None);
        assert_eq!(parse_time_of_day("no clock-in"), None);
        assert_eq!(parse_time_of_day("9:5"), None, "minutes need two digits");
    }

    #[test]
    fn test_time_of_day_does_not_range_check() {
        assert_eq!(parse_time_of_day("25:99"), Some(25 * 60 + 99));
    }

    #[test]
    fn test_instant_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 11, 17)
            .unwrap()
            .and_hms_opt(9, 2, 0)
            .unwrap();
        assert_eq!(parse_instant("2025-11-17T09:02:00+10:00"), Some(expected));
        assert_eq!(parse_instant("2025-11-17T09:02:00Z"), Some(expected));
        assert_eq!(parse_instant("2025-11-17T09:02:00"), Some(expected));
        assert_eq!(parse_instant("2025-11-17 09:02:00"), Some(expected));
        assert_eq!(parse_instant("2025-11-17 09:02"), Some(expected));
        assert_eq!(parse_instant("11/17/2025 09:02 AM"), Some(expected));
    }

    #[test]
    fn test_instant_date_only_is_midnight() {
        let midnight = NaiveDate::from_ymd_opt(2025, 11, 17)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(parse_instant("2025-11-17"), Some(midnight));
    }

    #[test]
    fn test_instant_rejects_time_only_and_garbage() {
        assert_eq!(parse_instant("09:00:00"), None);
        assert_eq!(parse_instant(""), None);
        assert_eq!(parse_instant("yesterday"), None);
    }

    #[test]
    fn test_duration_minutes() {
        assert_eq!(parse_duration_minutes("8:00:00"), Some(480.0));
        assert_eq!(parse_duration_minutes("0:00:00"), Some(0.0));
        let d = parse_duration_minutes("2:50:30").unwrap();
        assert!((d - 170.5).abs() < 1e-9, "got {}", d);
    }

    #[test]
    fn test_duration_rejects_wrong_shape() {
        assert_eq!(parse_duration_minutes(""), None);
        assert_eq!(parse_duration_minutes("8:00"), None);
        assert_eq!(parse_duration_minutes("1:2:3:4"), None);
        assert_eq!(parse_duration_minutes("8:xx:00"), None);
        assert_eq!(parse_duration_minutes("8::00"), None);
        assert_eq!(parse_duration_minutes("NaN:00:00"), None);
    }

    #[test]
    fn test_calendar_date_shapes() {
        let d = NaiveDate::from_ymd_opt(2025, 11, 17).unwrap();
        assert_eq!(parse_calendar_date("2025-11-17"), Some(d));
        assert_eq!(parse_calendar_date("11/17/2025"), Some(d));
        assert_eq!(parse_calendar_date("17-Nov-25"), Some(d));
        assert_eq!(parse_calendar_date("Nov 17, 2025"), Some(d));
        assert_eq!(parse_calendar_date("2025-11-17T09:00:00+10:00"), Some(d));
        assert_eq!(parse_calendar_date("someday"), None);
    }
}
