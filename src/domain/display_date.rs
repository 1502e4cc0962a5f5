use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

use crate::error::{AppError, Result};

const INVALID_DATE: &str = "fecha must be in YYYY-MM-DD or ISO-8601 format";

/// Offset timestamps RFC 3339 misses: minutes-only times and a space separator.
const OFFSET_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M%:z",
];

/// Naive timestamp layouts accepted after the offset forms fail.
const NAIVE_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Which grammar a display date matched. The stored value is always the
/// caller's original string; this is only used for acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayDate {
    Timestamp(DateTime<FixedOffset>),
    LocalTimestamp(NaiveDateTime),
    Date(NaiveDate),
}

/// Accepts a full ISO-8601 timestamp (a trailing `Z` is read as `+00:00`)
/// or a plain `YYYY-MM-DD` calendar date, in that order.
pub fn parse_display_date(raw: &str) -> Result<DisplayDate> {
    let candidate = match raw.strip_suffix('Z') {
        Some(head) => format!("{}+00:00", head),
        None => raw.to_string(),
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(&candidate) {
        return Ok(DisplayDate::Timestamp(ts));
    }

    for layout in OFFSET_LAYOUTS {
        if let Ok(ts) = DateTime::parse_from_str(&candidate, layout) {
            return Ok(DisplayDate::Timestamp(ts));
        }
    }

    for layout in NAIVE_LAYOUTS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(&candidate, layout) {
            return Ok(DisplayDate::LocalTimestamp(ts));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(DisplayDate::Date)
        .map_err(|_| AppError::Validation(INVALID_DATE.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_calendar_date() {
        let parsed = parse_display_date("2025-09-01").unwrap();
        assert_eq!(
            parsed,
            DisplayDate::Date(NaiveDate::from_ymd_opt(2025, 9, 1).unwrap())
        );
    }

    #[test]
    fn test_accepts_zulu_timestamp() {
        match parse_display_date("2025-09-01T10:00:00Z").unwrap() {
            DisplayDate::Timestamp(ts) => {
                assert_eq!(ts.offset().local_minus_utc(), 0);
                assert_eq!(ts.to_rfc3339(), "2025-09-01T10:00:00+00:00");
            }
            other => panic!("expected timestamp, got {:?}", other),
        }
    }

    #[test]
    fn test_accepts_offset_and_naive_timestamps() {
        assert!(matches!(
            parse_display_date("2025-09-01T10:00:00-05:00"),
            Ok(DisplayDate::Timestamp(_))
        ));
        assert!(matches!(
            parse_display_date("2025-09-01T10:00Z"),
            Ok(DisplayDate::Timestamp(_))
        ));
        assert!(matches!(
            parse_display_date("2025-09-01T10:00+02:00"),
            Ok(DisplayDate::Timestamp(_))
        ));
        assert!(matches!(
            parse_display_date("2025-09-01 10:00:30.5-03:00"),
            Ok(DisplayDate::Timestamp(_))
        ));
        assert!(matches!(
            parse_display_date("2025-09-01T10:00:00.123456"),
            Ok(DisplayDate::LocalTimestamp(_))
        ));
        assert!(matches!(
            parse_display_date("2025-09-01 10:00"),
            Ok(DisplayDate::LocalTimestamp(_))
        ));
    }

    #[test]
    fn test_rejects_other_formats() {
        for raw in ["09/01/2025", "", "2025-13-01", "2025-02-30", "yesterday", "2025-09-01Z"] {
            match parse_display_date(raw) {
                Err(AppError::Validation(msg)) => assert_eq!(msg, INVALID_DATE),
                other => panic!("{:?} should be rejected, got {:?}", raw, other),
            }
        }
    }
}
