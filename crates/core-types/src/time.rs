use crate::CoreError;
use chrono::{DateTime, NaiveDateTime};

const NAIVE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
const OFFSET_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f%#z";

/// Parses a `YYYY-MM-DD HH:MM:SS[.ffffff]` literal, optionally followed by a
/// UTC offset such as `-03` or `+05:30`.
///
/// The columns this feeds are `TIMESTAMP` (no time zone), so an offset is
/// accepted and then dropped: the wall-clock reading is what gets stored.
pub fn parse_timestamp(input: &str) -> Result<NaiveDateTime, CoreError> {
    let trimmed = input.trim();

    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, NAIVE_FORMAT) {
        return Ok(naive);
    }

    DateTime::parse_from_str(trimmed, OFFSET_FORMAT)
        .map(|dt| dt.naive_local())
        .map_err(|e| CoreError::InvalidTimestamp {
            input: input.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate, Timelike};

    #[test]
    fn parses_naive_literal_with_microseconds() {
        let ts = parse_timestamp("2017-10-25 10:26:10.015152").unwrap();
        let expected = NaiveDate::from_ymd_opt(2017, 10, 25)
            .unwrap()
            .and_hms_micro_opt(10, 26, 10, 15152)
            .unwrap();
        assert_eq!(ts, expected);
    }

    #[test]
    fn offset_is_dropped_and_wall_clock_kept() {
        let ts = parse_timestamp("2012-02-22 12:08:17.320053-03").unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2012, 2, 22));
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (12, 8, 17));
        assert_eq!(ts.nanosecond(), 320_053_000);

        let ts = parse_timestamp("2017-10-22 23:47:10.407569+05:30").unwrap();
        assert_eq!((ts.day(), ts.hour(), ts.minute()), (22, 23, 47));
    }

    #[test]
    fn accepts_unpadded_minutes() {
        let ts = parse_timestamp("2017-10-13 13:0:12.673382").unwrap();
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (13, 0, 12));
    }

    #[test]
    fn fraction_is_optional() {
        let ts = parse_timestamp("2017-10-25 10:26:10").unwrap();
        assert_eq!(ts.nanosecond(), 0);
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_timestamp("next tuesday").unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidTimestamp { ref input, .. } if input == "next tuesday"
        ));
    }
}
