//! Time window bucketing.
//!
//! Buckets are aligned to multiples of `n` minutes since the Unix epoch.
//! `floor` keeps a timestamp that already sits on a boundary, `ceil`
//! always advances to the next one.

use chrono::{DateTime, Datelike, DurationRound, FixedOffset, TimeDelta, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Calendar fields of a timestamp as used for store lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeParts {
    /// 0 = Sunday .. 6 = Saturday.
    pub day_of_week: u32,
    /// 24-hour HHMM as an integer, e.g. 09:05 -> 905.
    pub time_of_day: u32,
    /// Week of the year, weeks starting on Sunday (00..=53).
    pub week: u32,
}

fn bucket_width(n: u32) -> Result<TimeDelta> {
    if n == 0 {
        return Err(Error::InvalidInput(
            "bucket width must be at least one minute".to_string(),
        ));
    }
    Ok(TimeDelta::minutes(i64::from(n)))
}

/// Latest multiple of `n` minutes that is `<= t`.
pub fn floor(t: DateTime<Utc>, n: u32) -> Result<DateTime<Utc>> {
    let width = bucket_width(n)?;
    t.duration_trunc(width)
        .map_err(|e| Error::InvalidInput(format!("cannot floor {t} to {n} minutes: {e}")))
}

/// Earliest multiple of `n` minutes that is strictly `> t`.
pub fn ceil(t: DateTime<Utc>, n: u32) -> Result<DateTime<Utc>> {
    let width = bucket_width(n)?;
    floor(t, n)?
        .checked_add_signed(width)
        .ok_or_else(|| Error::InvalidInput(format!("cannot ceil {t} to {n} minutes")))
}

/// Split a timestamp into day-of-week, time-of-day and week number in its
/// own time zone.
pub fn decompose<Tz: TimeZone>(t: &DateTime<Tz>) -> TimeParts {
    let day_of_week = t.weekday().num_days_from_sunday();
    let day_of_year = t.ordinal0();
    TimeParts {
        day_of_week,
        time_of_day: t.hour() * 100 + t.minute(),
        week: (day_of_year + 7 - day_of_week) / 7,
    }
}

/// Fixed UTC offset for local time-of-day lookups.
pub fn utc_offset(minutes: i32) -> Result<FixedOffset> {
    FixedOffset::east_opt(minutes * 60)
        .ok_or_else(|| Error::InvalidInput(format!("utc offset out of range: {minutes} minutes")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_floor_and_ceil_bracket_time() {
        let samples = [
            "2024-03-10T10:00:30Z",
            "2024-03-10T23:59:59.999Z",
            "2024-12-31T23:59:01Z",
        ];
        for s in samples {
            let t = at(s);
            let lo = floor(t, 1).unwrap();
            let hi = ceil(t, 1).unwrap();
            assert!(lo <= t, "{s}");
            assert!(t < hi, "{s}");
            assert_eq!(hi - lo, TimeDelta::minutes(1));
        }
    }

    #[test]
    fn test_floor_keeps_boundary_ceil_advances() {
        let t = at("2024-03-10T10:00:00Z");
        assert_eq!(floor(t, 1).unwrap(), t);
        assert_eq!(ceil(t, 1).unwrap(), at("2024-03-10T10:01:00Z"));
    }

    #[test]
    fn test_reapplication_is_stable() {
        let t = at("2024-03-10T10:07:42Z");
        let lo = floor(t, 1).unwrap();
        let hi = ceil(t, 1).unwrap();
        assert_eq!(floor(lo, 1).unwrap(), lo);
        assert_eq!(floor(hi, 1).unwrap(), hi);
    }

    #[test]
    fn test_wider_buckets() {
        let t = at("2024-03-10T10:07:42Z");
        assert_eq!(floor(t, 5).unwrap(), at("2024-03-10T10:05:00Z"));
        assert_eq!(ceil(t, 5).unwrap(), at("2024-03-10T10:10:00Z"));
        assert_eq!(ceil(at("2024-03-10T10:10:00Z"), 5).unwrap(), at("2024-03-10T10:15:00Z"));
    }

    #[test]
    fn test_zero_width_rejected() {
        assert!(matches!(
            floor(at("2024-03-10T10:00:00Z"), 0),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_decompose() {
        // Sunday, first full week of 2024 (Jan 7 is the first Sunday).
        let parts = decompose(&at("2024-01-07T09:05:00Z"));
        assert_eq!(
            parts,
            TimeParts {
                day_of_week: 0,
                time_of_day: 905,
                week: 1,
            }
        );

        // Monday Jan 1 2024 is before the first Sunday.
        let parts = decompose(&at("2024-01-01T23:00:00Z"));
        assert_eq!(parts.day_of_week, 1);
        assert_eq!(parts.time_of_day, 2300);
        assert_eq!(parts.week, 0);

        assert_eq!(decompose(&at("2024-01-01T00:00:00Z")).time_of_day, 0);
    }

    #[test]
    fn test_decompose_uses_local_offset() {
        let offset = utc_offset(330).unwrap();
        let local = at("2024-03-10T10:00:30Z").with_timezone(&offset);
        assert_eq!(decompose(&local).time_of_day, 1530);
    }

    #[test]
    fn test_time_of_day_differs_between_floor_and_ceil() {
        for s in ["2024-03-10T10:00:30Z", "2024-03-10T10:00:00Z", "2024-03-10T23:59:59Z"] {
            let t = at(s);
            let lo = decompose(&floor(t, 1).unwrap()).time_of_day;
            let hi = decompose(&ceil(t, 1).unwrap()).time_of_day;
            assert_ne!(lo, hi, "{s}");
        }
        assert_eq!(
            decompose(&ceil(at("2024-03-10T23:59:59Z"), 1).unwrap()).time_of_day,
            0
        );
    }
}
