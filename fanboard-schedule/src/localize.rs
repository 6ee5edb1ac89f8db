//! UTC timestamp parsing and fixed-offset localization.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use fanboard_core::{LocalizedInstant, ScheduleError, ScheduleEvent, ScheduleResult};

/// Date-time layouts accepted when the value carries no UTC offset.
const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// ISO 8601 forms RFC 3339 rejects: no seconds, or an offset without a colon.
const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%dT%H:%M%:z",
];

/// Build a `FixedOffset` from minutes east of UTC.
pub fn fixed_offset(offset_minutes: i32) -> ScheduleResult<FixedOffset> {
    offset_minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or(ScheduleError::InvalidOffset {
            minutes: offset_minutes,
        })
}

/// Parse an ISO 8601 timestamp into a UTC instant.
///
/// Accepted forms:
/// - RFC 3339 with an offset (`2026-01-08T16:30:00Z`, `2026-01-09T01:30:00+09:00`)
/// - ISO 8601 without seconds or with a compact offset
///   (`2026-01-08T16:30Z`, `2026-01-08T16:30+09:00`, `2026-01-08T16:30:00+0900`)
/// - a date-time without offset, read as UTC (`2026-01-08T16:30:00`)
/// - a bare date, read as UTC midnight (`2026-01-09`)
///
/// Anything else is an `InvalidTimestamp`; there is no fallback instant.
pub fn parse_timestamp(value: &str) -> ScheduleResult<DateTime<Utc>> {
    let trimmed = value.trim();

    let rfc3339_err = match DateTime::parse_from_rfc3339(trimmed) {
        Ok(parsed) => return Ok(parsed.with_timezone(&Utc)),
        Err(e) => e,
    };

    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(trimmed, format) {
            return Ok(parsed.with_timezone(&Utc));
        }
    }

    // A trailing `Z` on a short form means UTC, same as no offset.
    let naive_part = trimmed
        .strip_suffix('Z')
        .or_else(|| trimmed.strip_suffix('z'))
        .unwrap_or(trimmed);
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(naive_part, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(ScheduleError::InvalidTimestamp {
        event_id: None,
        value: value.to_string(),
        reason: rfc3339_err.to_string(),
    })
}

/// Shift an instant into the display offset.
///
/// The date and time fields are read from the shifted instant, so an instant
/// late in the UTC day lands on the next local date for positive offsets.
pub fn localize_instant(utc: DateTime<Utc>, offset_minutes: i32) -> ScheduleResult<LocalizedInstant> {
    let offset = fixed_offset(offset_minutes)?;
    let local = utc.with_timezone(&offset);

    Ok(LocalizedInstant {
        utc,
        offset_minutes,
        local_date: local.date_naive(),
        local_time: local.time(),
    })
}

/// Parse `timestamp_utc` and shift it by `offset_minutes`.
pub fn to_local(timestamp_utc: &str, offset_minutes: i32) -> ScheduleResult<LocalizedInstant> {
    // Offset first, so a bad offset is never reported as a bad timestamp.
    fixed_offset(offset_minutes)?;
    let utc = parse_timestamp(timestamp_utc)?;
    localize_instant(utc, offset_minutes)
}

/// Localize one event, attaching its id to a timestamp error.
pub fn localize_event(event: &ScheduleEvent, offset_minutes: i32) -> ScheduleResult<LocalizedInstant> {
    to_local(&event.timestamp_utc, offset_minutes).map_err(|err| match err {
        ScheduleError::InvalidTimestamp { value, reason, .. } => ScheduleError::InvalidTimestamp {
            event_id: event.id_string(),
            value,
            reason,
        },
        other => other,
    })
}

/// "Today" as a local calendar date at the given instant.
pub fn local_today(now_utc: DateTime<Utc>, offset_minutes: i32) -> ScheduleResult<NaiveDate> {
    Ok(localize_instant(now_utc, offset_minutes)?.local_date)
}

/// "Today" in the display offset, read from the system clock.
pub fn today_in(offset_minutes: i32) -> ScheduleResult<NaiveDate> {
    local_today(Utc::now(), offset_minutes)
}

/// 24-hour `HH:MM` label of the local time.
pub fn format_local_time(instant: &LocalizedInstant) -> String {
    instant.local_time.format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeZone};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_to_local_crosses_midnight_forward() {
        let local = to_local("2026-01-08T16:30:00Z", 540).unwrap();
        assert_eq!(local.local_date, date(2026, 1, 9));
        assert_eq!(local.local_time, NaiveTime::from_hms_opt(1, 30, 0).unwrap());
        assert_eq!(local.offset_minutes, 540);
        assert_eq!(local.utc, Utc.with_ymd_and_hms(2026, 1, 8, 16, 30, 0).unwrap());
    }

    #[test]
    fn test_to_local_crosses_midnight_backward() {
        let local = to_local("2026-01-01T03:00:00Z", -300).unwrap();
        assert_eq!(local.local_date, date(2025, 12, 31));
        assert_eq!(format_local_time(&local), "22:00");
    }

    #[test]
    fn test_to_local_crosses_month_and_year() {
        let local = to_local("2025-12-31T20:00:00Z", 540).unwrap();
        assert_eq!(local.local_date, date(2026, 1, 1));
    }

    #[test]
    fn test_to_local_respects_source_offset() {
        // Already expressed in +09:00: same instant as 16:30Z the previous day.
        let a = to_local("2026-01-09T01:30:00+09:00", 540).unwrap();
        let b = to_local("2026-01-08T16:30:00Z", 540).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_naive_datetime_as_utc() {
        let parsed = parse_timestamp("2026-01-08T16:30:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 1, 8, 16, 30, 0).unwrap());
        let parsed = parse_timestamp("2026-01-08T16:30").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 1, 8, 16, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_iso_short_forms_with_offsets() {
        let expected = Utc.with_ymd_and_hms(2026, 1, 8, 16, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2026-01-08T16:30Z").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2026-01-08T16:30+09:00").unwrap(),
            expected - chrono::Duration::hours(9)
        );
        assert_eq!(
            parse_timestamp("2026-01-08T16:30:00+0900").unwrap(),
            expected - chrono::Duration::hours(9)
        );
        let fractional = parse_timestamp("2026-01-09T01:30:00.250+0900").unwrap();
        assert_eq!(fractional.timestamp(), expected.timestamp());
    }

    #[test]
    fn test_parse_bare_date_as_utc_midnight() {
        let parsed = parse_timestamp("2025-01-09").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 1, 9, 0, 0, 0).unwrap());
        // Midnight UTC is 09:00 in +09:00, same calendar day.
        assert_eq!(to_local("2025-01-09", 540).unwrap().local_date, date(2025, 1, 9));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "tomorrow", "2026-13-01", "2026-02-30", "2026-01-08T25:00:00Z"] {
            let err = parse_timestamp(bad).unwrap_err();
            assert!(
                matches!(err, ScheduleError::InvalidTimestamp { ref value, .. } if value == bad),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_invalid_offset() {
        assert_eq!(
            to_local("2026-01-08T16:30:00Z", 1440).unwrap_err(),
            ScheduleError::InvalidOffset { minutes: 1440 }
        );
        assert_eq!(
            fixed_offset(i32::MAX).unwrap_err(),
            ScheduleError::InvalidOffset { minutes: i32::MAX }
        );
        assert!(fixed_offset(-1439).is_ok());
    }

    #[test]
    fn test_localize_event_reports_id() {
        let event = ScheduleEvent::new("ev-9", "not a date");
        let err = localize_event(&event, 540).unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::InvalidTimestamp { event_id: Some(ref id), .. } if id == "ev-9"
        ));
    }

    #[test]
    fn test_local_today_uses_offset() {
        let now = Utc.with_ymd_and_hms(2026, 1, 8, 15, 0, 0).unwrap();
        assert_eq!(local_today(now, 540).unwrap(), date(2026, 1, 9));
        assert_eq!(local_today(now, 0).unwrap(), date(2026, 1, 8));
    }
}
