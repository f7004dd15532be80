//! Canonical parse/format table for every temporal encoding.
//!
//! Single source of truth shared by the document converters and the
//! query-value converters: any type whose query encoding is "format as
//! string" goes through exactly the same functions on both paths, so
//! equality predicates match stored values byte for byte.
//!
//! Encodings:
//!
//! - Instants and local date-times use extended-ISO strings with a fixed
//!   9-digit fraction, which keeps the string form lexically
//!   order-preserving.
//! - Local times, offsets, and durations use a wall-clock span string
//!   (`[-][D.]HH:MM:SS[.fffffffff]`) for display and a signed nanosecond
//!   count for ordered comparison.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};

use crate::error::{ConvertError, RangeBound, Result};

const INSTANT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.9fZ";
const LOCAL_DATE_FORMAT: &str = "%Y-%m-%d";
const LOCAL_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.9f";
const LOCAL_DATE_TIME_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const OFFSET_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.9f%:z";

const NANOS_PER_SECOND: u64 = 1_000_000_000;
const SECONDS_PER_DAY: u64 = 86_400;

// ── Instant bounds ──────────────────────────────────────────────────────────

/// Unix seconds of 0001-01-01T00:00:00Z, the smallest storable instant.
pub const MIN_ISO_SECONDS: i64 = -62_135_596_800;

/// Unix seconds of 9999-12-31T23:59:59Z; the last storable nanosecond is
/// this second plus 999,999,999 ns.
pub const MAX_ISO_SECONDS: i64 = 253_402_300_799;

/// The smallest instant the store can index: 0001-01-01T00:00:00Z.
pub fn min_iso_instant() -> DateTime<Utc> {
    DateTime::from_timestamp(MIN_ISO_SECONDS, 0).expect("constant is within chrono's range")
}

/// The largest instant the store can index: 9999-12-31T23:59:59.999999999Z.
pub fn max_iso_instant() -> DateTime<Utc> {
    DateTime::from_timestamp(MAX_ISO_SECONDS, 999_999_999)
        .expect("constant is within chrono's range")
}

/// Rejects instants outside the proleptic-Gregorian years 0001–9999.
///
/// # Errors
///
/// Returns [`ConvertError::OutOfRange`] naming the exceeded boundary.
/// Values are never clamped.
pub fn validate_instant(instant: &DateTime<Utc>) -> Result<()> {
    let seconds = instant.timestamp();
    if seconds < MIN_ISO_SECONDS {
        return Err(ConvertError::OutOfRange {
            bound: RangeBound::TooSmall,
            detail: format!("instant {instant} is before 0001-01-01T00:00:00Z"),
        });
    }
    if seconds > MAX_ISO_SECONDS {
        return Err(ConvertError::OutOfRange {
            bound: RangeBound::TooLarge,
            detail: format!("instant {instant} is after 9999-12-31T23:59:59.999999999Z"),
        });
    }
    Ok(())
}

// ── Instant ─────────────────────────────────────────────────────────────────

/// Formats an instant as `yyyy-MM-ddTHH:mm:ss.nnnnnnnnnZ` after range
/// validation.
pub fn format_instant(instant: &DateTime<Utc>) -> Result<String> {
    validate_instant(instant)?;
    Ok(instant.format(INSTANT_FORMAT).to_string())
}

/// Parses an instant from its canonical string. Any RFC 3339 offset is
/// accepted on read and normalized to UTC.
pub fn parse_instant(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| ConvertError::invalid_text("instant", text))
}

// ── Local date / date-time ──────────────────────────────────────────────────

pub fn format_local_date(date: &NaiveDate) -> String {
    date.format(LOCAL_DATE_FORMAT).to_string()
}

pub fn parse_local_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, LOCAL_DATE_FORMAT)
        .map_err(|_| ConvertError::invalid_text("local date", text))
}

pub fn format_local_date_time(date_time: &NaiveDateTime) -> String {
    date_time.format(LOCAL_DATE_TIME_FORMAT).to_string()
}

/// Parses a local date-time; the fractional part is optional and may carry
/// 1–9 digits.
pub fn parse_local_date_time(text: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, LOCAL_DATE_TIME_PARSE_FORMAT)
        .map_err(|_| ConvertError::invalid_text("local date-time", text))
}

// ── Offset date-time ────────────────────────────────────────────────────────

/// Formats a date-time with its fixed offset (`…±HH:MM`), validating the
/// instant projection against the storable year range.
pub fn format_offset_date_time(value: &DateTime<FixedOffset>) -> Result<String> {
    validate_instant(&value.with_timezone(&Utc))?;
    Ok(value.format(OFFSET_DATE_TIME_FORMAT).to_string())
}

/// Parses an offset date-time, preserving the offset it was written with.
pub fn parse_offset_date_time(text: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(text)
        .map_err(|_| ConvertError::invalid_text("offset date-time", text))
}

// ── Wall-clock span ─────────────────────────────────────────────────────────

/// Formats a signed nanosecond count as `[-][D.]HH:MM:SS[.fffffffff]`.
///
/// The day component appears only when non-zero and the fraction only when
/// non-zero (then always 9 digits, so equal values format identically).
pub fn format_time_span(nanos: i64) -> String {
    let magnitude = nanos.unsigned_abs();
    let fraction = magnitude % NANOS_PER_SECOND;
    let total_seconds = magnitude / NANOS_PER_SECOND;
    let seconds = total_seconds % 60;
    let minutes = total_seconds / 60 % 60;
    let hours = total_seconds / 3_600 % 24;
    let days = total_seconds / SECONDS_PER_DAY;

    let mut out = String::new();
    if nanos < 0 {
        out.push('-');
    }
    if days > 0 {
        out.push_str(&format!("{days}."));
    }
    out.push_str(&format!("{hours:02}:{minutes:02}:{seconds:02}"));
    if fraction > 0 {
        out.push_str(&format!(".{fraction:09}"));
    }
    out
}

/// Parses a wall-clock span string back to signed nanoseconds.
///
/// Accepts 1–9 fractional digits, so strings written by an earlier scheme
/// with a 7-digit (100 ns) fraction still read.
pub fn parse_time_span(text: &str) -> Result<i64> {
    let invalid = || ConvertError::invalid_text("wall-clock span", text);

    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let mut parts = unsigned.split(':');
    let hours_part = parts.next().ok_or_else(invalid)?;
    let minutes_part = parts.next().ok_or_else(invalid)?;
    let seconds_part = parts.next().ok_or_else(invalid)?;
    if parts.next().is_some() {
        return Err(invalid());
    }

    let (days, hours_text): (u64, &str) = match hours_part.split_once('.') {
        Some((days_text, hours_text)) => (days_text.parse().map_err(|_| invalid())?, hours_text),
        None => (0, hours_part),
    };
    let hours: u64 = hours_text.parse().map_err(|_| invalid())?;
    let minutes: u64 = minutes_part.parse().map_err(|_| invalid())?;
    let (seconds_text, fraction_text) = match seconds_part.split_once('.') {
        Some((seconds_text, fraction_text)) => (seconds_text, Some(fraction_text)),
        None => (seconds_part, None),
    };
    let seconds: u64 = seconds_text.parse().map_err(|_| invalid())?;

    if hours >= 24 || minutes >= 60 || seconds >= 60 {
        return Err(invalid());
    }

    let fraction: u64 = match fraction_text {
        Some(digits) => {
            if digits.is_empty() || digits.len() > 9 || !digits.bytes().all(|b| b.is_ascii_digit())
            {
                return Err(invalid());
            }
            format!("{digits:0<9}").parse().map_err(|_| invalid())?
        }
        None => 0,
    };

    let magnitude = (u128::from(days) * u128::from(SECONDS_PER_DAY)
        + u128::from(hours) * 3_600
        + u128::from(minutes) * 60
        + u128::from(seconds))
        * u128::from(NANOS_PER_SECOND)
        + u128::from(fraction);

    if negative {
        if magnitude > i64::MAX as u128 + 1 {
            return Err(ConvertError::OutOfRange {
                bound: RangeBound::TooSmall,
                detail: format!("span `{text}` exceeds the representable nanosecond range"),
            });
        }
        Ok((magnitude as i128).wrapping_neg() as i64)
    } else {
        if magnitude > i64::MAX as u128 {
            return Err(ConvertError::OutOfRange {
                bound: RangeBound::TooLarge,
                detail: format!("span `{text}` exceeds the representable nanosecond range"),
            });
        }
        Ok(magnitude as i64)
    }
}

// ── Nanosecond projections ──────────────────────────────────────────────────

/// Nanosecond of day, the numeric range encoding for local times.
///
/// A leap-second reading (nanosecond field of 1,000,000,000 or more) spills
/// into the following second; at the end of the day it folds into
/// 23:59:59.999999999, the last count a day holds.
pub fn local_time_nanos(time: &NaiveTime) -> i64 {
    let nanos = i64::from(time.num_seconds_from_midnight()) * NANOS_PER_SECOND as i64
        + i64::from(time.nanosecond());
    nanos.min((SECONDS_PER_DAY * NANOS_PER_SECOND) as i64 - 1)
}

/// Rebuilds a local time from its nanosecond-of-day count.
pub fn nanos_to_local_time(nanos: i64) -> Result<NaiveTime> {
    if nanos < 0 {
        return Err(ConvertError::OutOfRange {
            bound: RangeBound::TooSmall,
            detail: format!("{nanos} ns is before 00:00:00"),
        });
    }
    let seconds = (nanos as u64 / NANOS_PER_SECOND) as u32;
    let fraction = (nanos as u64 % NANOS_PER_SECOND) as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, fraction).ok_or_else(|| {
        ConvertError::OutOfRange {
            bound: RangeBound::TooLarge,
            detail: format!("{nanos} ns is past 24:00:00"),
        }
    })
}

/// Signed nanoseconds of a fixed UTC offset.
pub fn offset_nanos(offset: &FixedOffset) -> i64 {
    i64::from(offset.local_minus_utc()) * NANOS_PER_SECOND as i64
}

/// Rebuilds a fixed offset; offsets have whole-second resolution and must
/// stay within ±24 hours.
pub fn nanos_to_offset(nanos: i64) -> Result<FixedOffset> {
    if nanos % NANOS_PER_SECOND as i64 != 0 {
        return Err(ConvertError::invalid_text(
            "offset",
            format!("{nanos} ns is not a whole number of seconds"),
        ));
    }
    let seconds = (nanos / NANOS_PER_SECOND as i64) as i32;
    FixedOffset::east_opt(seconds).ok_or_else(|| ConvertError::OutOfRange {
        bound: if nanos < 0 {
            RangeBound::TooSmall
        } else {
            RangeBound::TooLarge
        },
        detail: format!("offset of {seconds} seconds is outside ±24 hours"),
    })
}

/// Total signed nanoseconds of a duration.
///
/// # Errors
///
/// Returns [`ConvertError::OutOfRange`] for durations beyond the `i64`
/// nanosecond range (roughly ±292 years).
pub fn duration_nanos(duration: &Duration) -> Result<i64> {
    duration
        .num_nanoseconds()
        .ok_or_else(|| ConvertError::OutOfRange {
            bound: if *duration < Duration::zero() {
                RangeBound::TooSmall
            } else {
                RangeBound::TooLarge
            },
            detail: "duration exceeds the representable nanosecond range".to_string(),
        })
}

pub fn nanos_to_duration(nanos: i64) -> Duration {
    Duration::nanoseconds(nanos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn instant(text: &str) -> DateTime<Utc> {
        parse_instant(text).unwrap()
    }

    // ── Instant ─────────────────────────────────────────────────────────

    #[test]
    fn test_instant_format_is_fixed_width() {
        let value = Utc.with_ymd_and_hms(2026, 3, 16, 10, 0, 5).unwrap();
        assert_eq!(
            format_instant(&value).unwrap(),
            "2026-03-16T10:00:05.000000000Z"
        );
    }

    #[test]
    fn test_instant_roundtrip_preserves_nanos() {
        let value = Utc
            .with_ymd_and_hms(2026, 3, 16, 10, 0, 5)
            .unwrap()
            .with_nanosecond(123_456_789)
            .unwrap();
        let text = format_instant(&value).unwrap();
        assert_eq!(text, "2026-03-16T10:00:05.123456789Z");
        assert_eq!(parse_instant(&text).unwrap(), value);
    }

    #[test]
    fn test_instant_parse_accepts_trimmed_legacy_fractions() {
        assert_eq!(
            instant("2026-03-16T10:00:05Z"),
            Utc.with_ymd_and_hms(2026, 3, 16, 10, 0, 5).unwrap()
        );
        assert_eq!(
            instant("2026-03-16T10:00:05.5Z").timestamp_subsec_nanos(),
            500_000_000
        );
    }

    #[test]
    fn test_instant_strings_sort_like_instants() {
        let base = Utc.with_ymd_and_hms(2026, 3, 16, 10, 0, 0).unwrap();
        let earlier = format_instant(&base).unwrap();
        let later = format_instant(&(base + Duration::nanoseconds(1))).unwrap();
        let much_later = format_instant(&(base + Duration::minutes(1))).unwrap();
        assert!(earlier < later);
        assert!(later < much_later);
    }

    #[test]
    fn test_instant_boundaries_roundtrip() {
        for value in [min_iso_instant(), max_iso_instant()] {
            let text = format_instant(&value).unwrap();
            assert_eq!(parse_instant(&text).unwrap(), value);
        }
    }

    #[test]
    fn test_instant_one_nano_past_bounds_rejected() {
        let below = min_iso_instant() - Duration::nanoseconds(1);
        let above = max_iso_instant() + Duration::nanoseconds(1);

        let err = validate_instant(&below).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::OutOfRange {
                bound: RangeBound::TooSmall,
                ..
            }
        ));

        let err = validate_instant(&above).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::OutOfRange {
                bound: RangeBound::TooLarge,
                ..
            }
        ));
    }

    // ── Local date / date-time ──────────────────────────────────────────

    #[test]
    fn test_local_date_roundtrip() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 28).unwrap();
        assert_eq!(format_local_date(&date), "2026-02-28");
        assert_eq!(parse_local_date("2026-02-28").unwrap(), date);
        assert!(parse_local_date("2026-02-30").is_err());
    }

    #[test]
    fn test_local_date_time_roundtrip() {
        let value = NaiveDate::from_ymd_opt(2026, 3, 16)
            .unwrap()
            .and_hms_nano_opt(10, 0, 5, 42)
            .unwrap();
        let text = format_local_date_time(&value);
        assert_eq!(text, "2026-03-16T10:00:05.000000042");
        assert_eq!(parse_local_date_time(&text).unwrap(), value);
        // Fraction is optional on read.
        assert!(parse_local_date_time("2026-03-16T10:00:05").is_ok());
    }

    // ── Offset date-time ────────────────────────────────────────────────

    #[test]
    fn test_offset_date_time_roundtrip_preserves_offset() {
        let offset = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        let value = offset
            .with_ymd_and_hms(2026, 3, 16, 10, 0, 5)
            .single()
            .unwrap();
        let text = format_offset_date_time(&value).unwrap();
        assert_eq!(text, "2026-03-16T10:00:05.000000000+05:30");
        let parsed = parse_offset_date_time(&text).unwrap();
        assert_eq!(parsed, value);
        assert_eq!(parsed.offset(), value.offset());
    }

    // ── Wall-clock span ─────────────────────────────────────────────────

    #[test]
    fn test_time_span_basic_forms() {
        assert_eq!(format_time_span(0), "00:00:00");
        assert_eq!(format_time_span(7 * 3_600 * 1_000_000_000), "07:00:00");
        assert_eq!(
            format_time_span(-(26 * 3_600 + 3 * 60 + 4) * 1_000_000_000 - 500_000_000),
            "-1.02:03:04.500000000"
        );
    }

    #[test]
    fn test_time_span_parse_forms() {
        assert_eq!(parse_time_span("00:00:00").unwrap(), 0);
        assert_eq!(
            parse_time_span("1.02:03:04").unwrap(),
            (86_400 + 2 * 3_600 + 3 * 60 + 4) * 1_000_000_000
        );
        // 7-digit fractions written by the earlier 100 ns scheme.
        assert_eq!(
            parse_time_span("00:00:00.1234567").unwrap(),
            123_456_700
        );
        assert_eq!(parse_time_span("-00:00:01").unwrap(), -1_000_000_000);
    }

    #[test]
    fn test_time_span_rejects_malformed_text() {
        for text in ["", "07:00", "24:00:00", "00:60:00", "00:00:60", "1:2", "abc"] {
            assert!(parse_time_span(text).is_err(), "accepted `{text}`");
        }
        assert!(parse_time_span("00:00:00.1234567890").is_err());
    }

    #[test]
    fn test_time_span_extremes_roundtrip() {
        for nanos in [i64::MAX, i64::MIN, 1, -1] {
            assert_eq!(parse_time_span(&format_time_span(nanos)).unwrap(), nanos);
        }
    }

    // ── Projections ─────────────────────────────────────────────────────

    #[test]
    fn test_local_time_nanos_roundtrip() {
        let time = NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap();
        let nanos = local_time_nanos(&time);
        assert_eq!(nanos, 86_400 * 1_000_000_000 - 1);
        assert_eq!(nanos_to_local_time(nanos).unwrap(), time);
        assert!(nanos_to_local_time(-1).is_err());
        assert!(nanos_to_local_time(86_400 * 1_000_000_000).is_err());
    }

    #[test]
    fn test_leap_second_folds_into_last_nanosecond_of_day() {
        // chrono models a leap second as a nanosecond field past 10^9.
        let leap = NaiveTime::from_hms_nano_opt(23, 59, 59, 1_500_000_000).unwrap();
        let nanos = local_time_nanos(&leap);
        assert_eq!(nanos, 86_400 * 1_000_000_000 - 1);
        assert_eq!(format_time_span(nanos), "23:59:59.999999999");
        assert_eq!(
            nanos_to_local_time(nanos).unwrap(),
            NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap()
        );

        // A mid-day leap reading stays within the day and spills into the
        // following second, still a valid round-trippable count.
        let mid = NaiveTime::from_hms_nano_opt(12, 0, 0, 1_250_000_000).unwrap();
        let nanos = local_time_nanos(&mid);
        assert_eq!(nanos, 12 * 3_600 * 1_000_000_000 + 1_250_000_000);
        assert_eq!(
            nanos_to_local_time(nanos).unwrap(),
            NaiveTime::from_hms_nano_opt(12, 0, 1, 250_000_000).unwrap()
        );
    }

    #[test]
    fn test_offset_nanos_roundtrip() {
        let offset = FixedOffset::west_opt(8 * 3600).unwrap();
        let nanos = offset_nanos(&offset);
        assert_eq!(nanos_to_offset(nanos).unwrap(), offset);
        assert!(nanos_to_offset(500).is_err());
        assert!(nanos_to_offset(25 * 3_600 * 1_000_000_000).is_err());
    }

    #[test]
    fn test_duration_nanos_overflow_is_an_error() {
        assert!(duration_nanos(&Duration::MAX).is_err());
        assert_eq!(
            duration_nanos(&Duration::seconds(90)).unwrap(),
            90_000_000_000
        );
    }

    // ── Properties ──────────────────────────────────────────────────────

    proptest! {
        #[test]
        fn prop_time_span_roundtrip(nanos in any::<i64>()) {
            let text = format_time_span(nanos);
            prop_assert_eq!(parse_time_span(&text).unwrap(), nanos);
        }

        #[test]
        fn prop_instant_roundtrip(
            seconds in MIN_ISO_SECONDS..=MAX_ISO_SECONDS,
            nanos in 0u32..1_000_000_000,
        ) {
            let value = DateTime::from_timestamp(seconds, nanos).unwrap();
            let text = format_instant(&value).unwrap();
            prop_assert_eq!(parse_instant(&text).unwrap(), value);
        }

        #[test]
        fn prop_instant_strings_preserve_order(
            a in MIN_ISO_SECONDS..=MAX_ISO_SECONDS,
            b in MIN_ISO_SECONDS..=MAX_ISO_SECONDS,
        ) {
            let left = DateTime::from_timestamp(a, 0).unwrap();
            let right = DateTime::from_timestamp(b, 0).unwrap();
            let left_text = format_instant(&left).unwrap();
            let right_text = format_instant(&right).unwrap();
            prop_assert_eq!(left.cmp(&right), left_text.cmp(&right_text));
        }
    }
}
