//! Query-value converters: encode a comparison operand for a predicate.
//!
//! Every converter takes the callback shape the host query builder consumes:
//! `(field_name, value, for_range) -> operand`. Equality operands are the
//! exact canonical document strings, so `field == v` matches stored values
//! byte for byte. Range operands differ only where the document string does
//! not sort correctly in the index: local times, offsets, and durations
//! compare as signed nanosecond counts against a numeric index, while
//! instant-like strings are already order-preserving and are reused as-is.
//!
//! Types without a total order (periods, time zones) refuse range mode
//! outright instead of producing a silently wrong filter.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;

use crate::error::{ConvertError, Result};
use crate::patterns;
use crate::types::{Period, TemporalType, ZonedDateTime};

/// An encoded comparison operand, ready for the host query builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOperand {
    Text(String),
    Number(i64),
}

impl std::fmt::Display for QueryOperand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryOperand::Text(text) => f.write_str(text),
            QueryOperand::Number(number) => write!(f, "{number}"),
        }
    }
}

/// Shared by the three span-valued types: numeric for range comparison,
/// display string for equality.
fn time_span_operand(nanos: i64, for_range: bool) -> QueryOperand {
    if for_range {
        QueryOperand::Number(nanos)
    } else {
        QueryOperand::Text(patterns::format_time_span(nanos))
    }
}

pub fn instant_operand(
    _field_name: &str,
    value: &DateTime<Utc>,
    _for_range: bool,
) -> Result<QueryOperand> {
    Ok(QueryOperand::Text(patterns::format_instant(value)?))
}

pub fn local_date_operand(
    _field_name: &str,
    value: &NaiveDate,
    _for_range: bool,
) -> Result<QueryOperand> {
    Ok(QueryOperand::Text(patterns::format_local_date(value)))
}

pub fn local_date_time_operand(
    _field_name: &str,
    value: &NaiveDateTime,
    _for_range: bool,
) -> Result<QueryOperand> {
    Ok(QueryOperand::Text(patterns::format_local_date_time(value)))
}

pub fn local_time_operand(
    _field_name: &str,
    value: &NaiveTime,
    for_range: bool,
) -> Result<QueryOperand> {
    Ok(time_span_operand(patterns::local_time_nanos(value), for_range))
}

pub fn offset_operand(
    _field_name: &str,
    value: &FixedOffset,
    for_range: bool,
) -> Result<QueryOperand> {
    Ok(time_span_operand(patterns::offset_nanos(value), for_range))
}

pub fn duration_operand(
    _field_name: &str,
    value: &Duration,
    for_range: bool,
) -> Result<QueryOperand> {
    Ok(time_span_operand(patterns::duration_nanos(value)?, for_range))
}

/// Offset date-times compare through their absolute-instant projection;
/// the composite itself is never a range operand.
pub fn offset_date_time_operand(
    _field_name: &str,
    value: &DateTime<FixedOffset>,
    _for_range: bool,
) -> Result<QueryOperand> {
    Ok(QueryOperand::Text(patterns::format_instant(
        &value.with_timezone(&Utc),
    )?))
}

/// Zoned date-times compare through their absolute-instant projection; the
/// zone id carries no order.
pub fn zoned_date_time_operand(
    _field_name: &str,
    value: &ZonedDateTime,
    _for_range: bool,
) -> Result<QueryOperand> {
    Ok(QueryOperand::Text(patterns::format_instant(
        &value.to_instant(),
    )?))
}

/// Periods support equality predicates only.
pub fn period_operand(_field_name: &str, value: &Period, for_range: bool) -> Result<QueryOperand> {
    if for_range {
        return Err(ConvertError::RangeUnsupported(TemporalType::Period));
    }
    Ok(QueryOperand::Text(value.to_string()))
}

/// Time-zone ids support equality predicates only.
pub fn time_zone_operand(_field_name: &str, value: &Tz, for_range: bool) -> Result<QueryOperand> {
    if for_range {
        return Err(ConvertError::RangeUnsupported(TemporalType::TimeZone));
    }
    Ok(QueryOperand::Text(value.name().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{
        DocumentConverter, DurationConverter, InstantConverter, LocalTimeConverter,
    };
    use chrono::TimeZone;
    use serde_json::Value;

    fn text(operand: QueryOperand) -> String {
        match operand {
            QueryOperand::Text(text) => text,
            QueryOperand::Number(number) => panic!("expected text, got {number}"),
        }
    }

    fn number(operand: QueryOperand) -> i64 {
        match operand {
            QueryOperand::Number(number) => number,
            QueryOperand::Text(text) => panic!("expected number, got {text}"),
        }
    }

    // ── Equality-mode operands match document encodings ─────────────────

    #[test]
    fn test_instant_equality_operand_matches_document_form() {
        let value = Utc.with_ymd_and_hms(2026, 3, 16, 10, 0, 5).unwrap();
        let stored = InstantConverter.write(&value).unwrap();
        let operand = instant_operand("When", &value, false).unwrap();
        assert_eq!(Value::String(text(operand)), stored);
    }

    #[test]
    fn test_local_time_equality_operand_matches_document_form() {
        let time = NaiveTime::from_hms_opt(7, 0, 0).unwrap();
        let stored = LocalTimeConverter::new(false).write(&time).unwrap();
        let operand = local_time_operand("At", &time, false).unwrap();
        assert_eq!(Value::String(text(operand)), stored);
    }

    #[test]
    fn test_duration_equality_operand_matches_document_form() {
        let duration = Duration::minutes(-90);
        let stored = DurationConverter.write(&duration).unwrap();
        let operand = duration_operand("Elapsed", &duration, false).unwrap();
        assert_eq!(Value::String(text(operand)), stored);
    }

    // ── Range-mode encodings ────────────────────────────────────────────

    #[test]
    fn test_span_types_encode_numerically_for_range() {
        let time = NaiveTime::from_hms_opt(7, 0, 0).unwrap();
        assert_eq!(
            number(local_time_operand("At", &time, true).unwrap()),
            7 * 3_600 * 1_000_000_000
        );

        let offset = FixedOffset::west_opt(3600).unwrap();
        assert_eq!(
            number(offset_operand("Off", &offset, true).unwrap()),
            -3_600_000_000_000
        );

        let duration = Duration::seconds(2);
        assert_eq!(
            number(duration_operand("Elapsed", &duration, true).unwrap()),
            2_000_000_000
        );
    }

    #[test]
    fn test_instant_range_operand_is_the_same_string() {
        let value = Utc.with_ymd_and_hms(2026, 3, 16, 10, 0, 5).unwrap();
        assert_eq!(
            instant_operand("When", &value, true).unwrap(),
            instant_operand("When", &value, false).unwrap()
        );
    }

    #[test]
    fn test_out_of_range_instant_operand_fails() {
        let above = patterns::max_iso_instant() + Duration::nanoseconds(1);
        assert!(instant_operand("When", &above, true).is_err());

        let offset = FixedOffset::east_opt(0).unwrap();
        let odt = above.with_timezone(&offset);
        assert!(offset_date_time_operand("When", &odt, true).is_err());
    }

    // ── Non-orderable types refuse range mode ───────────────────────────

    #[test]
    fn test_period_range_predicate_is_an_error() {
        let period = Period::from_minutes(90);
        assert_eq!(text(period_operand("Every", &period, false).unwrap()), "PT90M");
        assert!(matches!(
            period_operand("Every", &period, true).unwrap_err(),
            ConvertError::RangeUnsupported(TemporalType::Period)
        ));
    }

    #[test]
    fn test_time_zone_range_predicate_is_an_error() {
        let zone: Tz = "Europe/Paris".parse().unwrap();
        assert_eq!(text(time_zone_operand("Zone", &zone, false).unwrap()), "Europe/Paris");
        assert!(matches!(
            time_zone_operand("Zone", &zone, true).unwrap_err(),
            ConvertError::RangeUnsupported(TemporalType::TimeZone)
        ));
    }

    // ── Store-shaped scenarios over encoded operands ────────────────────

    #[test]
    fn test_instant_equality_and_range_scenario() {
        // Three documents at t, t+1min, t+2min, indexed by their canonical
        // strings.
        let t = Utc.with_ymd_and_hms(2026, 3, 16, 10, 0, 0).unwrap();
        let stored: Vec<String> = (0..3)
            .map(|i| text(instant_operand("When", &(t + Duration::minutes(i)), false).unwrap()))
            .collect();

        let probe = text(instant_operand("When", &t, true).unwrap());

        let equal: Vec<_> = stored.iter().filter(|s| **s == probe).collect();
        assert_eq!(equal.len(), 1);

        let mut greater: Vec<_> = stored.iter().filter(|s| **s > probe).collect();
        greater.sort_by(|a, b| b.cmp(a));
        assert_eq!(greater.len(), 2);
        assert!(greater[0] > greater[1]);

        let mut at_least: Vec<_> = stored.iter().filter(|s| **s >= probe).collect();
        at_least.sort_by(|a, b| b.cmp(a));
        assert_eq!(at_least.len(), 3);
        assert!(at_least[0] > at_least[1] && at_least[1] > at_least[2]);
    }

    #[test]
    fn test_local_time_range_scenario_uses_numeric_encoding() {
        // 07:00, 07:01, 07:02 against a numeric index.
        let base = NaiveTime::from_hms_opt(7, 0, 0).unwrap();
        let stored: Vec<i64> = (0..3)
            .map(|i| {
                let time = base + Duration::minutes(i);
                number(local_time_operand("At", &time, true).unwrap())
            })
            .collect();

        let probe = number(local_time_operand("At", &base, true).unwrap());
        let mut later: Vec<_> = stored.iter().copied().filter(|n| *n > probe).collect();
        later.sort();
        assert_eq!(later.len(), 2);
        assert!(later[0] < later[1]);

        // The display string would sort "07:01:00" after "07:00:00" too, but
        // a numeric index cannot compare strings; the numeric operand is the
        // contract.
        assert_eq!(stored[1] - stored[0], 60_000_000_000);
    }
}
