//! Document converters: JSON node ⇄ typed value for whole-document persistence.
//!
//! Every converter writes exactly one canonical form (from [`crate::patterns`])
//! and reads a superset of it: the scalar converters that replaced an earlier
//! object-shaped encoding optionally accept that legacy shape on read, so data
//! written by the old scheme stays loadable while everything written from now
//! on is canonical.
//!
//! Composite types (zoned date-times, intervals) are stored as two-member
//! objects; both members must be present on read, in any order.

use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use serde_json::{Map, Value};

use crate::error::{ConvertError, Result};
use crate::patterns;
use crate::types::{DateInterval, Interval, ZoneProvider, ZonedDateTime};

/// Member names of the stored composite objects. Fixed by the wire format.
pub const START_MEMBER: &str = "Start";
pub const END_MEMBER: &str = "End";
pub const OFFSET_DATE_TIME_MEMBER: &str = "OffsetDateTime";
pub const ZONE_MEMBER: &str = "Zone";

/// Encodes one temporal type to its stored JSON node and back.
///
/// Both directions are pure functions over the pattern table; `read` fails
/// on anything outside the (possibly relaxed) accepted forms.
pub trait DocumentConverter {
    type Value;

    fn write(&self, value: &Self::Value) -> Result<Value>;
    fn read(&self, node: &Value) -> Result<Self::Value>;
}

fn expect_string<'a>(node: &'a Value, kind: &'static str) -> Result<&'a str> {
    node.as_str()
        .ok_or_else(|| ConvertError::invalid_text(kind, node.to_string()))
}

fn expect_object<'a>(node: &'a Value, type_name: &str) -> Result<&'a Map<String, Value>> {
    node.as_object().ok_or_else(|| {
        ConvertError::MalformedComposite(format!("a {type_name} must be a JSON object"))
    })
}

fn composite_member<'a>(
    object: &'a Map<String, Value>,
    member: &str,
    type_name: &str,
) -> Result<&'a Value> {
    object.get(member).ok_or_else(|| {
        ConvertError::MalformedComposite(format!("a {type_name} must contain a {member} member"))
    })
}

// ── Legacy object shapes ────────────────────────────────────────────────────

fn legacy_integer(object: &Map<String, Value>, member: &str, kind: &'static str) -> Result<i64> {
    object
        .get(member)
        .and_then(Value::as_i64)
        .ok_or_else(|| ConvertError::invalid_text(kind, format!("object missing `{member}`")))
}

fn check_legacy_calendar(object: &Map<String, Value>) -> Result<()> {
    let Some(calendar) = object.get("calendar") else {
        return Ok(());
    };
    match calendar.as_str() {
        Some("Iso") | Some("ISO") => Ok(()),
        Some(other) => Err(ConvertError::UnsupportedCalendar(other.to_string())),
        None => Err(ConvertError::UnsupportedCalendar(calendar.to_string())),
    }
}

fn legacy_local_date(object: &Map<String, Value>) -> Result<NaiveDate> {
    check_legacy_calendar(object)?;
    let year = legacy_integer(object, "year", "local date")?;
    let month = legacy_integer(object, "month", "local date")?;
    let day = legacy_integer(object, "day", "local date")?;
    NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32).ok_or_else(|| {
        ConvertError::invalid_text("local date", format!("{year:04}-{month:02}-{day:02}"))
    })
}

fn legacy_local_date_time(object: &Map<String, Value>) -> Result<NaiveDateTime> {
    let date = legacy_local_date(object)?;
    let nano_of_day = legacy_integer(object, "nanoOfDay", "local date-time")?;
    Ok(date.and_time(patterns::nanos_to_local_time(nano_of_day)?))
}

fn legacy_local_time(object: &Map<String, Value>) -> Result<NaiveTime> {
    let nano_of_day = legacy_integer(object, "nanoOfDay", "local time")?;
    patterns::nanos_to_local_time(nano_of_day)
}

/// Canonical read first, legacy object shape second — never the other way
/// around.
fn read_with_fallback<T>(
    node: &Value,
    relaxed: bool,
    canonical: impl FnOnce(&Value) -> Result<T>,
    legacy: impl FnOnce(&Map<String, Value>) -> Result<T>,
) -> Result<T> {
    match canonical(node) {
        Ok(value) => Ok(value),
        Err(canonical_err) => match node.as_object() {
            Some(object) if relaxed => legacy(object),
            _ => Err(canonical_err),
        },
    }
}

// ── Scalar converters ───────────────────────────────────────────────────────

/// Instants as range-validated extended-ISO strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantConverter;

impl DocumentConverter for InstantConverter {
    type Value = DateTime<Utc>;

    fn write(&self, value: &Self::Value) -> Result<Value> {
        Ok(Value::String(patterns::format_instant(value)?))
    }

    fn read(&self, node: &Value) -> Result<Self::Value> {
        patterns::parse_instant(expect_string(node, "instant")?)
    }
}

/// Local dates as `yyyy-MM-dd` strings; optionally reads the legacy
/// `{year, month, day, calendar}` object shape.
#[derive(Debug, Clone, Copy)]
pub struct LocalDateConverter {
    relaxed: bool,
}

impl LocalDateConverter {
    pub fn new(relaxed: bool) -> Self {
        Self { relaxed }
    }
}

impl DocumentConverter for LocalDateConverter {
    type Value = NaiveDate;

    fn write(&self, value: &Self::Value) -> Result<Value> {
        Ok(Value::String(patterns::format_local_date(value)))
    }

    fn read(&self, node: &Value) -> Result<Self::Value> {
        read_with_fallback(
            node,
            self.relaxed,
            |node| patterns::parse_local_date(expect_string(node, "local date")?),
            legacy_local_date,
        )
    }
}

/// Local date-times as extended-ISO strings; optionally reads the legacy
/// `{year, month, day, nanoOfDay, calendar}` object shape.
#[derive(Debug, Clone, Copy)]
pub struct LocalDateTimeConverter {
    relaxed: bool,
}

impl LocalDateTimeConverter {
    pub fn new(relaxed: bool) -> Self {
        Self { relaxed }
    }
}

impl DocumentConverter for LocalDateTimeConverter {
    type Value = NaiveDateTime;

    fn write(&self, value: &Self::Value) -> Result<Value> {
        Ok(Value::String(patterns::format_local_date_time(value)))
    }

    fn read(&self, node: &Value) -> Result<Self::Value> {
        read_with_fallback(
            node,
            self.relaxed,
            |node| patterns::parse_local_date_time(expect_string(node, "local date-time")?),
            legacy_local_date_time,
        )
    }
}

/// Local times as wall-clock span strings; optionally reads the legacy
/// `{nanoOfDay}` object shape.
#[derive(Debug, Clone, Copy)]
pub struct LocalTimeConverter {
    relaxed: bool,
}

impl LocalTimeConverter {
    pub fn new(relaxed: bool) -> Self {
        Self { relaxed }
    }
}

impl DocumentConverter for LocalTimeConverter {
    type Value = NaiveTime;

    fn write(&self, value: &Self::Value) -> Result<Value> {
        Ok(Value::String(patterns::format_time_span(
            patterns::local_time_nanos(value),
        )))
    }

    fn read(&self, node: &Value) -> Result<Self::Value> {
        read_with_fallback(
            node,
            self.relaxed,
            |node| {
                patterns::nanos_to_local_time(patterns::parse_time_span(expect_string(
                    node,
                    "local time",
                )?)?)
            },
            legacy_local_time,
        )
    }
}

/// Fixed UTC offsets as wall-clock span strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct OffsetConverter;

impl DocumentConverter for OffsetConverter {
    type Value = FixedOffset;

    fn write(&self, value: &Self::Value) -> Result<Value> {
        Ok(Value::String(patterns::format_time_span(
            patterns::offset_nanos(value),
        )))
    }

    fn read(&self, node: &Value) -> Result<Self::Value> {
        patterns::nanos_to_offset(patterns::parse_time_span(expect_string(node, "offset")?)?)
    }
}

/// Durations as signed wall-clock span strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct DurationConverter;

impl DocumentConverter for DurationConverter {
    type Value = Duration;

    fn write(&self, value: &Self::Value) -> Result<Value> {
        Ok(Value::String(patterns::format_time_span(
            patterns::duration_nanos(value)?,
        )))
    }

    fn read(&self, node: &Value) -> Result<Self::Value> {
        Ok(patterns::nanos_to_duration(patterns::parse_time_span(
            expect_string(node, "duration")?,
        )?))
    }
}

/// Offset date-times as RFC 3339 strings carrying their offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct OffsetDateTimeConverter;

impl DocumentConverter for OffsetDateTimeConverter {
    type Value = DateTime<FixedOffset>;

    fn write(&self, value: &Self::Value) -> Result<Value> {
        Ok(Value::String(patterns::format_offset_date_time(value)?))
    }

    fn read(&self, node: &Value) -> Result<Self::Value> {
        patterns::parse_offset_date_time(expect_string(node, "offset date-time")?)
    }
}

/// Periods in their literal round-trip form.
#[derive(Debug, Clone, Copy, Default)]
pub struct PeriodConverter;

impl DocumentConverter for PeriodConverter {
    type Value = crate::types::Period;

    fn write(&self, value: &Self::Value) -> Result<Value> {
        Ok(Value::String(value.to_string()))
    }

    fn read(&self, node: &Value) -> Result<Self::Value> {
        expect_string(node, "period")?.parse()
    }
}

/// Time zones as their id string, resolved through the configured provider.
#[derive(Clone)]
pub struct TimeZoneConverter {
    provider: Arc<dyn ZoneProvider>,
}

impl TimeZoneConverter {
    pub fn new(provider: Arc<dyn ZoneProvider>) -> Self {
        Self { provider }
    }
}

impl DocumentConverter for TimeZoneConverter {
    type Value = Tz;

    fn write(&self, value: &Self::Value) -> Result<Value> {
        Ok(Value::String(value.name().to_string()))
    }

    fn read(&self, node: &Value) -> Result<Self::Value> {
        let id = expect_string(node, "time zone id")?;
        self.provider
            .resolve(id)
            .ok_or_else(|| ConvertError::UnknownZone(id.to_string()))
    }
}

// ── Composite converters ────────────────────────────────────────────────────

/// Zoned date-times as `{OffsetDateTime, Zone}` objects.
#[derive(Clone)]
pub struct ZonedDateTimeConverter {
    provider: Arc<dyn ZoneProvider>,
}

impl ZonedDateTimeConverter {
    pub fn new(provider: Arc<dyn ZoneProvider>) -> Self {
        Self { provider }
    }
}

impl DocumentConverter for ZonedDateTimeConverter {
    type Value = ZonedDateTime;

    fn write(&self, value: &Self::Value) -> Result<Value> {
        let mut object = Map::new();
        object.insert(
            OFFSET_DATE_TIME_MEMBER.to_string(),
            Value::String(patterns::format_offset_date_time(&value.offset_date_time())?),
        );
        object.insert(
            ZONE_MEMBER.to_string(),
            Value::String(value.zone().name().to_string()),
        );
        Ok(Value::Object(object))
    }

    fn read(&self, node: &Value) -> Result<Self::Value> {
        let object = expect_object(node, "ZonedDateTime")?;
        let odt_node = composite_member(object, OFFSET_DATE_TIME_MEMBER, "ZonedDateTime")?;
        let zone_node = composite_member(object, ZONE_MEMBER, "ZonedDateTime")?;

        let offset_date_time =
            patterns::parse_offset_date_time(expect_string(odt_node, "offset date-time")?)?;
        let id = expect_string(zone_node, "time zone id")?;
        let zone = self
            .provider
            .resolve(id)
            .ok_or_else(|| ConvertError::UnknownZone(id.to_string()))?;

        ZonedDateTime::new(offset_date_time, zone)
    }
}

/// Instant intervals as `{Start, End}` objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntervalConverter;

impl DocumentConverter for IntervalConverter {
    type Value = Interval;

    fn write(&self, value: &Self::Value) -> Result<Value> {
        let mut object = Map::new();
        object.insert(
            START_MEMBER.to_string(),
            Value::String(patterns::format_instant(&value.start())?),
        );
        object.insert(
            END_MEMBER.to_string(),
            Value::String(patterns::format_instant(&value.end())?),
        );
        Ok(Value::Object(object))
    }

    fn read(&self, node: &Value) -> Result<Self::Value> {
        let object = expect_object(node, "Interval")?;
        let start_node = composite_member(object, START_MEMBER, "Interval")?;
        let end_node = composite_member(object, END_MEMBER, "Interval")?;
        Interval::new(
            patterns::parse_instant(expect_string(start_node, "instant")?)?,
            patterns::parse_instant(expect_string(end_node, "instant")?)?,
        )
    }
}

/// Date intervals as `{Start, End}` objects of local dates.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateIntervalConverter;

impl DocumentConverter for DateIntervalConverter {
    type Value = DateInterval;

    fn write(&self, value: &Self::Value) -> Result<Value> {
        let mut object = Map::new();
        object.insert(
            START_MEMBER.to_string(),
            Value::String(patterns::format_local_date(&value.start())),
        );
        object.insert(
            END_MEMBER.to_string(),
            Value::String(patterns::format_local_date(&value.end())),
        );
        Ok(Value::Object(object))
    }

    fn read(&self, node: &Value) -> Result<Self::Value> {
        let object = expect_object(node, "DateInterval")?;
        let start_node = composite_member(object, START_MEMBER, "DateInterval")?;
        let end_node = composite_member(object, END_MEMBER, "DateInterval")?;
        DateInterval::new(
            patterns::parse_local_date(expect_string(start_node, "local date")?)?,
            patterns::parse_local_date(expect_string(end_node, "local date")?)?,
        )
    }
}
