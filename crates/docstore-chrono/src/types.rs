//! Value types exchanged with the document store.
//!
//! Scalar temporal values are plain `chrono` types. This module adds the
//! composite types the store persists as two-member objects
//! ([`ZonedDateTime`], [`Interval`], [`DateInterval`]), the calendar-relative
//! [`Period`], the zone-resolution seam ([`ZoneProvider`]), and the dispatch
//! enums ([`TemporalType`], [`TemporalValue`]) the conventions registry is
//! keyed by.

use chrono::{
    DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};
use chrono_tz::Tz;

use crate::error::{ConvertError, Result};

// ── Temporal type inventory ─────────────────────────────────────────────────

/// Every temporal type the adapters know how to convert.
///
/// Used as the registry key: one document converter per variant, and one
/// query-value converter where querying is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TemporalType {
    Instant,
    LocalDate,
    LocalTime,
    LocalDateTime,
    Offset,
    OffsetDateTime,
    ZonedDateTime,
    Duration,
    Period,
    Interval,
    DateInterval,
    TimeZone,
}

impl std::fmt::Display for TemporalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TemporalType::Instant => "Instant",
            TemporalType::LocalDate => "LocalDate",
            TemporalType::LocalTime => "LocalTime",
            TemporalType::LocalDateTime => "LocalDateTime",
            TemporalType::Offset => "Offset",
            TemporalType::OffsetDateTime => "OffsetDateTime",
            TemporalType::ZonedDateTime => "ZonedDateTime",
            TemporalType::Duration => "Duration",
            TemporalType::Period => "Period",
            TemporalType::Interval => "Interval",
            TemporalType::DateInterval => "DateInterval",
            TemporalType::TimeZone => "TimeZone",
        };
        f.write_str(name)
    }
}

// ── Zone resolution ─────────────────────────────────────────────────────────

/// Resolves a time-zone id to a concrete zone, or `None` when unknown.
///
/// The default implementation is backed by the bundled IANA database
/// ([`TzdbZoneProvider`]); tests or hosts with their own zone source can
/// substitute another implementation at configuration time.
pub trait ZoneProvider: Send + Sync {
    fn resolve(&self, id: &str) -> Option<Tz>;
}

/// [`ZoneProvider`] backed by the IANA tz database shipped with `chrono-tz`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TzdbZoneProvider;

impl ZoneProvider for TzdbZoneProvider {
    fn resolve(&self, id: &str) -> Option<Tz> {
        id.parse().ok()
    }
}

// ── ZonedDateTime ───────────────────────────────────────────────────────────

/// A date and time anchored to a named IANA time zone.
///
/// Persisted as a two-member object: the absolute time with its fixed offset,
/// plus the zone id. The offset is redundant with the zone but stored so the
/// absolute-time member sorts as an instant without zone lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZonedDateTime {
    offset_date_time: DateTime<FixedOffset>,
    zone: Tz,
}

impl ZonedDateTime {
    /// Pairs an offset date-time with a zone, verifying that the zone maps
    /// this instant to the given offset.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::MalformedComposite`] when the offset is not
    /// the one the zone assigns at this instant.
    pub fn new(offset_date_time: DateTime<FixedOffset>, zone: Tz) -> Result<Self> {
        let expected = zone
            .offset_from_utc_datetime(&offset_date_time.naive_utc())
            .fix();
        if expected != *offset_date_time.offset() {
            return Err(ConvertError::MalformedComposite(format!(
                "offset {} is not valid for zone {} at {}",
                offset_date_time.offset(),
                zone.name(),
                offset_date_time.naive_utc(),
            )));
        }
        Ok(Self {
            offset_date_time,
            zone,
        })
    }

    /// Anchors an absolute instant to a zone, deriving the offset.
    pub fn from_instant(instant: DateTime<Utc>, zone: Tz) -> Self {
        let local = instant.with_timezone(&zone);
        let offset = local.offset().fix();
        Self {
            offset_date_time: instant.with_timezone(&offset),
            zone,
        }
    }

    /// The absolute point on the UTC timeline.
    pub fn to_instant(&self) -> DateTime<Utc> {
        self.offset_date_time.with_timezone(&Utc)
    }

    /// The stored absolute time with its fixed offset.
    pub fn offset_date_time(&self) -> DateTime<FixedOffset> {
        self.offset_date_time
    }

    /// The local clock reading, with zone and offset dropped.
    pub fn local_date_time(&self) -> NaiveDateTime {
        self.offset_date_time.naive_local()
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }
}

// ── Intervals ───────────────────────────────────────────────────────────────

/// A half-open span `[start, end)` between two instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Interval {
    /// # Errors
    ///
    /// Returns [`ConvertError::InvalidInterval`] when `end` is before `start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end < start {
            return Err(ConvertError::InvalidInterval(format!(
                "start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

/// A closed span `[start, end]` between two local dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateInterval {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateInterval {
    /// # Errors
    ///
    /// Returns [`ConvertError::InvalidInterval`] when `end` is before `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(ConvertError::InvalidInterval(format!(
                "start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

// ── Period ──────────────────────────────────────────────────────────────────

/// A calendar-relative span: independent year/month/…/nanosecond components.
///
/// Components are never normalized against each other — 90 minutes and
/// 1 hour 30 minutes are distinct values, compare unequal, and round-trip
/// their literal form. There is no total order over periods, so they support
/// equality predicates only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Period {
    pub years: i64,
    pub months: i64,
    pub weeks: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub milliseconds: i64,
    pub nanoseconds: i64,
}

impl Period {
    pub fn from_years(years: i64) -> Self {
        Self {
            years,
            ..Self::default()
        }
    }

    pub fn from_months(months: i64) -> Self {
        Self {
            months,
            ..Self::default()
        }
    }

    pub fn from_weeks(weeks: i64) -> Self {
        Self {
            weeks,
            ..Self::default()
        }
    }

    pub fn from_days(days: i64) -> Self {
        Self {
            days,
            ..Self::default()
        }
    }

    pub fn from_hours(hours: i64) -> Self {
        Self {
            hours,
            ..Self::default()
        }
    }

    pub fn from_minutes(minutes: i64) -> Self {
        Self {
            minutes,
            ..Self::default()
        }
    }

    pub fn from_seconds(seconds: i64) -> Self {
        Self {
            seconds,
            ..Self::default()
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl std::fmt::Display for Period {
    /// Literal round-trip form: `P` + date components (`Y`, `M`, `W`, `D`),
    /// then `T` + time components (`H`, `M`, `S`, `s` for milliseconds, `n`
    /// for nanoseconds), each written only when non-zero. The zero period is
    /// `P0D`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_zero() {
            return f.write_str("P0D");
        }
        f.write_str("P")?;
        for (value, designator) in [
            (self.years, "Y"),
            (self.months, "M"),
            (self.weeks, "W"),
            (self.days, "D"),
        ] {
            if value != 0 {
                write!(f, "{value}{designator}")?;
            }
        }
        let time = [
            (self.hours, "H"),
            (self.minutes, "M"),
            (self.seconds, "S"),
            (self.milliseconds, "s"),
            (self.nanoseconds, "n"),
        ];
        if time.iter().any(|(value, _)| *value != 0) {
            f.write_str("T")?;
            for (value, designator) in time {
                if value != 0 {
                    write!(f, "{value}{designator}")?;
                }
            }
        }
        Ok(())
    }
}

impl std::str::FromStr for Period {
    type Err = ConvertError;

    fn from_str(text: &str) -> Result<Self> {
        let invalid = || ConvertError::invalid_text("period", text);
        let rest = text.strip_prefix('P').ok_or_else(invalid)?;
        let mut period = Period::default();
        let mut in_time = false;
        let mut chars = rest.chars().peekable();
        while chars.peek().is_some() {
            if chars.peek() == Some(&'T') {
                if in_time {
                    return Err(invalid());
                }
                in_time = true;
                chars.next();
                continue;
            }
            let mut number = String::new();
            if chars.peek() == Some(&'-') {
                number.push('-');
                chars.next();
            }
            while let Some(digit) = chars.peek().filter(|c| c.is_ascii_digit()) {
                number.push(*digit);
                chars.next();
            }
            let value: i64 = number.parse().map_err(|_| invalid())?;
            let component = match (in_time, chars.next().ok_or_else(invalid)?) {
                (false, 'Y') => &mut period.years,
                (false, 'M') => &mut period.months,
                (false, 'W') => &mut period.weeks,
                (false, 'D') => &mut period.days,
                (true, 'H') => &mut period.hours,
                (true, 'M') => &mut period.minutes,
                (true, 'S') => &mut period.seconds,
                (true, 's') => &mut period.milliseconds,
                (true, 'n') => &mut period.nanoseconds,
                _ => return Err(invalid()),
            };
            *component = value;
        }
        Ok(period)
    }
}

// ── TemporalValue ───────────────────────────────────────────────────────────

/// A temporal value of any registered type, for registry dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum TemporalValue {
    Instant(DateTime<Utc>),
    LocalDate(NaiveDate),
    LocalTime(NaiveTime),
    LocalDateTime(NaiveDateTime),
    Offset(FixedOffset),
    OffsetDateTime(DateTime<FixedOffset>),
    ZonedDateTime(ZonedDateTime),
    Duration(Duration),
    Period(Period),
    Interval(Interval),
    DateInterval(DateInterval),
    TimeZone(Tz),
}

impl TemporalValue {
    pub fn kind(&self) -> TemporalType {
        match self {
            TemporalValue::Instant(_) => TemporalType::Instant,
            TemporalValue::LocalDate(_) => TemporalType::LocalDate,
            TemporalValue::LocalTime(_) => TemporalType::LocalTime,
            TemporalValue::LocalDateTime(_) => TemporalType::LocalDateTime,
            TemporalValue::Offset(_) => TemporalType::Offset,
            TemporalValue::OffsetDateTime(_) => TemporalType::OffsetDateTime,
            TemporalValue::ZonedDateTime(_) => TemporalType::ZonedDateTime,
            TemporalValue::Duration(_) => TemporalType::Duration,
            TemporalValue::Period(_) => TemporalType::Period,
            TemporalValue::Interval(_) => TemporalType::Interval,
            TemporalValue::DateInterval(_) => TemporalType::DateInterval,
            TemporalValue::TimeZone(_) => TemporalType::TimeZone,
        }
    }
}

impl From<DateTime<Utc>> for TemporalValue {
    fn from(value: DateTime<Utc>) -> Self {
        TemporalValue::Instant(value)
    }
}

impl From<NaiveDate> for TemporalValue {
    fn from(value: NaiveDate) -> Self {
        TemporalValue::LocalDate(value)
    }
}

impl From<NaiveTime> for TemporalValue {
    fn from(value: NaiveTime) -> Self {
        TemporalValue::LocalTime(value)
    }
}

impl From<NaiveDateTime> for TemporalValue {
    fn from(value: NaiveDateTime) -> Self {
        TemporalValue::LocalDateTime(value)
    }
}

impl From<FixedOffset> for TemporalValue {
    fn from(value: FixedOffset) -> Self {
        TemporalValue::Offset(value)
    }
}

impl From<DateTime<FixedOffset>> for TemporalValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        TemporalValue::OffsetDateTime(value)
    }
}

impl From<ZonedDateTime> for TemporalValue {
    fn from(value: ZonedDateTime) -> Self {
        TemporalValue::ZonedDateTime(value)
    }
}

impl From<Duration> for TemporalValue {
    fn from(value: Duration) -> Self {
        TemporalValue::Duration(value)
    }
}

impl From<Period> for TemporalValue {
    fn from(value: Period) -> Self {
        TemporalValue::Period(value)
    }
}

impl From<Interval> for TemporalValue {
    fn from(value: Interval) -> Self {
        TemporalValue::Interval(value)
    }
}

impl From<DateInterval> for TemporalValue {
    fn from(value: DateInterval) -> Self {
        TemporalValue::DateInterval(value)
    }
}

impl From<Tz> for TemporalValue {
    fn from(value: Tz) -> Self {
        TemporalValue::TimeZone(value)
    }
}
