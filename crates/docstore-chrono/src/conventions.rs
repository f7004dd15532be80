//! Conventions registry: one-call setup of every temporal adapter.
//!
//! [`Conventions::configure_for_temporal_types`] installs the full inventory
//! of document converters, query-value converters (with their index sort
//! hints), and query-path translation rules. Configuration is idempotent:
//! once the inventory is installed, further calls are no-ops, so shared
//! setup paths can call it unconditionally.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::document::{
    DateIntervalConverter, DocumentConverter, DurationConverter, InstantConverter,
    IntervalConverter, LocalDateConverter, LocalDateTimeConverter, LocalTimeConverter,
    OffsetConverter, OffsetDateTimeConverter, PeriodConverter, TimeZoneConverter,
    ZonedDateTimeConverter,
};
use crate::error::{ConvertError, Result};
use crate::query::{self, QueryOperand};
use crate::translate::{
    default_translation_rules, translate, MemberAccess, TranslatedPath, TranslationRule,
};
use crate::types::{TemporalType, TemporalValue, TzdbZoneProvider, ZoneProvider};

// ── Registration records ────────────────────────────────────────────────────

type EncodeFn = Box<dyn Fn(&TemporalValue) -> Result<Value> + Send + Sync>;
type DecodeFn = Box<dyn Fn(&Value) -> Result<TemporalValue> + Send + Sync>;

struct DocumentRegistration {
    kind: TemporalType,
    encode: EncodeFn,
    decode: DecodeFn,
}

/// How a field of this type must be indexed for range predicates to work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortHint {
    /// The stored string sorts correctly as-is.
    Lexical,
    /// Range operands are signed nanosecond counts against a numeric index.
    Numeric,
}

/// Callback shape the host query builder invokes per predicate operand.
pub type QueryValueFn = fn(&str, &TemporalValue, bool) -> Result<QueryOperand>;

/// One query-value converter plus the sort hint its range encoding assumes.
pub struct QueryValueRegistration {
    pub kind: TemporalType,
    pub sort: SortHint,
    converter: QueryValueFn,
}

// ── Query dispatch wrappers ─────────────────────────────────────────────────

fn mismatch(expected: TemporalType, value: &TemporalValue) -> ConvertError {
    ConvertError::TypeMismatch {
        expected,
        actual: value.kind(),
    }
}

fn instant_query(field: &str, value: &TemporalValue, for_range: bool) -> Result<QueryOperand> {
    match value {
        TemporalValue::Instant(inner) => query::instant_operand(field, inner, for_range),
        other => Err(mismatch(TemporalType::Instant, other)),
    }
}

fn local_date_query(field: &str, value: &TemporalValue, for_range: bool) -> Result<QueryOperand> {
    match value {
        TemporalValue::LocalDate(inner) => query::local_date_operand(field, inner, for_range),
        other => Err(mismatch(TemporalType::LocalDate, other)),
    }
}

fn local_date_time_query(
    field: &str,
    value: &TemporalValue,
    for_range: bool,
) -> Result<QueryOperand> {
    match value {
        TemporalValue::LocalDateTime(inner) => {
            query::local_date_time_operand(field, inner, for_range)
        }
        other => Err(mismatch(TemporalType::LocalDateTime, other)),
    }
}

fn local_time_query(field: &str, value: &TemporalValue, for_range: bool) -> Result<QueryOperand> {
    match value {
        TemporalValue::LocalTime(inner) => query::local_time_operand(field, inner, for_range),
        other => Err(mismatch(TemporalType::LocalTime, other)),
    }
}

fn offset_query(field: &str, value: &TemporalValue, for_range: bool) -> Result<QueryOperand> {
    match value {
        TemporalValue::Offset(inner) => query::offset_operand(field, inner, for_range),
        other => Err(mismatch(TemporalType::Offset, other)),
    }
}

fn duration_query(field: &str, value: &TemporalValue, for_range: bool) -> Result<QueryOperand> {
    match value {
        TemporalValue::Duration(inner) => query::duration_operand(field, inner, for_range),
        other => Err(mismatch(TemporalType::Duration, other)),
    }
}

fn offset_date_time_query(
    field: &str,
    value: &TemporalValue,
    for_range: bool,
) -> Result<QueryOperand> {
    match value {
        TemporalValue::OffsetDateTime(inner) => {
            query::offset_date_time_operand(field, inner, for_range)
        }
        other => Err(mismatch(TemporalType::OffsetDateTime, other)),
    }
}

fn zoned_date_time_query(
    field: &str,
    value: &TemporalValue,
    for_range: bool,
) -> Result<QueryOperand> {
    match value {
        TemporalValue::ZonedDateTime(inner) => {
            query::zoned_date_time_operand(field, inner, for_range)
        }
        other => Err(mismatch(TemporalType::ZonedDateTime, other)),
    }
}

fn period_query(field: &str, value: &TemporalValue, for_range: bool) -> Result<QueryOperand> {
    match value {
        TemporalValue::Period(inner) => query::period_operand(field, inner, for_range),
        other => Err(mismatch(TemporalType::Period, other)),
    }
}

fn time_zone_query(field: &str, value: &TemporalValue, for_range: bool) -> Result<QueryOperand> {
    match value {
        TemporalValue::TimeZone(inner) => query::time_zone_operand(field, inner, for_range),
        other => Err(mismatch(TemporalType::TimeZone, other)),
    }
}

// ── Conventions ─────────────────────────────────────────────────────────────

/// Client conventions holding the temporal adapter registrations.
pub struct Conventions {
    zone_provider: Arc<dyn ZoneProvider>,
    relaxed_read: bool,
    document_converters: Vec<DocumentRegistration>,
    query_value_converters: Vec<QueryValueRegistration>,
    query_translators: Vec<TranslationRule>,
}

impl Default for Conventions {
    fn default() -> Self {
        Self::new()
    }
}

impl Conventions {
    /// Empty conventions: nothing registered, relaxed reads on, zones
    /// resolved against the bundled IANA database.
    pub fn new() -> Self {
        Self {
            zone_provider: Arc::new(TzdbZoneProvider),
            relaxed_read: true,
            document_converters: Vec::new(),
            query_value_converters: Vec::new(),
            query_translators: Vec::new(),
        }
    }

    /// Toggles acceptance of legacy object shapes on document read. Only
    /// affects converters registered after the call.
    pub fn with_relaxed_read(mut self, relaxed: bool) -> Self {
        self.relaxed_read = relaxed;
        self
    }

    pub fn zone_provider(&self) -> Arc<dyn ZoneProvider> {
        Arc::clone(&self.zone_provider)
    }

    /// Installs the full temporal adapter inventory using the bundled IANA
    /// zone database. Idempotent.
    pub fn configure_for_temporal_types(&mut self) {
        self.configure_for_temporal_types_with(Arc::new(TzdbZoneProvider));
    }

    /// Installs the full temporal adapter inventory with a custom zone
    /// source. Idempotent: a second call leaves the first registration
    /// (including its provider) in place.
    pub fn configure_for_temporal_types_with(&mut self, zone_provider: Arc<dyn ZoneProvider>) {
        if self.has_document_converter(TemporalType::Instant) {
            debug!("temporal adapters already registered, skipping");
            return;
        }
        self.zone_provider = zone_provider;
        let relaxed = self.relaxed_read;
        let provider = Arc::clone(&self.zone_provider);

        self.register_document(
            TemporalType::Instant,
            InstantConverter,
            |value| match value {
                TemporalValue::Instant(inner) => Some(inner),
                _ => None,
            },
            TemporalValue::Instant,
        );
        self.register_document(
            TemporalType::LocalDate,
            LocalDateConverter::new(relaxed),
            |value| match value {
                TemporalValue::LocalDate(inner) => Some(inner),
                _ => None,
            },
            TemporalValue::LocalDate,
        );
        self.register_document(
            TemporalType::LocalTime,
            LocalTimeConverter::new(relaxed),
            |value| match value {
                TemporalValue::LocalTime(inner) => Some(inner),
                _ => None,
            },
            TemporalValue::LocalTime,
        );
        self.register_document(
            TemporalType::LocalDateTime,
            LocalDateTimeConverter::new(relaxed),
            |value| match value {
                TemporalValue::LocalDateTime(inner) => Some(inner),
                _ => None,
            },
            TemporalValue::LocalDateTime,
        );
        self.register_document(
            TemporalType::Offset,
            OffsetConverter,
            |value| match value {
                TemporalValue::Offset(inner) => Some(inner),
                _ => None,
            },
            TemporalValue::Offset,
        );
        self.register_document(
            TemporalType::OffsetDateTime,
            OffsetDateTimeConverter,
            |value| match value {
                TemporalValue::OffsetDateTime(inner) => Some(inner),
                _ => None,
            },
            TemporalValue::OffsetDateTime,
        );
        self.register_document(
            TemporalType::ZonedDateTime,
            ZonedDateTimeConverter::new(Arc::clone(&provider)),
            |value| match value {
                TemporalValue::ZonedDateTime(inner) => Some(inner),
                _ => None,
            },
            TemporalValue::ZonedDateTime,
        );
        self.register_document(
            TemporalType::Duration,
            DurationConverter,
            |value| match value {
                TemporalValue::Duration(inner) => Some(inner),
                _ => None,
            },
            TemporalValue::Duration,
        );
        self.register_document(
            TemporalType::Period,
            PeriodConverter,
            |value| match value {
                TemporalValue::Period(inner) => Some(inner),
                _ => None,
            },
            TemporalValue::Period,
        );
        self.register_document(
            TemporalType::Interval,
            IntervalConverter,
            |value| match value {
                TemporalValue::Interval(inner) => Some(inner),
                _ => None,
            },
            TemporalValue::Interval,
        );
        self.register_document(
            TemporalType::DateInterval,
            DateIntervalConverter,
            |value| match value {
                TemporalValue::DateInterval(inner) => Some(inner),
                _ => None,
            },
            TemporalValue::DateInterval,
        );
        self.register_document(
            TemporalType::TimeZone,
            TimeZoneConverter::new(provider),
            |value| match value {
                TemporalValue::TimeZone(inner) => Some(inner),
                _ => None,
            },
            TemporalValue::TimeZone,
        );

        self.register_query_value(TemporalType::Instant, SortHint::Lexical, instant_query);
        self.register_query_value(TemporalType::LocalDate, SortHint::Lexical, local_date_query);
        self.register_query_value(
            TemporalType::LocalDateTime,
            SortHint::Lexical,
            local_date_time_query,
        );
        self.register_query_value(TemporalType::LocalTime, SortHint::Numeric, local_time_query);
        self.register_query_value(TemporalType::Offset, SortHint::Numeric, offset_query);
        self.register_query_value(TemporalType::Duration, SortHint::Numeric, duration_query);
        self.register_query_value(
            TemporalType::OffsetDateTime,
            SortHint::Lexical,
            offset_date_time_query,
        );
        self.register_query_value(
            TemporalType::ZonedDateTime,
            SortHint::Lexical,
            zoned_date_time_query,
        );
        self.register_query_value(TemporalType::Period, SortHint::Lexical, period_query);
        self.register_query_value(TemporalType::TimeZone, SortHint::Lexical, time_zone_query);

        self.query_translators
            .extend_from_slice(default_translation_rules());

        debug!(
            document_converters = self.document_converters.len(),
            query_value_converters = self.query_value_converters.len(),
            query_translators = self.query_translators.len(),
            "registered temporal adapters"
        );
    }

    fn register_document<C>(
        &mut self,
        kind: TemporalType,
        converter: C,
        extract: fn(&TemporalValue) -> Option<&C::Value>,
        wrap: fn(C::Value) -> TemporalValue,
    ) where
        C: DocumentConverter + Clone + Send + Sync + 'static,
    {
        let reader = converter.clone();
        let encode: EncodeFn = Box::new(move |value| {
            let inner = extract(value).ok_or_else(|| mismatch(kind, value))?;
            converter.write(inner)
        });
        let decode: DecodeFn = Box::new(move |node| Ok(wrap(reader.read(node)?)));
        self.document_converters.push(DocumentRegistration {
            kind,
            encode,
            decode,
        });
        debug!(%kind, "registered document converter");
    }

    fn register_query_value(&mut self, kind: TemporalType, sort: SortHint, converter: QueryValueFn) {
        self.query_value_converters.push(QueryValueRegistration {
            kind,
            sort,
            converter,
        });
        debug!(%kind, ?sort, "registered query-value converter");
    }

    // ── Dispatch ────────────────────────────────────────────────────────────

    /// Encodes a value to its stored JSON node.
    ///
    /// # Errors
    ///
    /// [`ConvertError::NotRegistered`] when no converter is installed for the
    /// value's type.
    pub fn encode_document_value(&self, value: &TemporalValue) -> Result<Value> {
        let registration = self
            .document_converters
            .iter()
            .find(|registration| registration.kind == value.kind())
            .ok_or(ConvertError::NotRegistered(value.kind()))?;
        (registration.encode)(value)
    }

    /// Decodes a stored JSON node as the given temporal type.
    ///
    /// # Errors
    ///
    /// [`ConvertError::NotRegistered`] when no converter is installed for
    /// `kind`; otherwise whatever the converter's read reports.
    pub fn decode_document_value(&self, kind: TemporalType, node: &Value) -> Result<TemporalValue> {
        let registration = self
            .document_converters
            .iter()
            .find(|registration| registration.kind == kind)
            .ok_or(ConvertError::NotRegistered(kind))?;
        (registration.decode)(node)
    }

    /// Encodes a predicate operand for the host query builder.
    pub fn query_operand(
        &self,
        field_name: &str,
        value: &TemporalValue,
        for_range: bool,
    ) -> Result<QueryOperand> {
        let registration = self
            .query_value_converters
            .iter()
            .find(|registration| registration.kind == value.kind())
            .ok_or(ConvertError::NotRegistered(value.kind()))?;
        (registration.converter)(field_name, value, for_range)
    }

    /// Rewrites a member access through the installed translation rules.
    /// `None` means no rule matched and the access passes through unchanged.
    pub fn translate_member(
        &self,
        source: TemporalType,
        access: MemberAccess,
        parent_path: &str,
    ) -> Option<TranslatedPath> {
        translate(&self.query_translators, source, access, parent_path)
    }

    // ── Inventory ───────────────────────────────────────────────────────────

    pub fn has_document_converter(&self, kind: TemporalType) -> bool {
        self.document_converters
            .iter()
            .any(|registration| registration.kind == kind)
    }

    pub fn document_converter_count(&self) -> usize {
        self.document_converters.len()
    }

    pub fn query_value_count(&self) -> usize {
        self.query_value_converters.len()
    }

    pub fn query_translator_count(&self) -> usize {
        self.query_translators.len()
    }

    /// The sort hint registered for a type, if it is queryable at all.
    pub fn sort_hint(&self, kind: TemporalType) -> Option<SortHint> {
        self.query_value_converters
            .iter()
            .find(|registration| registration.kind == kind)
            .map(|registration| registration.sort)
    }
}
