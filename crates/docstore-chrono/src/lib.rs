//! # docstore-chrono
//!
//! Temporal type adapters for a JSON document store client.
//!
//! Stores `chrono` values (plus the composite types the ecosystem lacks) in
//! canonical, order-preserving encodings, reads legacy object shapes written
//! by earlier schemes, and encodes query operands that compare correctly
//! against the stored forms, both for equality and for range predicates.
//!
//! ## Modules
//!
//! - [`patterns`] — Canonical string encodings and range validation
//! - [`types`] — Composite value types, zone resolution, dispatch enums
//! - [`document`] — JSON node ⇄ typed value converters for persistence
//! - [`query`] — Predicate operand encoding with equality/range modes
//! - [`translate`] — Query-path rewriting for composite member accesses
//! - [`dictionary`] — Temporal types as string map keys
//! - [`conventions`] — One-call registration of the whole adapter inventory
//! - [`error`] — Error types

pub mod conventions;
pub mod dictionary;
pub mod document;
pub mod error;
pub mod patterns;
pub mod query;
pub mod translate;
pub mod types;

pub use conventions::{Conventions, QueryValueFn, QueryValueRegistration, SortHint};
pub use dictionary::{read_map, write_map, DictionaryKey};
pub use document::DocumentConverter;
pub use error::{ConvertError, RangeBound, Result};
pub use query::QueryOperand;
pub use translate::{MemberAccess, TranslatedPath, TranslationRule};
pub use types::{
    DateInterval, Interval, Period, TemporalType, TemporalValue, TzdbZoneProvider, ZoneProvider,
    ZonedDateTime,
};
