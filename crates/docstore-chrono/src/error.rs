//! Error types for value conversion and query encoding.

use thiserror::Error;

use crate::types::TemporalType;

/// Which end of the representable range a value fell outside of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound {
    TooSmall,
    TooLarge,
}

impl std::fmt::Display for RangeBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RangeBound::TooSmall => f.write_str("too small"),
            RangeBound::TooLarge => f.write_str("too large"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConvertError {
    /// A value fell outside the representable range. Never clamped; the
    /// offending boundary is named so callers can tell which end they hit.
    #[error("value out of range ({bound}): {detail}")]
    OutOfRange { bound: RangeBound, detail: String },

    #[error("unsupported calendar system `{0}`: only the ISO calendar can be stored")]
    UnsupportedCalendar(String),

    #[error("malformed composite: {0}")]
    MalformedComposite(String),

    #[error("unrecognized time zone id `{0}`")]
    UnknownZone(String),

    #[error("{0} values have no total order and cannot be used in range predicates")]
    RangeUnsupported(TemporalType),

    #[error("invalid interval: {0}")]
    InvalidInterval(String),

    #[error("invalid {kind} `{text}`")]
    InvalidText { kind: &'static str, text: String },

    #[error("expected a {expected} value, got {actual}")]
    TypeMismatch {
        expected: TemporalType,
        actual: TemporalType,
    },

    #[error("no converter registered for {0}")]
    NotRegistered(TemporalType),
}

impl ConvertError {
    pub(crate) fn invalid_text(kind: &'static str, text: impl Into<String>) -> Self {
        ConvertError::InvalidText {
            kind,
            text: text.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
