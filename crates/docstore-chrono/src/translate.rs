//! Query-path translation for composite temporal types.
//!
//! Composite values are not stored as directly comparable scalars, so
//! member accesses like "compare by absolute instant" have to be rewritten
//! to the storage path that actually carries the comparable encoding. The
//! table is declarative: each rule keys on the exact
//! `(source type, member access)` shape and rewrites the resolved parent
//! path at query-build time.
//!
//! Shapes with no rule translate to `None` and pass through to the host
//! query builder unchanged. The host may then reject them or build an
//! incorrect filter; this is a known limitation, not a guarantee.

use crate::document::OFFSET_DATE_TIME_MEMBER;
use crate::types::TemporalType;

/// Name of the rewritable instant-projection method.
pub const TO_INSTANT: &str = "to_instant";

/// Name of the rewritable local-clock property.
pub const LOCAL_DATE_TIME: &str = "local_date_time";

/// Sub-path of a stored offset date-time that the index exposes for its
/// local clock reading. Fixed by the wire format.
const LOCAL_CLOCK_MEMBER: &str = "DateTime";

/// A member access on a temporal value inside a query expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberAccess {
    Method(&'static str),
    Property(&'static str),
}

/// The storage path a matched expression was rewritten to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedPath {
    pub path: String,
    pub is_nested: bool,
}

/// One rewrite rule: expression shape in, storage path out.
#[derive(Debug, Clone, Copy)]
pub struct TranslationRule {
    pub source: TemporalType,
    pub access: MemberAccess,
    rewrite: fn(&str) -> TranslatedPath,
}

impl TranslationRule {
    pub fn matches(&self, source: TemporalType, access: MemberAccess) -> bool {
        self.source == source && self.access == access
    }

    pub fn apply(&self, parent_path: &str) -> TranslatedPath {
        (self.rewrite)(parent_path)
    }
}

// The field is stored as an absolute-time string that already sorts as an
// instant; the projection needs no separate path.
fn same_path(parent_path: &str) -> TranslatedPath {
    TranslatedPath {
        path: parent_path.to_string(),
        is_nested: false,
    }
}

// Local-clock ordering and absolute-instant ordering diverge whenever a
// non-zero offset is present, so the local component gets its own sub-path.
fn local_clock_path(parent_path: &str) -> TranslatedPath {
    TranslatedPath {
        path: format!("{parent_path}.{LOCAL_CLOCK_MEMBER}"),
        is_nested: false,
    }
}

// The zone id carries no comparable order; the instant projection points at
// the composite's stored absolute-time member.
fn stored_offset_date_time_path(parent_path: &str) -> TranslatedPath {
    TranslatedPath {
        path: format!("{parent_path}.{OFFSET_DATE_TIME_MEMBER}"),
        is_nested: false,
    }
}

static DEFAULT_RULES: [TranslationRule; 3] = [
    TranslationRule {
        source: TemporalType::OffsetDateTime,
        access: MemberAccess::Method(TO_INSTANT),
        rewrite: same_path,
    },
    TranslationRule {
        source: TemporalType::OffsetDateTime,
        access: MemberAccess::Property(LOCAL_DATE_TIME),
        rewrite: local_clock_path,
    },
    TranslationRule {
        source: TemporalType::ZonedDateTime,
        access: MemberAccess::Method(TO_INSTANT),
        rewrite: stored_offset_date_time_path,
    },
];

/// The full rule inventory registered at configuration time.
pub fn default_translation_rules() -> &'static [TranslationRule] {
    &DEFAULT_RULES
}

/// Rewrites a member access against a rule table. `None` means the shape is
/// unknown and passes through unmodified.
pub fn translate(
    rules: &[TranslationRule],
    source: TemporalType,
    access: MemberAccess,
    parent_path: &str,
) -> Option<TranslatedPath> {
    rules
        .iter()
        .find(|rule| rule.matches(source, access))
        .map(|rule| rule.apply(parent_path))
}
