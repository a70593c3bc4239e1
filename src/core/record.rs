//! Translation records and their status state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a translation record.
///
/// Transitions are driven only by the reconciliation engine and the usage
/// checker, with one exception: `Approved` is set by an external
/// administrative action and is sticky. No automatic transition ever moves
/// a record out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Awaiting a translation.
    Pending,
    /// Has a translation (possibly the source text itself, for the source
    /// language).
    Translated,
    /// Translation reviewed and locked by an operator.
    Approved,
    /// Source text no longer appears in any live content.
    Unused,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Pending => write!(f, "pending"),
            Status::Translated => write!(f, "translated"),
            Status::Approved => write!(f, "approved"),
            Status::Unused => write!(f, "unused"),
        }
    }
}

impl Status {
    /// The status a record takes when its source text demonstrably
    /// reappears: translated if it already carries a translation, pending
    /// otherwise.
    pub fn reactivated(translated_text: &str) -> Status {
        if translated_text.is_empty() {
            Status::Pending
        } else {
            Status::Translated
        }
    }
}

/// Which extractor class last observed a record's source text.
///
/// Static extraction over templates is known-partial (a dynamically built
/// key is invisible to the walk), so template records are never eligible
/// for automatic unused-marking. Form definitions enumerate exhaustively,
/// so form records are.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Template,
    Form,
}

/// One translation slot: a distinct source string in one target locale.
///
/// The (`source_hash`, `locale_id`) pair is unique across the store. The
/// category reflects the most recent observation only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRecord {
    /// The original literal string exactly as authored; never re-derived.
    pub source_text: String,
    /// Content hash of `source_text` (see `core::hash`).
    pub source_hash: String,
    /// Lookup key; equal to the source text (no symbolic key namespace).
    pub translation_key: String,
    /// Target locale this record's translation applies to.
    pub locale_id: String,
    /// Grouping under which the string was last seen. Informational, not
    /// part of the record's identity.
    pub category: String,
    /// Extractor class that last observed the string.
    #[serde(default)]
    pub source_kind: SourceKind,
    /// Locale-specific translation; empty means untranslated.
    pub translated_text: String,
    pub status: Status,
    /// Number of extraction passes that observed this string since creation
    /// or since the last reactivation.
    pub usage_count: u64,
    pub last_seen_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TranslationRecord {
    /// Identity key of this record within the store.
    pub fn key(&self) -> RecordKey {
        RecordKey {
            source_hash: self.source_hash.clone(),
            locale_id: self.locale_id.clone(),
        }
    }
}

/// The unique identity of a record: (content hash, locale).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordKey {
    pub source_hash: String,
    pub locale_id: String,
}

impl RecordKey {
    pub fn new(source_hash: impl Into<String>, locale_id: impl Into<String>) -> Self {
        Self {
            source_hash: source_hash.into(),
            locale_id: locale_id.into(),
        }
    }
}
