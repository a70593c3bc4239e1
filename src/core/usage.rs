//! Usage checker: full-reconciliation liveness pass.
//!
//! The caller assembles the live-text set by extracting over *every* current
//! source object in scope, then this pass compares stored records against
//! it: records whose text is gone become unused, unused records whose text
//! reappeared reactivate. Status writes go straight through
//! `bulk_status_update`; this is a pure status transition, not a content
//! reconciliation.
//!
//! Conservative rule: only form-derived records can be marked unused, since
//! form definitions enumerate their text exhaustively. Template extraction
//! is known-partial (dynamically built keys are invisible to the static
//! walk), so a template record is always treated as in use, whatever its
//! category. A string that is never marked unused costs a translator
//! nothing; a string wrongly marked unused loses work.

use std::collections::HashSet;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::core::record::{SourceKind, Status};
use crate::core::store::{CategoryFilter, RecordStore};

/// Which records a usage pass may touch.
#[derive(Debug, Clone)]
pub struct UsageScope {
    /// Records considered at all.
    pub filter: CategoryFilter,
    /// Additional operator-configured category prefixes that are never
    /// auto-marked unused, on top of the template-kind exemption.
    pub exempt_prefixes: Vec<String>,
}

impl UsageScope {
    pub fn new(filter: CategoryFilter, exempt_prefixes: Vec<String>) -> Self {
        Self {
            filter,
            exempt_prefixes,
        }
    }

    fn is_exempt(&self, category: &str) -> bool {
        self.exempt_prefixes
            .iter()
            .any(|prefix| CategoryFilter::Prefix(prefix.clone()).matches(category))
    }
}

/// Result of one usage pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UsageOutcome {
    pub marked_unused: usize,
    pub reactivated: usize,
}

/// Reconcile stored record liveness against the live-text set.
///
/// Idempotent: a second pass over unchanged content changes nothing.
pub fn reconcile_usage<S: RecordStore + ?Sized>(
    store: &S,
    live_texts: &HashSet<String>,
    scope: &UsageScope,
    now: DateTime<Utc>,
) -> Result<UsageOutcome> {
    let mut to_unused = Vec::new();
    let mut to_pending = Vec::new();
    let mut to_translated = Vec::new();

    for record in store.list_by_scope(&scope.filter)? {
        let live = live_texts.contains(&record.source_text);
        match record.status {
            // Approved never moves automatically, in either direction.
            Status::Approved => {}
            Status::Unused => {
                if live {
                    match Status::reactivated(&record.translated_text) {
                        Status::Pending => to_pending.push(record.key()),
                        _ => to_translated.push(record.key()),
                    }
                }
            }
            Status::Pending | Status::Translated => {
                if !live
                    && record.source_kind == SourceKind::Form
                    && !scope.is_exempt(&record.category)
                {
                    to_unused.push(record.key());
                }
            }
        }
    }

    let marked_unused = store.bulk_status_update(&to_unused, Status::Unused, now)?;
    let reactivated = store.bulk_status_update(&to_pending, Status::Pending, now)?
        + store.bulk_status_update(&to_translated, Status::Translated, now)?;

    Ok(UsageOutcome {
        marked_unused,
        reactivated,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::core::record::{SourceKind, Status, TranslationRecord};
    use crate::core::store::{CategoryFilter, MemoryStore, RecordStore};
    use crate::core::usage::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    // Form-derived by default: the class eligible for unused-marking.
    fn record(text: &str, category: &str, status: Status) -> TranslationRecord {
        let now = Utc::now();
        TranslationRecord {
            source_text: text.to_string(),
            source_hash: crate::core::hash::source_hash(text),
            translation_key: text.to_string(),
            locale_id: "ar".to_string(),
            category: category.to_string(),
            source_kind: SourceKind::Form,
            translated_text: String::new(),
            status,
            usage_count: 1,
            last_seen_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    fn template_record(text: &str, category: &str, status: Status) -> TranslationRecord {
        TranslationRecord {
            source_kind: SourceKind::Template,
            ..record(text, category, status)
        }
    }

    fn live(texts: &[&str]) -> HashSet<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    fn scope() -> UsageScope {
        UsageScope::new(CategoryFilter::All, vec!["site".to_string()])
    }

    #[test]
    fn test_dead_text_marked_unused() {
        let store = MemoryStore::new();
        store.upsert(record("Gone", "contact.x.label", Status::Pending)).unwrap();
        store.upsert(record("Here", "contact.y.label", Status::Pending)).unwrap();

        let outcome =
            reconcile_usage(&store, &live(&["Here"]), &scope(), Utc::now()).unwrap();
        assert_eq!(outcome.marked_unused, 1);
        assert_eq!(outcome.reactivated, 0);

        let records = store.all().unwrap();
        let gone = records.iter().find(|r| r.source_text == "Gone").unwrap();
        assert_eq!(gone.status, Status::Unused);
        let here = records.iter().find(|r| r.source_text == "Here").unwrap();
        assert_eq!(here.status, Status::Pending);
    }

    #[test]
    fn test_exempt_category_never_marked_unused() {
        let store = MemoryStore::new();
        store.upsert(record("One", "site", Status::Pending)).unwrap();
        store.upsert(record("Another", "site.nav", Status::Translated)).unwrap();

        let outcome = reconcile_usage(&store, &live(&[]), &scope(), Utc::now()).unwrap();
        assert_eq!(outcome.marked_unused, 0);
    }

    #[test]
    fn test_template_records_never_marked_unused() {
        // Template extraction misses dynamically built keys, so absence
        // from the live set proves nothing for this class.
        let store = MemoryStore::new();
        store.upsert(template_record("Products", "nav", Status::Pending)).unwrap();
        store.upsert(template_record("Checkout", "shop.cart", Status::Translated)).unwrap();
        store.upsert(record("Dead label", "contact.x.label", Status::Pending)).unwrap();

        let outcome = reconcile_usage(&store, &live(&[]), &scope(), Utc::now()).unwrap();
        assert_eq!(outcome.marked_unused, 1);

        let records = store.all().unwrap();
        for record in &records {
            if record.source_kind == SourceKind::Template {
                assert_ne!(record.status, Status::Unused);
            } else {
                assert_eq!(record.status, Status::Unused);
            }
        }
    }

    #[test]
    fn test_reactivation_follows_translation_state() {
        let store = MemoryStore::new();
        let mut translated = record("Back", "contact.x.label", Status::Unused);
        translated.translated_text = "عاد".to_string();
        store.upsert(translated).unwrap();
        store.upsert(record("Also back", "contact.y.label", Status::Unused)).unwrap();

        let outcome = reconcile_usage(
            &store,
            &live(&["Back", "Also back"]),
            &scope(),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(outcome.reactivated, 2);

        let records = store.all().unwrap();
        let back = records.iter().find(|r| r.source_text == "Back").unwrap();
        assert_eq!(back.status, Status::Translated);
        let also = records.iter().find(|r| r.source_text == "Also back").unwrap();
        assert_eq!(also.status, Status::Pending);
    }

    #[test]
    fn test_unused_and_still_dead_stays_unused() {
        let store = MemoryStore::new();
        store.upsert(record("Gone", "contact.x.label", Status::Unused)).unwrap();

        let outcome = reconcile_usage(&store, &live(&[]), &scope(), Utc::now()).unwrap();
        assert_eq!(outcome.marked_unused, 0);
        assert_eq!(outcome.reactivated, 0);
    }

    #[test]
    fn test_approved_untouched_in_both_directions() {
        let store = MemoryStore::new();
        store.upsert(record("Locked gone", "contact.x.label", Status::Approved)).unwrap();

        let outcome = reconcile_usage(&store, &live(&[]), &scope(), Utc::now()).unwrap();
        assert_eq!(outcome.marked_unused, 0);

        let records = store.all().unwrap();
        assert_eq!(records[0].status, Status::Approved);
    }

    #[test]
    fn test_scope_filter_limits_candidates() {
        let store = MemoryStore::new();
        store.upsert(record("Gone A", "contact.x.label", Status::Pending)).unwrap();
        store.upsert(record("Gone B", "survey.x.label", Status::Pending)).unwrap();

        let scope = UsageScope::new(
            CategoryFilter::Prefix("contact".to_string()),
            Vec::new(),
        );
        let outcome = reconcile_usage(&store, &live(&[]), &scope, Utc::now()).unwrap();
        assert_eq!(outcome.marked_unused, 1);

        let records = store.all().unwrap();
        let b = records.iter().find(|r| r.source_text == "Gone B").unwrap();
        assert_eq!(b.status, Status::Pending);
    }

    #[test]
    fn test_idempotent_second_pass() {
        let store = MemoryStore::new();
        store.upsert(record("Gone", "contact.x.label", Status::Pending)).unwrap();
        store.upsert(record("Here", "contact.y.label", Status::Unused)).unwrap();

        let live = live(&["Here"]);
        let first = reconcile_usage(&store, &live, &scope(), Utc::now()).unwrap();
        assert_eq!(first.marked_unused, 1);
        assert_eq!(first.reactivated, 1);

        let second = reconcile_usage(&store, &live, &scope(), Utc::now()).unwrap();
        assert_eq!(second, UsageOutcome::default());
    }
}
