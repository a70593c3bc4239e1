//! Reconciliation engine: aligning stored records with fresh extractions.
//!
//! One extracted string fans out to one record per active locale. Each
//! locale is handled independently: a persistence failure for one locale is
//! reported and the rest keep going; there is no cross-locale transaction.

use chrono::{DateTime, Utc};

use crate::core::extract::ExtractedString;
use crate::core::hash::source_hash;
use crate::core::locale::LocaleSet;
use crate::core::record::{Status, TranslationRecord};
use crate::core::store::RecordStore;
use crate::utils::text_preview;

/// Counters for one or more reconciliation calls.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub created: usize,
    pub updated: usize,
    pub reactivated: usize,
    pub errors: Vec<String>,
}

impl ReconcileOutcome {
    pub fn merge(&mut self, other: ReconcileOutcome) {
        self.created += other.created;
        self.updated += other.updated;
        self.reactivated += other.reactivated;
        self.errors.extend(other.errors);
    }
}

enum LocaleResult {
    Created,
    Updated,
    Reactivated,
}

/// Drives the per-record state machine for extracted strings.
#[derive(Debug)]
pub struct Reconciler<'a, S: RecordStore + ?Sized> {
    store: &'a S,
    locales: &'a LocaleSet,
}

impl<'a, S: RecordStore + ?Sized> Reconciler<'a, S> {
    pub fn new(store: &'a S, locales: &'a LocaleSet) -> Self {
        Self { store, locales }
    }

    /// Reconcile one extracted string across every active locale.
    ///
    /// Per-locale failures land in the outcome's error list with enough
    /// context (text prefix, locale, category) for a manual re-run; they
    /// never abort the remaining locales.
    pub fn reconcile(&self, extracted: &ExtractedString, now: DateTime<Utc>) -> ReconcileOutcome {
        let hash = source_hash(&extracted.text);
        let mut outcome = ReconcileOutcome::default();

        for locale in &self.locales.locales {
            match self.reconcile_locale(&hash, extracted, &locale.id, now) {
                Ok(LocaleResult::Created) => outcome.created += 1,
                Ok(LocaleResult::Updated) => outcome.updated += 1,
                Ok(LocaleResult::Reactivated) => {
                    outcome.updated += 1;
                    outcome.reactivated += 1;
                }
                Err(err) => outcome.errors.push(format!(
                    "failed to persist \"{}\" [{}] ({}): {:#}",
                    text_preview(&extracted.text, 40),
                    locale.id,
                    extracted.category,
                    err
                )),
            }
        }

        outcome
    }

    fn reconcile_locale(
        &self,
        hash: &str,
        extracted: &ExtractedString,
        locale_id: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<LocaleResult> {
        match self.store.find_by_hash_and_locale(hash, locale_id)? {
            None => {
                self.store.upsert(self.new_record(hash, extracted, locale_id, now))?;
                Ok(LocaleResult::Created)
            }
            Some(mut record) => {
                record.usage_count += 1;
                record.last_seen_at = now;
                record.updated_at = now;
                // Most-recent observation wins; category and source kind are
                // provenance, not identity.
                record.category = extracted.category.clone();
                record.source_kind = extracted.kind;

                let result = match record.status {
                    // Approved is sticky: no automatic status write may
                    // touch it.
                    Status::Approved => LocaleResult::Updated,
                    Status::Unused => {
                        record.status = Status::reactivated(&record.translated_text);
                        LocaleResult::Reactivated
                    }
                    Status::Pending | Status::Translated => LocaleResult::Updated,
                };

                self.store.upsert(record)?;
                Ok(result)
            }
        }
    }

    /// Build a fresh record, applying the locale-identity rule: a locale
    /// whose base language equals the source language gets the source text
    /// as its translation and starts out translated.
    fn new_record(
        &self,
        hash: &str,
        extracted: &ExtractedString,
        locale_id: &str,
        now: DateTime<Utc>,
    ) -> TranslationRecord {
        let is_source = self
            .locales
            .locales
            .iter()
            .find(|l| l.id == locale_id)
            .is_some_and(|l| self.locales.is_source_locale(l));

        let (translated_text, status) = if is_source {
            (extracted.text.clone(), Status::Translated)
        } else {
            (String::new(), Status::Pending)
        };

        TranslationRecord {
            source_text: extracted.text.clone(),
            source_hash: hash.to_string(),
            translation_key: extracted.text.clone(),
            locale_id: locale_id.to_string(),
            category: extracted.category.clone(),
            source_kind: extracted.kind,
            translated_text,
            status,
            usage_count: 1,
            last_seen_at: now,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::extract::ExtractedString;
    use crate::core::hash::source_hash;
    use crate::core::locale::{Locale, LocaleSet};
    use crate::core::reconcile::*;
    use crate::core::record::{SourceKind, Status};
    use crate::core::store::{MemoryStore, RecordStore};
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn locales() -> LocaleSet {
        LocaleSet::new(vec![Locale::new("en"), Locale::new("ar")], "en")
    }

    fn submit() -> ExtractedString {
        ExtractedString::new("Submit", "forms", "page.twig", SourceKind::Template)
    }

    #[test]
    fn test_fan_out_creates_one_record_per_locale() {
        let store = MemoryStore::new();
        let locales = locales();
        let reconciler = Reconciler::new(&store, &locales);

        let outcome = reconciler.reconcile(&submit(), Utc::now());
        assert_eq!(outcome.created, 2);
        assert_eq!(outcome.updated, 0);
        assert!(outcome.errors.is_empty());
        assert_eq!(store.all().unwrap().len(), 2);
    }

    #[test]
    fn test_source_language_auto_translation() {
        let store = MemoryStore::new();
        let locales = locales();
        let reconciler = Reconciler::new(&store, &locales);
        reconciler.reconcile(&submit(), Utc::now());

        let hash = source_hash("Submit");
        let en = store.find_by_hash_and_locale(&hash, "en").unwrap().unwrap();
        assert_eq!(en.status, Status::Translated);
        assert_eq!(en.translated_text, "Submit");

        let ar = store.find_by_hash_and_locale(&hash, "ar").unwrap().unwrap();
        assert_eq!(ar.status, Status::Pending);
        assert_eq!(ar.translated_text, "");
    }

    #[test]
    fn test_regional_source_locale_counts_as_source() {
        let store = MemoryStore::new();
        let locales = LocaleSet::new(vec![Locale::new("en-GB")], "en");
        let reconciler = Reconciler::new(&store, &locales);
        reconciler.reconcile(&submit(), Utc::now());

        let hash = source_hash("Submit");
        let record = store.find_by_hash_and_locale(&hash, "en-GB").unwrap().unwrap();
        assert_eq!(record.status, Status::Translated);
    }

    #[test]
    fn test_second_observation_updates_not_creates() {
        let store = MemoryStore::new();
        let locales = locales();
        let reconciler = Reconciler::new(&store, &locales);

        reconciler.reconcile(&submit(), Utc::now());
        let outcome = reconciler.reconcile(&submit(), Utc::now());
        assert_eq!(outcome.created, 0);
        assert_eq!(outcome.updated, 2);

        let hash = source_hash("Submit");
        let record = store.find_by_hash_and_locale(&hash, "ar").unwrap().unwrap();
        assert_eq!(record.usage_count, 2);
    }

    #[test]
    fn test_dedup_across_categories() {
        let store = MemoryStore::new();
        let locales = locales();
        let reconciler = Reconciler::new(&store, &locales);

        reconciler.reconcile(&submit(), Utc::now());
        reconciler.reconcile(
            &ExtractedString::new("Submit", "checkout.pay.label", "checkout", SourceKind::Form),
            Utc::now(),
        );

        // Still one record per locale; category and source kind reflect the
        // latest sighting.
        assert_eq!(store.all().unwrap().len(), 2);
        let hash = source_hash("Submit");
        let record = store.find_by_hash_and_locale(&hash, "en").unwrap().unwrap();
        assert_eq!(record.category, "checkout.pay.label");
        assert_eq!(record.source_kind, SourceKind::Form);
        assert_eq!(record.usage_count, 2);
    }

    #[test]
    fn test_reactivation_from_unused() {
        let store = MemoryStore::new();
        let locales = locales();
        let reconciler = Reconciler::new(&store, &locales);
        reconciler.reconcile(&submit(), Utc::now());

        let hash = source_hash("Submit");
        let mut record = store.find_by_hash_and_locale(&hash, "ar").unwrap().unwrap();
        record.status = Status::Unused;
        store.upsert(record).unwrap();

        let outcome = reconciler.reconcile(&submit(), Utc::now());
        assert_eq!(outcome.reactivated, 1);

        let record = store.find_by_hash_and_locale(&hash, "ar").unwrap().unwrap();
        assert_eq!(record.status, Status::Pending);
        assert_eq!(record.usage_count, 2);
    }

    #[test]
    fn test_reactivation_with_translation_goes_translated() {
        let store = MemoryStore::new();
        let locales = locales();
        let reconciler = Reconciler::new(&store, &locales);
        reconciler.reconcile(&submit(), Utc::now());

        let hash = source_hash("Submit");
        let mut record = store.find_by_hash_and_locale(&hash, "ar").unwrap().unwrap();
        record.status = Status::Unused;
        record.translated_text = "إرسال".to_string();
        store.upsert(record).unwrap();

        reconciler.reconcile(&submit(), Utc::now());
        let record = store.find_by_hash_and_locale(&hash, "ar").unwrap().unwrap();
        assert_eq!(record.status, Status::Translated);
    }

    #[test]
    fn test_approved_is_sticky() {
        let store = MemoryStore::new();
        let locales = locales();
        let reconciler = Reconciler::new(&store, &locales);
        reconciler.reconcile(&submit(), Utc::now());

        let hash = source_hash("Submit");
        let mut record = store.find_by_hash_and_locale(&hash, "ar").unwrap().unwrap();
        record.status = Status::Approved;
        record.translated_text = "إرسال".to_string();
        store.upsert(record).unwrap();

        reconciler.reconcile(&submit(), Utc::now());
        let record = store.find_by_hash_and_locale(&hash, "ar").unwrap().unwrap();
        assert_eq!(record.status, Status::Approved);
        assert_eq!(record.usage_count, 2);
    }

    #[test]
    fn test_source_text_kept_verbatim() {
        let store = MemoryStore::new();
        let locales = locales();
        let reconciler = Reconciler::new(&store, &locales);
        let padded = ExtractedString::new("  Spaced  ", "site", "page.twig", SourceKind::Template);
        reconciler.reconcile(&padded, Utc::now());

        let hash = source_hash("  Spaced  ");
        let record = store.find_by_hash_and_locale(&hash, "en").unwrap().unwrap();
        assert_eq!(record.source_text, "  Spaced  ");
        assert_eq!(record.translation_key, "  Spaced  ");
    }
}
