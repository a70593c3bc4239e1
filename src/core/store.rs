//! Record store adapter: the narrow persistence seam of the engine.
//!
//! The engine only ever talks to [`RecordStore`]. `MemoryStore` is the
//! canonical in-process implementation (and the test double); `JsonStore`
//! wraps it with load/flush against a JSON file for the CLI. A real
//! deployment backs this trait with its own persistent store.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};

use crate::core::record::{RecordKey, Status, TranslationRecord};

/// Scope filter over record categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    /// Matches categories equal to the prefix or starting with `prefix + "."`.
    Prefix(String),
}

impl CategoryFilter {
    pub fn matches(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Prefix(prefix) => {
                category == prefix
                    || (category.len() > prefix.len()
                        && category.starts_with(prefix.as_str())
                        && category.as_bytes()[prefix.len()] == b'.')
            }
        }
    }
}

/// Persistence interface used by the reconciliation engine and the usage
/// checker.
///
/// Implementations must make `upsert` atomic with respect to the
/// (`source_hash`, `locale_id`) uniqueness invariant: a concurrent writer
/// must land as an update, never as a uniqueness violation surfaced to the
/// caller.
pub trait RecordStore: Send + Sync {
    fn find_by_hash_and_locale(
        &self,
        hash: &str,
        locale_id: &str,
    ) -> Result<Option<TranslationRecord>>;

    /// Insert or replace the record identified by its (hash, locale) key.
    fn upsert(&self, record: TranslationRecord) -> Result<TranslationRecord>;

    /// Set `status` on every existing record named in `keys`. Returns the
    /// number of records actually changed.
    fn bulk_status_update(
        &self,
        keys: &[RecordKey],
        status: Status,
        now: DateTime<Utc>,
    ) -> Result<usize>;

    /// All records whose category matches `filter`, in deterministic order.
    fn list_by_scope(&self, filter: &CategoryFilter) -> Result<Vec<TranslationRecord>>;
}

// ============================================================
// In-memory store
// ============================================================

/// In-process store: a mutex-guarded map keyed by (hash, locale).
///
/// The single lock makes every operation atomic, which satisfies the
/// uniqueness invariant without a retry path: a replace can never collide.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<RecordKey, TranslationRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<RecordKey, TranslationRecord>>> {
        self.records
            .lock()
            .map_err(|_| anyhow!("record store lock poisoned"))
    }

    /// Snapshot of every record, sorted by (hash, locale).
    pub fn all(&self) -> Result<Vec<TranslationRecord>> {
        self.list_by_scope(&CategoryFilter::All)
    }

    /// Replace the full contents (used by `JsonStore` on load).
    fn replace_all(&self, records: Vec<TranslationRecord>) -> Result<()> {
        let mut guard = self.lock()?;
        guard.clear();
        for record in records {
            guard.insert(record.key(), record);
        }
        Ok(())
    }
}

impl RecordStore for MemoryStore {
    fn find_by_hash_and_locale(
        &self,
        hash: &str,
        locale_id: &str,
    ) -> Result<Option<TranslationRecord>> {
        let guard = self.lock()?;
        Ok(guard
            .get(&RecordKey::new(hash, locale_id))
            .cloned())
    }

    fn upsert(&self, record: TranslationRecord) -> Result<TranslationRecord> {
        let mut guard = self.lock()?;
        guard.insert(record.key(), record.clone());
        Ok(record)
    }

    fn bulk_status_update(
        &self,
        keys: &[RecordKey],
        status: Status,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let mut guard = self.lock()?;
        let mut changed = 0;
        for key in keys {
            if let Some(record) = guard.get_mut(key) {
                if record.status != status {
                    record.status = status;
                    record.updated_at = now;
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }

    fn list_by_scope(&self, filter: &CategoryFilter) -> Result<Vec<TranslationRecord>> {
        let guard = self.lock()?;
        let mut records: Vec<_> = guard
            .values()
            .filter(|r| filter.matches(&r.category))
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            a.source_hash
                .cmp(&b.source_hash)
                .then_with(|| a.locale_id.cmp(&b.locale_id))
        });
        Ok(records)
    }
}

// ============================================================
// JSON-file store
// ============================================================

/// File-backed store for the CLI: loads all records into a `MemoryStore` on
/// open, writes them back on `flush`.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonStore {
    /// Open the store file, creating an empty store when the file does not
    /// exist yet.
    pub fn open(path: &Path) -> Result<Self> {
        let inner = MemoryStore::new();
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read record store: {:?}", path))?;
            let records: Vec<TranslationRecord> = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse record store: {:?}", path))?;
            inner.replace_all(records)?;
        }
        Ok(Self {
            path: path.to_path_buf(),
            inner,
        })
    }

    /// Write all records back to the store file.
    pub fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create store directory: {:?}", parent))?;
            }
        }
        let records = self.inner.all()?;
        let json = serde_json::to_string_pretty(&records)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write record store: {:?}", self.path))?;
        Ok(())
    }
}

impl RecordStore for JsonStore {
    fn find_by_hash_and_locale(
        &self,
        hash: &str,
        locale_id: &str,
    ) -> Result<Option<TranslationRecord>> {
        self.inner.find_by_hash_and_locale(hash, locale_id)
    }

    fn upsert(&self, record: TranslationRecord) -> Result<TranslationRecord> {
        self.inner.upsert(record)
    }

    fn bulk_status_update(
        &self,
        keys: &[RecordKey],
        status: Status,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        self.inner.bulk_status_update(keys, status, now)
    }

    fn list_by_scope(&self, filter: &CategoryFilter) -> Result<Vec<TranslationRecord>> {
        self.inner.list_by_scope(filter)
    }
}
