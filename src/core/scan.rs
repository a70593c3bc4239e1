//! Scan orchestrator: the only component with I/O-heavy control flow.
//!
//! Drives full-repository capture passes: discover template files, parse and
//! extract them (per-file in parallel, extraction is side-effect-free),
//! reconcile every captured string through the store (serialized), and, on a
//! full scan, run the usage pass against the live-text set assembled from
//! everything just extracted.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use glob::Pattern;
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::config::Config;
use crate::core::extract::template::TemplateExtraction;
use crate::core::extract::{FormExtractor, SkipFilter, TemplateExtractor, is_excluded};
use crate::core::locale::LocaleSet;
use crate::core::reconcile::{ReconcileOutcome, Reconciler};
use crate::core::store::{CategoryFilter, RecordStore};
use crate::core::usage::{UsageScope, reconcile_usage};
use crate::parsers::forms::{FormDefinition, load_forms_dir};
use crate::parsers::twig;

/// Cap on error/warning messages kept for display.
pub const MAX_REPORTED_MESSAGES: usize = 20;

/// Template file extensions considered during discovery.
const TEMPLATE_EXTENSIONS: &[&str] = &["twig", "html"];

/// User-visible result of a scan.
#[derive(Debug, Default, Clone)]
pub struct ScanSummary {
    /// Template files plus form definitions visited.
    pub scanned_sources: usize,
    /// Distinct source strings observed (post skip-filter).
    pub extracted_strings: usize,
    pub created: usize,
    pub updated: usize,
    pub reactivated: usize,
    pub marked_unused: usize,
    /// Hard failures (store writes, unreadable files), capped for display.
    pub errors: Vec<String>,
    pub error_count: usize,
    /// Operator-visibility notes (dropped unsafe literals, unparsable form
    /// files), capped for display.
    pub warnings: Vec<String>,
    pub warning_count: usize,
}

impl ScanSummary {
    pub fn push_error(&mut self, message: String) {
        if self.errors.len() < MAX_REPORTED_MESSAGES {
            self.errors.push(message);
        }
        self.error_count += 1;
    }

    pub fn push_warning(&mut self, message: String) {
        if self.warnings.len() < MAX_REPORTED_MESSAGES {
            self.warnings.push(message);
        }
        self.warning_count += 1;
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Fold one sweep's reconciliation counters into the summary.
    fn absorb(&mut self, outcome: ReconcileOutcome) {
        self.created += outcome.created;
        self.updated += outcome.updated;
        self.reactivated += outcome.reactivated;
        for error in outcome.errors {
            self.push_error(error);
        }
    }
}

/// Which capture passes a scan runs.
#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    pub templates: bool,
    pub forms: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            templates: true,
            forms: true,
        }
    }
}

/// One bounded capture pass over templates and/or forms.
pub struct Scanner<'a, S: RecordStore + ?Sized> {
    store: &'a S,
    locales: &'a LocaleSet,
    config: &'a Config,
    skip: SkipFilter,
}

impl<'a, S: RecordStore + ?Sized> Scanner<'a, S> {
    pub fn new(store: &'a S, locales: &'a LocaleSet, config: &'a Config) -> Self {
        Self {
            store,
            locales,
            config,
            skip: SkipFilter::new(&config.skip_patterns),
        }
    }

    /// Run a scan per `options`. The usage pass only runs when both sweeps
    /// actually covered their sources, because only then does the live-text
    /// set cover every enumerable source of translatable text.
    pub fn run(&self, root: &Path, options: ScanOptions) -> Result<ScanSummary> {
        let mut summary = ScanSummary::default();
        let mut live_texts: HashSet<String> = HashSet::new();
        let mut distinct: HashSet<String> = HashSet::new();

        let mut templates_swept = false;
        if options.templates {
            let templates_root = root.join(&self.config.templates_root);
            if templates_root.is_dir() {
                self.scan_templates(&templates_root, &mut summary, &mut live_texts, &mut distinct)?;
                templates_swept = true;
            } else {
                summary.push_warning(format!(
                    "templates directory not found, skipping template sweep: {}",
                    templates_root.display()
                ));
            }
        }
        let mut forms_swept = false;
        if options.forms {
            let forms_root = root.join(&self.config.forms_root);
            if forms_root.is_dir() {
                self.scan_forms(&forms_root, &mut summary, &mut live_texts, &mut distinct)?;
                forms_swept = true;
            } else {
                summary.push_warning(format!(
                    "forms directory not found, skipping form sweep: {}",
                    forms_root.display()
                ));
            }
        }
        summary.extracted_strings = distinct.len();

        if templates_swept && forms_swept {
            let scope = UsageScope::new(
                CategoryFilter::All,
                self.config.exempt_categories.clone(),
            );
            let outcome = reconcile_usage(self.store, &live_texts, &scope, Utc::now())?;
            summary.marked_unused = outcome.marked_unused;
            summary.reactivated += outcome.reactivated;
        }

        Ok(summary)
    }

    /// Sweep every template file under `root`.
    fn scan_templates(
        &self,
        root: &Path,
        summary: &mut ScanSummary,
        live_texts: &mut HashSet<String>,
        distinct: &mut HashSet<String>,
    ) -> Result<()> {
        let files = discover_templates(root, &self.config.ignores)?;
        summary.scanned_sources += files.len();

        let extractor =
            TemplateExtractor::new(&self.config.translate_filters, &self.config.default_category);

        // Parse + extract in parallel; each file is independent and
        // side-effect-free until results reach the reconciler.
        let extractions: Vec<(String, Result<TemplateExtraction>)> = files
            .par_iter()
            .map(|path| {
                let display = path.display().to_string();
                let result = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read template: {:?}", path))
                    .map(|source| extractor.extract(&twig::parse(&source), &display));
                (display, result)
            })
            .collect();

        let reconciler = Reconciler::new(self.store, self.locales);
        let now = Utc::now();
        let mut outcome = ReconcileOutcome::default();
        for (file, result) in extractions {
            match result {
                Ok(extraction) => {
                    for message in extraction.dropped {
                        summary.push_warning(message);
                    }
                    for extracted in extraction.strings {
                        if self.skip.matches(&extracted.text) {
                            continue;
                        }
                        live_texts.insert(extracted.text.clone());
                        distinct.insert(extracted.text.clone());
                        outcome.merge(reconciler.reconcile(&extracted, now));
                    }
                }
                Err(err) => summary.push_error(format!("{}: {:#}", file, err)),
            }
        }
        summary.absorb(outcome);

        Ok(())
    }

    /// Sweep every form definition under `root`.
    fn scan_forms(
        &self,
        root: &Path,
        summary: &mut ScanSummary,
        live_texts: &mut HashSet<String>,
        distinct: &mut HashSet<String>,
    ) -> Result<()> {
        let (forms, load_errors) = load_forms_dir(root)?;
        for error in load_errors {
            summary.push_warning(error);
        }

        let forms: Vec<&FormDefinition> = forms
            .iter()
            .filter(|form| !is_excluded(form, &self.config.excluded_forms))
            .collect();
        summary.scanned_sources += forms.len();

        let reconciler = Reconciler::new(self.store, self.locales);
        let now = Utc::now();
        let mut outcome = ReconcileOutcome::default();
        for form in forms {
            for extracted in FormExtractor::extract(form) {
                if self.skip.matches(&extracted.text) {
                    continue;
                }
                live_texts.insert(extracted.text.clone());
                distinct.insert(extracted.text.clone());
                outcome.merge(reconciler.reconcile(&extracted, now));
            }
        }
        summary.absorb(outcome);

        Ok(())
    }

}

/// Find template files under `root`, skipping ignore globs. Paths come back
/// sorted for deterministic scan order.
pub fn discover_templates(root: &Path, ignores: &[String]) -> Result<Vec<PathBuf>> {
    let patterns: Vec<Pattern> = ignores
        .iter()
        .filter_map(|p| Pattern::new(p).ok())
        .collect();

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| TEMPLATE_EXTENSIONS.contains(&ext))
        })
        .filter(|path| {
            let relative = path.strip_prefix(root).unwrap_or(path);
            !patterns
                .iter()
                .any(|pattern| pattern.matches_path(relative))
        })
        .collect();
    files.sort();
    Ok(files)
}
