//! Content extraction: turning source documents into captured strings.
//!
//! Two extractors share one contract: walk a parsed input and produce a
//! finite sequence of [`ExtractedString`] tuples.
//!
//! - [`template`]: the Twig AST walker (literal subjects of translation
//!   filters, with scope-local constant bindings)
//! - [`form`]: the form-definition object-graph walker (per-kind dispatch
//!   over translatable field slots)
//!
//! [`safety`] guards both against capturing residual template syntax.

pub mod form;
pub mod safety;
pub mod template;

pub use form::{FormExtractor, is_excluded};
pub use template::TemplateExtractor;

use crate::core::record::SourceKind;

/// One captured translatable string. Transient: produced by an extractor and
/// consumed immediately by the reconciliation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedString {
    /// The literal source text, exactly as authored.
    pub text: String,
    /// Grouping under which the string was observed (template category
    /// argument, or the form field path).
    pub category: String,
    /// Where the string came from: template file path or form handle.
    pub origin: String,
    /// Which extractor class produced it.
    pub kind: SourceKind,
}

impl ExtractedString {
    pub fn new(
        text: impl Into<String>,
        category: impl Into<String>,
        origin: impl Into<String>,
        kind: SourceKind,
    ) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
            origin: origin.into(),
            kind,
        }
    }
}

/// Case-insensitive substring filter for strings that must never be
/// captured. Checked before hashing, so a skipped string leaves no trace in
/// the store.
#[derive(Debug, Clone, Default)]
pub struct SkipFilter {
    patterns: Vec<String>,
}

impl SkipFilter {
    pub fn new(patterns: &[String]) -> Self {
        Self {
            patterns: patterns.iter().map(|p| p.to_lowercase()).collect(),
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let lowered = text.to_lowercase();
        self.patterns.iter().any(|p| lowered.contains(p.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use crate::core::extract::*;

    #[test]
    fn test_skip_filter_case_insensitive() {
        let filter = SkipFilter::new(&["lorem".to_string()]);
        assert!(filter.matches("Lorem ipsum dolor"));
        assert!(filter.matches("some LOREM text"));
        assert!(!filter.matches("Submit"));
    }

    #[test]
    fn test_empty_skip_filter_matches_nothing() {
        let filter = SkipFilter::default();
        assert!(!filter.matches("anything"));
        assert!(!filter.matches(""));
    }
}
