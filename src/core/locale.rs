//! Locales and the source-language rule.

use serde::{Deserialize, Serialize};

/// One target locale for which translations are tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Locale {
    /// Locale identifier, e.g. `en-US`, `fr`, `ar`.
    pub id: String,
    /// Base language tag. Defaults to the base tag of `id` (`en-US` → `en`).
    #[serde(default)]
    pub language: Option<String>,
}

impl Locale {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            language: None,
        }
    }

    /// The locale's base language: the explicit `language` if configured,
    /// otherwise the part of the id before the first `-` or `_`.
    pub fn base_language(&self) -> &str {
        if let Some(language) = &self.language {
            return language;
        }
        self.id
            .split(['-', '_'])
            .next()
            .unwrap_or(self.id.as_str())
    }
}

/// The ordered set of active locales, plus the configured source language of
/// the content. Fan-out iterates this set in order.
#[derive(Debug, Clone)]
pub struct LocaleSet {
    pub locales: Vec<Locale>,
    pub source_language: String,
}

impl LocaleSet {
    pub fn new(locales: Vec<Locale>, source_language: impl Into<String>) -> Self {
        Self {
            locales,
            source_language: source_language.into(),
        }
    }

    /// Whether a locale's base language equals the source language, meaning
    /// the source text is trivially "translated" into that locale.
    pub fn is_source_locale(&self, locale: &Locale) -> bool {
        locale.base_language() == self.source_language
    }

    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }

    pub fn len(&self) -> usize {
        self.locales.len()
    }
}

#[cfg(test)]
mod tests {
    use crate::core::locale::*;

    #[test]
    fn test_base_language_derived_from_id() {
        assert_eq!(Locale::new("en-US").base_language(), "en");
        assert_eq!(Locale::new("pt_BR").base_language(), "pt");
        assert_eq!(Locale::new("ar").base_language(), "ar");
    }

    #[test]
    fn test_explicit_language_wins() {
        let locale = Locale {
            id: "intranet".to_string(),
            language: Some("de".to_string()),
        };
        assert_eq!(locale.base_language(), "de");
    }

    #[test]
    fn test_is_source_locale() {
        let set = LocaleSet::new(vec![Locale::new("en-US"), Locale::new("ar")], "en");
        assert!(set.is_source_locale(&set.locales[0]));
        assert!(!set.is_source_locale(&set.locales[1]));
    }
}
