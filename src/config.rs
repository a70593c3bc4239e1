use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::core::locale::{Locale, LocaleSet};

pub const CONFIG_FILE_NAME: &str = ".linguarc.json";

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Active locales translations are tracked for.
    #[serde(default = "default_locales")]
    pub locales: Vec<Locale>,
    /// Base language the source content is authored in.
    #[serde(default = "default_source_language")]
    pub source_language: String,
    #[serde(default = "default_templates_root")]
    pub templates_root: String,
    #[serde(default = "default_forms_root")]
    pub forms_root: String,
    #[serde(default = "default_store_path")]
    pub store_path: String,
    /// Category recorded when a template translation call names none.
    #[serde(default = "default_category")]
    pub default_category: String,
    /// Filter names that mark a value as translatable.
    #[serde(default = "default_translate_filters")]
    pub translate_filters: Vec<String>,
    /// Case-insensitive substrings; matching strings are never captured.
    #[serde(default)]
    pub skip_patterns: Vec<String>,
    /// Case-insensitive substrings matched against form handles and titles;
    /// matching forms are skipped entirely.
    #[serde(default)]
    pub excluded_forms: Vec<String>,
    /// Category prefixes whose records are never auto-marked unused.
    #[serde(default = "default_exempt_categories")]
    pub exempt_categories: Vec<String>,
    /// Glob patterns for template paths to skip during discovery.
    #[serde(default)]
    pub ignores: Vec<String>,
}

fn default_locales() -> Vec<Locale> {
    vec![Locale::new("en")]
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_templates_root() -> String {
    "./templates".to_string()
}

fn default_forms_root() -> String {
    "./forms".to_string()
}

fn default_store_path() -> String {
    "./.lingua/records.json".to_string()
}

fn default_category() -> String {
    "site".to_string()
}

fn default_translate_filters() -> Vec<String> {
    vec!["t".to_string(), "translate".to_string()]
}

fn default_exempt_categories() -> Vec<String> {
    vec!["site".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locales: default_locales(),
            source_language: default_source_language(),
            templates_root: default_templates_root(),
            forms_root: default_forms_root(),
            store_path: default_store_path(),
            default_category: default_category(),
            translate_filters: default_translate_filters(),
            skip_patterns: Vec::new(),
            excluded_forms: Vec::new(),
            exempt_categories: default_exempt_categories(),
            ignores: Vec::new(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error for invalid glob patterns in `ignores`, an empty
    /// locale list, or a blank source language.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        if self.locales.is_empty() {
            anyhow::bail!("Config must declare at least one locale.");
        }
        if self.source_language.trim().is_empty() {
            anyhow::bail!("Config 'sourceLanguage' must not be empty.");
        }
        if self.translate_filters.is_empty() {
            anyhow::bail!("Config must declare at least one translate filter.");
        }

        Ok(())
    }

    /// The locale set the reconciliation engine fans out over.
    pub fn locale_set(&self) -> LocaleSet {
        LocaleSet::new(self.locales.clone(), self.source_language.clone())
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::config::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.source_language, "en");
        assert_eq!(config.default_category, "site");
        assert_eq!(config.translate_filters, vec!["t", "translate"]);
        assert!(config.skip_patterns.is_empty());
    }

    #[test]
    fn test_parse_config() {
        let json = r#"{
              "locales": [{ "id": "en-US" }, { "id": "ar" }],
              "sourceLanguage": "en",
              "templatesRoot": "./site/templates",
              "skipPatterns": ["lorem"]
          }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.locales.len(), 2);
        assert_eq!(config.locales[0].id, "en-US");
        assert_eq!(config.templates_root, "./site/templates");
        assert_eq!(config.skip_patterns, vec!["lorem"]);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let json = r#"{ "sourceLanguage": "de" }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.source_language, "de");
        assert_eq!(config.translate_filters, default_translate_filters());
        assert_eq!(config.store_path, default_store_path());
    }

    #[test]
    fn test_locale_with_explicit_language() {
        let json = r#"{ "locales": [{ "id": "intranet", "language": "de" }] }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.locales[0].base_language(), "de");
    }

    #[test]
    fn test_find_config_file() {
        let dir = tempdir().unwrap();
        let sub_dir = dir.path().join("templates").join("shop");
        fs::create_dir_all(&sub_dir).unwrap();

        let config_path = dir.path().join(CONFIG_FILE_NAME);
        File::create(&config_path).unwrap();

        let found = find_config_file(&sub_dir);
        assert!(found.is_some());
        assert_eq!(found.unwrap(), config_path);
    }

    #[test]
    fn test_find_config_not_found() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        let found = find_config_file(dir.path());
        assert!(found.is_none());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        fs::write(&config_path, r#"{ "excludedForms": ["internal"] }"#).unwrap();

        let result = load_config(dir.path()).unwrap();
        assert!(result.from_file);
        assert_eq!(result.config.excluded_forms, vec!["internal"]);
    }

    #[test]
    fn test_load_config_default_when_not_found() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        let result = load_config(dir.path()).unwrap();
        assert!(!result.from_file);
        assert_eq!(result.config.locales, default_locales());
    }

    #[test]
    fn test_validate_invalid_ignore_pattern() {
        let config = Config {
            ignores: vec!["[invalid".to_string()], // unclosed bracket
            ..Default::default()
        };
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("ignores"));
    }

    #[test]
    fn test_validate_empty_locales() {
        let config = Config {
            locales: Vec::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_config_with_invalid_pattern_fails() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "ignores": ["[invalid"] }"#,
        )
        .unwrap();

        let result = load_config(dir.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_default_config_json_round_trips() {
        let json = default_config_json().unwrap();
        let config: Config = serde_json::from_str(&json).unwrap();
        assert!(config.validate().is_ok());
        assert!(json.contains("sourceLanguage"));
        assert!(json.contains("translateFilters"));
    }
}
