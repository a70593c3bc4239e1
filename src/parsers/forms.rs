//! Form definition documents.
//!
//! A form definition is a JSON document describing a structured form owned by
//! an external system: a stable handle, a display title, and a tree of typed
//! fields. The object-graph extractor walks this model; every translatable
//! slot is optional so that a sparse or older document never fails to load.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

/// A labeled choice inside a select/radio/checkboxes field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOption {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

/// One field of a form. `kind` drives the per-kind extraction dispatch;
/// kind-specific translatable slots that have no dedicated column live in
/// `extra` and are read defensively.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub kind: String,
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<FieldOption>>,
    /// Nested fields for composite kinds (`group`, `page`).
    #[serde(default)]
    pub fields: Option<Vec<Field>>,
    /// Kind-specific properties (e.g. `checkedLabel`, `firstNameLabel`, `text`).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Field {
    /// Read a kind-specific string property from `extra`, if present.
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }
}

/// A full form definition document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDefinition {
    /// Stable machine handle, used as the category root for every string
    /// captured from this form.
    pub handle: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// Load a single form definition from a JSON file.
pub fn load_form(path: &Path) -> Result<FormDefinition> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read form definition: {:?}", path))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse form definition: {:?}", path))
}

/// Load every `*.json` form definition under a directory (non-recursive,
/// sorted by file name for deterministic scan order).
///
/// Unparsable files are reported in the returned error list rather than
/// aborting the load; the caller surfaces them as scan warnings.
pub fn load_forms_dir(dir: &Path) -> Result<(Vec<FormDefinition>, Vec<String>)> {
    let mut forms = Vec::new();
    let mut errors = Vec::new();

    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read forms directory: {:?}", dir))?;
    let mut paths: Vec<_> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    for path in paths {
        match load_form(&path) {
            Ok(form) => forms.push(form),
            Err(err) => errors.push(format!("{:#}", err)),
        }
    }

    Ok((forms, errors))
}
