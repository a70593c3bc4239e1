//! Object-graph extractor for form definitions.
//!
//! A fixed per-kind dispatch table maps each known field kind to the labeled
//! slots that are translatable for that kind. Composite kinds (`group`,
//! `page`) recurse into their nested fields. Unknown kinds are skipped with
//! no error. A missing optional slot yields no extraction, never a failure.
//!
//! Each tuple's category is the structured path
//! `{formHandle}.{fieldHandle}.{slot}`, which the reconciliation engine
//! records as provenance.

use crate::core::extract::ExtractedString;
use crate::core::record::SourceKind;
use crate::parsers::forms::{Field, FormDefinition};

/// Extraction function for one field kind.
type KindExtractor = fn(&Field, &str, &str, &mut Vec<ExtractedString>);

/// Look up the extractor for a field kind. Unknown kinds map to `None`,
/// which the walker treats as a no-op (forward compatible with new kinds).
fn kind_extractor(kind: &str) -> Option<KindExtractor> {
    Some(match kind {
        "text" | "textarea" | "email" | "number" | "date" | "phone" | "website" => extract_input,
        "select" | "radio" | "checkboxes" | "multiselect" => extract_choice,
        "agree" => extract_agree,
        "name" => extract_name,
        "file" => extract_basic,
        "heading" | "paragraph" => extract_rich_text,
        "submit" => extract_submit,
        "group" | "page" => extract_composite,
        _ => return None,
    })
}

/// Extractor over form-definition object graphs.
#[derive(Debug)]
pub struct FormExtractor;

impl FormExtractor {
    /// Extract every translatable slot from a form definition.
    ///
    /// The exclusion filter is the caller's responsibility (see
    /// [`is_excluded`]); an excluded form must never reach this point.
    pub fn extract(form: &FormDefinition) -> Vec<ExtractedString> {
        let mut out = Vec::new();
        let origin = form.handle.as_str();

        if let Some(title) = &form.title {
            push_text(&mut out, title, &format!("{}.title", form.handle), origin);
        }
        for field in &form.fields {
            extract_field(field, &form.handle, origin, &mut out);
        }
        out
    }
}

/// Whether a form is opted out of capture entirely: case-insensitive
/// substring match of any pattern against the handle or the display title.
pub fn is_excluded(form: &FormDefinition, patterns: &[String]) -> bool {
    if patterns.is_empty() {
        return false;
    }
    let handle = form.handle.to_lowercase();
    let title = form.title.as_deref().unwrap_or("").to_lowercase();
    patterns.iter().any(|pattern| {
        let pattern = pattern.to_lowercase();
        handle.contains(&pattern) || (!title.is_empty() && title.contains(&pattern))
    })
}

fn extract_field(field: &Field, prefix: &str, origin: &str, out: &mut Vec<ExtractedString>) {
    let path = format!("{}.{}", prefix, field.handle);
    if let Some(extract) = kind_extractor(&field.kind) {
        extract(field, &path, origin, out);
    }
}

fn push_text(out: &mut Vec<ExtractedString>, text: &str, category: &str, origin: &str) {
    if !text.is_empty() {
        out.push(ExtractedString::new(text, category, origin, SourceKind::Form));
    }
}

fn push_slot(out: &mut Vec<ExtractedString>, value: Option<&str>, path: &str, slot: &str, origin: &str) {
    if let Some(text) = value {
        push_text(out, text, &format!("{}.{}", path, slot), origin);
    }
}

// ============================================================
// Per-kind extractors
// ============================================================

/// label + instructions, the slots every concrete kind shares.
fn extract_basic(field: &Field, path: &str, origin: &str, out: &mut Vec<ExtractedString>) {
    push_slot(out, field.label.as_deref(), path, "label", origin);
    push_slot(out, field.instructions.as_deref(), path, "instructions", origin);
}

/// Free-text input kinds: label, placeholder, instructions.
fn extract_input(field: &Field, path: &str, origin: &str, out: &mut Vec<ExtractedString>) {
    extract_basic(field, path, origin, out);
    push_slot(out, field.placeholder.as_deref(), path, "placeholder", origin);
}

/// Choice kinds: basics plus each option label.
fn extract_choice(field: &Field, path: &str, origin: &str, out: &mut Vec<ExtractedString>) {
    extract_basic(field, path, origin, out);
    if let Some(options) = &field.options {
        for option in options {
            push_slot(out, option.label.as_deref(), path, "options", origin);
        }
    }
}

fn extract_agree(field: &Field, path: &str, origin: &str, out: &mut Vec<ExtractedString>) {
    extract_basic(field, path, origin, out);
    push_slot(out, field.extra_str("checkedLabel"), path, "checkedLabel", origin);
}

fn extract_name(field: &Field, path: &str, origin: &str, out: &mut Vec<ExtractedString>) {
    extract_basic(field, path, origin, out);
    push_slot(out, field.extra_str("firstNameLabel"), path, "firstNameLabel", origin);
    push_slot(out, field.extra_str("lastNameLabel"), path, "lastNameLabel", origin);
}

/// Display-only rich text blocks carry their content in `text`.
fn extract_rich_text(field: &Field, path: &str, origin: &str, out: &mut Vec<ExtractedString>) {
    push_slot(out, field.extra_str("text"), path, "text", origin);
}

fn extract_submit(field: &Field, path: &str, origin: &str, out: &mut Vec<ExtractedString>) {
    push_slot(out, field.label.as_deref(), path, "label", origin);
}

/// Composite kinds: own label, then recurse into nested fields with the
/// extended path prefix.
fn extract_composite(field: &Field, path: &str, origin: &str, out: &mut Vec<ExtractedString>) {
    push_slot(out, field.label.as_deref(), path, "label", origin);
    if let Some(fields) = &field.fields {
        for child in fields {
            extract_field(child, path, origin, out);
        }
    }
}
