//! Template-AST extractor.
//!
//! Walks a parsed Twig template depth-first and captures the literal
//! subjects of translation filters (`'Submit'|t('forms')`). Name references
//! resolve through a scope-local map of constant `set` bindings; anything
//! dynamic is skipped; extraction never guesses.
//!
//! Asymmetry preserved from the system this engine reconciles for: an
//! unresolvable *category* argument falls back to the default category,
//! while an unresolvable *subject* skips the whole call.

use std::collections::HashMap;

use crate::core::extract::{ExtractedString, safety};
use crate::core::record::SourceKind;
use crate::parsers::twig::{Arg, Expr, FilterCall, Node, Template};
use crate::utils::text_preview;

/// Output of one template extraction pass.
#[derive(Debug, Default)]
pub struct TemplateExtraction {
    pub strings: Vec<ExtractedString>,
    /// Resolved literals that failed safety validation, kept for operator
    /// visibility in the scan report.
    pub dropped: Vec<String>,
}

/// Extractor over template ASTs. Stateless across documents; restartable on
/// the same input with identical results.
#[derive(Debug)]
pub struct TemplateExtractor<'a> {
    /// Translation-marking filter names (`t`, `translate`).
    filters: &'a [String],
    /// Fallback category when the category argument cannot be statically
    /// resolved.
    default_category: &'a str,
}

/// Scope stack of constant bindings. `None` marks a name rebound to a
/// computed value, which shadows any outer constant.
type Scopes = Vec<HashMap<String, Option<String>>>;

impl<'a> TemplateExtractor<'a> {
    pub fn new(filters: &'a [String], default_category: &'a str) -> Self {
        Self {
            filters,
            default_category,
        }
    }

    /// Extract every statically resolvable translation call from `template`.
    pub fn extract(&self, template: &Template, file_path: &str) -> TemplateExtraction {
        let mut extraction = TemplateExtraction::default();
        let mut scopes: Scopes = vec![HashMap::new()];
        self.walk(&template.nodes, &mut scopes, file_path, &mut extraction);
        extraction
    }

    fn walk(
        &self,
        nodes: &[Node],
        scopes: &mut Scopes,
        file_path: &str,
        extraction: &mut TemplateExtraction,
    ) {
        for node in nodes {
            match node {
                Node::Text(_) => {}
                Node::Set { name, value, .. } => {
                    // A translation call on the right-hand side is still a
                    // capture site, even though the binding itself stays
                    // computed (the bound value is the translated text).
                    self.inspect_expr(value, scopes, file_path, extraction);
                    let literal = match value {
                        Expr::Literal(text) => Some(text.clone()),
                        _ => None,
                    };
                    if let Some(scope) = scopes.last_mut() {
                        scope.insert(name.clone(), literal);
                    }
                }
                Node::Print { expr, .. } => {
                    self.inspect_expr(expr, scopes, file_path, extraction);
                }
                Node::Tag {
                    exprs, children, ..
                } => {
                    for expr in exprs {
                        self.inspect_expr(expr, scopes, file_path, extraction);
                    }
                    // Child nodes get their own binding scope; siblings keep
                    // walking regardless of what the subtree produced.
                    scopes.push(HashMap::new());
                    self.walk(children, scopes, file_path, extraction);
                    scopes.pop();
                }
            }
        }
    }

    fn inspect_expr(
        &self,
        expr: &Expr,
        scopes: &Scopes,
        file_path: &str,
        extraction: &mut TemplateExtraction,
    ) {
        let Expr::Filtered { subject, filters } = expr else {
            return;
        };

        // The translation filter must be applied directly to the subject; a
        // preceding filter means the value is computed, not a literal.
        let Some(call) = filters.first() else {
            return;
        };
        if !self.filters.iter().any(|f| f == &call.name) {
            return;
        }

        let Some(text) = resolve_subject(subject, scopes) else {
            // Dynamic subject: documented limitation, skip without guessing.
            return;
        };

        let category = self.resolve_category(call);

        match safety::sanitize(&text) {
            Some(clean) => {
                extraction.strings.push(ExtractedString::new(
                    clean,
                    category,
                    file_path,
                    SourceKind::Template,
                ));
            }
            None => {
                extraction.dropped.push(format!(
                    "{}: dropped unsafe literal \"{}\"",
                    file_path,
                    text_preview(&text, 60)
                ));
            }
        }
    }

    /// Category argument: the first positional argument, or the named
    /// `category` argument. A dynamic value in the category slot falls back
    /// to the default category; later positionals are not category slots.
    fn resolve_category(&self, call: &FilterCall) -> String {
        for arg in &call.args {
            match arg {
                Arg::Literal(value) => return value.clone(),
                Arg::Dynamic => return self.default_category.to_string(),
                Arg::Named { name, value } if name == "category" => {
                    return value
                        .clone()
                        .unwrap_or_else(|| self.default_category.to_string());
                }
                _ => {}
            }
        }
        self.default_category.to_string()
    }
}

/// Resolve a filter subject to a string: literals directly, names through
/// the innermost constant binding. Computed values resolve to nothing.
fn resolve_subject(subject: &Expr, scopes: &Scopes) -> Option<String> {
    match subject {
        Expr::Literal(text) => Some(text.clone()),
        Expr::Name(name) => {
            for scope in scopes.iter().rev() {
                if let Some(binding) = scope.get(name) {
                    return binding.clone();
                }
            }
            None
        }
        _ => None,
    }
}
