//! Safety validation for resolved literals.
//!
//! A resolved "literal" can still be unrendered template source that leaked
//! into a string position (injected markup, a component block passed around
//! as text). Capturing it verbatim would poison the record store, so every
//! resolved string passes through here before it may be emitted.
//!
//! The check is a finite-state scan over the character sequence; the input
//! is never evaluated or partially trusted.

use crate::parsers::twig::{self, Segment, Token};

/// True when the text contains any of the three delimiter families
/// (`{{ }}`, `{% %}`, `{# #}`), opening or closing side.
pub fn contains_template_syntax(text: &str) -> bool {
    let mut prev = '\0';
    for c in text.chars() {
        match (prev, c) {
            ('{', '{') | ('{', '%') | ('{', '#') => return true,
            ('}', '}') | ('%', '}') | ('#', '}') => return true,
            _ => {}
        }
        prev = c;
    }
    false
}

/// Validate a resolved literal for capture.
///
/// - Plain text passes through unchanged.
/// - A single wrapping statement pair around plain text (the component-block
///   convention, e.g. `{% block %}Hello{% endblock %}`) is unwrapped to the
///   enclosed text, which is then re-validated.
/// - Anything else containing template syntax is dropped (`None`); there is
///   no partial-guess fallback.
pub fn sanitize(text: &str) -> Option<String> {
    if !contains_template_syntax(text) {
        return Some(text.to_string());
    }
    let inner = unwrap_component_block(text)?;
    sanitize(&inner)
}

/// Extract the plain-text span enclosed by a single wrapping statement pair.
///
/// The text must lex as exactly three segments: an opening statement, a text
/// span, and a closing `end*` statement. Any other shape (nested blocks,
/// expressions mixed into the body, stray delimiters) yields `None`.
fn unwrap_component_block(text: &str) -> Option<String> {
    let segments = twig::lex(text);
    match segments.as_slice() {
        [
            Segment::Stmt(open, _),
            Segment::Text(inner),
            Segment::Stmt(close, _),
        ] => {
            let Some(Token::Name(open_tag)) = open.first() else {
                return None;
            };
            let Some(Token::Name(close_tag)) = close.first() else {
                return None;
            };
            if close_tag.starts_with("end") && !open_tag.starts_with("end") {
                Some(inner.clone())
            } else {
                None
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::core::extract::safety::*;

    #[test]
    fn test_plain_text_is_clean() {
        assert!(!contains_template_syntax("Submit"));
        assert!(!contains_template_syntax("100% done { }"));
        assert_eq!(sanitize("Submit"), Some("Submit".to_string()));
    }

    #[test]
    fn test_detects_all_delimiter_families() {
        assert!(contains_template_syntax("{{ foo }}"));
        assert!(contains_template_syntax("{% if x %}"));
        assert!(contains_template_syntax("{# note #}"));
        assert!(contains_template_syntax("tail }} only"));
        assert!(contains_template_syntax("tail %} only"));
    }

    #[test]
    fn test_expression_is_rejected() {
        assert_eq!(sanitize("{{ foo }}"), None);
    }

    #[test]
    fn test_component_block_is_unwrapped() {
        assert_eq!(
            sanitize("{% block %}Hello{% endblock %}"),
            Some("Hello".to_string())
        );
    }

    #[test]
    fn test_named_component_block_is_unwrapped() {
        assert_eq!(
            sanitize("{% block cta %}Read more{% endblock %}"),
            Some("Read more".to_string())
        );
    }

    #[test]
    fn test_block_with_expression_body_is_rejected() {
        assert_eq!(sanitize("{% block %}{{ name }}{% endblock %}"), None);
    }

    #[test]
    fn test_nested_blocks_are_rejected() {
        assert_eq!(
            sanitize("{% block %}{% block %}Hi{% endblock %}{% endblock %}"),
            None
        );
    }

    #[test]
    fn test_mixed_text_around_block_is_rejected() {
        assert_eq!(sanitize("before {% block %}Hi{% endblock %}"), None);
    }

    #[test]
    fn test_reversed_pair_is_rejected() {
        assert_eq!(sanitize("{% endblock %}Hi{% block %}"), None);
    }
}
