/// Shorten a string for log and error messages. Truncation happens on char
/// boundaries and appends an ellipsis.
pub fn text_preview(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max).collect();
    format!("{}…", truncated)
}

#[cfg(test)]
mod tests {
    use crate::utils::*;

    #[test]
    fn test_short_text_unchanged() {
        assert_eq!(text_preview("Submit", 40), "Submit");
    }

    #[test]
    fn test_long_text_truncated() {
        assert_eq!(text_preview("abcdefgh", 4), "abcd…");
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        assert_eq!(text_preview("こんにちは世界", 3), "こんに…");
    }

    #[test]
    fn test_exact_length_unchanged() {
        assert_eq!(text_preview("abcd", 4), "abcd");
    }
}
