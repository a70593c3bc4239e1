//! Key Identity: content hashing of source text.
//!
//! The (hash, locale) pair is the sole dedup key for translation records, so
//! this function is a stable contract: the input is the exact UTF-8 byte
//! sequence of the source text, with no trimming or normalization, and the
//! output format must never change without a store migration.

/// Compute the content hash of a source string.
///
/// 128-bit blake3 digest, hex-encoded (32 lowercase hex characters).
/// Byte-identical input always produces identical output.
pub fn source_hash(text: &str) -> String {
    use std::fmt::Write;

    let digest = blake3::hash(text.as_bytes());
    let mut out = String::with_capacity(32);
    for byte in &digest.as_bytes()[..16] {
        let _ = write!(out, "{:02x}", byte);
    }
    out
}

#[cfg(test)]
mod tests {
    use crate::core::hash::*;

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(source_hash("Submit"), source_hash("Submit"));
    }

    #[test]
    fn test_hash_length_and_charset() {
        let hash = source_hash("Hello");
        assert_eq!(hash.len(), 32);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_no_normalization() {
        // Whitespace and case are significant: these are different strings.
        assert_ne!(source_hash("Submit"), source_hash("Submit "));
        assert_ne!(source_hash("Submit"), source_hash("submit"));
    }

    #[test]
    fn test_unicode_input() {
        assert_ne!(source_hash("مرحبا"), source_hash("مرحبا "));
        assert_eq!(source_hash("你好"), source_hash("你好"));
    }
}
