//! Query word validation
//!
//! Structural validation of the query word. Numeric search options are
//! clamped elsewhere; only a word the dictionary could never contain is
//! rejected outright.

use rimekit_common::{Error, Result};

/// Longest word the dictionary carries
const MAX_WORD_LEN: usize = 50;

/// Validate and normalize a query word: trimmed, lowercased,
/// letters/spaces/hyphens/apostrophes/periods only.
pub fn validate_word(word: &str) -> Result<String> {
    let trimmed = word.trim();

    if trimmed.is_empty() {
        return Err(Error::InvalidInput("query word is empty".to_string()));
    }

    if trimmed.len() > MAX_WORD_LEN {
        return Err(Error::InvalidInput(format!(
            "query word too long: {} characters (max {})",
            trimmed.len(),
            MAX_WORD_LEN
        )));
    }

    let valid = trimmed
        .chars()
        .all(|c| c.is_ascii_alphabetic() || matches!(c, ' ' | '-' | '\'' | '.'));
    if !valid {
        return Err(Error::InvalidInput(format!(
            "query word contains invalid characters: '{}'",
            trimmed
        )));
    }

    Ok(trimmed.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(validate_word("  Double ").unwrap(), "double");
    }

    #[test]
    fn rejects_empty_and_whitespace_only() {
        assert!(validate_word("").is_err());
        assert!(validate_word("   ").is_err());
    }

    #[test]
    fn rejects_invalid_characters() {
        assert!(validate_word("dou8le").is_err());
        assert!(validate_word("semi_colon").is_err());
    }

    #[test]
    fn allows_hyphens_and_apostrophes() {
        assert_eq!(validate_word("mother-in-law").unwrap(), "mother-in-law");
        assert_eq!(validate_word("o'clock").unwrap(), "o'clock");
    }

    #[test]
    fn rejects_overlong_words() {
        let long = "a".repeat(51);
        assert!(validate_word(&long).is_err());
    }
}
