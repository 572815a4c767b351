//! ARPAbet phoneme model
//!
//! Tolerant parsing of space-separated ARPAbet pronunciations. Vowels carry
//! an optional stress digit (0 = unstressed, 1 = primary, 2 = secondary);
//! consonants never do. Tokens outside the vowel inventory are treated as
//! consonants rather than rejected, so malformed dictionary rows degrade to
//! weak matches instead of errors.

use serde::Serialize;
use std::fmt;

/// The fixed ARPAbet vowel inventory
pub const VOWELS: [&str; 15] = [
    "AA", "AE", "AH", "AO", "AW", "AY", "EH", "ER", "EY", "IH", "IY", "OW", "OY", "UH", "UW",
];

/// Vowel stress level, from the trailing digit of a vowel token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stress {
    Unstressed,
    Primary,
    Secondary,
}

impl Stress {
    pub fn from_digit(c: char) -> Option<Self> {
        match c {
            '0' => Some(Stress::Unstressed),
            '1' => Some(Stress::Primary),
            '2' => Some(Stress::Secondary),
            _ => None,
        }
    }

    pub fn digit(self) -> char {
        match self {
            Stress::Unstressed => '0',
            Stress::Primary => '1',
            Stress::Secondary => '2',
        }
    }
}

/// A single phonetic unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Phoneme {
    /// Vowel with its stress digit (`None` when the token carried no digit)
    Vowel {
        base: String,
        stress: Option<Stress>,
    },
    /// Consonant (or unrecognized token, kept verbatim)
    Consonant(String),
}

impl Phoneme {
    /// Parse a single ARPAbet token. Never fails.
    pub fn parse(token: &str) -> Self {
        let (base, stress) = match token.chars().last().and_then(Stress::from_digit) {
            Some(stress) => (&token[..token.len() - 1], Some(stress)),
            None => (token, None),
        };

        if VOWELS.contains(&base) {
            Phoneme::Vowel {
                base: base.to_string(),
                stress,
            }
        } else {
            Phoneme::Consonant(token.to_string())
        }
    }

    pub fn is_vowel(&self) -> bool {
        matches!(self, Phoneme::Vowel { .. })
    }

    pub fn is_consonant(&self) -> bool {
        matches!(self, Phoneme::Consonant(_))
    }

    /// Stress-stripped symbol ("AH1" -> "AH"; consonants unchanged)
    pub fn base(&self) -> &str {
        match self {
            Phoneme::Vowel { base, .. } => base,
            Phoneme::Consonant(symbol) => symbol,
        }
    }

    pub fn stress(&self) -> Option<Stress> {
        match self {
            Phoneme::Vowel { stress, .. } => *stress,
            Phoneme::Consonant(_) => None,
        }
    }

    pub fn has_primary_stress(&self) -> bool {
        self.stress() == Some(Stress::Primary)
    }
}

impl fmt::Display for Phoneme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phoneme::Vowel {
                base,
                stress: Some(stress),
            } => write!(f, "{}{}", base, stress.digit()),
            Phoneme::Vowel { base, stress: None } => write!(f, "{}", base),
            Phoneme::Consonant(symbol) => write!(f, "{}", symbol),
        }
    }
}

/// Poetic meter derived from a stress pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Meter {
    Iamb,
    Trochee,
    Amphibrach,
    Dactyl,
    Anapest,
    Mixed,
    Unknown,
}

impl Meter {
    /// Name the meter from a stress digit string ("10" -> trochee)
    pub fn from_stress_pattern(pattern: &str) -> Self {
        if pattern.is_empty() {
            return Meter::Unknown;
        }
        if pattern.ends_with("010") {
            return Meter::Amphibrach;
        }
        if pattern.ends_with("100") {
            return Meter::Dactyl;
        }
        if pattern.ends_with("001") {
            return Meter::Anapest;
        }
        if pattern.ends_with("01") {
            return Meter::Iamb;
        }
        if pattern.ends_with("10") {
            return Meter::Trochee;
        }
        Meter::Mixed
    }
}

/// Parse a whitespace-separated pronunciation. Empty input yields an empty
/// sequence; malformed tokens become consonants. Never errors.
pub fn parse_pronunciation(text: &str) -> Vec<Phoneme> {
    text.split_whitespace().map(Phoneme::parse).collect()
}

/// Rejoin a phoneme sequence with single spaces
pub fn join_phonemes(seq: &[Phoneme]) -> String {
    seq.iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extract the stress digit string ("10" for a trochee); vowels without a
/// digit count as unstressed
pub fn stress_pattern(seq: &[Phoneme]) -> String {
    seq.iter()
        .filter_map(|p| match p {
            Phoneme::Vowel { stress, .. } => {
                Some(stress.unwrap_or(Stress::Unstressed).digit())
            }
            Phoneme::Consonant(_) => None,
        })
        .collect()
}

/// Syllable count: one syllable per vowel
pub fn syllable_count(seq: &[Phoneme]) -> usize {
    seq.iter().filter(|p| p.is_vowel()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_vowels_and_consonants() {
        let seq = parse_pronunciation("D AH1 B AH0 L");
        assert_eq!(seq.len(), 5);
        assert!(seq[1].is_vowel());
        assert!(seq[1].has_primary_stress());
        assert_eq!(seq[1].base(), "AH");
        assert!(seq[2].is_consonant());
        assert_eq!(seq[4].base(), "L");
    }

    #[test]
    fn empty_input_yields_empty_sequence() {
        assert!(parse_pronunciation("").is_empty());
        assert!(parse_pronunciation("   ").is_empty());
    }

    #[test]
    fn malformed_tokens_become_consonants() {
        let seq = parse_pronunciation("XX1 ??");
        assert_eq!(seq.len(), 2);
        assert!(seq.iter().all(|p| p.is_consonant()));
    }

    #[test]
    fn round_trip_reproduces_normalized_input() {
        for pron in ["D AH1 B AH0 L", "K AE1 T", "ER", "S T R EH1 NG K TH S"] {
            let seq = parse_pronunciation(pron);
            assert_eq!(join_phonemes(&seq), pron);
        }
        // Extra whitespace normalizes to single spaces
        let seq = parse_pronunciation("  K   AE1  T ");
        assert_eq!(join_phonemes(&seq), "K AE1 T");
    }

    #[test]
    fn vowel_without_digit_keeps_no_digit() {
        let seq = parse_pronunciation("AH");
        assert!(seq[0].is_vowel());
        assert_eq!(seq[0].stress(), None);
        assert_eq!(join_phonemes(&seq), "AH");
    }

    #[test]
    fn stress_pattern_and_syllables() {
        let seq = parse_pronunciation("D AH1 B AH0 L");
        assert_eq!(stress_pattern(&seq), "10");
        assert_eq!(syllable_count(&seq), 2);
    }

    #[test]
    fn meter_names() {
        assert_eq!(Meter::from_stress_pattern("10"), Meter::Trochee);
        assert_eq!(Meter::from_stress_pattern("01"), Meter::Iamb);
        assert_eq!(Meter::from_stress_pattern("010"), Meter::Amphibrach);
        assert_eq!(Meter::from_stress_pattern("100"), Meter::Dactyl);
        assert_eq!(Meter::from_stress_pattern("001"), Meter::Anapest);
        assert_eq!(Meter::from_stress_pattern("11"), Meter::Mixed);
        assert_eq!(Meter::from_stress_pattern(""), Meter::Unknown);
    }
}
