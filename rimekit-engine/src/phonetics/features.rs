//! Articulatory feature tables and phoneme distances
//!
//! Vowels embed into a 3-D feature space (height, backness, rounding);
//! consonants carry place / manner / voicing. Distances from these tables
//! drive the pararhyme vowel penalty and the phonetic edit distance.

use super::phoneme::Phoneme;
use serde::Serialize;

/// Normalizer for the vowel embedding: the largest pairwise distance in the
/// table (high front unrounded vs. low back rounded) is about 3.5
pub const VOWEL_DISTANCE_NORM: f64 = 3.5;

/// 3-D vowel embedding: (height, backness, rounding).
/// Height runs 0 (low) to 3 (high); backness 0 (front) to 2 (back);
/// rounding 0 or 1. Diphthongs sit at their trajectory midpoint.
pub fn vowel_embedding(base: &str) -> Option<(f64, f64, f64)> {
    let features = match base {
        "IY" => (3.0, 0.0, 0.0),
        "IH" => (2.5, 0.5, 0.0),
        "EY" => (2.0, 0.0, 0.0),
        "EH" => (1.5, 0.5, 0.0),
        "AE" => (0.5, 0.5, 0.0),
        "AA" => (0.0, 2.0, 0.0),
        "AO" => (1.0, 2.0, 1.0),
        "OW" => (2.0, 2.0, 1.0),
        "UH" => (2.5, 1.5, 1.0),
        "UW" => (3.0, 2.0, 1.0),
        "AH" => (1.5, 1.0, 0.0),
        "ER" => (2.0, 1.0, 0.0),
        "AY" => (1.0, 1.0, 0.0),
        "AW" => (1.0, 1.5, 0.5),
        "OY" => (1.5, 1.5, 1.0),
        _ => return None,
    };
    Some(features)
}

/// Normalized distance between two vowel bases, in [0, 1].
/// Unknown vowels are maximally distant unless identical.
pub fn vowel_distance(a: &str, b: &str) -> f64 {
    if a == b {
        return 0.0;
    }
    match (vowel_embedding(a), vowel_embedding(b)) {
        (Some((h1, b1, r1)), Some((h2, b2, r2))) => {
            let d = ((h1 - h2).powi(2) + (b1 - b2).powi(2) + (r1 - r2).powi(2)).sqrt();
            (d / VOWEL_DISTANCE_NORM).min(1.0)
        }
        _ => 1.0,
    }
}

/// Place of articulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Place {
    Bilabial,
    Labiodental,
    Dental,
    Alveolar,
    Postalveolar,
    Palatal,
    Velar,
    Glottal,
}

impl Place {
    /// The coronal places that pattern together in family rhymes
    pub fn is_coronal(self) -> bool {
        matches!(self, Place::Dental | Place::Alveolar | Place::Postalveolar)
    }
}

/// Manner of articulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Manner {
    Stop,
    Affricate,
    Fricative,
    Nasal,
    Liquid,
    Glide,
}

/// Articulatory features of a consonant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConsonantFeatures {
    pub place: Place,
    pub manner: Manner,
    pub voiced: bool,
}

/// Feature lookup for ARPAbet consonants
pub fn consonant_features(symbol: &str) -> Option<ConsonantFeatures> {
    use Manner::*;
    use Place::*;

    let (place, manner, voiced) = match symbol {
        "P" => (Bilabial, Stop, false),
        "B" => (Bilabial, Stop, true),
        "M" => (Bilabial, Nasal, true),
        "F" => (Labiodental, Fricative, false),
        "V" => (Labiodental, Fricative, true),
        "TH" => (Dental, Fricative, false),
        "DH" => (Dental, Fricative, true),
        "T" => (Alveolar, Stop, false),
        "D" => (Alveolar, Stop, true),
        "N" => (Alveolar, Nasal, true),
        "S" => (Alveolar, Fricative, false),
        "Z" => (Alveolar, Fricative, true),
        "L" => (Alveolar, Liquid, true),
        "R" => (Alveolar, Liquid, true),
        "SH" => (Postalveolar, Fricative, false),
        "ZH" => (Postalveolar, Fricative, true),
        "CH" => (Postalveolar, Affricate, false),
        "JH" => (Postalveolar, Affricate, true),
        "Y" => (Palatal, Glide, true),
        "K" => (Velar, Stop, false),
        "G" => (Velar, Stop, true),
        "NG" => (Velar, Nasal, true),
        "W" => (Velar, Glide, true),
        "HH" => (Glottal, Fricative, false),
        _ => return None,
    };

    Some(ConsonantFeatures {
        place,
        manner,
        voiced,
    })
}

/// Weighted consonant distance in [0, 1]: place 0.4, manner 0.4, voicing 0.2.
/// Unknown consonants are maximally distant unless identical.
pub fn consonant_distance(a: &str, b: &str) -> f64 {
    if a == b {
        return 0.0;
    }
    match (consonant_features(a), consonant_features(b)) {
        (Some(fa), Some(fb)) => {
            let place = if fa.place == fb.place { 0.0 } else { 1.0 };
            let manner = if fa.manner == fb.manner { 0.0 } else { 1.0 };
            let voicing = if fa.voiced == fb.voiced { 0.0 } else { 1.0 };
            0.4 * place + 0.4 * manner + 0.2 * voicing
        }
        _ => 1.0,
    }
}

/// Whether two consonants count as equivalent for family rhymes: identical,
/// or same place and manner (voicing free), or coronal-class places with
/// the same manner.
pub fn consonants_equivalent(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    match (consonant_features(a), consonant_features(b)) {
        (Some(fa), Some(fb)) => {
            if fa.manner != fb.manner {
                return false;
            }
            fa.place == fb.place || (fa.place.is_coronal() && fb.place.is_coronal())
        }
        _ => false,
    }
}

/// Pairwise phoneme distance in [0, 1], stress-agnostic: 0 for identical
/// bases, feature distance within a class, maximal across classes.
pub fn phoneme_distance(a: &Phoneme, b: &Phoneme) -> f64 {
    match (a, b) {
        (Phoneme::Vowel { base: va, .. }, Phoneme::Vowel { base: vb, .. }) => {
            vowel_distance(va, vb)
        }
        (Phoneme::Consonant(ca), Phoneme::Consonant(cb)) => consonant_distance(ca, cb),
        _ => 1.0,
    }
}
