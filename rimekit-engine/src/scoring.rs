//! Weighted rhyme scoring
//!
//! Combines the hierarchical key indicators with the extended similarity
//! signals and a rarity blend into one scalar in [0, 1]. The cascade gives
//! the strongest matched level its full weight and suppresses the weaker
//! levels beneath it; the extended signals then refine ordering within a
//! band.

use crate::phonetics::keys::{compute_keys, terminal_chunk};
use crate::phonetics::phoneme::Phoneme;
use crate::phonetics::similarity::{
    family_rhyme, multisyllabic_continuity, pararhyme, rarity_index, tail_consonance,
    upstream_assonance,
};
use serde::Serialize;

/// Composite rhyme score with its component breakdown
#[derive(Debug, Clone, Serialize)]
pub struct RhymeScore {
    /// Combined score, clamped to [0, 1]
    pub composite: f64,
    /// Exact stressed rime match (K3)
    pub k3_match: bool,
    /// Stress-agnostic rime match (K2)
    pub k2_match: bool,
    /// Final-syllable match ignoring stress
    pub terminal_match: bool,
    /// Nucleus vowel match (K1)
    pub k1_match: bool,
    pub tail_consonance: f64,
    pub family_rhyme: f64,
    pub pararhyme: f64,
    pub multisyllabic: f64,
    pub upstream_assonance: f64,
    pub rarity: f64,
}

/// Score two phoneme sequences with their popularity measures.
///
/// The hierarchical cascade: K3 1.00, K2 0.85, terminal 0.60, K1 0.35 —
/// each level only contributes when every stronger level failed. The
/// extended signals and the rarity average are additive on top, and the
/// result is clamped to [0, 1].
pub fn score_sequences(a: &[Phoneme], b: &[Phoneme], zipf_a: f64, zipf_b: f64) -> RhymeScore {
    let keys_a = compute_keys(a);
    let keys_b = compute_keys(b);

    let k3 = !keys_a.k3.is_empty() && keys_a.k3 == keys_b.k3;
    let k2 = !keys_a.k2.is_empty() && keys_a.k2 == keys_b.k2;
    let terminal = match (terminal_chunk(a), terminal_chunk(b)) {
        (Some(ta), Some(tb)) => ta == tb,
        _ => false,
    };
    let k1 = !keys_a.k1.is_empty() && keys_a.k1 == keys_b.k1;

    let tail = tail_consonance(a, b);
    let family = family_rhyme(a, b);
    let para = pararhyme(a, b);
    let multi = multisyllabic_continuity(a, b);
    let upstream = upstream_assonance(a, b);
    let rarity = (rarity_index(zipf_a) + rarity_index(zipf_b)) / 2.0;

    let ind = |flag: bool| if flag { 1.0 } else { 0.0 };
    let (s3, s2, s25, s1) = (ind(k3), ind(k2), ind(terminal), ind(k1));

    let hierarchical = 1.00 * s3
        + 0.85 * (1.0 - s3) * s2
        + 0.60 * (1.0 - s3) * (1.0 - s2) * s25
        + 0.35 * (1.0 - s3) * (1.0 - s2) * (1.0 - s25) * s1;

    let composite = hierarchical
        + 0.20 * tail
        + 0.15 * family
        + 0.15 * para
        + 0.10 * multi.min(1.0)
        + upstream
        + 0.20 * rarity;

    RhymeScore {
        composite: composite.clamp(0.0, 1.0),
        k3_match: k3,
        k2_match: k2,
        terminal_match: terminal,
        k1_match: k1,
        tail_consonance: tail,
        family_rhyme: family,
        pararhyme: para,
        multisyllabic: multi,
        upstream_assonance: upstream,
        rarity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phonetics::phoneme::parse_pronunciation;

    fn score(a: &str, b: &str, zipf_a: f64, zipf_b: f64) -> RhymeScore {
        score_sequences(
            &parse_pronunciation(a),
            &parse_pronunciation(b),
            zipf_a,
            zipf_b,
        )
    }

    #[test]
    fn double_trouble_is_a_full_score() {
        let s = score("D AH1 B AH0 L", "T R AH1 B AH0 L", 5.0, 5.2);
        assert!(s.k3_match);
        assert_eq!(s.composite, 1.0);
    }

    #[test]
    fn couple_double_stays_in_the_assonance_band() {
        let s = score("K AH1 P AH0 L", "D AH1 B AH0 L", 5.1, 5.0);
        assert!(!s.k3_match && !s.k2_match && !s.terminal_match);
        assert!(s.k1_match);
        assert!(s.composite >= 0.35, "composite {}", s.composite);
        assert!(s.composite < 0.60, "composite {}", s.composite);
    }

    #[test]
    fn k2_match_scores_as_perfect_by_ear() {
        // Same rime, nucleus stress differs: K2 holds, K3 does not
        let s = score("K AE1 T", "K AE2 T", 5.0, 5.0);
        assert!(!s.k3_match);
        assert!(s.k2_match);
        assert!(s.composite >= 0.85);
    }

    #[test]
    fn terminal_match_lands_between_k2_and_k1() {
        // city / gravity: different nucleus, same final syllable chunk
        let s = score("S IH1 T IY0", "G R AE1 V AH0 T IY0", 5.3, 4.1);
        assert!(!s.k3_match && !s.k2_match);
        assert!(s.terminal_match);
        assert!(s.composite >= 0.60);
        assert!(s.composite < 0.85, "composite {}", s.composite);
    }

    #[test]
    fn unrelated_words_score_low() {
        let s = score("K AE1 T", "L UW1 N", 5.5, 4.0);
        assert!(!s.k1_match && !s.k2_match && !s.k3_match && !s.terminal_match);
        assert!(s.composite < 0.35, "composite {}", s.composite);
    }

    #[test]
    fn scoring_is_symmetric_on_the_hierarchical_part() {
        let ab = score("B AE1 T", "K AE1 T", 4.0, 4.0);
        let ba = score("K AE1 T", "B AE1 T", 4.0, 4.0);
        assert_eq!(ab.composite, ba.composite);
    }

    #[test]
    fn rarity_lifts_rare_pairs() {
        let common = score("K AH1 P AH0 L", "D AH1 B AH0 L", 6.5, 6.5);
        let rare = score("K AH1 P AH0 L", "D AH1 B AH0 L", 1.0, 1.0);
        assert!(rare.composite > common.composite);
    }

    #[test]
    fn degenerate_sequences_do_not_match() {
        let s = score("SH T", "SH T", 3.0, 3.0);
        assert!(!s.k1_match && !s.k2_match && !s.k3_match);
    }
}
