//! Hierarchical rhyme key extraction
//!
//! Every pronunciation maps to three keys anchored at the rhyme nucleus:
//!
//! - `k1` — the stress-stripped nucleus vowel ("AH")
//! - `k2` — nucleus vowel plus coda, stress-agnostic at the nucleus
//!   ("AH|B AH0 L")
//! - `k3` — same, with the nucleus stress digit preserved ("AH1|B AH0 L")
//!
//! Equal `k2` always implies equal `k1`; `k2` may match while `k3` differs
//! when only the nucleus stress disagrees.

use super::phoneme::{join_phonemes, Phoneme};
use serde::Serialize;

/// The three hierarchical rhyme keys of a pronunciation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RhymeKeys {
    pub k1: String,
    pub k2: String,
    pub k3: String,
}

/// Locate the rhyme nucleus.
///
/// The nucleus is the vowel carrying primary stress; when several vowels
/// carry digit 1 (ambiguous input) the first one wins, which favors the
/// earlier syllable of compound-like words. With no primary stress the last
/// vowel is used. `None` when the sequence has no vowels.
pub fn locate_nucleus(seq: &[Phoneme]) -> Option<usize> {
    let mut first_primary = None;
    let mut last_vowel = None;

    for (i, p) in seq.iter().enumerate() {
        if p.is_vowel() {
            last_vowel = Some(i);
            if first_primary.is_none() && p.has_primary_stress() {
                first_primary = Some(i);
            }
        }
    }

    first_primary.or(last_vowel)
}

/// The stress-stripped nucleus vowel and the phonemes strictly after it
pub fn rhyme_tail(seq: &[Phoneme]) -> Option<(&str, &[Phoneme])> {
    let idx = locate_nucleus(seq)?;
    Some((seq[idx].base(), &seq[idx + 1..]))
}

/// Compute K1/K2/K3 for a phoneme sequence.
///
/// Degenerate case: a sequence without vowels has no nucleus, and all three
/// keys collapse to the empty string.
pub fn compute_keys(seq: &[Phoneme]) -> RhymeKeys {
    let Some(idx) = locate_nucleus(seq) else {
        return RhymeKeys::default();
    };

    let nucleus = &seq[idx];
    let coda = join_phonemes(&seq[idx + 1..]);

    let k1 = nucleus.base().to_string();
    let k2 = format!("{}|{}", k1, coda);
    let k3 = format!("{}|{}", nucleus, coda);

    RhymeKeys { k1, k2, k3 }
}

/// The final syllable chunk, stress-stripped: the consonants after the last
/// non-final vowel, the final vowel, and its coda. Used for the terminal
/// ("perfect by ear on the last syllable") comparison; including the onset
/// consonants keeps pairs like couple/double out of the terminal band.
pub fn terminal_chunk(seq: &[Phoneme]) -> Option<String> {
    let last_vowel = seq.iter().rposition(|p| p.is_vowel())?;

    // Walk back over the consonant onset of the final syllable
    let mut start = last_vowel;
    while start > 0 && seq[start - 1].is_consonant() {
        start -= 1;
    }

    let chunk: Vec<&str> = seq[start..].iter().map(|p| p.base()).collect();
    Some(chunk.join(" "))
}
