//! Extended similarity functions
//!
//! Pure, side-effect-free comparisons feeding the weighted scorer. Each
//! returns a float in a documented sub-range; none of them consult the
//! dictionary or any other shared state.

use super::features::{consonants_equivalent, phoneme_distance, vowel_distance};
use super::keys::locate_nucleus;
use super::phoneme::Phoneme;

/// Vowel bases occurring strictly before the nucleus
fn upstream_vowels(seq: &[Phoneme]) -> Vec<&str> {
    match locate_nucleus(seq) {
        Some(idx) => seq[..idx]
            .iter()
            .filter(|p| p.is_vowel())
            .map(|p| p.base())
            .collect(),
        None => Vec::new(),
    }
}

/// Consonants strictly after the nucleus
fn coda_consonants(seq: &[Phoneme]) -> Vec<&str> {
    match locate_nucleus(seq) {
        Some(idx) => seq[idx + 1..]
            .iter()
            .filter(|p| p.is_consonant())
            .map(|p| p.base())
            .collect(),
        None => Vec::new(),
    }
}

/// Consonants strictly before the nucleus
fn onset_consonants(seq: &[Phoneme]) -> Vec<&str> {
    match locate_nucleus(seq) {
        Some(idx) => seq[..idx]
            .iter()
            .filter(|p| p.is_consonant())
            .map(|p| p.base())
            .collect(),
        None => Vec::new(),
    }
}

/// Shared vowel color before the rhyme nucleus.
///
/// Range: 0, or [0.10, 0.25] when both words have pre-nucleus vowels.
pub fn upstream_assonance(a: &[Phoneme], b: &[Phoneme]) -> f64 {
    let ua = upstream_vowels(a);
    let ub = upstream_vowels(b);

    if ua.is_empty() || ub.is_empty() {
        return 0.0;
    }

    let shorter = ua.len().min(ub.len());
    let overlap = ua
        .iter()
        .filter(|v| ub.contains(v))
        .collect::<std::collections::HashSet<_>>()
        .len();

    0.10 + 0.15 * (overlap as f64 / shorter as f64)
}

/// Exact consonant agreement at the tail of the coda.
///
/// Scans coda consonants from the end and counts the contiguous
/// exact-match run before the first mismatch. Range: [0, 1.2] (identical
/// non-empty codas can earn the full ratio plus the run bonus).
pub fn tail_consonance(a: &[Phoneme], b: &[Phoneme]) -> f64 {
    let ca = coda_consonants(a);
    let cb = coda_consonants(b);

    if ca.is_empty() && cb.is_empty() {
        return 1.0;
    }
    if ca.is_empty() || cb.is_empty() {
        return 0.0;
    }

    let mut matches = 0usize;
    for (x, y) in ca.iter().rev().zip(cb.iter().rev()) {
        if x == y {
            matches += 1;
        } else {
            break;
        }
    }

    let max_len = ca.len().max(cb.len());
    let overlap_ratio = matches as f64 / max_len as f64;
    overlap_ratio + (0.05 * matches as f64).min(0.2)
}

/// Consonant-family agreement at the tail of the coda.
///
/// Like tail consonance but with family equivalence (voicing-free same
/// place+manner, or coronal-class place with the same manner). Only the
/// equivalent-but-not-identical pairs score here — exact matches are
/// already rewarded by tail consonance. Range: [0, 1.0] in 0.1 steps.
pub fn family_rhyme(a: &[Phoneme], b: &[Phoneme]) -> f64 {
    let ca = coda_consonants(a);
    let cb = coda_consonants(b);

    let mut near_matches = 0usize;
    for (x, y) in ca.iter().rev().zip(cb.iter().rev()) {
        if x == y {
            continue;
        }
        if consonants_equivalent(x, y) {
            near_matches += 1;
        } else {
            break;
        }
    }

    (0.1 * near_matches as f64).min(1.0)
}

/// Pararhyme: identical consonant frame around differing nucleus vowels.
///
/// Fires only when the onset consonants and coda consonants both match
/// exactly while the nucleus vowels differ. Range: 0, or (0.5, 0.8].
pub fn pararhyme(a: &[Phoneme], b: &[Phoneme]) -> f64 {
    let (Some(na), Some(nb)) = (locate_nucleus(a), locate_nucleus(b)) else {
        return 0.0;
    };

    let va = a[na].base();
    let vb = b[nb].base();
    if va == vb {
        return 0.0;
    }

    if onset_consonants(a) != onset_consonants(b) || coda_consonants(a) != coda_consonants(b) {
        return 0.0;
    }

    0.8 - 0.3 * vowel_distance(va, vb)
}

/// Syllable chunks: each vowel plus the consonants up to the next vowel.
/// Word-initial onset consonants belong to no chunk.
fn syllable_chunks(seq: &[Phoneme]) -> Vec<&[Phoneme]> {
    let vowel_positions: Vec<usize> = seq
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_vowel())
        .map(|(i, _)| i)
        .collect();

    vowel_positions
        .iter()
        .enumerate()
        .map(|(k, &start)| {
            let end = vowel_positions.get(k + 1).copied().unwrap_or(seq.len());
            &seq[start..end]
        })
        .collect()
}

fn chunks_match_stress_agnostic(a: &[Phoneme], b: &[Phoneme]) -> bool {
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.base() == y.base())
}

/// Sustained multi-syllable agreement.
///
/// Finds the longest run of consecutive syllables matching at the
/// stress-agnostic level across all start-offset pairs; runs shorter than
/// two syllables score 0. The stress bonus credits aligned syllables whose
/// stress digits also agree. Range: {0} ∪ (0, 1].
pub fn multisyllabic_continuity(a: &[Phoneme], b: &[Phoneme]) -> f64 {
    let sa = syllable_chunks(a);
    let sb = syllable_chunks(b);

    let mut best_len = 0usize;
    let mut best_stress_matches = 0usize;

    for i in 0..sa.len() {
        for j in 0..sb.len() {
            let mut len = 0usize;
            let mut stress_matches = 0usize;
            while i + len < sa.len()
                && j + len < sb.len()
                && chunks_match_stress_agnostic(sa[i + len], sb[j + len])
            {
                if sa[i + len][0].stress() == sb[j + len][0].stress() {
                    stress_matches += 1;
                }
                len += 1;
            }
            if len > best_len || (len == best_len && stress_matches > best_stress_matches) {
                best_len = len;
                best_stress_matches = stress_matches;
            }
        }
    }

    if best_len < 2 {
        return 0.0;
    }

    let n = best_len as f64;
    let stress_bonus = 0.1 * best_stress_matches as f64;
    let score = (n + stress_bonus) / n + (0.1 * (n - 2.0)).min(0.3);
    score.clamp(0.0, 1.0)
}

/// Piecewise-linear map from zipf popularity to a rarity index in [0, 1].
///
/// Bands: zipf >= 7 -> [0.0, 0.2]; [4, 7) -> [0.2, 0.5]; [2, 4) ->
/// [0.5, 0.8]; below 2 -> [0.8, 1.0]. Higher zipf means more common,
/// so rarer words index higher.
pub fn rarity_index(zipf: f64) -> f64 {
    if zipf >= 7.0 {
        0.2 * (8.0 - zipf.min(8.0))
    } else if zipf >= 4.0 {
        0.2 + 0.3 * (7.0 - zipf) / 3.0
    } else if zipf >= 2.0 {
        0.5 + 0.3 * (4.0 - zipf) / 2.0
    } else {
        0.8 + 0.2 * (2.0 - zipf.max(0.0)) / 2.0
    }
}

/// Normalized phonetic edit distance in [0, 1].
///
/// Levenshtein-style alignment with substitution cost from the feature
/// tables (vowel embedding, weighted consonant features, 1.0 across
/// classes), insert/delete cost 1.0, normalized by the longer length.
pub fn phonetic_edit_distance(a: &[Phoneme], b: &[Phoneme]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    if a.is_empty() || b.is_empty() {
        return 1.0;
    }

    let (n, m) = (a.len(), b.len());
    let mut prev: Vec<f64> = (0..=m).map(|j| j as f64).collect();
    let mut curr = vec![0.0f64; m + 1];

    for i in 1..=n {
        curr[0] = i as f64;
        for j in 1..=m {
            let substitute = prev[j - 1] + phoneme_distance(&a[i - 1], &b[j - 1]);
            let delete = prev[j] + 1.0;
            let insert = curr[j - 1] + 1.0;
            curr[j] = substitute.min(delete).min(insert);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[m] / n.max(m) as f64
}

/// First-consonant agreement at the very start of the word. Metadata flag,
/// not a score component.
pub fn alliterates(a: &[Phoneme], b: &[Phoneme]) -> bool {
    match (a.first(), b.first()) {
        (Some(Phoneme::Consonant(x)), Some(Phoneme::Consonant(y))) => x == y,
        _ => false,
    }
}

/// Number of matching syllable vowels counted from the end, stress-agnostic
pub fn matching_tail_syllables(a: &[Phoneme], b: &[Phoneme]) -> usize {
    let va: Vec<&str> = a.iter().filter(|p| p.is_vowel()).map(|p| p.base()).collect();
    let vb: Vec<&str> = b.iter().filter(|p| p.is_vowel()).map(|p| p.base()).collect();

    va.iter()
        .rev()
        .zip(vb.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}
