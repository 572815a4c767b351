//! Uncommonness filtering
//!
//! Re-ranks classified candidates by a combined popularity blend and keeps
//! only the uncommon-but-usable percentile band: the most clichéd matches
//! are dropped, the truly obscure ones are hidden but retained for
//! on-demand reveal, and per-tier minimums are backfilled from the hidden
//! pools rather than fabricated.

use crate::services::merger::ClassifiedCandidate;
use crate::types::Tier;
use rimekit_common::config::FilterConfig;

/// Zipf ceiling used to normalize popularity into [0, 1]
const ZIPF_SCALE: f64 = 8.0;

/// External frequency assumed for candidates without frequency data
const DEFAULT_EXTERNAL_ZIPF: f64 = 3.0;

/// Outcome of one filter pass. Hidden pools stay ordered
/// most-uncommon-first so reveal and backfill take the rarest words first.
#[derive(Debug, Default)]
pub struct FilterOutcome {
    pub kept: Vec<ClassifiedCandidate>,
    pub too_popular: Vec<ClassifiedCandidate>,
    pub too_obscure: Vec<ClassifiedCandidate>,
    pub backfilled: usize,
}

/// Combined popularity in [0, 1]; higher = more popular.
///
/// Blends the index zipf with the external frequency (converted to the
/// zipf scale so the two are commensurable). Perfect rhymes get a small
/// discount so they survive the popular cut.
pub fn combined_popularity(candidate: &ClassifiedCandidate, config: &FilterConfig) -> f64 {
    let zipf = match candidate.candidate.zipf {
        Some(z) => z,
        None => DEFAULT_EXTERNAL_ZIPF,
    };
    let zipf_norm = (zipf / ZIPF_SCALE).clamp(0.0, 1.0);

    let external_zipf = if candidate.candidate.external_frequency > 0.0 {
        candidate.candidate.external_frequency.log10() + 3.0
    } else {
        DEFAULT_EXTERNAL_ZIPF
    };
    let external_norm = (external_zipf / ZIPF_SCALE).clamp(0.0, 1.0);

    let mut combined = config.zipf_weight * zipf_norm + config.external_weight * external_norm;

    if candidate.candidate.score.composite >= 0.85 {
        combined -= config.perfect_boost;
    }

    combined.clamp(0.0, 1.0)
}

/// Apply the percentile band and minimum guarantees.
///
/// `band` is (lower, upper) in [0, 1] over candidates ranked
/// most-uncommon-first: below the lower percentile candidates are hidden
/// as too obscure, above the upper as too popular.
pub fn apply(
    mut candidates: Vec<ClassifiedCandidate>,
    band: (f64, f64),
    config: &FilterConfig,
) -> FilterOutcome {
    if candidates.is_empty() {
        return FilterOutcome::default();
    }

    // Most-uncommon-first, alphabetical tie-break for determinism
    candidates.sort_by(|a, b| {
        combined_popularity(a, config)
            .partial_cmp(&combined_popularity(b, config))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.candidate.word.cmp(&b.candidate.word))
    });

    let total = candidates.len();
    let lower_idx = ((total as f64) * band.0).floor() as usize;
    let upper_idx = (((total as f64) * band.1).floor() as usize).min(total);

    let popular_tail = candidates.split_off(upper_idx);
    let kept = candidates.split_off(lower_idx.min(candidates.len()));
    let obscure = candidates;

    tracing::debug!(
        total,
        kept = kept.len(),
        too_obscure = obscure.len(),
        too_popular = popular_tail.len(),
        "Uncommonness partition"
    );

    let mut outcome = FilterOutcome {
        kept,
        too_popular: popular_tail,
        too_obscure: obscure,
        backfilled: 0,
    };

    ensure_minimums(&mut outcome, config);
    outcome
}

/// Backfill per-tier and total minimums from the hidden pools,
/// most-uncommon-first, popular pool before obscure. Never fabricates:
/// when the pools run dry the guarantee simply is not met.
fn ensure_minimums(outcome: &mut FilterOutcome, config: &FilterConfig) {
    for tier in Tier::ALL {
        let minimum = match tier {
            Tier::Perfect => config.min_perfect,
            _ => config.min_per_tier,
        };

        let current = outcome.kept.iter().filter(|c| c.tier == tier).count();
        if current < minimum {
            let needed = minimum - current;
            let moved = take_from_pools(outcome, needed, Some(tier));
            outcome.backfilled += moved;
        }
    }

    if outcome.kept.len() < config.min_total {
        let needed = config.min_total - outcome.kept.len();
        let moved = take_from_pools(outcome, needed, None);
        outcome.backfilled += moved;
    }
}

fn take_from_pools(
    outcome: &mut FilterOutcome,
    needed: usize,
    tier: Option<Tier>,
) -> usize {
    let mut moved = 0;

    for pool in [&mut outcome.too_popular, &mut outcome.too_obscure] {
        while moved < needed {
            let pos = pool
                .iter()
                .position(|c| tier.map_or(true, |t| c.tier == t));
            match pos {
                Some(pos) => {
                    outcome.kept.push(pool.remove(pos));
                    moved += 1;
                }
                None => break,
            }
        }
        if moved >= needed {
            break;
        }
    }

    moved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phonetics::phoneme::Meter;
    use crate::scoring::RhymeScore;
    use crate::types::{Bucket, Candidate, Provenance};

    fn classified(word: &str, zipf: f64, composite: f64, tier: Tier) -> ClassifiedCandidate {
        ClassifiedCandidate {
            candidate: Candidate {
                word: word.to_string(),
                provenance: Provenance::Index,
                score: RhymeScore {
                    composite,
                    k3_match: composite >= 1.0,
                    k2_match: false,
                    terminal_match: false,
                    k1_match: true,
                    tail_consonance: 0.0,
                    family_rhyme: 0.0,
                    pararhyme: 0.0,
                    multisyllabic: 0.0,
                    upstream_assonance: 0.0,
                    rarity: 0.0,
                },
                zipf: Some(zipf),
                external_frequency: 0.0,
                syllables: 2,
                stress: "10".to_string(),
                meter: Meter::Trochee,
                pronunciation: String::new(),
                alliteration: false,
                matching_syllables: 0,
            },
            tier,
            bucket: Bucket::Technical,
        }
    }

    fn tight_config() -> FilterConfig {
        FilterConfig {
            min_perfect: 0,
            min_per_tier: 0,
            min_total: 0,
            ..Default::default()
        }
    }

    #[test]
    fn partitions_by_percentile_band() {
        // Ten candidates, popularity spread 0.5 .. 5.0
        let candidates: Vec<_> = (1..=10)
            .map(|i| classified(&format!("word{:02}", i), i as f64 * 0.5, 0.5, Tier::Assonance))
            .collect();

        let outcome = apply(candidates, (0.2, 0.7), &tight_config());

        assert_eq!(outcome.too_obscure.len(), 2);
        assert_eq!(outcome.kept.len(), 5);
        assert_eq!(outcome.too_popular.len(), 3);

        // The popular pool holds the most common words
        assert!(outcome
            .too_popular
            .iter()
            .any(|c| c.candidate.word == "word10"));
        // The obscure pool holds the rarest
        assert!(outcome
            .too_obscure
            .iter()
            .any(|c| c.candidate.word == "word01"));
    }

    #[test]
    fn perfect_boost_protects_perfect_rhymes() {
        let config = tight_config();
        let perfect = classified("perfect", 5.0, 1.0, Tier::Perfect);
        let plain = classified("plain", 5.0, 0.5, Tier::Assonance);

        assert!(combined_popularity(&perfect, &config) < combined_popularity(&plain, &config));
    }

    #[test]
    fn backfill_restores_tier_minimums() {
        let candidates = vec![
            classified("alpha", 6.0, 1.0, Tier::Perfect),
            classified("beta", 5.5, 1.0, Tier::Perfect),
            classified("gamma", 1.0, 0.5, Tier::Assonance),
        ];

        // Band that would keep nothing; perfect minimum pulls them back
        let config = FilterConfig {
            min_perfect: 2,
            min_per_tier: 0,
            min_total: 0,
            ..Default::default()
        };
        let outcome = apply(candidates, (0.0, 0.0), &config);

        let perfect_kept = outcome.kept.iter().filter(|c| c.tier == Tier::Perfect).count();
        assert_eq!(perfect_kept, 2);
        assert_eq!(outcome.backfilled, 2);
    }

    #[test]
    fn backfill_never_fabricates() {
        let candidates = vec![classified("only", 3.0, 1.0, Tier::Perfect)];

        let config = FilterConfig {
            min_perfect: 1000,
            min_per_tier: 0,
            min_total: 0,
            ..Default::default()
        };
        let outcome = apply(candidates, (0.0, 1.0), &config);

        // Requesting 1000 perfect rhymes yields exactly the one that exists
        let perfect_kept = outcome.kept.iter().filter(|c| c.tier == Tier::Perfect).count();
        assert_eq!(perfect_kept, 1);
        assert!(outcome.too_popular.is_empty());
        assert!(outcome.too_obscure.is_empty());
    }

    #[test]
    fn total_minimum_backfills_across_tiers() {
        let candidates: Vec<_> = (1..=6)
            .map(|i| classified(&format!("w{}", i), i as f64, 0.5, Tier::Assonance))
            .collect();

        let config = FilterConfig {
            min_perfect: 0,
            min_per_tier: 0,
            min_total: 5,
            ..Default::default()
        };
        // Keep only the middle third initially
        let outcome = apply(candidates, (0.33, 0.66), &config);

        assert!(outcome.kept.len() >= 5);
        assert!(outcome.backfilled > 0);
    }

    #[test]
    fn empty_input_yields_empty_outcome() {
        let outcome = apply(Vec::new(), (0.55, 0.75), &FilterConfig::default());
        assert!(outcome.kept.is_empty());
        assert_eq!(outcome.backfilled, 0);
    }

    #[test]
    fn missing_frequency_data_uses_defaults() {
        let config = tight_config();
        let mut candidate = classified("word", 0.0, 0.5, Tier::Assonance);
        candidate.candidate.zipf = None;
        let score = combined_popularity(&candidate, &config);
        // Both components fall back to the default external zipf of 3.0
        assert!((score - 3.0 / ZIPF_SCALE).abs() < 1e-9);
    }
}
