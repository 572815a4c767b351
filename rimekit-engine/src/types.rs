//! Result model and search options
//!
//! Tagged-union result structures: tiers and popularity buckets are enums
//! matched exhaustively, so a candidate can only ever live in one place in
//! a result set.

use crate::phonetics::phoneme::Meter;
use crate::scoring::RhymeScore;
use serde::Serialize;

/// Where a candidate came from. Diagnostic only — provenance never affects
/// scoring or placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Index,
    External,
}

/// Rhyme-strength tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Perfect,
    NearPerfect,
    Assonance,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Perfect, Tier::NearPerfect, Tier::Assonance];

    /// Classify a composite score; `None` below the assonance floor
    pub fn classify(composite: f64) -> Option<Tier> {
        if composite >= 0.85 {
            Some(Tier::Perfect)
        } else if composite >= 0.60 {
            Some(Tier::NearPerfect)
        } else if composite >= 0.35 {
            Some(Tier::Assonance)
        } else {
            None
        }
    }
}

/// Popularity bucket within a tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Popular,
    Technical,
}

/// A scored candidate match. Ephemeral: built per request, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub word: String,
    pub provenance: Provenance,
    pub score: RhymeScore,
    /// Index popularity (zipf); `None` for entries the dictionary lacks
    /// frequency data for
    pub zipf: Option<f64>,
    /// External-service frequency (occurrences per million); 0 when the
    /// candidate only came from the index
    pub external_frequency: f64,
    pub syllables: i64,
    pub stress: String,
    pub meter: Meter,
    pub pronunciation: String,
    pub alliteration: bool,
    pub matching_syllables: usize,
}

impl Candidate {
    pub fn zipf_or_default(&self) -> f64 {
        self.zipf.unwrap_or(0.0)
    }
}

/// The two popularity buckets of one tier, each ordered by popularity
/// descending (ties broken alphabetically)
#[derive(Debug, Clone, Default, Serialize)]
pub struct TierBuckets {
    pub popular: Vec<Candidate>,
    pub technical: Vec<Candidate>,
}

impl TierBuckets {
    pub fn len(&self) -> usize {
        self.popular.len() + self.technical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.popular.is_empty() && self.technical.is_empty()
    }

    pub fn bucket_mut(&mut self, bucket: Bucket) -> &mut Vec<Candidate> {
        match bucket {
            Bucket::Popular => &mut self.popular,
            Bucket::Technical => &mut self.technical,
        }
    }
}

/// A generated multi-word phrase
#[derive(Debug, Clone, Serialize)]
pub struct Phrase {
    pub text: String,
    pub score: f64,
    pub pattern: String,
    /// The rhyming head word the phrase was built around
    pub base_word: String,
    pub syllables: i64,
}

/// Summary metadata for one search
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchSummary {
    pub index_candidates: usize,
    pub external_candidates: usize,
    pub merged: usize,
    pub scored: usize,
    pub dropped_too_popular: usize,
    pub dropped_too_obscure: usize,
    pub backfilled: usize,
    /// Set when the relaxed zipf-band fallback pass produced the results
    pub relaxed: bool,
    pub elapsed_ms: u64,
}

/// Candidates hidden by the uncommonness filter, retained for on-demand
/// reveal. Ordered most-uncommon-first.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HiddenPools {
    pub too_popular: Vec<Candidate>,
    pub too_obscure: Vec<Candidate>,
}

/// One search's grouped, classified results. Ephemeral: discarded after
/// being returned to the caller. A case-normalized word appears in at most
/// one tier/bucket.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultSet {
    pub perfect: TierBuckets,
    pub near_perfect: TierBuckets,
    pub assonance: TierBuckets,
    pub phrases: Vec<Phrase>,
    pub hidden: HiddenPools,
    pub summary: SearchSummary,
}

impl ResultSet {
    pub fn tier(&self, tier: Tier) -> &TierBuckets {
        match tier {
            Tier::Perfect => &self.perfect,
            Tier::NearPerfect => &self.near_perfect,
            Tier::Assonance => &self.assonance,
        }
    }

    pub fn tier_mut(&mut self, tier: Tier) -> &mut TierBuckets {
        match tier {
            Tier::Perfect => &mut self.perfect,
            Tier::NearPerfect => &mut self.near_perfect,
            Tier::Assonance => &mut self.assonance,
        }
    }

    /// Total single-word candidates across all tiers
    pub fn total_candidates(&self) -> usize {
        Tier::ALL.iter().map(|t| self.tier(*t).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_candidates() == 0 && self.phrases.is_empty()
    }
}

/// Syllable-count filter for index candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SyllableFilter {
    #[default]
    Any,
    Exactly(u8),
    FiveOrMore,
}

/// Caller-supplied search options. Numeric fields are clamped to their
/// documented ranges rather than rejected; see [`SearchOptions::clamped`].
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Maximum candidates per tier/bucket (clamped to 1..=200)
    pub max_items_per_category: usize,
    /// Generate the multi-word phrase category
    pub include_multiword: bool,
    /// Zipf threshold separating popular from technical (clamped to 0..=8)
    pub popularity_threshold: f64,
    /// Lower percentile of the kept rarity band; `None` uses the configured
    /// default
    pub rarity_band_lower: Option<f64>,
    /// Upper percentile of the kept rarity band; `None` uses the configured
    /// default
    pub rarity_band_upper: Option<f64>,
    /// Query the external suggestion service
    pub use_external: bool,
    /// Surface external-service exhaustion as an error instead of
    /// degrading to index-only results
    pub strict_external: bool,
    /// Restrict index candidates by syllable count
    pub syllable_filter: SyllableFilter,
    /// Restrict index candidates to an exact stress pattern (e.g. "10")
    pub stress_filter: Option<String>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_items_per_category: 20,
            include_multiword: true,
            popularity_threshold: 2.0,
            rarity_band_lower: None,
            rarity_band_upper: None,
            use_external: true,
            strict_external: false,
            syllable_filter: SyllableFilter::Any,
            stress_filter: None,
        }
    }
}

impl SearchOptions {
    /// Clamp numeric options to their documented ranges. Out-of-range
    /// values are pulled to the nearest bound, not rejected.
    pub fn clamped(&self) -> Self {
        let mut opts = self.clone();
        opts.max_items_per_category = opts.max_items_per_category.clamp(1, 200);
        opts.popularity_threshold = opts.popularity_threshold.clamp(0.0, 8.0);
        opts.rarity_band_lower = opts.rarity_band_lower.map(|v| v.clamp(0.0, 1.0));
        opts.rarity_band_upper = opts.rarity_band_upper.map(|v| v.clamp(0.0, 1.0));
        if let (Some(lower), Some(upper)) = (opts.rarity_band_lower, opts.rarity_band_upper) {
            if lower > upper {
                opts.rarity_band_upper = Some(lower);
            }
        }
        opts
    }
}
