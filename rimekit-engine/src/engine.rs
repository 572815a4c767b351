//! The consumer-facing rhyme engine
//!
//! One `RhymeEngine` is constructed at startup with its dependencies
//! injected — dictionary pool, optional suggestion client, configuration —
//! and shared across requests. Searches hold no state of their own, so an
//! in-flight search is abandoned by simply dropping its future.

use crate::db::words::lookup_entry;
use crate::phonetics::keys::{compute_keys, RhymeKeys};
use crate::phonetics::phoneme::parse_pronunciation;
use crate::scoring::{score_sequences, RhymeScore};
use crate::services::datamuse_client::DatamuseClient;
use crate::services::merger::{gather_and_classify, ClassifiedCandidate, MergeOutcome};
use crate::services::phrase_generator::{PhraseGenerator, PhraseHead};
use crate::services::uncommon_filter;
use crate::types::{Phrase, ResultSet, SearchOptions, Tier};
use crate::validation::validate_word;
use rimekit_common::config::{FilterConfig, SearchConfig};
use rimekit_common::db::DictionaryEntry;
use rimekit_common::{Error, Result};
use sqlx::SqlitePool;
use std::time::Instant;
use tracing::{debug, info};

/// Long-lived rhyme search engine
pub struct RhymeEngine {
    pool: SqlitePool,
    client: Option<DatamuseClient>,
    search_config: SearchConfig,
    filter_config: FilterConfig,
    phrase_generator: PhraseGenerator,
}

impl RhymeEngine {
    /// Build the engine. Loads the phrase-generator vocabularies from the
    /// index, so the dictionary must already be open and verified.
    pub async fn new(
        pool: SqlitePool,
        client: Option<DatamuseClient>,
        search_config: SearchConfig,
        filter_config: FilterConfig,
    ) -> Result<Self> {
        let phrase_generator = PhraseGenerator::from_index(&pool).await?;

        Ok(Self {
            pool,
            client,
            search_config,
            filter_config,
            phrase_generator,
        })
    }

    /// Search for rhymes of `word`.
    ///
    /// An unknown word is not an error: the result is an explicit empty
    /// set with zeroed summary metadata so callers can render "no rhymes
    /// found". A search that finds nothing inside the configured zipf band
    /// retries once with the band widened before giving up.
    pub async fn search(&self, word: &str, options: &SearchOptions) -> Result<ResultSet> {
        let started = Instant::now();
        let word = validate_word(word)?;
        let options = options.clamped();

        let Some(target) = lookup_entry(&self.pool, &word).await? else {
            info!(word = %word, "Word not in dictionary, returning empty result set");
            return Ok(ResultSet::default());
        };

        let mut outcome = self
            .gather(&target, &options, self.search_config.zipf_max)
            .await?;
        let mut relaxed = false;

        if outcome.classified.is_empty() && outcome.external_multiword.is_empty() {
            debug!(word = %word, "No candidates in band, retrying with relaxed zipf ceiling");
            outcome = self
                .gather(&target, &options, self.search_config.zipf_max_relaxed)
                .await?;
            relaxed = true;
        }

        let mut results = self.assemble(&target, outcome, &options);
        results.summary.relaxed = relaxed;
        results.summary.elapsed_ms = started.elapsed().as_millis() as u64;

        info!(
            word = %word,
            perfect = results.perfect.len(),
            near_perfect = results.near_perfect.len(),
            assonance = results.assonance.len(),
            phrases = results.phrases.len(),
            relaxed,
            elapsed_ms = results.summary.elapsed_ms,
            "Search complete"
        );

        Ok(results)
    }

    /// Diagnostic: score two dictionary words against each other
    pub async fn score_words(&self, word_a: &str, word_b: &str) -> Result<RhymeScore> {
        let word_a = validate_word(word_a)?;
        let word_b = validate_word(word_b)?;

        let entry_a = lookup_entry(&self.pool, &word_a)
            .await?
            .ok_or_else(|| Error::NotFound(format!("word '{}' not in dictionary", word_a)))?;
        let entry_b = lookup_entry(&self.pool, &word_b)
            .await?
            .ok_or_else(|| Error::NotFound(format!("word '{}' not in dictionary", word_b)))?;

        let phones_a = parse_pronunciation(&entry_a.pron);
        let phones_b = parse_pronunciation(&entry_b.pron);

        Ok(score_sequences(
            &phones_a,
            &phones_b,
            entry_a.zipf_or_default(),
            entry_b.zipf_or_default(),
        ))
    }

    /// Diagnostic: derive the hierarchical keys of a raw pronunciation
    pub fn compute_keys(&self, pronunciation: &str) -> RhymeKeys {
        compute_keys(&parse_pronunciation(pronunciation))
    }

    async fn gather(
        &self,
        target: &DictionaryEntry,
        options: &SearchOptions,
        zipf_max: f64,
    ) -> Result<MergeOutcome> {
        gather_and_classify(
            &self.pool,
            self.client.as_ref(),
            target,
            options,
            &self.search_config,
            zipf_max,
        )
        .await
    }

    /// Run the uncommonness filter, build the phrase category, and arrange
    /// everything into the tiered result set
    fn assemble(
        &self,
        target: &DictionaryEntry,
        outcome: MergeOutcome,
        options: &SearchOptions,
    ) -> ResultSet {
        let mut band = (
            options
                .rarity_band_lower
                .unwrap_or(self.filter_config.band_lower),
            options
                .rarity_band_upper
                .unwrap_or(self.filter_config.band_upper),
        );
        // A lone lower override can invert the band against the configured
        // upper bound; collapse it rather than panic downstream
        if band.0 > band.1 {
            band.1 = band.0;
        }

        let scored = outcome.classified.len();
        let filtered = uncommon_filter::apply(outcome.classified, band, &self.filter_config);

        let mut results = ResultSet::default();
        results.summary.index_candidates = outcome.index_count;
        results.summary.external_candidates = outcome.external_count;
        results.summary.merged = outcome.merged_count;
        results.summary.scored = scored;
        results.summary.dropped_too_popular = filtered.too_popular.len();
        results.summary.dropped_too_obscure = filtered.too_obscure.len();
        results.summary.backfilled = filtered.backfilled;

        if options.include_multiword {
            results.phrases = self.build_phrases(target, &filtered.kept, &outcome.external_multiword, options);
        }

        for item in filtered.kept {
            results
                .tier_mut(item.tier)
                .bucket_mut(item.bucket)
                .push(item.candidate);
        }

        for tier in Tier::ALL {
            let buckets = results.tier_mut(tier);
            for bucket in [&mut buckets.popular, &mut buckets.technical] {
                bucket.sort_by(|a, b| {
                    b.zipf_or_default()
                        .partial_cmp(&a.zipf_or_default())
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then_with(|| a.word.cmp(&b.word))
                });
                bucket.truncate(options.max_items_per_category);
            }
        }

        results.hidden.too_popular = filtered
            .too_popular
            .into_iter()
            .map(|c| c.candidate)
            .collect();
        results.hidden.too_obscure = filtered
            .too_obscure
            .into_iter()
            .map(|c| c.candidate)
            .collect();

        results
    }

    /// Generated phrases plus multi-word suggestions from the external
    /// service, one ranked list
    fn build_phrases(
        &self,
        target: &DictionaryEntry,
        kept: &[ClassifiedCandidate],
        external_multiword: &[crate::services::datamuse_client::RawSuggestion],
        options: &SearchOptions,
    ) -> Vec<Phrase> {
        let heads: Vec<PhraseHead> = kept
            .iter()
            .filter(|c| matches!(c.tier, Tier::Perfect | Tier::NearPerfect))
            .map(|c| PhraseHead {
                word: c.candidate.word.clone(),
                syllables: c.candidate.syllables,
            })
            .collect();

        let mut phrases =
            self.phrase_generator
                .generate(&target.word, &heads, options.max_items_per_category);

        let mut seen: std::collections::HashSet<String> =
            phrases.iter().map(|p| p.text.to_lowercase()).collect();

        for suggestion in external_multiword {
            let text = suggestion.word.to_lowercase();
            if !seen.insert(text.clone()) {
                continue;
            }
            phrases.push(Phrase {
                text,
                // External phrases arrive pre-vetted by the service
                score: 0.8,
                pattern: "external".to_string(),
                base_word: suggestion.word.clone(),
                syllables: suggestion.word.split_whitespace().count() as i64,
            });
        }

        phrases.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.text.cmp(&b.text))
        });
        phrases.truncate(options.max_items_per_category);
        phrases
    }
}
