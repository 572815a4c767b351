//! Candidate merging and classification
//!
//! Unions index and external candidates, dedups by case-normalized word,
//! scores every survivor against the target, and assigns tier and
//! popularity bucket. Index retrieval relaxes K3 -> K2 -> K1, each stage
//! strictly additive, until the configured minimum is reached.

use crate::db::words::{candidates_by_key, lookup_entry, CandidateQuery, KeyLevel};
use crate::phonetics::phoneme::{parse_pronunciation, Meter, Phoneme};
use crate::phonetics::similarity::{alliterates, matching_tail_syllables};
use crate::scoring::score_sequences;
use crate::services::datamuse_client::{DatamuseClient, RawSuggestion};
use crate::types::{Bucket, Candidate, Provenance, SearchOptions, Tier};
use rimekit_common::config::SearchConfig;
use rimekit_common::db::DictionaryEntry;
use rimekit_common::{Error, Result};
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};

/// A candidate with its assigned tier and bucket
#[derive(Debug, Clone)]
pub struct ClassifiedCandidate {
    pub candidate: Candidate,
    pub tier: Tier,
    pub bucket: Bucket,
}

/// Everything the merge stage hands downstream
#[derive(Debug, Default)]
pub struct MergeOutcome {
    pub classified: Vec<ClassifiedCandidate>,
    /// Multi-word external suggestions, routed to the phrase category
    pub external_multiword: Vec<RawSuggestion>,
    pub index_count: usize,
    pub external_count: usize,
    pub merged_count: usize,
}

/// Gather candidates from the index and the external service, merge,
/// score, and classify them.
///
/// The index queries and the external fetch run concurrently; dropping the
/// returned future abandons both.
pub async fn gather_and_classify(
    pool: &SqlitePool,
    client: Option<&DatamuseClient>,
    target: &DictionaryEntry,
    options: &SearchOptions,
    config: &SearchConfig,
    zipf_max: f64,
) -> Result<MergeOutcome> {
    let index_future = gather_index_candidates(pool, target, options, config, zipf_max);
    let external_future = async {
        match client {
            Some(client) if options.use_external => client
                .fetch_comprehensive(&target.word, options.strict_external)
                .await
                .map_err(|e| Error::Service(e.to_string())),
            _ => Ok(Default::default()),
        }
    };

    let (index_entries, external) = tokio::join!(index_future, external_future);
    let index_entries = index_entries?;
    let external = match external {
        Ok(sets) => sets,
        Err(err) if options.strict_external => return Err(err),
        Err(err) => {
            tracing::warn!(error = %err, "External fetch failed, continuing index-only");
            Default::default()
        }
    };

    merge_and_classify(pool, target, index_entries, &external, options).await
}

/// Merge one index result list with one set of external suggestions, then
/// score and classify the survivors
pub async fn merge_and_classify(
    pool: &SqlitePool,
    target: &DictionaryEntry,
    index_entries: Vec<DictionaryEntry>,
    external: &crate::services::datamuse_client::ComprehensiveSuggestions,
    options: &SearchOptions,
) -> Result<MergeOutcome> {
    let target_phones = parse_pronunciation(&target.pron);
    let index_count = index_entries.len();
    let external_count = external.total_len();

    // Dedup by case-normalized word, first occurrence wins. Index entries
    // come first so their pronunciations anchor the scoring; an external
    // duplicate only contributes its frequency measure.
    let mut order: Vec<String> = Vec::new();
    let mut entries: HashMap<String, (Provenance, DictionaryEntry)> = HashMap::new();
    let mut external_freq: HashMap<String, f64> = HashMap::new();
    let mut external_multiword = Vec::new();

    let target_norm = target.word.to_lowercase();

    for entry in index_entries {
        let norm = entry.word.to_lowercase();
        if norm == target_norm || entries.contains_key(&norm) {
            continue;
        }
        order.push(norm.clone());
        entries.insert(norm, (Provenance::Index, entry));
    }

    for suggestion in external.iter_all() {
        let norm = suggestion.word.to_lowercase();
        if norm == target_norm {
            continue;
        }
        if suggestion.is_multiword {
            external_multiword.push(suggestion.clone());
            continue;
        }

        if entries.contains_key(&norm) {
            // Already present from the index: keep its frequency signal
            external_freq.entry(norm).or_insert(suggestion.frequency);
            continue;
        }

        // Resolve the pronunciation through the index; candidates the
        // dictionary cannot pronounce are unscoreable and dropped
        match lookup_entry(pool, &suggestion.word).await? {
            Some(entry) => {
                order.push(norm.clone());
                external_freq.insert(norm.clone(), suggestion.frequency);
                entries.insert(norm, (Provenance::External, entry));
            }
            None => {
                tracing::debug!(word = %suggestion.word, "Dropping unscoreable external candidate");
            }
        }
    }

    let merged_count = order.len();

    // Score and classify the survivors
    let mut classified = Vec::with_capacity(order.len());

    for norm in order {
        let (provenance, entry) = &entries[&norm];
        let cand_phones = parse_pronunciation(&entry.pron);

        let score = score_sequences(
            &target_phones,
            &cand_phones,
            target.zipf_or_default(),
            entry.zipf_or_default(),
        );

        let Some(tier) = Tier::classify(score.composite) else {
            continue;
        };

        let bucket = if entry.zipf_or_default() >= options.popularity_threshold {
            Bucket::Popular
        } else {
            Bucket::Technical
        };

        let candidate = build_candidate(
            entry,
            *provenance,
            score,
            external_freq.get(&norm).copied().unwrap_or(0.0),
            &target_phones,
            &cand_phones,
        );

        classified.push(ClassifiedCandidate {
            candidate,
            tier,
            bucket,
        });
    }

    tracing::debug!(
        target = %target.word,
        index = index_count,
        external = external_count,
        merged = merged_count,
        classified = classified.len(),
        "Merge and classification complete"
    );

    Ok(MergeOutcome {
        classified,
        external_multiword,
        index_count,
        external_count,
        merged_count,
    })
}

/// Query the index at K3, relaxing additively to K2 and K1 while the
/// candidate count stays below the configured minimum
async fn gather_index_candidates(
    pool: &SqlitePool,
    target: &DictionaryEntry,
    options: &SearchOptions,
    config: &SearchConfig,
    zipf_max: f64,
) -> Result<Vec<DictionaryEntry>> {
    let stages = [
        (KeyLevel::K3, target.k3.as_str()),
        (KeyLevel::K2, target.k2.as_str()),
        (KeyLevel::K1, target.k1.as_str()),
    ];

    let mut gathered: Vec<DictionaryEntry> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (i, (level, value)) in stages.iter().enumerate() {
        if i > 0 && gathered.len() >= config.min_index_candidates {
            break;
        }
        if value.is_empty() {
            continue;
        }

        let mut query = CandidateQuery::new(*level, value, &target.word, config.index_query_limit);
        query.zipf_max = Some(zipf_max);
        query.syllables = options.syllable_filter;
        query.stress = options.stress_filter.as_deref();

        let rows = candidates_by_key(pool, &query).await?;
        let stage_total = rows.len();

        for row in rows {
            if seen.insert(row.word.to_lowercase()) {
                gathered.push(row);
            }
        }

        tracing::debug!(
            level = ?level,
            fetched = stage_total,
            gathered = gathered.len(),
            "Index candidate stage"
        );
    }

    Ok(gathered)
}

fn build_candidate(
    entry: &DictionaryEntry,
    provenance: Provenance,
    score: crate::scoring::RhymeScore,
    external_frequency: f64,
    target_phones: &[Phoneme],
    cand_phones: &[Phoneme],
) -> Candidate {
    let stress = entry.stress_or_default().to_string();
    Candidate {
        word: entry.word.to_lowercase(),
        provenance,
        meter: Meter::from_stress_pattern(&stress),
        zipf: entry.zipf,
        external_frequency,
        syllables: entry.syls,
        stress,
        pronunciation: entry.pron.clone(),
        alliteration: alliterates(target_phones, cand_phones),
        matching_syllables: matching_tail_syllables(target_phones, cand_phones),
        score,
    }
}
