//! Multi-word phrase generation
//!
//! Combines single-word rhymes with small curated vocabularies to form
//! two-word phrases ("poor job", "spruce knob"). Vocabularies come from
//! the index by syllable/popularity band, topped up with fixed lists so a
//! thin dictionary still produces natural modifiers.

use crate::db::words::modifier_vocabulary;
use crate::types::Phrase;
use rimekit_common::Result;
use sqlx::SqlitePool;
use std::collections::HashSet;

/// Words that never make useful modifiers
const STOPWORDS: [&str; 13] = [
    "a", "an", "the", "of", "to", "and", "in", "on", "for", "by", "at", "with", "from",
];

const FIXED_ADJECTIVES: [&str; 30] = [
    "big", "small", "good", "bad", "new", "old", "hot", "cold", "fast", "slow", "high", "low",
    "long", "short", "bright", "dark", "loud", "quiet", "soft", "hard", "clean", "sweet", "rich",
    "poor", "young", "happy", "blue", "red", "green", "black",
];

const FIXED_NOUNS: [&str; 30] = [
    "man", "woman", "child", "friend", "home", "house", "car", "road", "street", "city", "town",
    "world", "sky", "sun", "moon", "star", "tree", "water", "fire", "wind", "rain", "snow",
    "stone", "bread", "money", "job", "work", "time", "day", "night",
];

const FIXED_VERBS: [&str; 20] = [
    "be", "have", "do", "say", "get", "make", "go", "know", "take", "see", "come", "think",
    "look", "want", "give", "find", "tell", "work", "feel", "keep",
];

const PREPOSITIONS: [&str; 10] = ["in", "on", "at", "by", "for", "with", "to", "from", "of", "about"];

const DETERMINERS: [&str; 11] = [
    "this", "that", "these", "those", "my", "your", "his", "her", "its", "our", "their",
];

/// Modifier+head pairs that read as word salad no matter how common the
/// parts are
const DENYLIST: [(&str, &str); 12] = [
    ("be", "able"),
    ("do", "able"),
    ("get", "able"),
    ("go", "able"),
    ("very", "able"),
    ("the", "able"),
    ("big", "trouble"),
    ("new", "trouble"),
    ("old", "trouble"),
    ("be", "trouble"),
    ("do", "trouble"),
    ("the", "trouble"),
];

/// Grammatical pattern of a generated phrase, ordered by how natural the
/// combination tends to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pattern {
    AdjectiveNoun,
    NounNoun,
    VerbNoun,
    PrepositionNoun,
    DeterminerNoun,
}

impl Pattern {
    fn base_score(self) -> f64 {
        match self {
            Pattern::AdjectiveNoun => 0.8,
            Pattern::NounNoun => 0.7,
            Pattern::VerbNoun => 0.6,
            Pattern::PrepositionNoun => 0.5,
            Pattern::DeterminerNoun => 0.4,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Pattern::AdjectiveNoun => "adj_noun",
            Pattern::NounNoun => "noun_noun",
            Pattern::VerbNoun => "verb_noun",
            Pattern::PrepositionNoun => "prep_noun",
            Pattern::DeterminerNoun => "det_noun",
        }
    }
}

/// A rhyming head word a phrase can be built around
#[derive(Debug, Clone)]
pub struct PhraseHead {
    pub word: String,
    pub syllables: i64,
}

/// Curated modifier vocabularies, loaded once at engine startup
pub struct PhraseGenerator {
    adjectives: Vec<String>,
    nouns: Vec<String>,
    verbs: Vec<String>,
}

impl PhraseGenerator {
    /// Load vocabularies from the index by syllable/popularity band,
    /// supplemented with the fixed lists
    pub async fn from_index(pool: &SqlitePool) -> Result<Self> {
        let band = modifier_vocabulary(pool, 2, 3.0, 7.0, 200).await?;

        let band_words: Vec<String> = band
            .iter()
            .map(|e| e.word.to_lowercase())
            .filter(|w| !STOPWORDS.contains(&w.as_str()))
            .collect();

        Ok(Self {
            adjectives: merge_vocab(&band_words, &FIXED_ADJECTIVES, 300),
            nouns: merge_vocab(&band_words, &FIXED_NOUNS, 300),
            verbs: merge_vocab(&band_words, &FIXED_VERBS, 300),
        })
    }

    /// Fixed-lists-only generator for setups without a usable modifier band
    pub fn with_fixed_vocabulary() -> Self {
        Self {
            adjectives: FIXED_ADJECTIVES.iter().map(|s| s.to_string()).collect(),
            nouns: FIXED_NOUNS.iter().map(|s| s.to_string()).collect(),
            verbs: FIXED_VERBS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Generate ranked phrases around the given rhyme heads.
    ///
    /// Output is deterministic: scored, then ordered descending with an
    /// alphabetical tie-break, truncated to `max_phrases`.
    pub fn generate(
        &self,
        target_word: &str,
        heads: &[PhraseHead],
        max_phrases: usize,
    ) -> Vec<Phrase> {
        let mut phrases: Vec<Phrase> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        let strategies: [(&[String], Pattern); 3] = [
            (&self.adjectives, Pattern::AdjectiveNoun),
            (&self.nouns, Pattern::NounNoun),
            (&self.verbs, Pattern::VerbNoun),
        ];

        for head in heads.iter().take(50) {
            for (vocab, pattern) in &strategies {
                for modifier in vocab.iter().take(100) {
                    self.push_phrase(
                        &mut phrases,
                        &mut seen,
                        target_word,
                        head,
                        modifier,
                        *pattern,
                    );
                }
            }
            for preposition in PREPOSITIONS {
                self.push_phrase(
                    &mut phrases,
                    &mut seen,
                    target_word,
                    head,
                    preposition,
                    Pattern::PrepositionNoun,
                );
            }
            for determiner in DETERMINERS {
                self.push_phrase(
                    &mut phrases,
                    &mut seen,
                    target_word,
                    head,
                    determiner,
                    Pattern::DeterminerNoun,
                );
            }
        }

        phrases.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.text.cmp(&b.text))
        });
        phrases.truncate(max_phrases);
        phrases
    }

    fn push_phrase(
        &self,
        phrases: &mut Vec<Phrase>,
        seen: &mut HashSet<String>,
        target_word: &str,
        head: &PhraseHead,
        modifier: &str,
        pattern: Pattern,
    ) {
        if modifier == head.word {
            return;
        }
        let text = format!("{} {}", modifier, head.word);
        if !seen.insert(text.clone()) {
            return;
        }

        let score = self.score_phrase(&text, target_word, head, modifier, pattern);

        phrases.push(Phrase {
            text,
            score,
            pattern: pattern.name().to_string(),
            base_word: head.word.clone(),
            // Modifier vocabulary is capped at two syllables
            syllables: head.syllables + 1,
        });
    }

    fn score_phrase(
        &self,
        text: &str,
        target_word: &str,
        head: &PhraseHead,
        modifier: &str,
        pattern: Pattern,
    ) -> f64 {
        let mut score = pattern.base_score();

        // Commonness bonus for well-known modifiers
        if self.adjectives.iter().take(50).any(|w| w == modifier)
            || self.nouns.iter().take(50).any(|w| w == modifier)
        {
            score += 0.1;
        } else if self.verbs.iter().take(50).any(|w| w == modifier) {
            score += 0.05;
        }

        // Alliteration with the search target
        let target_initial = target_word.chars().next().map(|c| c.to_ascii_lowercase());
        let head_initial = head.word.chars().next().map(|c| c.to_ascii_lowercase());
        if target_initial.is_some() && target_initial == head_initial {
            score += 0.2;
        }

        // Brevity: two-word phrases read most naturally
        score += 0.1;

        if is_unnatural(text, modifier, &head.word) {
            score *= 0.3;
        }

        score.clamp(0.0, 1.0)
    }
}

fn merge_vocab(band: &[String], fixed: &[&str], cap: usize) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut merged: Vec<String> = Vec::new();

    for word in fixed.iter().copied().chain(band.iter().map(|s| s.as_str())) {
        if seen.insert(word) {
            merged.push(word.to_string());
            if merged.len() >= cap {
                break;
            }
        }
    }

    merged
}

fn is_unnatural(text: &str, modifier: &str, head: &str) -> bool {
    // Single-letter fragments and anything non-alphabetic
    if text
        .split_whitespace()
        .any(|w| w.len() <= 1 || !w.chars().all(|c| c.is_ascii_alphabetic()))
    {
        return true;
    }

    DENYLIST.contains(&(modifier, head))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heads(words: &[&str]) -> Vec<PhraseHead> {
        words
            .iter()
            .map(|w| PhraseHead {
                word: w.to_string(),
                syllables: 1,
            })
            .collect()
    }

    #[test]
    fn generates_ranked_deduplicated_phrases() {
        let generator = PhraseGenerator::with_fixed_vocabulary();
        let phrases = generator.generate("snob", &heads(&["job", "knob"]), 40);

        assert!(!phrases.is_empty());
        assert!(phrases.len() <= 40);

        // Unique texts
        let texts: HashSet<&str> = phrases.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts.len(), phrases.len());

        // Ranked descending
        for pair in phrases.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn adjective_noun_outranks_determiner_noun() {
        let generator = PhraseGenerator::with_fixed_vocabulary();
        let phrases = generator.generate("log", &heads(&["dog"]), 500);

        let adj = phrases.iter().find(|p| p.text == "big dog").unwrap();
        let det = phrases.iter().find(|p| p.text == "my dog").unwrap();
        assert!(adj.score > det.score);
    }

    #[test]
    fn denylisted_combinations_are_penalized() {
        let generator = PhraseGenerator::with_fixed_vocabulary();
        let phrases = generator.generate("bubble", &heads(&["trouble"]), 2000);

        let denied = phrases.iter().find(|p| p.text == "big trouble").unwrap();
        let allowed = phrases.iter().find(|p| p.text == "hot trouble").unwrap();
        assert!(denied.score < allowed.score);
    }

    #[test]
    fn alliteration_with_target_scores_higher() {
        let generator = PhraseGenerator::with_fixed_vocabulary();
        // Target "jog" alliterates with head "job", not with "knob"
        let phrases = generator.generate("jog", &heads(&["job", "knob"]), 2000);

        let job = phrases.iter().find(|p| p.text == "my job").unwrap();
        let knob = phrases.iter().find(|p| p.text == "my knob").unwrap();
        assert!(job.score > knob.score);
    }

    #[test]
    fn output_is_deterministic() {
        let generator = PhraseGenerator::with_fixed_vocabulary();
        let a = generator.generate("snob", &heads(&["job", "knob"]), 30);
        let b = generator.generate("snob", &heads(&["job", "knob"]), 30);

        let texts_a: Vec<&str> = a.iter().map(|p| p.text.as_str()).collect();
        let texts_b: Vec<&str> = b.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts_a, texts_b);
    }

    #[test]
    fn empty_heads_yield_no_phrases() {
        let generator = PhraseGenerator::with_fixed_vocabulary();
        assert!(generator.generate("word", &[], 20).is_empty());
    }
}
