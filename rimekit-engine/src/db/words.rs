//! Word table queries
//!
//! All access to the read-only `words` table. Queries exclude
//! apostrophe-bearing garbage entries left over from dictionary builds and
//! order deterministically by popularity descending with an alphabetical
//! tie-break.

use crate::types::SyllableFilter;
use rimekit_common::db::DictionaryEntry;
use rimekit_common::Result;
use sqlx::SqlitePool;

const ENTRY_COLUMNS: &str = "word, pron, k1, k2, k3, syls, stress, zipf";

/// Which precomputed rhyme key column a candidate query matches against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyLevel {
    K1,
    K2,
    K3,
}

impl KeyLevel {
    fn column(self) -> &'static str {
        match self {
            KeyLevel::K1 => "k1",
            KeyLevel::K2 => "k2",
            KeyLevel::K3 => "k3",
        }
    }
}

/// Case-insensitive exact lookup. Absence is not an error.
pub async fn lookup_entry(pool: &SqlitePool, word: &str) -> Result<Option<DictionaryEntry>> {
    let sql = format!(
        "SELECT {} FROM words WHERE word = ? COLLATE NOCASE LIMIT 1",
        ENTRY_COLUMNS
    );
    let entry = sqlx::query_as::<_, DictionaryEntry>(&sql)
        .bind(word.trim().to_lowercase())
        .fetch_optional(pool)
        .await?;
    Ok(entry)
}

/// Parameters for one key-level candidate query
#[derive(Debug, Clone)]
pub struct CandidateQuery<'a> {
    pub level: KeyLevel,
    pub value: &'a str,
    /// The query word itself, excluded case-insensitively
    pub exclude_word: &'a str,
    pub limit: i64,
    /// Popularity ceiling; filters out ubiquitous filler words
    pub zipf_max: Option<f64>,
    pub syllables: SyllableFilter,
    /// Exact stress pattern filter (e.g. "10")
    pub stress: Option<&'a str>,
}

impl<'a> CandidateQuery<'a> {
    pub fn new(level: KeyLevel, value: &'a str, exclude_word: &'a str, limit: i64) -> Self {
        Self {
            level,
            value,
            exclude_word,
            limit,
            zipf_max: None,
            syllables: SyllableFilter::Any,
            stress: None,
        }
    }
}

/// Fetch candidate entries sharing a rhyme key.
///
/// Ordering is deterministic: popularity descending, then word ascending.
pub async fn candidates_by_key(
    pool: &SqlitePool,
    query: &CandidateQuery<'_>,
) -> Result<Vec<DictionaryEntry>> {
    let mut sql = format!(
        "SELECT {} FROM words WHERE {} = ? AND word != ? COLLATE NOCASE \
         AND word NOT LIKE '%''%'",
        ENTRY_COLUMNS,
        query.level.column()
    );

    if query.zipf_max.is_some() {
        sql.push_str(" AND zipf <= ?");
    }
    match query.syllables {
        SyllableFilter::Any => {}
        SyllableFilter::Exactly(_) => sql.push_str(" AND syls = ?"),
        SyllableFilter::FiveOrMore => sql.push_str(" AND syls >= 5"),
    }
    if query.stress.is_some() {
        sql.push_str(" AND stress = ?");
    }
    sql.push_str(" ORDER BY zipf DESC, word ASC LIMIT ?");

    let mut q = sqlx::query_as::<_, DictionaryEntry>(&sql)
        .bind(query.value)
        .bind(query.exclude_word.trim().to_lowercase());

    if let Some(zipf_max) = query.zipf_max {
        q = q.bind(zipf_max);
    }
    if let SyllableFilter::Exactly(n) = query.syllables {
        q = q.bind(n as i64);
    }
    if let Some(stress) = query.stress {
        q = q.bind(stress);
    }
    q = q.bind(query.limit);

    let rows = q.fetch_all(pool).await?;
    Ok(rows)
}

/// Common short words for the phrase generator, by syllable and popularity
/// band
pub async fn modifier_vocabulary(
    pool: &SqlitePool,
    max_syllables: i64,
    zipf_min: f64,
    zipf_max: f64,
    limit: i64,
) -> Result<Vec<DictionaryEntry>> {
    let sql = format!(
        "SELECT {} FROM words WHERE syls <= ? AND zipf >= ? AND zipf <= ? \
         AND word NOT LIKE '%''%' ORDER BY zipf DESC, word ASC LIMIT ?",
        ENTRY_COLUMNS
    );
    let rows = sqlx::query_as::<_, DictionaryEntry>(&sql)
        .bind(max_syllables)
        .bind(zipf_min)
        .bind(zipf_max)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}
