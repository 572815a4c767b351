//! Dictionary row models

use serde::Serialize;

/// One row of the pronunciation dictionary.
///
/// Keys K1/K2/K3 are precomputed by the ETL process from the canonical
/// pronunciation; `zipf` is a logarithmic word-frequency measure where
/// higher means more common. `stress` is the vowel stress digit string
/// (e.g. "10" for a trochee).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DictionaryEntry {
    pub word: String,
    pub pron: String,
    pub k1: String,
    pub k2: String,
    pub k3: String,
    pub syls: i64,
    pub stress: Option<String>,
    pub zipf: Option<f64>,
}

impl DictionaryEntry {
    /// Popularity measure, defaulting missing frequency data to 0 (rarest)
    pub fn zipf_or_default(&self) -> f64 {
        self.zipf.unwrap_or(0.0)
    }

    /// Stress pattern string, empty when the ETL left it unset
    pub fn stress_or_default(&self) -> &str {
        self.stress.as_deref().unwrap_or("")
    }
}
