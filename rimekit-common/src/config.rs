//! Configuration loading
//!
//! TOML bootstrap configuration for the rhyme engine. These settings cannot
//! change during runtime; the consuming application must restart to pick up
//! changes to the file. Every field except the dictionary path has a
//! built-in default, so a minimal config is just:
//!
//! ```toml
//! dictionary_path = "data/words_index.sqlite"
//! ```

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Bootstrap configuration loaded from a TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Path to the SQLite pronunciation dictionary (built by an external
    /// ETL process; opened read-only at query time)
    pub dictionary_path: PathBuf,

    /// Dictionary pool settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// External suggestion service settings
    #[serde(default)]
    pub external: ExternalConfig,

    /// Search behavior defaults
    #[serde(default)]
    pub search: SearchConfig,

    /// Uncommonness filter settings
    #[serde(default)]
    pub filter: FilterConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TomlConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read config failed: {}: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse config failed: {}: {}", path.display(), e)))
    }

    /// Build a config with defaults for everything but the dictionary path
    pub fn with_dictionary(dictionary_path: impl Into<PathBuf>) -> Self {
        Self {
            dictionary_path: dictionary_path.into(),
            database: DatabaseConfig::default(),
            external: ExternalConfig::default(),
            search: SearchConfig::default(),
            filter: FilterConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Dictionary connection pool settings
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Number of reusable read handles in the pool
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,

    /// Maximum wait for a pool handle before the request fails with
    /// `PoolExhausted`
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            acquire_timeout_ms: default_acquire_timeout_ms(),
        }
    }
}

/// External suggestion service (Datamuse) settings
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalConfig {
    /// Service endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-attempt request timeout
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Retry attempts for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay for exponential backoff between retries
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Extra fixed delay applied when the service answers HTTP 429
    #[serde(default = "default_rate_limit_delay_ms")]
    pub rate_limit_delay_ms: u64,

    /// Minimum spacing between outbound requests, shared across all
    /// relations and callers
    #[serde(default = "default_min_request_interval_ms")]
    pub min_request_interval_ms: u64,

    /// Cap on simultaneous outbound requests
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// Bounded size of the LRU response cache
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,

    /// Default maximum results requested per relation
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for ExternalConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            rate_limit_delay_ms: default_rate_limit_delay_ms(),
            min_request_interval_ms: default_min_request_interval_ms(),
            max_concurrent_requests: default_max_concurrent_requests(),
            cache_size: default_cache_size(),
            max_results: default_max_results(),
        }
    }
}

/// Search behavior defaults (overridable per request via SearchOptions)
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Maximum candidates returned per tier/bucket
    #[serde(default = "default_max_items")]
    pub max_items: usize,

    /// Minimum index candidates before relaxing K3 -> K2 -> K1
    #[serde(default = "default_min_index_candidates")]
    pub min_index_candidates: usize,

    /// Zipf popularity threshold separating popular from technical results
    #[serde(default = "default_popularity_threshold")]
    pub popularity_threshold: f64,

    /// Zipf ceiling applied to index candidate queries
    #[serde(default = "default_zipf_max")]
    pub zipf_max: f64,

    /// Widened zipf ceiling used by the relaxed fallback pass
    #[serde(default = "default_zipf_max_relaxed")]
    pub zipf_max_relaxed: f64,

    /// Row limit per key-level index query
    #[serde(default = "default_index_query_limit")]
    pub index_query_limit: i64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_items: default_max_items(),
            min_index_candidates: default_min_index_candidates(),
            popularity_threshold: default_popularity_threshold(),
            zipf_max: default_zipf_max(),
            zipf_max_relaxed: default_zipf_max_relaxed(),
            index_query_limit: default_index_query_limit(),
        }
    }
}

/// Uncommonness filter settings
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// Lower percentile of the kept display band (candidates ranked
    /// most-uncommon-first; below this they are hidden as too obscure)
    #[serde(default = "default_band_lower")]
    pub band_lower: f64,

    /// Upper percentile of the kept display band (above this candidates are
    /// hidden as too popular)
    #[serde(default = "default_band_upper")]
    pub band_upper: f64,

    /// Weight of index zipf in the combined popularity blend
    #[serde(default = "default_zipf_weight")]
    pub zipf_weight: f64,

    /// Weight of external frequency in the combined popularity blend
    #[serde(default = "default_external_weight")]
    pub external_weight: f64,

    /// Popularity discount for perfect rhymes so they stay reachable
    #[serde(default = "default_perfect_boost")]
    pub perfect_boost: f64,

    /// Minimum perfect-tier results guaranteed after filtering (set high to
    /// keep every true perfect rhyme visible)
    #[serde(default = "default_min_perfect")]
    pub min_perfect: usize,

    /// Minimum results guaranteed per non-perfect tier
    #[serde(default = "default_min_per_tier")]
    pub min_per_tier: usize,

    /// Minimum total results guaranteed across all tiers
    #[serde(default = "default_min_total")]
    pub min_total: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            band_lower: default_band_lower(),
            band_upper: default_band_upper(),
            zipf_weight: default_zipf_weight(),
            external_weight: default_external_weight(),
            perfect_boost: default_perfect_boost(),
            min_perfect: default_min_perfect(),
            min_per_tier: default_min_per_tier(),
            min_total: default_min_total(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_pool_size() -> u32 {
    10
}

fn default_acquire_timeout_ms() -> u64 {
    5000
}

fn default_base_url() -> String {
    "https://api.datamuse.com/words".to_string()
}

fn default_request_timeout_ms() -> u64 {
    3000
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    1000
}

fn default_rate_limit_delay_ms() -> u64 {
    2000
}

fn default_min_request_interval_ms() -> u64 {
    100
}

fn default_max_concurrent_requests() -> usize {
    10
}

fn default_cache_size() -> usize {
    1000
}

fn default_max_results() -> usize {
    1000
}

fn default_max_items() -> usize {
    20
}

fn default_min_index_candidates() -> usize {
    10
}

fn default_popularity_threshold() -> f64 {
    2.0
}

fn default_zipf_max() -> f64 {
    6.0
}

fn default_zipf_max_relaxed() -> f64 {
    8.0
}

fn default_index_query_limit() -> i64 {
    1000
}

fn default_band_lower() -> f64 {
    0.55
}

fn default_band_upper() -> f64 {
    0.75
}

fn default_zipf_weight() -> f64 {
    0.6
}

fn default_external_weight() -> f64 {
    0.4
}

fn default_perfect_boost() -> f64 {
    0.1
}

fn default_min_perfect() -> usize {
    1000
}

fn default_min_per_tier() -> usize {
    2
}

fn default_min_total() -> usize {
    15
}

fn default_log_level() -> String {
    "info".to_string()
}
