//! Datamuse API client
//!
//! Rate-limited, cached, retrying client for the remote rhyme-suggestion
//! service. One instance is constructed at startup and shared by every
//! search, so the rate limiter, response cache, and concurrency cap are
//! process-wide without being globals.

use super::retry::{retry_with_backoff, Retryable, RetryPolicy};
use rimekit_common::config::ExternalConfig;
use serde::Deserialize;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{Mutex, Semaphore};

const USER_AGENT: &str = "rimekit/0.1.0";

/// Datamuse client errors
#[derive(Debug, Error)]
pub enum DatamuseError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Rate limited by service")]
    RateLimited,

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl DatamuseError {
    fn retryable(&self) -> Retryable {
        match self {
            DatamuseError::Timeout | DatamuseError::Network(_) => Retryable::Transient,
            DatamuseError::RateLimited => Retryable::RateLimited,
            DatamuseError::Api(status, _) if *status >= 500 => Retryable::Transient,
            DatamuseError::Api(..) | DatamuseError::Parse(_) => Retryable::No,
        }
    }
}

/// Rhyme relation endpoints offered by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Perfect,
    Near,
    Approximate,
}

impl Relation {
    pub const ALL: [Relation; 3] = [Relation::Perfect, Relation::Near, Relation::Approximate];

    /// The service's query parameter for this relation
    pub fn query_param(self) -> &'static str {
        match self {
            Relation::Perfect => "rel_rhy",
            Relation::Near => "rel_nry",
            Relation::Approximate => "rel_app",
        }
    }
}

/// Raw wire item; `tags` and `score` are frequently absent
#[derive(Debug, Clone, Deserialize)]
struct WireSuggestion {
    #[serde(default)]
    word: String,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    tags: Vec<String>,
}

/// A parsed suggestion from the remote service
#[derive(Debug, Clone)]
pub struct RawSuggestion {
    pub word: String,
    /// Service-assigned relevance rank
    pub rank_score: f64,
    /// Word frequency in occurrences per million; 0 when the tag is absent
    pub frequency: f64,
    /// ARPAbet pronunciation hint; empty when the tag is absent
    pub pronunciation: String,
    pub tags: Vec<String>,
    pub is_multiword: bool,
    pub relation: Relation,
}

/// All three relation fetches for one word
#[derive(Debug, Clone, Default)]
pub struct ComprehensiveSuggestions {
    pub perfect: Vec<RawSuggestion>,
    pub near: Vec<RawSuggestion>,
    pub approximate: Vec<RawSuggestion>,
}

impl ComprehensiveSuggestions {
    pub fn iter_all(&self) -> impl Iterator<Item = &RawSuggestion> {
        self.perfect
            .iter()
            .chain(self.near.iter())
            .chain(self.approximate.iter())
    }

    pub fn total_len(&self) -> usize {
        self.perfect.len() + self.near.len() + self.approximate.len()
    }
}

/// Minimum-interval request scheduler shared across all relations and
/// callers. Delays, never drops.
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    /// Wait if necessary to comply with the minimum spacing
    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Datamuse rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

type CacheKey = (Relation, String, usize);

/// Bounded LRU response cache, process lifetime only
struct ResponseCache {
    entries: HashMap<CacheKey, Vec<RawSuggestion>>,
    access_order: VecDeque<CacheKey>,
    capacity: usize,
}

impl ResponseCache {
    fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            access_order: VecDeque::new(),
            capacity,
        }
    }

    fn get(&mut self, key: &CacheKey) -> Option<Vec<RawSuggestion>> {
        let hit = self.entries.get(key).cloned();
        if hit.is_some() {
            self.touch(key);
        }
        hit
    }

    fn insert(&mut self, key: CacheKey, value: Vec<RawSuggestion>) {
        if self.capacity == 0 {
            return;
        }
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            if let Some(oldest) = self.access_order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        self.entries.insert(key.clone(), value);
        self.touch(&key);
    }

    fn touch(&mut self, key: &CacheKey) {
        if let Some(pos) = self.access_order.iter().position(|k| k == key) {
            self.access_order.remove(pos);
        }
        self.access_order.push_back(key.clone());
    }
}

/// Datamuse API client
pub struct DatamuseClient {
    http_client: reqwest::Client,
    rate_limiter: Arc<RateLimiter>,
    cache: Mutex<ResponseCache>,
    semaphore: Arc<Semaphore>,
    retry_policy: RetryPolicy,
    base_url: String,
    default_max_results: usize,
}

impl DatamuseClient {
    pub fn new(config: &ExternalConfig) -> Result<Self, DatamuseError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| DatamuseError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            rate_limiter: Arc::new(RateLimiter::new(Duration::from_millis(
                config.min_request_interval_ms,
            ))),
            cache: Mutex::new(ResponseCache::new(config.cache_size)),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent_requests.max(1))),
            retry_policy: RetryPolicy {
                max_attempts: config.max_retries.max(1),
                base_delay: Duration::from_millis(config.backoff_base_ms),
                max_delay: Duration::from_secs(8),
                rate_limit_delay: Duration::from_millis(config.rate_limit_delay_ms),
            },
            base_url: config.base_url.clone(),
            default_max_results: config.max_results,
        })
    }

    /// Fetch suggestions for one relation.
    ///
    /// Served from the LRU cache when possible; otherwise rate-limited,
    /// concurrency-capped, and retried with backoff on transient failures.
    pub async fn fetch_by_relation(
        &self,
        word: &str,
        relation: Relation,
        max_results: usize,
    ) -> Result<Vec<RawSuggestion>, DatamuseError> {
        let key: CacheKey = (relation, word.to_lowercase(), max_results);

        if let Some(hit) = self.cache.lock().await.get(&key) {
            tracing::debug!(word = %word, relation = ?relation, "Datamuse cache hit");
            return Ok(hit);
        }

        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| DatamuseError::Network("client closed".to_string()))?;

        let suggestions = retry_with_backoff(
            "datamuse fetch",
            &self.retry_policy,
            DatamuseError::retryable,
            || self.request_once(&key.1, relation, max_results),
        )
        .await?;

        tracing::debug!(
            word = %word,
            relation = ?relation,
            count = suggestions.len(),
            "Datamuse fetch complete"
        );

        self.cache.lock().await.insert(key, suggestions.clone());
        Ok(suggestions)
    }

    /// Issue all three relation fetches concurrently and join the results.
    ///
    /// In the default mode a failed relation degrades to an empty list for
    /// that relation only; with `strict` set the first failure is returned.
    pub async fn fetch_comprehensive(
        &self,
        word: &str,
        strict: bool,
    ) -> Result<ComprehensiveSuggestions, DatamuseError> {
        let near_max = self.default_max_results;
        let approximate_max = self.default_max_results / 2;

        let (perfect, near, approximate) = tokio::join!(
            self.fetch_by_relation(word, Relation::Perfect, self.default_max_results),
            self.fetch_by_relation(word, Relation::Near, near_max),
            self.fetch_by_relation(word, Relation::Approximate, approximate_max),
        );

        let mut sets = ComprehensiveSuggestions::default();
        for (relation, outcome) in [
            (Relation::Perfect, perfect),
            (Relation::Near, near),
            (Relation::Approximate, approximate),
        ] {
            match outcome {
                Ok(list) => match relation {
                    Relation::Perfect => sets.perfect = list,
                    Relation::Near => sets.near = list,
                    Relation::Approximate => sets.approximate = list,
                },
                Err(err) if strict => return Err(err),
                Err(err) => {
                    tracing::warn!(
                        word = %word,
                        relation = ?relation,
                        error = %err,
                        "Datamuse relation failed, degrading to empty"
                    );
                }
            }
        }

        Ok(sets)
    }

    async fn request_once(
        &self,
        word: &str,
        relation: Relation,
        max_results: usize,
    ) -> Result<Vec<RawSuggestion>, DatamuseError> {
        self.rate_limiter.wait().await;

        let max_param = max_results.to_string();
        let response = self
            .http_client
            .get(&self.base_url)
            .query(&[
                (relation.query_param(), word),
                ("max", max_param.as_str()),
                ("md", "fp"),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DatamuseError::Timeout
                } else {
                    DatamuseError::Network(e.to_string())
                }
            })?;

        let status = response.status();

        if status.as_u16() == 429 {
            return Err(DatamuseError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DatamuseError::Api(status.as_u16(), body));
        }

        let items: Vec<WireSuggestion> = response
            .json()
            .await
            .map_err(|e| DatamuseError::Parse(e.to_string()))?;

        Ok(items
            .into_iter()
            .filter(|item| !item.word.is_empty())
            .map(|item| parse_suggestion(item, relation))
            .collect())
    }
}

/// Decode one wire item; missing `f:`/`p:` tags default gracefully
fn parse_suggestion(item: WireSuggestion, relation: Relation) -> RawSuggestion {
    let frequency = item
        .tags
        .iter()
        .find_map(|tag| tag.strip_prefix("f:").and_then(|v| v.parse::<f64>().ok()))
        .unwrap_or(0.0);

    let pronunciation = item
        .tags
        .iter()
        .find_map(|tag| tag.strip_prefix("p:").map(|v| v.to_string()))
        .unwrap_or_default();

    let is_multiword = item.word.contains(' ');

    RawSuggestion {
        word: item.word,
        rank_score: item.score,
        frequency,
        pronunciation,
        tags: item.tags,
        is_multiword,
        relation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestion(word: &str) -> Vec<RawSuggestion> {
        vec![RawSuggestion {
            word: word.to_string(),
            rank_score: 1.0,
            frequency: 0.0,
            pronunciation: String::new(),
            tags: Vec::new(),
            is_multiword: false,
            relation: Relation::Perfect,
        }]
    }

    #[test]
    fn client_creation() {
        let client = DatamuseClient::new(&ExternalConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn relation_query_params() {
        assert_eq!(Relation::Perfect.query_param(), "rel_rhy");
        assert_eq!(Relation::Near.query_param(), "rel_nry");
        assert_eq!(Relation::Approximate.query_param(), "rel_app");
    }

    #[test]
    fn parses_frequency_and_pronunciation_tags() {
        let item = WireSuggestion {
            word: "trouble".to_string(),
            score: 3000.0,
            tags: vec!["f:12.5".to_string(), "p:T R AH1 B AH0 L".to_string()],
        };
        let parsed = parse_suggestion(item, Relation::Perfect);
        assert_eq!(parsed.frequency, 12.5);
        assert_eq!(parsed.pronunciation, "T R AH1 B AH0 L");
        assert!(!parsed.is_multiword);
    }

    #[test]
    fn missing_tags_default_gracefully() {
        let item = WireSuggestion {
            word: "spruce knob".to_string(),
            score: 0.0,
            tags: Vec::new(),
        };
        let parsed = parse_suggestion(item, Relation::Near);
        assert_eq!(parsed.frequency, 0.0);
        assert_eq!(parsed.pronunciation, "");
        assert!(parsed.is_multiword);
    }

    #[test]
    fn malformed_frequency_tag_defaults_to_zero() {
        let item = WireSuggestion {
            word: "x".to_string(),
            score: 1.0,
            tags: vec!["f:not-a-number".to_string()],
        };
        let parsed = parse_suggestion(item, Relation::Perfect);
        assert_eq!(parsed.frequency, 0.0);
    }

    #[test]
    fn lru_cache_evicts_oldest() {
        let mut cache = ResponseCache::new(2);
        let key_a = (Relation::Perfect, "a".to_string(), 10);
        let key_b = (Relation::Perfect, "b".to_string(), 10);
        let key_c = (Relation::Perfect, "c".to_string(), 10);

        cache.insert(key_a.clone(), suggestion("a"));
        cache.insert(key_b.clone(), suggestion("b"));
        cache.insert(key_c.clone(), suggestion("c"));

        assert!(cache.get(&key_a).is_none());
        assert!(cache.get(&key_b).is_some());
        assert!(cache.get(&key_c).is_some());
    }

    #[test]
    fn lru_cache_refreshes_on_access() {
        let mut cache = ResponseCache::new(2);
        let key_a = (Relation::Perfect, "a".to_string(), 10);
        let key_b = (Relation::Perfect, "b".to_string(), 10);
        let key_c = (Relation::Perfect, "c".to_string(), 10);

        cache.insert(key_a.clone(), suggestion("a"));
        cache.insert(key_b.clone(), suggestion("b"));
        // Touch a so b becomes the eviction candidate
        assert!(cache.get(&key_a).is_some());
        cache.insert(key_c.clone(), suggestion("c"));

        assert!(cache.get(&key_a).is_some());
        assert!(cache.get(&key_b).is_none());
    }

    #[test]
    fn relation_keys_do_not_collide() {
        let mut cache = ResponseCache::new(10);
        let perfect = (Relation::Perfect, "word".to_string(), 10);
        let near = (Relation::Near, "word".to_string(), 10);

        cache.insert(perfect.clone(), suggestion("perfect"));
        cache.insert(near.clone(), suggestion("near"));

        assert_eq!(cache.get(&perfect).unwrap()[0].word, "perfect");
        assert_eq!(cache.get(&near).unwrap()[0].word, "near");
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn rate_limiter_enforces_min_spacing() {
        let limiter = RateLimiter::new(Duration::from_millis(50));

        let start = Instant::now();
        limiter.wait().await;
        let first_elapsed = start.elapsed();

        limiter.wait().await;
        let second_elapsed = start.elapsed();

        limiter.wait().await;
        let third_elapsed = start.elapsed();

        assert!(first_elapsed < Duration::from_millis(40));
        assert!(second_elapsed >= Duration::from_millis(45));
        assert!(third_elapsed >= Duration::from_millis(95));
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn rate_limiter_spaces_concurrent_callers() {
        let limiter = RateLimiter::new(Duration::from_millis(40));

        let start = Instant::now();
        tokio::join!(limiter.wait(), limiter.wait(), limiter.wait());
        let elapsed = start.elapsed();

        // Three callers, two enforced gaps
        assert!(elapsed >= Duration::from_millis(75));
    }

    #[test]
    fn retryable_classification() {
        assert_eq!(DatamuseError::Timeout.retryable(), Retryable::Transient);
        assert_eq!(DatamuseError::RateLimited.retryable(), Retryable::RateLimited);
        assert_eq!(
            DatamuseError::Api(503, String::new()).retryable(),
            Retryable::Transient
        );
        assert_eq!(
            DatamuseError::Api(400, String::new()).retryable(),
            Retryable::No
        );
        assert_eq!(
            DatamuseError::Parse("bad json".to_string()).retryable(),
            Retryable::No
        );
    }
}
