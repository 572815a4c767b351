//! Engine services
//!
//! The request-time pipeline: external suggestion client, candidate
//! merger/classifier, uncommonness filter, and phrase generation, plus the
//! shared retry combinator.

pub mod datamuse_client;
pub mod merger;
pub mod phrase_generator;
pub mod retry;
pub mod uncommon_filter;

pub use datamuse_client::{ComprehensiveSuggestions, DatamuseClient, DatamuseError, RawSuggestion, Relation};
pub use merger::ClassifiedCandidate;
pub use phrase_generator::PhraseGenerator;
pub use retry::{retry_with_backoff, Retryable, RetryPolicy};
