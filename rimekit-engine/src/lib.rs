//! # rimekit Engine
//!
//! Phonetic rhyme retrieval and ranking: parses ARPAbet pronunciations,
//! derives hierarchical rhyme keys, retrieves candidates from the local
//! dictionary and the Datamuse suggestion service, scores each pair with a
//! weighted phonetic similarity model, classifies candidates into
//! rhyme-strength tiers and popularity buckets, and surfaces the
//! uncommon-but-usable band of results.
//!
//! The consumer-facing entry point is [`engine::RhymeEngine`].

pub mod db;
pub mod engine;
pub mod phonetics;
pub mod scoring;
pub mod services;
pub mod types;
pub mod validation;

pub use engine::RhymeEngine;
pub use phonetics::keys::{compute_keys, RhymeKeys};
pub use scoring::{score_sequences, RhymeScore};
pub use types::{Bucket, Candidate, ResultSet, SearchOptions, Tier};
