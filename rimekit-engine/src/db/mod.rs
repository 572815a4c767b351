//! Repository queries over the pronunciation dictionary

pub mod words;

pub use words::{candidates_by_key, lookup_entry, modifier_vocabulary, CandidateQuery, KeyLevel};
