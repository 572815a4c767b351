//! Phoneme model and phonetic analysis
//!
//! ARPAbet pronunciation parsing, hierarchical rhyme key extraction,
//! articulatory feature tables, and the extended similarity functions used
//! by the weighted scorer.

pub mod features;
pub mod keys;
pub mod phoneme;
pub mod similarity;

pub use keys::{compute_keys, locate_nucleus, rhyme_tail, RhymeKeys};
pub use phoneme::{parse_pronunciation, Meter, Phoneme, Stress};
