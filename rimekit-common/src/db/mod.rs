//! Dictionary database access
//!
//! The pronunciation dictionary is built and maintained by an external ETL
//! process; at query time it is strictly read-only and shared across all
//! concurrent searches through a bounded connection pool.

pub mod init;
pub mod models;

pub use init::init_dictionary;
pub use models::DictionaryEntry;
