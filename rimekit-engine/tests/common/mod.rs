//! Shared test fixtures: a small temp-file pronunciation dictionary built
//! the way the ETL process would, opened read-only through the normal
//! initialization path.

#![allow(dead_code)]

use rimekit_common::config::{DatabaseConfig, FilterConfig, SearchConfig};
use rimekit_common::db::init_dictionary;
use rimekit_engine::phonetics::keys::compute_keys;
use rimekit_engine::phonetics::phoneme::{parse_pronunciation, stress_pattern, syllable_count};
use rimekit_engine::RhymeEngine;
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// (word, pronunciation, zipf)
pub const WORDS: [(&str, &str, f64); 25] = [
    ("double", "D AH1 B AH0 L", 5.0),
    ("trouble", "T R AH1 B AH0 L", 5.2),
    ("bubble", "B AH1 B AH0 L", 4.3),
    ("rubble", "R AH1 B AH0 L", 3.2),
    ("stubble", "S T AH1 B AH0 L", 2.4),
    ("redouble", "R IY0 D AH1 B AH0 L", 1.8),
    ("couple", "K AH1 P AH0 L", 5.1),
    ("supple", "S AH1 P AH0 L", 2.9),
    ("muddle", "M AH1 D AH0 L", 3.0),
    ("puddle", "P AH1 D AH0 L", 3.5),
    ("huddle", "HH AH1 D AH0 L", 3.3),
    ("shuttle", "SH AH1 T AH0 L", 3.8),
    ("subtle", "S AH1 T AH0 L", 4.6),
    ("cat", "K AE1 T", 5.5),
    ("bat", "B AE1 T", 4.8),
    ("hat", "HH AE1 T", 4.9),
    ("mat", "M AE1 T", 4.0),
    ("gnat", "N AE1 T", 2.2),
    ("vat", "V AE1 T", 2.7),
    ("sat", "S AE1 T", 4.5),
    ("splat", "S P L AE1 T", 2.5),
    ("man", "M AE1 N", 6.0),
    ("blue", "B L UW1", 5.4),
    ("new", "N UW1", 6.2),
    ("job", "JH AA1 B", 5.6),
];

/// Build a dictionary file under `dir`, precomputing keys the way the ETL
/// does
pub async fn build_dictionary(dir: &Path) -> PathBuf {
    let path = dir.join("words_index.sqlite");
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let pool = SqlitePool::connect(&url).await.expect("create fixture db");

    sqlx::query(
        r#"
        CREATE TABLE words (
            word TEXT PRIMARY KEY,
            pron TEXT NOT NULL,
            k1 TEXT NOT NULL,
            k2 TEXT NOT NULL,
            k3 TEXT NOT NULL,
            syls INTEGER NOT NULL,
            stress TEXT,
            zipf REAL
        )
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();

    for (word, pron, zipf) in WORDS {
        let seq = parse_pronunciation(pron);
        let keys = compute_keys(&seq);
        sqlx::query(
            "INSERT INTO words (word, pron, k1, k2, k3, syls, stress, zipf) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(word)
        .bind(pron)
        .bind(&keys.k1)
        .bind(&keys.k2)
        .bind(&keys.k3)
        .bind(syllable_count(&seq) as i64)
        .bind(stress_pattern(&seq))
        .bind(zipf)
        .execute(&pool)
        .await
        .unwrap();
    }

    pool.close().await;
    path
}

/// Route engine tracing through the test harness when RUST_LOG is set
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Dictionary opened through the normal read-only initialization path
pub async fn open_dictionary() -> (TempDir, SqlitePool) {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = build_dictionary(dir.path()).await;
    let pool = init_dictionary(&path, &DatabaseConfig::default())
        .await
        .expect("open fixture dictionary");
    (dir, pool)
}

/// A full engine over the fixture dictionary, no external client
pub async fn fixture_engine() -> (TempDir, RhymeEngine) {
    let (dir, pool) = open_dictionary().await;
    let engine = RhymeEngine::new(
        pool,
        None,
        SearchConfig::default(),
        FilterConfig::default(),
    )
    .await
    .expect("build engine");
    (dir, engine)
}
