//! Dictionary pool initialization
//!
//! Opens the SQLite pronunciation dictionary behind a bounded connection
//! pool. A missing or unreadable dictionary is fatal here: the engine
//! cannot serve any request without it, so startup is the one place where
//! store errors do not degrade gracefully.

use crate::config::DatabaseConfig;
use crate::{Error, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

/// Open the dictionary database and verify its schema.
///
/// The pool is bounded at `pool_size` handles; acquiring a handle waits at
/// most `acquire_timeout` before the request fails with `PoolExhausted`.
/// Readers never block each other once holding a handle.
pub async fn init_dictionary(db_path: &Path, config: &DatabaseConfig) -> Result<SqlitePool> {
    if !db_path.exists() {
        return Err(Error::Config(format!(
            "Dictionary database not found: {}",
            db_path.display()
        )));
    }

    let db_url = format!("sqlite://{}?mode=ro", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(config.pool_size)
        .acquire_timeout(config.acquire_timeout())
        .connect(&db_url)
        .await?;

    verify_words_table(&pool).await?;

    info!(
        path = %db_path.display(),
        pool_size = config.pool_size,
        "Opened pronunciation dictionary"
    );

    Ok(pool)
}

/// Fail fast when the dictionary schema is not what the ETL produces
async fn verify_words_table(pool: &SqlitePool) -> Result<()> {
    let table: Option<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'words'",
    )
    .fetch_optional(pool)
    .await?;

    if table.is_none() {
        return Err(Error::Config(
            "Dictionary database has no 'words' table".to_string(),
        ));
    }

    Ok(())
}
