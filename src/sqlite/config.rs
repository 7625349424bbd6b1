use deadpool_sqlite::{Config as DeadpoolSqliteConfig, Runtime};

use super::interact;
use crate::error::SqlClientError;

/// Build a `SQLite` pool for the given database path (or `:memory:`).
///
/// The DSN is handed to rusqlite unparsed. A connection is checked out once
/// to apply the WAL pragma and prove the database is reachable before the
/// pool is returned. Checkouts wait at most [`crate::pool::CHECKOUT_WAIT`]
/// for a free connection.
///
/// # Errors
///
/// Returns `SqlClientError::ConnectionError` if pool creation fails, or the
/// underlying rusqlite error if the smoke test fails.
pub async fn new_pool(dsn: &str, max_open: usize) -> Result<deadpool_sqlite::Pool, SqlClientError> {
    let mut cfg = DeadpoolSqliteConfig::new(dsn);
    let mut pool_cfg = deadpool::managed::PoolConfig::new(max_open);
    pool_cfg.timeouts.wait = Some(crate::pool::CHECKOUT_WAIT);
    cfg.pool = Some(pool_cfg);

    let pool = cfg.create_pool(Runtime::Tokio1).map_err(|e| {
        SqlClientError::ConnectionError(format!("Failed to create SQLite pool: {e}"))
    })?;

    let conn = pool
        .get()
        .await
        .map_err(SqlClientError::PoolErrorSqlite)?;
    interact(&conn, |conn| {
        conn.execute_batch("PRAGMA journal_mode = WAL;")
            .map_err(SqlClientError::SqliteError)
    })
    .await?;

    Ok(pool)
}
