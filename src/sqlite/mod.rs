//! `SQLite` backend via `deadpool-sqlite`.
//!
//! rusqlite is synchronous, so every call forwards to the pooled
//! connection's interact thread. Prepared statements are kept warm in
//! rusqlite's statement cache and re-fetched by SQL text on each execution,
//! since a compiled statement cannot leave the interact closure.

pub mod config;
pub mod executor;
pub mod params;
pub mod prepared;
pub mod query;
pub mod transaction;

pub use config::new_pool;
pub use executor::{execute_dml, execute_select};
pub use prepared::{Prepared, prepare};
pub use transaction::{Tx, begin};

use crate::error::SqlClientError;
use deadpool_sqlite::rusqlite;

/// Run synchronous rusqlite work on the pooled connection's interact thread.
pub(crate) async fn interact<R, F>(
    conn: &deadpool_sqlite::Object,
    func: F,
) -> Result<R, SqlClientError>
where
    F: FnOnce(&mut rusqlite::Connection) -> Result<R, SqlClientError> + Send + 'static,
    R: Send + 'static,
{
    conn.interact(func).await?
}
