use std::sync::Arc;

use crate::error::SqlClientError;
use crate::results::ResultSet;
use crate::types::RowValues;

use super::params::Params;
use super::query::build_result_set;
use super::interact;

/// A prepared statement bound to a held pool checkout.
///
/// The compiled statement lives in rusqlite's per-connection statement cache;
/// this handle pins the connection and re-fetches the cache entry by SQL text
/// on every execution, so the compile happens once.
pub struct Prepared {
    conn: deadpool_sqlite::Object,
    sql: Arc<String>,
}

/// Compile `sql` on a connection checked out of `pool` and keep both.
///
/// # Errors
///
/// Returns pool checkout errors, or the rusqlite error if the SQL does not
/// compile.
pub async fn prepare(
    pool: &deadpool_sqlite::Pool,
    sql: &str,
) -> Result<Prepared, SqlClientError> {
    let conn = pool.get().await.map_err(SqlClientError::PoolErrorSqlite)?;
    let sql = Arc::new(sql.to_owned());
    let warm = Arc::clone(&sql);
    interact(&conn, move |conn| {
        conn.prepare_cached(&warm)?;
        Ok(())
    })
    .await?;
    Ok(Prepared { conn, sql })
}

impl Prepared {
    /// Run the statement as a SELECT.
    ///
    /// # Errors
    ///
    /// Returns the underlying rusqlite error.
    pub async fn query(&self, params: &[RowValues]) -> Result<ResultSet, SqlClientError> {
        let sql = Arc::clone(&self.sql);
        let values = Params::convert(params)?.0;
        interact(&self.conn, move |conn| {
            let mut stmt = conn.prepare_cached(&sql)?;
            build_result_set(&mut stmt, &values)
        })
        .await
    }

    /// Run the statement as DML; returns rows affected.
    ///
    /// # Errors
    ///
    /// Returns the underlying rusqlite error.
    pub async fn execute(&self, params: &[RowValues]) -> Result<usize, SqlClientError> {
        let sql = Arc::clone(&self.sql);
        let values = Params::convert(params)?.0;
        interact(&self.conn, move |conn| {
            let mut stmt = conn.prepare_cached(&sql)?;
            let params = Params(values);
            let refs = params.as_refs();
            let affected = stmt.execute(&refs[..])?;
            Ok(affected)
        })
        .await
    }
}
