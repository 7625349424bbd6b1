use deadpool_postgres::{Object, Pool};
use tokio_postgres::Statement;

use crate::error::SqlClientError;
use crate::results::ResultSet;
use crate::types::RowValues;

use super::params::Params;
use super::query::build_result_set_from_statement;

/// A server-side prepared statement pinned to a held pool checkout.
///
/// `tokio-postgres` statements are scoped to the connection they were
/// prepared on, so the checkout stays alive as long as the statement does.
pub struct Prepared {
    conn: Object,
    stmt: Statement,
}

/// Prepare `sql` on a connection checked out of `pool` and keep both.
///
/// # Errors
///
/// Returns pool checkout errors or the underlying driver error.
pub async fn prepare(pool: &Pool, sql: &str) -> Result<Prepared, SqlClientError> {
    let conn = pool
        .get()
        .await
        .map_err(SqlClientError::PoolErrorPostgres)?;
    let stmt = conn.prepare(sql).await?;
    Ok(Prepared { conn, stmt })
}

impl Prepared {
    /// Run the statement as a SELECT.
    ///
    /// # Errors
    ///
    /// Returns the underlying driver error.
    pub async fn query(&self, params: &[RowValues]) -> Result<ResultSet, SqlClientError> {
        let converted = Params::convert(params)?;
        let rows = self.conn.query(&self.stmt, converted.as_refs()).await?;
        build_result_set_from_statement(&self.stmt, &rows)
    }

    /// Run the statement as DML; returns rows affected.
    ///
    /// # Errors
    ///
    /// Returns the underlying driver error.
    pub async fn execute(&self, params: &[RowValues]) -> Result<usize, SqlClientError> {
        let converted = Params::convert(params)?;
        let affected = self.conn.execute(&self.stmt, converted.as_refs()).await?;
        usize::try_from(affected).map_err(|e| {
            SqlClientError::ExecutionError(format!("postgres affected rows conversion error: {e}"))
        })
    }
}
