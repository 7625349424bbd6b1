use deadpool_postgres::{Object, Pool};
use tokio_postgres::Statement;

use crate::error::SqlClientError;
use crate::results::ResultSet;
use crate::types::RowValues;

use super::params::Params;
use super::query::{build_result_set_from_rows, build_result_set_from_statement};

/// An open Postgres transaction.
///
/// Owns the pool checkout for the transaction's lifetime; `BEGIN` has already
/// been issued when a value of this type exists. The transactional prepared
/// slot lives here so it can never outlive its transaction.
pub struct Tx {
    conn: Object,
    prepared: Option<Statement>,
}

/// Check a connection out of `pool` and issue `BEGIN` on it.
///
/// # Errors
///
/// Returns pool checkout errors or the underlying driver error.
pub async fn begin(pool: &Pool) -> Result<Tx, SqlClientError> {
    let conn = pool
        .get()
        .await
        .map_err(SqlClientError::PoolErrorPostgres)?;
    conn.batch_execute("BEGIN").await?;
    Ok(Tx {
        conn,
        prepared: None,
    })
}

impl Tx {
    /// Run a SELECT inside the transaction.
    ///
    /// # Errors
    ///
    /// Returns the underlying driver error.
    pub async fn execute_select(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlClientError> {
        let converted = Params::convert(params)?;
        let rows = self.conn.query(query, converted.as_refs()).await?;
        build_result_set_from_rows(&rows)
    }

    /// Run a DML statement inside the transaction; returns rows affected.
    ///
    /// # Errors
    ///
    /// Returns the underlying driver error.
    pub async fn execute_dml(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<usize, SqlClientError> {
        let converted = Params::convert(params)?;
        let affected = self.conn.execute(query, converted.as_refs()).await?;
        usize::try_from(affected).map_err(|e| {
            SqlClientError::ExecutionError(format!("postgres affected rows conversion error: {e}"))
        })
    }

    /// Install (or replace) the transaction's prepared statement.
    ///
    /// # Errors
    ///
    /// Returns the underlying driver error.
    pub async fn prepare(&mut self, sql: &str) -> Result<(), SqlClientError> {
        let stmt = self.conn.prepare(sql).await?;
        self.prepared = Some(stmt);
        Ok(())
    }

    /// Run the transaction's prepared statement as a SELECT.
    ///
    /// # Errors
    ///
    /// Returns `SqlClientError::PrepareTransactionRequired` if no statement
    /// is installed, otherwise the underlying driver error.
    pub async fn query_prepared(&self, params: &[RowValues]) -> Result<ResultSet, SqlClientError> {
        let stmt = self.prepared_statement()?;
        let converted = Params::convert(params)?;
        let rows = self.conn.query(stmt, converted.as_refs()).await?;
        build_result_set_from_statement(stmt, &rows)
    }

    /// Run the transaction's prepared statement as DML; returns rows
    /// affected.
    ///
    /// # Errors
    ///
    /// Returns `SqlClientError::PrepareTransactionRequired` if no statement
    /// is installed, otherwise the underlying driver error.
    pub async fn execute_prepared(&self, params: &[RowValues]) -> Result<usize, SqlClientError> {
        let stmt = self.prepared_statement()?;
        let converted = Params::convert(params)?;
        let affected = self.conn.execute(stmt, converted.as_refs()).await?;
        usize::try_from(affected).map_err(|e| {
            SqlClientError::ExecutionError(format!("postgres affected rows conversion error: {e}"))
        })
    }

    /// Commit and release the held connection back to the pool.
    ///
    /// # Errors
    ///
    /// Returns the underlying driver error.
    pub async fn commit(self) -> Result<(), SqlClientError> {
        self.conn.batch_execute("COMMIT").await?;
        Ok(())
    }

    /// Roll back and release the held connection back to the pool.
    ///
    /// # Errors
    ///
    /// Returns the underlying driver error.
    pub async fn rollback(self) -> Result<(), SqlClientError> {
        self.conn.batch_execute("ROLLBACK").await?;
        Ok(())
    }

    fn prepared_statement(&self) -> Result<&Statement, SqlClientError> {
        self.prepared
            .as_ref()
            .ok_or(SqlClientError::PrepareTransactionRequired)
    }
}
