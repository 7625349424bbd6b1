use std::sync::Arc;

use crate::error::SqlClientError;
use crate::results::ResultSet;
use crate::types::RowValues;

use super::params::Params;
use super::query::build_result_set;
use super::interact;

/// An open `SQLite` transaction.
///
/// Owns the pool checkout for the transaction's lifetime; `BEGIN` has already
/// been issued when a value of this type exists. The transactional prepared
/// slot lives here so it can never outlive its transaction.
pub struct Tx {
    conn: deadpool_sqlite::Object,
    prepared: Option<Arc<String>>,
}

/// Check a connection out of `pool` and issue `BEGIN` on it.
///
/// # Errors
///
/// Returns pool checkout errors or the underlying rusqlite error.
pub async fn begin(pool: &deadpool_sqlite::Pool) -> Result<Tx, SqlClientError> {
    let conn = pool.get().await.map_err(SqlClientError::PoolErrorSqlite)?;
    interact(&conn, |conn| {
        conn.execute_batch("BEGIN")
            .map_err(SqlClientError::SqliteError)
    })
    .await?;
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
    /// Returns the underlying rusqlite error.
    pub async fn execute_select(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlClientError> {
        let sql = query.to_owned();
        let values = Params::convert(params)?.0;
        interact(&self.conn, move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            build_result_set(&mut stmt, &values)
        })
        .await
    }

    /// Run a DML statement inside the transaction; returns rows affected.
    ///
    /// # Errors
    ///
    /// Returns the underlying rusqlite error.
    pub async fn execute_dml(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<usize, SqlClientError> {
        let sql = query.to_owned();
        let values = Params::convert(params)?.0;
        interact(&self.conn, move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let params = Params(values);
            let refs = params.as_refs();
            let affected = stmt.execute(&refs[..])?;
            Ok(affected)
        })
        .await
    }

    /// Install (or replace) the transaction's prepared statement.
    ///
    /// # Errors
    ///
    /// Returns the rusqlite error if the SQL does not compile.
    pub async fn prepare(&mut self, sql: &str) -> Result<(), SqlClientError> {
        let sql = Arc::new(sql.to_owned());
        let warm = Arc::clone(&sql);
        interact(&self.conn, move |conn| {
            conn.prepare_cached(&warm)?;
            Ok(())
        })
        .await?;
        self.prepared = Some(sql);
        Ok(())
    }

    /// Run the transaction's prepared statement as a SELECT.
    ///
    /// # Errors
    ///
    /// Returns `SqlClientError::PrepareTransactionRequired` if no statement
    /// is installed, otherwise the underlying rusqlite error.
    pub async fn query_prepared(&self, params: &[RowValues]) -> Result<ResultSet, SqlClientError> {
        let sql = self.prepared_sql()?;
        let values = Params::convert(params)?.0;
        interact(&self.conn, move |conn| {
            let mut stmt = conn.prepare_cached(&sql)?;
            build_result_set(&mut stmt, &values)
        })
        .await
    }

    /// Run the transaction's prepared statement as DML; returns rows
    /// affected.
    ///
    /// # Errors
    ///
    /// Returns `SqlClientError::PrepareTransactionRequired` if no statement
    /// is installed, otherwise the underlying rusqlite error.
    pub async fn execute_prepared(&self, params: &[RowValues]) -> Result<usize, SqlClientError> {
        let sql = self.prepared_sql()?;
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

    /// Commit and release the held connection back to the pool.
    ///
    /// # Errors
    ///
    /// Returns the underlying rusqlite error.
    pub async fn commit(self) -> Result<(), SqlClientError> {
        interact(&self.conn, |conn| {
            conn.execute_batch("COMMIT")
                .map_err(SqlClientError::SqliteError)
        })
        .await
    }

    /// Roll back and release the held connection back to the pool.
    ///
    /// # Errors
    ///
    /// Returns the underlying rusqlite error.
    pub async fn rollback(self) -> Result<(), SqlClientError> {
        interact(&self.conn, |conn| {
            conn.execute_batch("ROLLBACK")
                .map_err(SqlClientError::SqliteError)
        })
        .await
    }

    fn prepared_sql(&self) -> Result<Arc<String>, SqlClientError> {
        self.prepared
            .as_ref()
            .map(Arc::clone)
            .ok_or(SqlClientError::PrepareTransactionRequired)
    }
}
