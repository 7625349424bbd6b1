use crate::error::SqlClientError;
use crate::results::ResultSet;
use crate::types::RowValues;

use super::params::Params;
use super::query::build_result_set;
use super::interact;

/// Execute a SELECT on a per-call pool checkout.
///
/// # Errors
///
/// Returns pool checkout errors or the underlying rusqlite error.
pub async fn execute_select(
    pool: &deadpool_sqlite::Pool,
    query: &str,
    params: &[RowValues],
) -> Result<ResultSet, SqlClientError> {
    let conn = pool.get().await.map_err(SqlClientError::PoolErrorSqlite)?;
    let sql = query.to_owned();
    let values = Params::convert(params)?.0;
    interact(&conn, move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        build_result_set(&mut stmt, &values)
    })
    .await
}

/// Execute a DML statement on a per-call pool checkout; returns rows affected.
///
/// # Errors
///
/// Returns pool checkout errors or the underlying rusqlite error.
pub async fn execute_dml(
    pool: &deadpool_sqlite::Pool,
    query: &str,
    params: &[RowValues],
) -> Result<usize, SqlClientError> {
    let conn = pool.get().await.map_err(SqlClientError::PoolErrorSqlite)?;
    let sql = query.to_owned();
    let values = Params::convert(params)?.0;
    interact(&conn, move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let params = Params(values);
        let refs = params.as_refs();
        let affected = stmt.execute(&refs[..])?;
        Ok(affected)
    })
    .await
}
