use deadpool_postgres::Pool;

use crate::error::SqlClientError;
use crate::results::ResultSet;
use crate::types::RowValues;

use super::params::Params;
use super::query::build_result_set_from_rows;

/// Execute a SELECT on a per-call pool checkout.
///
/// # Errors
///
/// Returns pool checkout errors or the underlying driver error.
pub async fn execute_select(
    pool: &Pool,
    query: &str,
    params: &[RowValues],
) -> Result<ResultSet, SqlClientError> {
    let conn = pool
        .get()
        .await
        .map_err(SqlClientError::PoolErrorPostgres)?;
    let converted = Params::convert(params)?;
    let rows = conn.query(query, converted.as_refs()).await?;
    build_result_set_from_rows(&rows)
}

/// Execute a DML statement on a per-call pool checkout; returns rows
/// affected.
///
/// # Errors
///
/// Returns pool checkout errors or the underlying driver error.
pub async fn execute_dml(
    pool: &Pool,
    query: &str,
    params: &[RowValues],
) -> Result<usize, SqlClientError> {
    let conn = pool
        .get()
        .await
        .map_err(SqlClientError::PoolErrorPostgres)?;
    let converted = Params::convert(params)?;
    let affected = conn.execute(query, converted.as_refs()).await?;
    usize::try_from(affected).map_err(|e| {
        SqlClientError::ExecutionError(format!("postgres affected rows conversion error: {e}"))
    })
}
