//! SQL Server backend via Tiberius.
//!
//! Tiberius exposes no client-side prepared-statement handle, so prepared
//! slots here pin a pool checkout and re-bind the stored SQL on each
//! execution. Transactions are driven with `BEGIN TRAN` / `COMMIT TRAN` /
//! `ROLLBACK TRAN` on the held connection.

use std::borrow::Cow;
use std::fmt;

use deadpool::Runtime;
use deadpool::managed::{Manager, Metrics, Object, Pool, RecycleError, RecycleResult};
use futures_util::TryStreamExt;
use tiberius::{Client, ColumnData, ToSql};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use crate::error::SqlClientError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Type alias for the SQL Server client.
pub type MssqlClient = Client<Compat<TcpStream>>;

/// Deadpool manager for SQL Server connections.
pub struct MssqlManager {
    config: tiberius::Config,
}

impl fmt::Debug for MssqlManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MssqlManager").finish_non_exhaustive()
    }
}

impl Manager for MssqlManager {
    type Type = MssqlClient;
    type Error = tiberius::error::Error;

    async fn create(&self) -> Result<Self::Type, Self::Error> {
        let config = self.config.clone();
        let tcp = TcpStream::connect(config.get_addr())
            .await
            .map_err(|e| tiberius::error::Error::Io {
                kind: e.kind(),
                message: format!("TCP connection error: {e}"),
            })?;
        Client::connect(config, tcp.compat_write()).await
    }

    async fn recycle(
        &self,
        client: &mut Self::Type,
        _metrics: &Metrics,
    ) -> RecycleResult<Self::Error> {
        match client.simple_query("SELECT 1").await {
            Ok(stream) => {
                stream
                    .into_results()
                    .await
                    .map_err(RecycleError::Backend)?;
                Ok(())
            }
            Err(e) => Err(RecycleError::Backend(e)),
        }
    }
}

/// Build a SQL Server pool from an ADO.NET-style connection string.
///
/// # Errors
///
/// Returns `SqlClientError::ConfigError` for an unparseable DSN,
/// `SqlClientError::ConnectionError` if pool creation fails, or the
/// underlying driver error if the smoke query fails.
pub async fn new_pool(
    dsn: &str,
    max_open: usize,
) -> Result<Pool<MssqlManager>, SqlClientError> {
    let config = tiberius::Config::from_ado_string(dsn)
        .map_err(|e| SqlClientError::ConfigError(format!("invalid SQL Server DSN: {e}")))?;

    let pool = Pool::builder(MssqlManager { config })
        .max_size(max_open)
        .wait_timeout(Some(crate::pool::CHECKOUT_WAIT))
        .runtime(Runtime::Tokio1)
        .build()
        .map_err(|e| {
            SqlClientError::ConnectionError(format!("Failed to create SQL Server pool: {e}"))
        })?;

    let mut conn = pool.get().await.map_err(SqlClientError::PoolErrorMssql)?;
    run_simple(&mut conn, "SELECT 1").await?;

    Ok(pool)
}

impl ToSql for RowValues {
    fn to_sql(&self) -> ColumnData<'_> {
        match self {
            RowValues::Int(i) => ColumnData::I64(Some(*i)),
            RowValues::Float(f) => ColumnData::F64(Some(*f)),
            RowValues::Text(s) => ColumnData::String(Some(Cow::from(s.as_str()))),
            RowValues::Bool(b) => ColumnData::Bit(Some(*b)),
            RowValues::Timestamp(dt) => ColumnData::String(Some(Cow::from(dt.to_string()))),
            RowValues::Null => ColumnData::String(None),
            RowValues::JSON(jsval) => ColumnData::String(Some(Cow::from(jsval.to_string()))),
            RowValues::Blob(bytes) => ColumnData::Binary(Some(Cow::from(bytes.as_slice()))),
        }
    }
}

fn param_refs(params: &[RowValues]) -> Vec<&dyn ToSql> {
    params.iter().map(|p| p as &dyn ToSql).collect()
}

async fn run_simple(client: &mut MssqlClient, sql: &str) -> Result<(), SqlClientError> {
    let stream = client.simple_query(sql).await?;
    stream.into_results().await?;
    Ok(())
}

/// Run a SELECT on `client` and materialize all rows.
///
/// # Errors
///
/// Returns the underlying driver error.
pub async fn build_result_set(
    client: &mut MssqlClient,
    query: &str,
    params: &[RowValues],
) -> Result<ResultSet, SqlClientError> {
    let refs = param_refs(params);
    let mut stream = client.query(query, &refs).await?;

    let columns = stream.columns().await?.unwrap_or_default().to_vec();
    let column_names: Vec<String> = columns.iter().map(|col| col.name().to_string()).collect();
    let column_count = column_names.len();

    let mut result_set = ResultSet::with_capacity(10);
    result_set.set_column_names(std::sync::Arc::new(column_names));

    let mut rows = stream.into_row_stream();
    while let Some(row) = rows.try_next().await? {
        let mut values = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            values.push(extract_value(&row, idx));
        }
        result_set.add_row_values(values);
    }

    Ok(result_set)
}

/// Extract a value from a Tiberius row, probing the common column types.
fn extract_value(row: &tiberius::Row, idx: usize) -> RowValues {
    if let Ok(Some(val)) = row.try_get::<i32, _>(idx) {
        return RowValues::Int(i64::from(val));
    }
    if let Ok(Some(val)) = row.try_get::<i64, _>(idx) {
        return RowValues::Int(val);
    }
    if let Ok(Some(val)) = row.try_get::<f32, _>(idx) {
        return RowValues::Float(f64::from(val));
    }
    if let Ok(Some(val)) = row.try_get::<f64, _>(idx) {
        return RowValues::Float(val);
    }
    if let Ok(Some(val)) = row.try_get::<bool, _>(idx) {
        return RowValues::Bool(val);
    }
    if let Ok(Some(val)) = row.try_get::<&str, _>(idx) {
        return RowValues::Text(val.to_string());
    }
    if let Ok(Some(val)) = row.try_get::<&[u8], _>(idx) {
        return RowValues::Blob(val.to_vec());
    }
    RowValues::Null
}

/// Execute a SELECT on a per-call pool checkout.
///
/// # Errors
///
/// Returns pool checkout errors or the underlying driver error.
pub async fn execute_select(
    pool: &Pool<MssqlManager>,
    query: &str,
    params: &[RowValues],
) -> Result<ResultSet, SqlClientError> {
    let mut conn = pool.get().await.map_err(SqlClientError::PoolErrorMssql)?;
    build_result_set(&mut conn, query, params).await
}

/// Execute a DML statement on a per-call pool checkout; returns rows
/// affected.
///
/// # Errors
///
/// Returns pool checkout errors or the underlying driver error.
pub async fn execute_dml(
    pool: &Pool<MssqlManager>,
    query: &str,
    params: &[RowValues],
) -> Result<usize, SqlClientError> {
    let mut conn = pool.get().await.map_err(SqlClientError::PoolErrorMssql)?;
    dml_on_client(&mut conn, query, params).await
}

async fn dml_on_client(
    client: &mut MssqlClient,
    query: &str,
    params: &[RowValues],
) -> Result<usize, SqlClientError> {
    let refs = param_refs(params);
    let result = client.execute(query, &refs).await?;
    let affected: u64 = result.rows_affected().iter().sum();
    usize::try_from(affected).map_err(|e| {
        SqlClientError::ExecutionError(format!("mssql affected rows conversion error: {e}"))
    })
}

/// A prepared statement pinned to a held pool checkout.
///
/// Tiberius binds parameters at execution via `sp_executesql`; the slot
/// stores the SQL text and replays it with fresh parameters each call.
pub struct Prepared {
    conn: Object<MssqlManager>,
    sql: String,
}

/// Check a connection out of `pool` and install `sql` on it.
///
/// # Errors
///
/// Returns pool checkout errors.
pub async fn prepare(
    pool: &Pool<MssqlManager>,
    sql: &str,
) -> Result<Prepared, SqlClientError> {
    let conn = pool.get().await.map_err(SqlClientError::PoolErrorMssql)?;
    Ok(Prepared {
        conn,
        sql: sql.to_owned(),
    })
}

impl Prepared {
    /// Run the statement as a SELECT.
    ///
    /// # Errors
    ///
    /// Returns the underlying driver error.
    pub async fn query(&mut self, params: &[RowValues]) -> Result<ResultSet, SqlClientError> {
        let sql = self.sql.clone();
        build_result_set(&mut self.conn, &sql, params).await
    }

    /// Run the statement as DML; returns rows affected.
    ///
    /// # Errors
    ///
    /// Returns the underlying driver error.
    pub async fn execute(&mut self, params: &[RowValues]) -> Result<usize, SqlClientError> {
        let sql = self.sql.clone();
        dml_on_client(&mut self.conn, &sql, params).await
    }
}

/// An open SQL Server transaction.
///
/// Owns the pool checkout for the transaction's lifetime; `BEGIN TRAN` has
/// already been issued when a value of this type exists.
pub struct Tx {
    conn: Object<MssqlManager>,
    prepared: Option<String>,
}

/// Check a connection out of `pool` and issue `BEGIN TRAN` on it.
///
/// # Errors
///
/// Returns pool checkout errors or the underlying driver error.
pub async fn begin(pool: &Pool<MssqlManager>) -> Result<Tx, SqlClientError> {
    let mut conn = pool.get().await.map_err(SqlClientError::PoolErrorMssql)?;
    run_simple(&mut conn, "BEGIN TRAN").await?;
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
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlClientError> {
        build_result_set(&mut self.conn, query, params).await
    }

    /// Run a DML statement inside the transaction; returns rows affected.
    ///
    /// # Errors
    ///
    /// Returns the underlying driver error.
    pub async fn execute_dml(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<usize, SqlClientError> {
        dml_on_client(&mut self.conn, query, params).await
    }

    /// Install (or replace) the transaction's prepared statement.
    ///
    /// # Errors
    ///
    /// Infallible today; kept fallible for parity with the other backends.
    pub async fn prepare(&mut self, sql: &str) -> Result<(), SqlClientError> {
        self.prepared = Some(sql.to_owned());
        Ok(())
    }

    /// Run the transaction's prepared statement as a SELECT.
    ///
    /// # Errors
    ///
    /// Returns `SqlClientError::PrepareTransactionRequired` if no statement
    /// is installed, otherwise the underlying driver error.
    pub async fn query_prepared(
        &mut self,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlClientError> {
        let sql = self.prepared_sql()?;
        build_result_set(&mut self.conn, &sql, params).await
    }

    /// Run the transaction's prepared statement as DML; returns rows
    /// affected.
    ///
    /// # Errors
    ///
    /// Returns `SqlClientError::PrepareTransactionRequired` if no statement
    /// is installed, otherwise the underlying driver error.
    pub async fn execute_prepared(
        &mut self,
        params: &[RowValues],
    ) -> Result<usize, SqlClientError> {
        let sql = self.prepared_sql()?;
        dml_on_client(&mut self.conn, &sql, params).await
    }

    /// Commit and release the held connection back to the pool.
    ///
    /// # Errors
    ///
    /// Returns the underlying driver error.
    pub async fn commit(mut self) -> Result<(), SqlClientError> {
        run_simple(&mut self.conn, "COMMIT TRAN").await
    }

    /// Roll back and release the held connection back to the pool.
    ///
    /// # Errors
    ///
    /// Returns the underlying driver error.
    pub async fn rollback(mut self) -> Result<(), SqlClientError> {
        run_simple(&mut self.conn, "ROLLBACK TRAN").await
    }

    fn prepared_sql(&self) -> Result<String, SqlClientError> {
        self.prepared
            .clone()
            .ok_or(SqlClientError::PrepareTransactionRequired)
    }
}
