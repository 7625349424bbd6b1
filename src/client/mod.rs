mod prepared;
mod transaction;

use std::fmt;

use tracing::{debug, trace};

use crate::error::SqlClientError;
use crate::outcome::TxOutcome;
use crate::pool::DriverPool;
use crate::results::{CustomDbRow, ResultSet};
use crate::types::{DatabaseType, RowValues};

use prepared::PreparedStatement;
use transaction::ClientTransaction;

/// A stateful SQL client with a uniform contract across backends.
///
/// The handle owns up to four resources, layered strictly: the connection
/// pool (installed by [`open`](Self::open)), an optional prepared statement,
/// an optional transaction, and inside the transaction an optional
/// transactional prepared statement. Calling an operation whose layer is not
/// present fails with one of four stable precondition errors, e.g.
/// `please call Open first`; everything below the client passes through
/// untouched.
///
/// A handle is meant for single-task use; hold one handle per concurrent
/// transaction.
///
/// ```rust
/// # async fn demo() -> Result<(), sql_client::SqlClientError> {
/// use sql_client::{RowValues, SqlClient, TxOutcome};
///
/// let mut client = SqlClient::new();
/// client.open("sqlite", ":memory:", 1).await?;
/// client.execute("CREATE TABLE t (a INT)", &[]).await?;
/// client
///     .execute("INSERT INTO t VALUES (?1)", &[RowValues::Int(1)])
///     .await?;
///
/// let row = client.query_row("SELECT a FROM t", &[]).await?.unwrap();
/// assert_eq!(row.get("a").unwrap().as_int(), Some(&1));
///
/// client.begin_transaction().await?;
/// client
///     .execute_transaction("UPDATE t SET a = ?1", &[RowValues::Int(2)])
///     .await?;
/// client.end_transaction(TxOutcome::Commit).await?;
/// client.close().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct SqlClient {
    driver: Option<DatabaseType>,
    pool: Option<DriverPool>,
    prepared: Option<PreparedStatement>,
    tx: Option<ClientTransaction>,
}

impl SqlClient {
    /// Create a closed handle; call [`open`](Self::open) before anything
    /// else.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a connection pool for `driver_tag` against the opaque `dsn`.
    ///
    /// `max_open` is handed to the pool's max-size knob; the client itself
    /// never queues or throttles. An already-open handle is closed first, so
    /// a re-open discards the previous connection, prepared statement, and
    /// transaction.
    ///
    /// A prepared statement and a transaction each pin one pool connection
    /// for their lifetime, so size `max_open` for the slots you hold plus
    /// the direct traffic running beside them. An operation that cannot get
    /// a connection within a few seconds fails with the pool's timeout error
    /// instead of waiting indefinitely.
    ///
    /// # Errors
    ///
    /// Returns `SqlClientError::ConfigError` for an unknown tag or bad DSN,
    /// `SqlClientError::Unimplemented` for a tag whose driver binding is not
    /// compiled into this build, or the driver's own error if the connection
    /// smoke test fails.
    pub async fn open(
        &mut self,
        driver_tag: &str,
        dsn: &str,
        max_open: usize,
    ) -> Result<(), SqlClientError> {
        let driver = DatabaseType::from_tag(driver_tag)?;
        self.close().await?;
        let pool = DriverPool::open(driver, dsn, max_open).await?;
        debug!(driver = driver.tag(), "opened connection pool");
        self.driver = Some(driver);
        self.pool = Some(pool);
        Ok(())
    }

    /// Close the handle, releasing the transactional prepared statement, the
    /// transaction, the prepared statement, and the pool, in that order.
    ///
    /// Idempotent: closing a fresh or already-closed handle succeeds. An
    /// in-flight transaction gets a best-effort rollback so its connection
    /// is never recycled mid-transaction.
    ///
    /// # Errors
    ///
    /// Never fails today; the `Result` is part of the contract.
    pub async fn close(&mut self) -> Result<(), SqlClientError> {
        if let Some(tx) = self.tx.take() {
            if let Err(e) = tx.rollback().await {
                debug!(error = %e, "rollback during close failed");
            }
        }
        self.prepared = None;
        if self.pool.take().is_some() {
            debug!("closed connection pool");
        }
        self.driver = None;
        Ok(())
    }

    /// The driver tag the handle is currently open against, or `None` when
    /// closed.
    #[must_use]
    pub fn driver(&self) -> Option<DatabaseType> {
        self.driver
    }

    /// Run a SELECT outside any transaction and materialize all rows.
    ///
    /// # Errors
    ///
    /// Returns `SqlClientError::OpenRequired` on a closed handle, otherwise
    /// the driver's error.
    pub async fn query(
        &mut self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlClientError> {
        self.pool()?.execute_select(sql, params).await
    }

    /// Run a SELECT and return its first row, if any.
    ///
    /// The whole result set is materialized before the first row is taken;
    /// bound a statement that can match many rows with `LIMIT 1` (or the
    /// driver's equivalent).
    ///
    /// # Errors
    ///
    /// Returns `SqlClientError::OpenRequired` on a closed handle, otherwise
    /// the driver's error.
    pub async fn query_row(
        &mut self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<Option<CustomDbRow>, SqlClientError> {
        Ok(self.query(sql, params).await?.results.into_iter().next())
    }

    /// Run a DML statement outside any transaction.
    ///
    /// The rows-affected count is always harvested from the driver, because
    /// some drivers only surface execution errors when it is computed, then
    /// discarded.
    ///
    /// # Errors
    ///
    /// Returns `SqlClientError::OpenRequired` on a closed handle, otherwise
    /// the driver's error.
    pub async fn execute(
        &mut self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<(), SqlClientError> {
        let affected = self.pool()?.execute_dml(sql, params).await?;
        trace!(rows_affected = affected, "execute");
        Ok(())
    }

    /// Install (or replace) the non-transactional prepared statement.
    ///
    /// The statement pins one pool connection until it is replaced or the
    /// handle is closed; open with `max_open` of at least two to keep direct
    /// operations runnable beside it.
    ///
    /// # Errors
    ///
    /// Returns `SqlClientError::OpenRequired` on a closed handle, otherwise
    /// the driver's error if the SQL does not prepare.
    pub async fn set_prepare(&mut self, sql: &str) -> Result<(), SqlClientError> {
        let pool = self.pool.as_ref().ok_or(SqlClientError::OpenRequired)?;
        let statement = PreparedStatement::prepare(pool, sql).await?;
        self.prepared = Some(statement);
        Ok(())
    }

    /// Run the installed prepared statement as a SELECT.
    ///
    /// # Errors
    ///
    /// Returns `SqlClientError::PrepareRequired` when no statement is
    /// installed, otherwise the driver's error.
    pub async fn query_prepare(
        &mut self,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlClientError> {
        self.prepared()?.query(params).await
    }

    /// Run the installed prepared statement and return its first row, if
    /// any. As with [`query_row`](Self::query_row), the whole result set is
    /// materialized first.
    ///
    /// # Errors
    ///
    /// Returns `SqlClientError::PrepareRequired` when no statement is
    /// installed, otherwise the driver's error.
    pub async fn query_row_prepare(
        &mut self,
        params: &[RowValues],
    ) -> Result<Option<CustomDbRow>, SqlClientError> {
        Ok(self
            .query_prepare(params)
            .await?
            .results
            .into_iter()
            .next())
    }

    /// Run the installed prepared statement as DML.
    ///
    /// # Errors
    ///
    /// Returns `SqlClientError::PrepareRequired` when no statement is
    /// installed, otherwise the driver's error.
    pub async fn execute_prepare(&mut self, params: &[RowValues]) -> Result<(), SqlClientError> {
        let affected = self.prepared()?.execute(params).await?;
        trace!(rows_affected = affected, "execute_prepare");
        Ok(())
    }

    /// Begin a transaction on a dedicated pool checkout.
    ///
    /// At most one transaction is active per handle. The checkout is pinned
    /// until the transaction ends, so size `max_open` to leave room for any
    /// direct operations run while it is open.
    ///
    /// # Errors
    ///
    /// Returns `SqlClientError::OpenRequired` on a closed handle,
    /// `SqlClientError::ExecutionError` if a transaction is already active,
    /// otherwise the driver's error.
    pub async fn begin_transaction(&mut self) -> Result<(), SqlClientError> {
        let pool = self.pool.as_ref().ok_or(SqlClientError::OpenRequired)?;
        if self.tx.is_some() {
            return Err(SqlClientError::ExecutionError(
                "transaction already in progress".into(),
            ));
        }
        self.tx = Some(ClientTransaction::begin(pool).await?);
        debug!("transaction started");
        Ok(())
    }

    /// End the active transaction: commit on [`TxOutcome::Commit`], roll
    /// back on [`TxOutcome::Rollback`].
    ///
    /// `outcome` also accepts `&Result<_, _>` directly, preserving the usual
    /// idiom of handing over the result of the transactional work. The
    /// transaction (and its prepared statement) is consumed unconditionally,
    /// even when the commit or rollback itself fails.
    ///
    /// # Errors
    ///
    /// Returns `SqlClientError::TransactionRequired` when no transaction is
    /// active, otherwise the driver's commit/rollback error.
    pub async fn end_transaction<O>(&mut self, outcome: O) -> Result<(), SqlClientError>
    where
        O: Into<TxOutcome>,
    {
        let tx = self.tx.take().ok_or(SqlClientError::TransactionRequired)?;
        let outcome = outcome.into();
        debug!(?outcome, "transaction ended");
        match outcome {
            TxOutcome::Commit => tx.commit().await,
            TxOutcome::Rollback => tx.rollback().await,
        }
    }

    /// Run a SELECT inside the active transaction.
    ///
    /// # Errors
    ///
    /// Returns `SqlClientError::TransactionRequired` when no transaction is
    /// active, otherwise the driver's error.
    pub async fn query_transaction(
        &mut self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlClientError> {
        self.tx()?.execute_select(sql, params).await
    }

    /// Run a SELECT inside the active transaction and return its first row,
    /// if any. As with [`query_row`](Self::query_row), the whole result set
    /// is materialized first.
    ///
    /// # Errors
    ///
    /// Returns `SqlClientError::TransactionRequired` when no transaction is
    /// active, otherwise the driver's error.
    pub async fn query_row_transaction(
        &mut self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<Option<CustomDbRow>, SqlClientError> {
        Ok(self
            .query_transaction(sql, params)
            .await?
            .results
            .into_iter()
            .next())
    }

    /// Run a DML statement inside the active transaction.
    ///
    /// A driver error here does not roll back; hand the error (or any
    /// `Result`) to [`end_transaction`](Self::end_transaction) to do that.
    ///
    /// # Errors
    ///
    /// Returns `SqlClientError::TransactionRequired` when no transaction is
    /// active, otherwise the driver's error.
    pub async fn execute_transaction(
        &mut self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<(), SqlClientError> {
        let affected = self.tx()?.execute_dml(sql, params).await?;
        trace!(rows_affected = affected, "execute_transaction");
        Ok(())
    }

    /// Install (or replace) the active transaction's prepared statement.
    ///
    /// The statement is discarded when the transaction ends.
    ///
    /// # Errors
    ///
    /// Returns `SqlClientError::TransactionRequired` when no transaction is
    /// active, otherwise the driver's error.
    pub async fn set_prepare_transaction(&mut self, sql: &str) -> Result<(), SqlClientError> {
        self.tx()?.prepare(sql).await
    }

    /// Run the transaction's prepared statement as a SELECT.
    ///
    /// # Errors
    ///
    /// Returns `SqlClientError::PrepareTransactionRequired` when no
    /// transactional statement is installed (including when no transaction
    /// is active at all), otherwise the driver's error.
    pub async fn query_prepare_transaction(
        &mut self,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlClientError> {
        match self.tx.as_mut() {
            Some(tx) => tx.query_prepared(params).await,
            None => Err(SqlClientError::PrepareTransactionRequired),
        }
    }

    /// Run the transaction's prepared statement and return its first row,
    /// if any. As with [`query_row`](Self::query_row), the whole result set
    /// is materialized first.
    ///
    /// # Errors
    ///
    /// Returns `SqlClientError::PrepareTransactionRequired` when no
    /// transactional statement is installed (including when no transaction
    /// is active at all), otherwise the driver's error.
    pub async fn query_row_prepare_transaction(
        &mut self,
        params: &[RowValues],
    ) -> Result<Option<CustomDbRow>, SqlClientError> {
        Ok(self
            .query_prepare_transaction(params)
            .await?
            .results
            .into_iter()
            .next())
    }

    /// Run the transaction's prepared statement as DML.
    ///
    /// # Errors
    ///
    /// Returns `SqlClientError::PrepareTransactionRequired` when no
    /// transactional statement is installed (including when no transaction
    /// is active at all), otherwise the driver's error.
    pub async fn execute_prepare_transaction(
        &mut self,
        params: &[RowValues],
    ) -> Result<(), SqlClientError> {
        let affected = match self.tx.as_mut() {
            Some(tx) => tx.execute_prepared(params).await?,
            None => return Err(SqlClientError::PrepareTransactionRequired),
        };
        trace!(rows_affected = affected, "execute_prepare_transaction");
        Ok(())
    }

    fn pool(&self) -> Result<&DriverPool, SqlClientError> {
        self.pool.as_ref().ok_or(SqlClientError::OpenRequired)
    }

    fn prepared(&mut self) -> Result<&mut PreparedStatement, SqlClientError> {
        self.prepared.as_mut().ok_or(SqlClientError::PrepareRequired)
    }

    fn tx(&mut self) -> Result<&mut ClientTransaction, SqlClientError> {
        self.tx.as_mut().ok_or(SqlClientError::TransactionRequired)
    }
}

impl fmt::Debug for SqlClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlClient")
            .field("driver", &self.driver)
            .field("open", &self.pool.is_some())
            .field("prepared", &self.prepared.is_some())
            .field("transaction", &self.tx.is_some())
            .finish()
    }
}
