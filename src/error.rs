use thiserror::Error;

#[cfg(feature = "sqlite")]
use deadpool_sqlite::rusqlite;

/// Error type for every fallible operation on [`crate::SqlClient`].
///
/// Two kinds of failure exist. Precondition errors are raised by the client
/// itself when an operation is called out of sequence; their `Display`
/// renderings are stable strings that callers and test suites match on.
/// Everything else originates below the client and is passed through
/// unchanged via the transparent variants.
#[derive(Debug, Error)]
pub enum SqlClientError {
    /// A connection-level operation was called before `open`.
    #[error("please call Open first")]
    OpenRequired,

    /// A prepared-statement operation was called with no statement installed.
    #[error("please call SetPrepare first")]
    PrepareRequired,

    /// A transactional operation was called with no transaction active.
    #[error("please call BeginTransaction first")]
    TransactionRequired,

    /// A transactional prepared-statement operation was called with no
    /// statement installed on the active transaction.
    #[error("please call SetPrepareTransaction first")]
    PrepareTransactionRequired,

    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[cfg(feature = "mssql")]
    #[error(transparent)]
    MssqlError(#[from] tiberius::error::Error),

    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PoolErrorPostgres(#[from] deadpool_postgres::PoolError),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    PoolErrorSqlite(#[from] deadpool::managed::PoolError<rusqlite::Error>),

    #[cfg(feature = "mssql")]
    #[error(transparent)]
    PoolErrorMssql(#[from] deadpool::managed::PoolError<tiberius::error::Error>),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Unimplemented feature: {0}")]
    Unimplemented(String),
}

#[cfg(feature = "sqlite")]
impl From<deadpool_sqlite::InteractError> for SqlClientError {
    fn from(err: deadpool_sqlite::InteractError) -> Self {
        SqlClientError::ConnectionError(format!("SQLite interact error: {err}"))
    }
}
