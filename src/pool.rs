use std::fmt;
use std::time::Duration;

use crate::error::SqlClientError;
use crate::results::ResultSet;
use crate::types::{DatabaseType, RowValues};

/// How long a checkout waits for a free connection before failing with the
/// pool's timeout error. Prepared statements and transactions pin a
/// connection each, so an undersized pool would otherwise block forever.
pub(crate) const CHECKOUT_WAIT: Duration = Duration::from_secs(5);

/// Driver-supplied connection pool, one variant per compiled-in backend.
///
/// Direct (non-prepared, non-transactional) operations check a connection out
/// of the pool per call; prepared statements and transactions hold a checkout
/// for their whole lifetime instead.
pub(crate) enum DriverPool {
    #[cfg(feature = "sqlite")]
    Sqlite(deadpool_sqlite::Pool),
    #[cfg(feature = "postgres")]
    Postgres(deadpool_postgres::Pool),
    #[cfg(feature = "mssql")]
    Mssql(deadpool::managed::Pool<crate::mssql::MssqlManager>),
}

// Manual Debug because the tiberius manager doesn't implement it.
impl fmt::Debug for DriverPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(pool) => f.debug_tuple("Sqlite").field(pool).finish(),
            #[cfg(feature = "postgres")]
            Self::Postgres(pool) => f.debug_tuple("Postgres").field(pool).finish(),
            #[cfg(feature = "mssql")]
            Self::Mssql(_) => f.debug_tuple("Mssql").field(&"<TiberiusPool>").finish(),
        }
    }
}

impl DriverPool {
    /// Build the pool for `driver`, handing the opaque DSN to the backend and
    /// `max_open` to the pool's max-size knob.
    pub(crate) async fn open(
        driver: DatabaseType,
        dsn: &str,
        max_open: usize,
    ) -> Result<Self, SqlClientError> {
        match driver {
            #[cfg(feature = "sqlite")]
            DatabaseType::Sqlite => Ok(Self::Sqlite(crate::sqlite::new_pool(dsn, max_open).await?)),
            #[cfg(feature = "postgres")]
            DatabaseType::Postgres => {
                Ok(Self::Postgres(crate::postgres::new_pool(dsn, max_open).await?))
            }
            #[cfg(feature = "mssql")]
            DatabaseType::Mssql => Ok(Self::Mssql(crate::mssql::new_pool(dsn, max_open).await?)),
            other => Err(SqlClientError::Unimplemented(format!(
                "driver '{}' is not enabled in the current build",
                other.tag()
            ))),
        }
    }

    /// Run a SELECT on a per-call pool checkout.
    pub(crate) async fn execute_select(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlClientError> {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(pool) => crate::sqlite::execute_select(pool, query, params).await,
            #[cfg(feature = "postgres")]
            Self::Postgres(pool) => crate::postgres::execute_select(pool, query, params).await,
            #[cfg(feature = "mssql")]
            Self::Mssql(pool) => crate::mssql::execute_select(pool, query, params).await,
        }
    }

    /// Run a DML statement on a per-call pool checkout; returns rows affected.
    pub(crate) async fn execute_dml(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<usize, SqlClientError> {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(pool) => crate::sqlite::execute_dml(pool, query, params).await,
            #[cfg(feature = "postgres")]
            Self::Postgres(pool) => crate::postgres::execute_dml(pool, query, params).await,
            #[cfg(feature = "mssql")]
            Self::Mssql(pool) => crate::mssql::execute_dml(pool, query, params).await,
        }
    }
}
