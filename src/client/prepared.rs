use crate::error::SqlClientError;
use crate::pool::DriverPool;
use crate::results::ResultSet;
use crate::types::RowValues;

/// The client's non-transactional prepared slot, one variant per backend.
///
/// Each variant holds its own pool checkout, so the compiled statement stays
/// bound to a live connection until the slot is replaced or the client is
/// closed.
pub(crate) enum PreparedStatement {
    #[cfg(feature = "sqlite")]
    Sqlite(crate::sqlite::Prepared),
    #[cfg(feature = "postgres")]
    Postgres(crate::postgres::Prepared),
    #[cfg(feature = "mssql")]
    Mssql(crate::mssql::Prepared),
}

impl PreparedStatement {
    pub(crate) async fn prepare(pool: &DriverPool, sql: &str) -> Result<Self, SqlClientError> {
        match pool {
            #[cfg(feature = "sqlite")]
            DriverPool::Sqlite(pool) => Ok(Self::Sqlite(crate::sqlite::prepare(pool, sql).await?)),
            #[cfg(feature = "postgres")]
            DriverPool::Postgres(pool) => {
                Ok(Self::Postgres(crate::postgres::prepare(pool, sql).await?))
            }
            #[cfg(feature = "mssql")]
            DriverPool::Mssql(pool) => Ok(Self::Mssql(crate::mssql::prepare(pool, sql).await?)),
        }
    }

    pub(crate) async fn query(&mut self, params: &[RowValues]) -> Result<ResultSet, SqlClientError> {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(prepared) => prepared.query(params).await,
            #[cfg(feature = "postgres")]
            Self::Postgres(prepared) => prepared.query(params).await,
            #[cfg(feature = "mssql")]
            Self::Mssql(prepared) => prepared.query(params).await,
        }
    }

    pub(crate) async fn execute(&mut self, params: &[RowValues]) -> Result<usize, SqlClientError> {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(prepared) => prepared.execute(params).await,
            #[cfg(feature = "postgres")]
            Self::Postgres(prepared) => prepared.execute(params).await,
            #[cfg(feature = "mssql")]
            Self::Mssql(prepared) => prepared.execute(params).await,
        }
    }
}
