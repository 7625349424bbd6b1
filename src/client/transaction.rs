use crate::error::SqlClientError;
use crate::pool::DriverPool;
use crate::results::ResultSet;
use crate::types::RowValues;

/// The client's active transaction, one variant per backend.
///
/// Each variant owns the pool checkout the transaction runs on, plus the
/// transactional prepared slot, so both are released together when the
/// transaction ends.
pub(crate) enum ClientTransaction {
    #[cfg(feature = "sqlite")]
    Sqlite(crate::sqlite::Tx),
    #[cfg(feature = "postgres")]
    Postgres(crate::postgres::Tx),
    #[cfg(feature = "mssql")]
    Mssql(crate::mssql::Tx),
}

impl ClientTransaction {
    pub(crate) async fn begin(pool: &DriverPool) -> Result<Self, SqlClientError> {
        match pool {
            #[cfg(feature = "sqlite")]
            DriverPool::Sqlite(pool) => Ok(Self::Sqlite(crate::sqlite::begin(pool).await?)),
            #[cfg(feature = "postgres")]
            DriverPool::Postgres(pool) => Ok(Self::Postgres(crate::postgres::begin(pool).await?)),
            #[cfg(feature = "mssql")]
            DriverPool::Mssql(pool) => Ok(Self::Mssql(crate::mssql::begin(pool).await?)),
        }
    }

    pub(crate) async fn execute_select(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlClientError> {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(tx) => tx.execute_select(query, params).await,
            #[cfg(feature = "postgres")]
            Self::Postgres(tx) => tx.execute_select(query, params).await,
            #[cfg(feature = "mssql")]
            Self::Mssql(tx) => tx.execute_select(query, params).await,
        }
    }

    pub(crate) async fn execute_dml(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<usize, SqlClientError> {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(tx) => tx.execute_dml(query, params).await,
            #[cfg(feature = "postgres")]
            Self::Postgres(tx) => tx.execute_dml(query, params).await,
            #[cfg(feature = "mssql")]
            Self::Mssql(tx) => tx.execute_dml(query, params).await,
        }
    }

    pub(crate) async fn prepare(&mut self, sql: &str) -> Result<(), SqlClientError> {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(tx) => tx.prepare(sql).await,
            #[cfg(feature = "postgres")]
            Self::Postgres(tx) => tx.prepare(sql).await,
            #[cfg(feature = "mssql")]
            Self::Mssql(tx) => tx.prepare(sql).await,
        }
    }

    pub(crate) async fn query_prepared(
        &mut self,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlClientError> {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(tx) => tx.query_prepared(params).await,
            #[cfg(feature = "postgres")]
            Self::Postgres(tx) => tx.query_prepared(params).await,
            #[cfg(feature = "mssql")]
            Self::Mssql(tx) => tx.query_prepared(params).await,
        }
    }

    pub(crate) async fn execute_prepared(
        &mut self,
        params: &[RowValues],
    ) -> Result<usize, SqlClientError> {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(tx) => tx.execute_prepared(params).await,
            #[cfg(feature = "postgres")]
            Self::Postgres(tx) => tx.execute_prepared(params).await,
            #[cfg(feature = "mssql")]
            Self::Mssql(tx) => tx.execute_prepared(params).await,
        }
    }

    pub(crate) async fn commit(self) -> Result<(), SqlClientError> {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(tx) => tx.commit().await,
            #[cfg(feature = "postgres")]
            Self::Postgres(tx) => tx.commit().await,
            #[cfg(feature = "mssql")]
            Self::Mssql(tx) => tx.commit().await,
        }
    }

    pub(crate) async fn rollback(self) -> Result<(), SqlClientError> {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(tx) => tx.rollback().await,
            #[cfg(feature = "postgres")]
            Self::Postgres(tx) => tx.rollback().await,
            #[cfg(feature = "mssql")]
            Self::Mssql(tx) => tx.rollback().await,
        }
    }
}
