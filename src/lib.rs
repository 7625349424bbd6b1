//! A stateful SQL client with one contract across database backends.
//!
//! [`SqlClient`] is a single handle that owns a connection pool, an optional
//! prepared statement, an optional transaction, and the transaction's own
//! prepared statement. Every operation checks the layer it needs and fails
//! with a stable, matchable message when it is missing, so callers can treat
//! SQLite, PostgreSQL, and SQL Server identically.
//!
//! Backends are feature-gated (`sqlite` and `postgres` are on by default,
//! `mssql` is opt-in); a driver tag whose backend is not compiled in is
//! rejected at [`SqlClient::open`] time rather than at build time.

mod client;
mod error;
mod outcome;
mod pool;
mod results;
mod types;

#[cfg(feature = "mssql")]
mod mssql;
#[cfg(feature = "postgres")]
mod postgres;
#[cfg(feature = "sqlite")]
mod sqlite;

pub mod prelude;

#[cfg(feature = "test-utils-postgres")]
pub mod test_utils;

pub use client::SqlClient;
pub use error::SqlClientError;
pub use outcome::TxOutcome;
pub use results::{CustomDbRow, ResultSet};
pub use types::{DatabaseType, RowValues};
