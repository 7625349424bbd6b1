//! `PostgreSQL` backend via `tokio-postgres` and `deadpool-postgres`.
//!
//! - config: DSN parsing and pool setup
//! - params: parameter conversion between client and `tokio-postgres` types
//! - query: row extraction and result building
//! - executor: direct per-checkout operations
//! - prepared / transaction: held-checkout statement and transaction handles

pub mod config;
pub mod executor;
pub mod params;
pub mod prepared;
pub mod query;
pub mod transaction;

pub use config::new_pool;
pub use executor::{execute_dml, execute_select};
pub use prepared::{Prepared, prepare};
pub use transaction::{Tx, begin};
