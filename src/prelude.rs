//! Convenient imports for common functionality.
//!
//! Pulls in the client handle and the handful of types its operations speak
//! in, so a `use sql_client::prelude::*;` is enough for most callers.

pub use crate::client::SqlClient;
pub use crate::error::SqlClientError;
pub use crate::outcome::TxOutcome;
pub use crate::results::{CustomDbRow, ResultSet};
pub use crate::types::{DatabaseType, RowValues};
