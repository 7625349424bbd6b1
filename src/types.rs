use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;
use std::fmt;

use crate::error::SqlClientError;

/// Values that can be stored in a database row or used as query parameters.
///
/// The same enum is reused across backends so caller code never needs to
/// branch on driver types:
/// ```rust
/// use sql_client::prelude::*;
///
/// let params = vec![
///     RowValues::Int(1),
///     RowValues::Text("alice".into()),
///     RowValues::Bool(true),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let RowValues::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let RowValues::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            // Try "YYYY-MM-DD HH:MM:SS"
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt);
            }
            // Try "YYYY-MM-DD HH:MM:SS.SSS"
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S.%3f") {
                return Some(dt);
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let RowValues::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }
}

/// Identity of the backend a client handle was opened against.
///
/// The tag is stored on [`crate::SqlClient`] when `open` succeeds and cleared
/// on `close`; beyond routing the open call it does not alter behavior.
/// Variants exist for every registered tag; attempting to open one whose
/// driver binding is not compiled into the current build fails with
/// [`SqlClientError::Unimplemented`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseType {
    /// `MySQL` database
    Mysql,
    /// `PostgreSQL` database
    Postgres,
    /// `SQLite` database
    Sqlite,
    /// `ClickHouse` database
    Clickhouse,
    /// SQL Server database
    Mssql,
    /// Oracle database
    Oracle,
    /// `DynamoDB` by way of its SQL shim
    Dynamodb,
}

impl DatabaseType {
    /// Resolve a registered driver tag string.
    ///
    /// # Errors
    ///
    /// Returns `SqlClientError::ConfigError` for tags no driver registered.
    pub fn from_tag(tag: &str) -> Result<Self, SqlClientError> {
        match tag {
            "mysql" => Ok(Self::Mysql),
            "postgres" => Ok(Self::Postgres),
            "sqlite" => Ok(Self::Sqlite),
            "clickhouse" => Ok(Self::Clickhouse),
            "sqlserver" => Ok(Self::Mssql),
            "oracle" => Ok(Self::Oracle),
            "godynamo" => Ok(Self::Dynamodb),
            other => Err(SqlClientError::ConfigError(format!(
                "unknown driver tag: {other}"
            ))),
        }
    }

    /// The tag string the driver registered under.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Mysql => "mysql",
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
            Self::Clickhouse => "clickhouse",
            Self::Mssql => "sqlserver",
            Self::Oracle => "oracle",
            Self::Dynamodb => "godynamo",
        }
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
