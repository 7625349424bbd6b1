use deadpool_sqlite::rusqlite;

use crate::error::SqlClientError;
use crate::types::RowValues;

/// Convert a single [`RowValues`] to a rusqlite `Value`.
#[must_use]
pub fn row_value_to_sqlite_value(value: &RowValues) -> rusqlite::types::Value {
    match value {
        RowValues::Int(i) => rusqlite::types::Value::Integer(*i),
        RowValues::Float(f) => rusqlite::types::Value::Real(*f),
        RowValues::Text(s) => rusqlite::types::Value::Text(s.clone()),
        RowValues::Bool(b) => rusqlite::types::Value::Integer(i64::from(*b)),
        RowValues::Timestamp(dt) => {
            rusqlite::types::Value::Text(dt.format("%F %T%.f").to_string())
        }
        RowValues::Null => rusqlite::types::Value::Null,
        RowValues::JSON(jval) => rusqlite::types::Value::Text(jval.to_string()),
        RowValues::Blob(bytes) => rusqlite::types::Value::Blob(bytes.clone()),
    }
}

/// Unified `SQLite` parameter container.
///
/// Values are owned so they can be moved onto the interact thread.
pub struct Params(pub Vec<rusqlite::types::Value>);

impl Params {
    /// Convert client row values into owned `SQLite` values.
    ///
    /// # Errors
    ///
    /// Infallible today; the `Result` keeps the signature uniform with the
    /// other backends' converters.
    pub fn convert(params: &[RowValues]) -> Result<Self, SqlClientError> {
        Ok(Params(
            params.iter().map(row_value_to_sqlite_value).collect(),
        ))
    }

    /// Build a borrowed params slice suitable for rusqlite execution.
    #[must_use]
    pub fn as_refs(&self) -> Vec<&dyn rusqlite::ToSql> {
        self.0.iter().map(|v| v as &dyn rusqlite::ToSql).collect()
    }
}
