use deadpool_sqlite::rusqlite;
use rusqlite::types::Value;
use rusqlite::{Statement, ToSql};

use crate::error::SqlClientError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Extract a [`RowValues`] from a `SQLite` row at the given column index.
///
/// # Errors
///
/// Returns the underlying rusqlite error if the column cannot be read.
pub fn extract_value(row: &rusqlite::Row, idx: usize) -> Result<RowValues, SqlClientError> {
    let value: Value = row.get(idx).map_err(SqlClientError::SqliteError)?;
    Ok(match value {
        Value::Null => RowValues::Null,
        Value::Integer(i) => RowValues::Int(i),
        Value::Real(f) => RowValues::Float(f),
        Value::Text(s) => RowValues::Text(s),
        Value::Blob(b) => RowValues::Blob(b),
    })
}

/// Run a prepared statement and materialize all rows into a [`ResultSet`].
///
/// # Errors
///
/// Returns the underlying rusqlite error if execution or row extraction
/// fails.
pub fn build_result_set(
    stmt: &mut Statement,
    params: &[Value],
) -> Result<ResultSet, SqlClientError> {
    let param_refs: Vec<&dyn ToSql> = params.iter().map(|v| v as &dyn ToSql).collect();
    let column_names: Vec<String> = stmt
        .column_names()
        .iter()
        .map(std::string::ToString::to_string)
        .collect();
    let column_count = column_names.len();

    let mut result_set = ResultSet::with_capacity(10);
    result_set.set_column_names(std::sync::Arc::new(column_names));

    let mut rows = stmt.query(&param_refs[..])?;
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            values.push(extract_value(row, idx)?);
        }
        result_set.add_row_values(values);
    }

    Ok(result_set)
}
