use rusqlite::types::Value as SqliteValue;

use crate::results::ResultSet;
use crate::types::Value;

/// Extract a [`Value`] from a `SQLite` row.
///
/// # Errors
///
/// Returns `rusqlite::Error` if the column cannot be read.
pub fn sqlite_extract_value(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Value> {
    let value: SqliteValue = row.get(idx)?;
    Ok(match value {
        SqliteValue::Null => Value::Null,
        SqliteValue::Integer(i) => Value::Int(i),
        SqliteValue::Real(f) => Value::Float(f),
        SqliteValue::Text(s) => Value::Text(s),
        SqliteValue::Blob(b) => Value::Blob(b),
    })
}

/// Run one statement and buffer everything it produced.
///
/// Statements without result columns (DML, DDL) yield the change count and the last
/// inserted rowid; queries yield their rows.
///
/// # Errors
/// Returns `rusqlite::Error` if preparation, execution or value extraction fails.
pub fn build_result_set(conn: &rusqlite::Connection, sql: &str) -> rusqlite::Result<ResultSet> {
    let mut stmt = conn.prepare(sql)?;
    let col_count = stmt.column_count();
    if col_count == 0 {
        let changed = stmt.execute([])?;
        return Ok(ResultSet::affected(changed as u64, conn.last_insert_rowid()));
    }

    let column_names: Vec<String> = stmt
        .column_names()
        .iter()
        .map(std::string::ToString::to_string)
        .collect();
    let mut result_set = ResultSet::with_columns(column_names);

    let mut rows_iter = stmt.query([])?;
    while let Some(row) = rows_iter.next()? {
        let mut row_values = Vec::with_capacity(col_count);
        for i in 0..col_count {
            row_values.push(sqlite_extract_value(row, i)?);
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}
