use chrono::NaiveDateTime;
use sqlx::mysql::MySqlRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

use crate::error::DbError;
use crate::results::ResultSet;
use crate::types::Value;

/// Extract a [`Value`] from a `MySQL` row.
///
/// Rows come back over the text protocol, so decoding is unchecked and falls back to
/// text when a typed decode fails.
///
/// # Errors
/// Returns `DbError::QueryError` if the column cannot be read at all.
pub fn mysql_extract_value(row: &MySqlRow, idx: usize) -> Result<Value, DbError> {
    let raw = row
        .try_get_raw(idx)
        .map_err(|e| DbError::QueryError(e.to_string()))?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let type_name = raw.type_info().name().to_string();

    let value = match type_name.as_str() {
        "BOOLEAN" => row
            .try_get_unchecked::<bool, _>(idx)
            .map(Value::Bool)
            .ok(),
        name if is_integer(name) => {
            if name.ends_with("UNSIGNED") {
                row.try_get_unchecked::<u64, _>(idx)
                    .ok()
                    .map(|v| i64::try_from(v).map_or_else(|_| Value::Text(v.to_string()), Value::Int))
            } else {
                row.try_get_unchecked::<i64, _>(idx).map(Value::Int).ok()
            }
        }
        "FLOAT" | "DOUBLE" => row.try_get_unchecked::<f64, _>(idx).map(Value::Float).ok(),
        "DATETIME" | "TIMESTAMP" => row
            .try_get_unchecked::<NaiveDateTime, _>(idx)
            .map(Value::Timestamp)
            .ok(),
        "JSON" => row
            .try_get_unchecked::<String, _>(idx)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .map(Value::Json),
        "BINARY" | "VARBINARY" | "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT" => row
            .try_get_unchecked::<Vec<u8>, _>(idx)
            .map(Value::Blob)
            .ok(),
        _ => None,
    };

    match value {
        Some(v) => Ok(v),
        None => row
            .try_get_unchecked::<String, _>(idx)
            .map(Value::Text)
            .or_else(|_| row.try_get_unchecked::<Vec<u8>, _>(idx).map(Value::Blob))
            .map_err(|e| DbError::QueryError(e.to_string())),
    }
}

fn is_integer(name: &str) -> bool {
    ["TINYINT", "SMALLINT", "MEDIUMINT", "INT", "BIGINT", "YEAR"]
        .iter()
        .any(|prefix| name.starts_with(prefix))
}

/// Buffer fetched rows into a [`ResultSet`].
///
/// # Errors
/// Returns `DbError::QueryError` if a value cannot be extracted.
pub fn build_result_set(rows: &[MySqlRow]) -> Result<ResultSet, DbError> {
    let column_names: Vec<String> = rows
        .first()
        .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
        .unwrap_or_default();
    let col_count = column_names.len();
    let mut result_set = ResultSet::with_columns(column_names);

    for row in rows {
        let mut row_values = Vec::with_capacity(col_count);
        for i in 0..col_count {
            row_values.push(mysql_extract_value(row, i)?);
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}
