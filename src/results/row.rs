use indexmap::IndexMap;

use crate::types::{FetchMode, Value};

/// One row of data: column name to value, in column order.
///
/// Used both for fetched rows and as the input of the CRUD helpers.
pub type Record = IndexMap<String, Value>;

/// Result of [`crate::Db::fetch_all_keyed_by`].
pub type KeyedRows = IndexMap<RowKey, Record>;

/// Build a [`Record`] from `column => value` pairs.
///
/// ```rust
/// use appflow_db::{record, prelude::*};
///
/// let r = record! { "name" => "alice", "age" => 30 };
/// assert_eq!(r["age"], Value::Int(30));
/// ```
#[macro_export]
macro_rules! record {
    () => { $crate::results::Record::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut record = $crate::results::Record::new();
        $( record.insert(::std::string::String::from($key), $crate::types::Value::from($value)); )+
        record
    }};
}

/// Key of a row in a keyed fetch.
///
/// Follows associative-array key rules: integers and canonical decimal strings become
/// `Int`, so `5` and `"5"` address the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RowKey {
    Int(i64),
    Text(String),
}

impl RowKey {
    /// Derive the key for a cell value.
    #[must_use]
    pub fn from_value(value: &Value) -> RowKey {
        match value {
            Value::Int(i) => RowKey::Int(*i),
            Value::Bool(b) => RowKey::Int(i64::from(*b)),
            #[allow(clippy::cast_possible_truncation)]
            Value::Float(f) if f.is_finite() => RowKey::Int(f.trunc() as i64),
            Value::Text(s) => RowKey::from_text(s),
            Value::Null => RowKey::Text(String::new()),
            Value::Blob(bytes) => RowKey::from_text(&String::from_utf8_lossy(bytes)),
            other => RowKey::from_text(&other.to_sql_text().unwrap_or_default()),
        }
    }

    fn from_text(s: &str) -> RowKey {
        if is_canonical_int(s) {
            if let Ok(i) = s.parse::<i64>() {
                return RowKey::Int(i);
            }
        }
        RowKey::Text(s.to_string())
    }
}

impl From<i64> for RowKey {
    fn from(i: i64) -> Self {
        RowKey::Int(i)
    }
}

impl From<&str> for RowKey {
    fn from(s: &str) -> Self {
        RowKey::from_text(s)
    }
}

impl std::fmt::Display for RowKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowKey::Int(i) => write!(f, "{i}"),
            RowKey::Text(s) => f.write_str(s),
        }
    }
}

fn is_canonical_int(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if digits == "0" {
        return s == "0";
    }
    !digits.starts_with('0')
}

/// Shape one row's values into a [`Record`] for the given fetch mode.
#[must_use]
pub fn build_record(column_names: &[String], values: Vec<Value>, mode: FetchMode) -> Record {
    let mut record = Record::with_capacity(match mode {
        FetchMode::Both => values.len() * 2,
        _ => values.len(),
    });
    for (idx, value) in values.into_iter().enumerate() {
        let name = column_names
            .get(idx)
            .cloned()
            .unwrap_or_else(|| idx.to_string());
        match mode {
            FetchMode::Assoc => {
                record.insert(name, value);
            }
            FetchMode::Num => {
                record.insert(idx.to_string(), value);
            }
            FetchMode::Both => {
                record.insert(name, value.clone());
                record.insert(idx.to_string(), value);
            }
        }
    }
    record
}

/// Index records by the value in `column`.
///
/// Rows without `column` are appended under the next free integer key (one past the
/// largest integer key so far, or `0`). Rows sharing a key overwrite each other; the last
/// one wins and keeps the position of the first.
#[must_use]
pub fn key_rows(records: Vec<Record>, column: &str) -> KeyedRows {
    let mut keyed = KeyedRows::with_capacity(records.len());
    let mut next_index: Option<i64> = None;
    for record in records {
        let key = match record.get(column) {
            Some(value) => RowKey::from_value(value),
            None => RowKey::Int(next_index.unwrap_or(0)),
        };
        if let RowKey::Int(i) = key {
            let candidate = i.saturating_add(1);
            next_index = Some(next_index.map_or(candidate, |n| n.max(candidate)));
        }
        keyed.insert(key, record);
    }
    keyed
}
