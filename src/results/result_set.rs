use std::collections::VecDeque;
use std::sync::Arc;

use super::row::{Record, build_record};
use crate::types::{FetchMode, Value};

/// Buffered result of one executed statement: the cursor.
///
/// Rows are held in memory and consumed from the front as they are fetched. A write
/// statement produces a result set with no columns, carrying the affected row count and
/// the id generated by the statement.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    column_names: Arc<Vec<String>>,
    rows: VecDeque<Vec<Value>>,
    /// Rows returned (reads) or affected (writes)
    num_rows: u64,
    last_insert_id: i64,
}

impl ResultSet {
    /// Create an empty result set for a query returning `column_names`.
    #[must_use]
    pub fn with_columns(column_names: Vec<String>) -> ResultSet {
        ResultSet {
            column_names: Arc::new(column_names),
            ..ResultSet::default()
        }
    }

    /// Result of a statement that returned no rows.
    #[must_use]
    pub fn affected(rows_affected: u64, last_insert_id: i64) -> ResultSet {
        ResultSet {
            num_rows: rows_affected,
            last_insert_id,
            ..ResultSet::default()
        }
    }

    /// Append a row read from the driver.
    pub fn add_row_values(&mut self, row_values: Vec<Value>) {
        self.rows.push_back(row_values);
        self.num_rows += 1;
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Rows returned by the query, or rows affected by the write. Not reduced by fetching.
    #[must_use]
    pub fn num_rows(&self) -> u64 {
        self.num_rows
    }

    #[must_use]
    pub fn last_insert_id(&self) -> i64 {
        self.last_insert_id
    }

    /// Rows not yet fetched.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }

    /// Consume the next row, if any.
    pub fn next_record(&mut self, mode: FetchMode) -> Option<Record> {
        let values = self.rows.pop_front()?;
        Some(build_record(&self.column_names, values, mode))
    }

    /// Consume every remaining row.
    pub fn drain_records(&mut self, mode: FetchMode) -> Vec<Record> {
        let column_names = Arc::clone(&self.column_names);
        self.rows
            .drain(..)
            .map(|values| build_record(&column_names, values, mode))
            .collect()
    }
}
