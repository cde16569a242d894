use super::Db;
use crate::results::{KeyedRows, Record, key_rows};
use crate::types::FetchMode;

impl Db {
    /// Next row of the current cursor, or `None` once it is exhausted (or nothing ran yet).
    pub fn fetch_one(&mut self, mode: FetchMode) -> Option<Record> {
        self.rs.as_mut()?.next_record(mode)
    }

    /// Every remaining row of the current cursor.
    pub fn fetch_all(&mut self, mode: FetchMode) -> Vec<Record> {
        self.rs
            .as_mut()
            .map(|rs| rs.drain_records(mode))
            .unwrap_or_default()
    }

    /// Every remaining row, indexed by the value in `column`.
    ///
    /// Rows without `column` are appended under the next free integer key. Rows that share
    /// a key overwrite one another, so only the last survives; callers that need every row
    /// should use [`Db::fetch_all`].
    pub fn fetch_all_keyed_by(&mut self, column: &str, mode: FetchMode) -> KeyedRows {
        key_rows(self.fetch_all(mode), column)
    }

    /// Rows returned by the last query, or rows affected by the last write.
    #[must_use]
    pub fn num_rows(&self) -> u64 {
        self.rs.as_ref().map_or(0, crate::results::ResultSet::num_rows)
    }

    /// Id generated by the most recent INSERT on the live connection.
    #[must_use]
    pub fn last_insert_id(&self) -> i64 {
        self.conn.as_ref().map_or(0, |conn| conn.last_insert_id())
    }

    /// Whether a statement has run in this session.
    #[must_use]
    pub fn has_cursor(&self) -> bool {
        self.rs.is_some()
    }
}
