use tracing::debug;

use super::Db;
use crate::error::DbError;
use crate::escape::{identifier, literal, quote_ident};
use crate::results::Record;
use crate::types::{Dialect, FetchMode, Value};

/// Equality filter: every entry must match, joined with `AND`.
pub type WhereClause = Record;

/// What [`Db::upsert`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The record or the filter was empty; nothing ran.
    Skipped,
    /// A matching row existed; carries the result of [`Db::update`].
    Updated(bool),
    /// No row matched; carries the id returned by [`Db::insert`].
    Inserted(i64),
}

fn where_sql(filter: &WhereClause, dialect: Dialect) -> String {
    filter
        .iter()
        .map(|(column, value)| match value {
            Value::Null => format!("{} IS NULL", quote_ident(column)),
            other => format!("{} = {}", quote_ident(column), literal(other, dialect)),
        })
        .collect::<Vec<_>>()
        .join(" AND ")
}

impl Db {
    /// Insert `record` into `table`, commit, and return the generated id.
    ///
    /// Keys are not checked against the schema. Returns `0` when the record is empty,
    /// no row was inserted, or there was nothing to commit.
    ///
    /// # Errors
    /// Returns `DbError` if the statement or the commit fails.
    pub fn insert(&mut self, table: &str, record: &Record) -> Result<i64, DbError> {
        if record.is_empty() {
            debug!(table, "insert skipped: empty record");
            return Ok(0);
        }
        let dialect = self.dialect();
        let columns = record
            .keys()
            .map(|k| quote_ident(k))
            .collect::<Vec<_>>()
            .join(", ");
        let values = record
            .values()
            .map(|v| literal(v, dialect))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({columns}) VALUES ({values})",
            identifier(table)
        );

        let inserted = self.execute(&sql)?.num_rows();
        let new_id = self.rs.as_ref().map_or(0, |rs| rs.last_insert_id());
        let committed = self.commit()?;
        Ok(if inserted > 0 && committed { new_id } else { 0 })
    }

    /// Update rows of `table` matching `filter` with the columns of `record` that exist in
    /// the table, then commit.
    ///
    /// Returns `Ok(false)` without running anything when `filter` is empty or none of the
    /// record's keys is a real column. Unknown keys are dropped silently.
    ///
    /// # Errors
    /// Returns `DbError` if the catalog lookup, the statement or the commit fails.
    pub fn update(
        &mut self,
        table: &str,
        record: &Record,
        filter: &WhereClause,
    ) -> Result<bool, DbError> {
        if filter.is_empty() {
            debug!(table, "update skipped: empty where clause");
            return Ok(false);
        }

        let catalog = self.columns_of(table)?;
        let dialect = self.dialect();
        let assignments: Vec<String> = record
            .iter()
            .filter(|(column, _)| catalog.contains(column))
            .map(|(column, value)| format!("{} = {}", quote_ident(column), literal(value, dialect)))
            .collect();
        if assignments.is_empty() {
            debug!(table, "update skipped: no writable columns");
            return Ok(false);
        }

        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            identifier(table),
            assignments.join(", "),
            where_sql(filter, dialect)
        );
        self.execute(&sql)?.commit()
    }

    /// Delete rows of `table` matching `filter`, then commit.
    ///
    /// Returns `Ok(false)` without running anything when `filter` is empty.
    ///
    /// # Errors
    /// Returns `DbError` if the statement or the commit fails.
    pub fn delete(&mut self, table: &str, filter: &WhereClause) -> Result<bool, DbError> {
        if filter.is_empty() {
            debug!(table, "delete skipped: empty where clause");
            return Ok(false);
        }
        let sql = format!(
            "DELETE FROM {} WHERE {}",
            identifier(table),
            where_sql(filter, self.dialect())
        );
        self.execute(&sql)?.commit()
    }

    /// Update the rows matching `filter`, or insert `record` plus the filter columns when
    /// none match.
    ///
    /// On insert, keys present in both `record` and `filter` take the record's value.
    ///
    /// # Errors
    /// Returns `DbError` if any underlying statement or commit fails.
    pub fn upsert(
        &mut self,
        table: &str,
        record: &Record,
        filter: &WhereClause,
    ) -> Result<UpsertOutcome, DbError> {
        if record.is_empty() || filter.is_empty() {
            debug!(table, "upsert skipped: empty record or where clause");
            return Ok(UpsertOutcome::Skipped);
        }

        let sql = format!(
            "SELECT * FROM {} WHERE {}",
            identifier(table),
            where_sql(filter, self.dialect())
        );
        let existing = self.execute(&sql)?.fetch_one(FetchMode::Assoc);

        if existing.is_some() {
            return Ok(UpsertOutcome::Updated(self.update(table, record, filter)?));
        }

        let mut row = record.clone();
        for (column, value) in filter {
            row.entry(column.clone()).or_insert_with(|| value.clone());
        }
        Ok(UpsertOutcome::Inserted(self.insert(table, &row)?))
    }

    /// Escape `text` for the live connection's dialect.
    #[must_use]
    pub fn escape(&self, text: &str) -> String {
        crate::escape::escape_str(text, self.dialect())
    }

    /// Escape every string inside a nested JSON structure for the live dialect.
    #[must_use]
    pub fn escape_all(&self, data: &serde_json::Value) -> serde_json::Value {
        crate::escape::escape_all(data, self.dialect())
    }
}
