use indexmap::IndexMap;

use super::Db;
use crate::error::DbError;
use crate::escape;
use crate::results::Record;
use crate::types::{Dialect, FetchMode, Value};

/// Snapshot of a table's columns: column name to its catalog row.
///
/// Each descriptor carries `COLUMN_NAME`, `DATA_TYPE`, `IS_NULLABLE`, `COLUMN_DEFAULT` and
/// `COLUMN_KEY`. Taken per call, never cached.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnCatalog {
    columns: IndexMap<String, Record>,
}

impl ColumnCatalog {
    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Record> {
        self.columns.get(column)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// `DATA_TYPE` of `column`, as reported by the server.
    #[must_use]
    pub fn data_type(&self, column: &str) -> Option<&str> {
        self.get(column)?.get("DATA_TYPE").and_then(Value::as_text)
    }
}

/// Catalog query for `table`; a `schema.table` name is split into both filters.
fn catalog_sql(dialect: Dialect, table: &str) -> String {
    let (schema, name) = match table.split_once('.') {
        Some((schema, name)) => (Some(schema), name),
        None => (None, table),
    };
    let name_lit = escape::literal(&Value::Text(name.to_string()), dialect);
    match dialect {
        Dialect::MySql => {
            let schema_filter = schema.map_or_else(
                || "DATABASE()".to_string(),
                |s| escape::literal(&Value::Text(s.to_string()), dialect),
            );
            format!(
                "SELECT COLUMN_NAME, DATA_TYPE, IS_NULLABLE, COLUMN_DEFAULT, COLUMN_KEY \
                 FROM INFORMATION_SCHEMA.COLUMNS \
                 WHERE TABLE_SCHEMA = {schema_filter} AND TABLE_NAME = {name_lit} \
                 ORDER BY ORDINAL_POSITION"
            )
        }
        Dialect::Sqlite => {
            let source = match schema {
                Some(s) => format!(
                    "pragma_table_info({name_lit}, {})",
                    escape::literal(&Value::Text(s.to_string()), dialect)
                ),
                None => format!("pragma_table_info({name_lit})"),
            };
            format!(
                "SELECT name AS COLUMN_NAME, type AS DATA_TYPE, \
                 CASE WHEN \"notnull\" = 1 THEN 'NO' ELSE 'YES' END AS IS_NULLABLE, \
                 dflt_value AS COLUMN_DEFAULT, \
                 CASE WHEN pk > 0 THEN 'PRI' ELSE '' END AS COLUMN_KEY \
                 FROM {source} ORDER BY cid"
            )
        }
    }
}

impl Db {
    /// Look up the columns of `table` in the server's metadata catalog.
    ///
    /// An unknown table yields an empty catalog, not an error.
    ///
    /// # Errors
    /// Returns `DbError::QueryError` if the catalog query fails.
    pub fn columns_of(&mut self, table: &str) -> Result<ColumnCatalog, DbError> {
        let sql = catalog_sql(self.dialect(), table);
        let keyed = self
            .execute(&sql)?
            .fetch_all_keyed_by("COLUMN_NAME", FetchMode::Assoc);
        let columns = keyed
            .into_iter()
            .map(|(key, descriptor)| (key.to_string(), descriptor))
            .collect();
        Ok(ColumnCatalog { columns })
    }
}
