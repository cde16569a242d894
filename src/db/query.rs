use tracing::debug;

use super::Db;
use crate::error::DbError;
use crate::types::{Role, StatementKind};

const WRITE_PREFIXES: [&str; 4] = ["INSERT INTO", "UPDATE", "DELETE FROM", "CREATE"];
const READ_PREFIXES: [&str; 1] = ["SELECT"];

/// Classify `sql` by its leading keyword.
///
/// This is a literal, case-sensitive prefix match on the left-trimmed text; nothing is
/// parsed. Returns `None` for anything that is neither a recognized write nor a `SELECT`.
#[must_use]
pub fn classify(sql: &str) -> Option<StatementKind> {
    let head = sql.trim_start();
    if WRITE_PREFIXES.iter().any(|p| head.starts_with(p)) {
        Some(StatementKind::Write)
    } else if READ_PREFIXES.iter().any(|p| head.starts_with(p)) {
        Some(StatementKind::Read)
    } else {
        None
    }
}

impl Db {
    /// Execute one statement and keep its result as the current cursor.
    ///
    /// Writes always run on a read/write connection: with the default options a new
    /// read/write connection is opened before every write; otherwise only when the live
    /// connection is read-only. Returns `self` so fetches and `commit` can be chained.
    ///
    /// # Errors
    /// - `DbError::InvalidStatementError` if the text has no recognized leading keyword;
    ///   nothing is sent to the driver.
    /// - `DbError::ConnectionError` if switching to the read/write role fails.
    /// - `DbError::QueryError` if the driver rejects the statement.
    pub fn execute(&mut self, sql: &str) -> Result<&mut Self, DbError> {
        let Some(kind) = classify(sql) else {
            let err = DbError::InvalidStatementError(
                "the current query string is invalid".to_string(),
            );
            return self.record_error(Err(err));
        };

        if kind == StatementKind::Write
            && (self.options.reconnect_on_every_write || self.role != Some(Role::ReadWrite))
        {
            self.connect(Role::ReadWrite)?;
        }

        debug!(?kind, role = ?self.role, "executing statement");
        let result = self.handle_mut()?.query(sql, kind);
        let rs = self.record_error(result)?;
        self.rs = Some(rs);
        Ok(self)
    }
}
