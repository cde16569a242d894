use std::fmt;
use std::time::Duration;

use rusqlite::OpenFlags;
use tracing::debug;

use super::query::build_result_set;
use crate::config::ConnectionProfile;
use crate::driver::DriverConnection;
use crate::error::DbError;
use crate::results::ResultSet;
use crate::types::{Dialect, Role, StatementKind};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A single rusqlite connection opened for one role.
///
/// `SQLite` has no autocommit switch, so "autocommit off" is emulated: a `BEGIN` is issued
/// before the first write whenever no transaction is open, and it stays open until
/// `commit` or `rollback`. Reads never open a transaction; they join a pending one, or
/// release their shared lock once the rows are buffered.
pub struct SqliteConnection {
    conn: rusqlite::Connection,
    role: Role,
    autocommit: bool,
}

impl SqliteConnection {
    /// Open `profile.database`; the read-only role opens the file with `SQLITE_OPEN_READ_ONLY`.
    ///
    /// # Errors
    /// Returns `DbError::ConnectionError` if the file cannot be opened.
    pub fn open(profile: &ConnectionProfile, role: Role) -> Result<Self, DbError> {
        let flags = match role {
            Role::ReadOnly => {
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX
            }
            Role::ReadWrite => {
                OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_CREATE
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX
            }
        };
        let conn = rusqlite::Connection::open_with_flags(&profile.database, flags)
            .map_err(connect_error)?;
        conn.busy_timeout(BUSY_TIMEOUT).map_err(connect_error)?;
        debug!(path = %profile.database, ?role, "opened sqlite connection");
        Ok(Self {
            conn,
            role,
            autocommit: true,
        })
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    fn begin_if_needed(&self) -> Result<(), DbError> {
        if !self.autocommit && self.conn.is_autocommit() {
            self.conn
                .execute_batch("BEGIN")
                .map_err(|e| DbError::QueryError(e.to_string()))?;
        }
        Ok(())
    }
}

impl fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("role", &self.role)
            .field("autocommit", &self.autocommit)
            .field("in_transaction", &!self.conn.is_autocommit())
            .finish()
    }
}

impl DriverConnection for SqliteConnection {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn set_autocommit(&mut self, enabled: bool) -> Result<(), DbError> {
        if enabled && !self.conn.is_autocommit() {
            // switching autocommit back on commits whatever is pending
            self.conn
                .execute_batch("COMMIT")
                .map_err(connect_error)?;
        }
        self.autocommit = enabled;
        Ok(())
    }

    fn query(&mut self, sql: &str, kind: StatementKind) -> Result<ResultSet, DbError> {
        if kind == StatementKind::Write {
            self.begin_if_needed()?;
        }
        build_result_set(&self.conn, sql).map_err(|e| DbError::QueryError(e.to_string()))
    }

    fn commit(&mut self) -> Result<(), DbError> {
        if self.conn.is_autocommit() {
            return Ok(());
        }
        self.conn
            .execute_batch("COMMIT")
            .map_err(|e| DbError::CommitError(e.to_string()))
    }

    fn rollback(&mut self) -> Result<(), DbError> {
        if self.conn.is_autocommit() {
            return Ok(());
        }
        self.conn
            .execute_batch("ROLLBACK")
            .map_err(|e| DbError::QueryError(e.to_string()))
    }

    fn last_insert_id(&self) -> i64 {
        self.conn.last_insert_rowid()
    }

    fn select_db(&mut self, name: &str) -> Result<(), DbError> {
        Err(DbError::ConfigError(format!(
            "cannot switch to database {name}: a SQLite connection is bound to one file"
        )))
    }

    fn close(self: Box<Self>) -> Result<(), DbError> {
        self.conn
            .close()
            .map_err(|(_, e)| DbError::QueryError(format!("failed to close sqlite connection: {e}")))
    }
}

fn connect_error(err: rusqlite::Error) -> DbError {
    match err {
        rusqlite::Error::SqliteFailure(inner, message) => DbError::ConnectionError {
            code: i64::from(inner.extended_code),
            message: message.unwrap_or_else(|| inner.to_string()),
        },
        other => DbError::connection(-1, other),
    }
}
