//! The seam between [`crate::Db`] and a concrete database driver.

use crate::config::ConnectionProfile;
use crate::error::DbError;
use crate::results::ResultSet;
use crate::types::{DatabaseType, Dialect, Role, StatementKind};

/// Opens driver connections.
pub trait Connector {
    /// Open a connection with `profile`. `role` tells drivers that can enforce it (such
    /// as `SQLite`'s read-only open flag) which privileges to request.
    ///
    /// # Errors
    /// Returns `DbError::ConnectionError` with the driver's code and message.
    fn connect(
        &self,
        profile: &ConnectionProfile,
        role: Role,
    ) -> Result<Box<dyn DriverConnection>, DbError>;
}

/// A live driver connection.
pub trait DriverConnection {
    fn dialect(&self) -> Dialect;

    /// # Errors
    /// Returns `DbError::ConnectionError` if the driver rejects the setting.
    fn set_autocommit(&mut self, enabled: bool) -> Result<(), DbError>;

    /// Execute `sql` and buffer its result.
    ///
    /// # Errors
    /// Returns `DbError::QueryError` with the driver's error text.
    fn query(&mut self, sql: &str, kind: StatementKind) -> Result<ResultSet, DbError>;

    /// # Errors
    /// Returns `DbError::CommitError` with the driver's error text.
    fn commit(&mut self) -> Result<(), DbError>;

    /// # Errors
    /// Returns `DbError::QueryError` with the driver's error text.
    fn rollback(&mut self) -> Result<(), DbError>;

    /// Id generated by the most recent INSERT on this connection.
    fn last_insert_id(&self) -> i64;

    /// # Errors
    /// Returns `DbError` if the driver cannot switch databases.
    fn select_db(&mut self, name: &str) -> Result<(), DbError>;

    /// # Errors
    /// Returns `DbError` if the driver reports a failure while closing.
    fn close(self: Box<Self>) -> Result<(), DbError>;
}

impl Connector for DatabaseType {
    #[allow(unused_variables)]
    fn connect(
        &self,
        profile: &ConnectionProfile,
        role: Role,
    ) -> Result<Box<dyn DriverConnection>, DbError> {
        match self {
            #[cfg(feature = "sqlite")]
            DatabaseType::Sqlite => Ok(Box::new(crate::sqlite::SqliteConnection::open(
                profile, role,
            )?)),
            #[cfg(feature = "mysql")]
            DatabaseType::Mysql => Ok(Box::new(crate::mysql::MysqlConnection::open(
                profile, role,
            )?)),
            #[allow(unreachable_patterns)]
            other => Err(DbError::Unimplemented(format!(
                "{other:?} support was not compiled in"
            ))),
        }
    }
}
