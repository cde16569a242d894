//! The data-access object.
//!
//! A [`Db`] owns two connection profiles, exactly one live driver connection and at
//! most one cursor. Methods take `&mut self`, so a single instance can only ever have
//! one operation in flight; give each unit of work its own instance.
//!
//! - query: statement classification, role routing, execution
//! - fetch: reading the current cursor
//! - tx: commit / rollback
//! - schema: column catalog lookups
//! - crud: INSERT / UPDATE / DELETE / upsert composition

mod crud;
mod fetch;
mod query;
mod schema;
mod tx;

use std::fmt;

use tracing::{debug, warn};

pub use crud::{UpsertOutcome, WhereClause};
pub use query::classify;
pub use schema::ColumnCatalog;

use crate::config::{ConnectionProfile, DbOptions, DbOptionsBuilder};
use crate::driver::{Connector, DriverConnection};
use crate::error::DbError;
use crate::results::ResultSet;
use crate::types::{DatabaseType, Dialect, Role};

/// Role-routing handle over one live driver connection and its current cursor.
pub struct Db {
    options: DbOptions,
    connector: Box<dyn Connector>,
    conn: Option<Box<dyn DriverConnection>>,
    role: Option<Role>,
    rs: Option<ResultSet>,
    last_error: Option<String>,
}

impl Db {
    /// Connect read-only using the built-in connector for `options.backend`.
    ///
    /// # Errors
    /// Returns `DbError::ConfigError` for invalid options and `DbError::ConnectionError`
    /// if the initial connection fails.
    pub fn new(options: DbOptions) -> Result<Self, DbError> {
        let connector = Box::new(options.backend);
        Self::with_connector(options, connector)
    }

    #[must_use]
    pub fn builder(backend: DatabaseType, read_write: ConnectionProfile) -> DbOptionsBuilder {
        DbOptionsBuilder::new(backend, read_write)
    }

    /// Connect read-only through a caller-supplied connector.
    ///
    /// # Errors
    /// Same as [`Db::new`].
    pub fn with_connector(
        options: DbOptions,
        connector: Box<dyn Connector>,
    ) -> Result<Self, DbError> {
        options.validate()?;
        let mut db = Self {
            options,
            connector,
            conn: None,
            role: None,
            rs: None,
            last_error: None,
        };
        db.connect(Role::ReadOnly)?;
        Ok(db)
    }

    /// Open a fresh connection for `role`, replacing the current one, and turn autocommit off.
    ///
    /// On failure the previous connection stays in place.
    ///
    /// # Errors
    /// Returns `DbError::ConnectionError` with the driver's code and message.
    pub fn connect(&mut self, role: Role) -> Result<(), DbError> {
        let opened = self
            .connector
            .connect(self.options.profile_for(role), role)
            .and_then(|mut conn| {
                conn.set_autocommit(false)?;
                Ok(conn)
            });
        let conn = match opened {
            Ok(conn) => conn,
            Err(err) => {
                self.last_error = Some(err.message().to_string());
                return Err(err);
            }
        };
        if self.role.is_some() {
            debug!(from = ?self.role, to = ?role, "reconnecting");
        }
        self.conn = Some(conn);
        self.role = Some(role);
        Ok(())
    }

    /// Role of the live connection.
    #[must_use]
    pub fn current_role(&self) -> Option<Role> {
        self.role
    }

    #[must_use]
    pub fn options(&self) -> &DbOptions {
        &self.options
    }

    /// Dialect of the live connection, or of the configured backend when disconnected.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        match &self.conn {
            Some(conn) => conn.dialect(),
            None => match self.options.backend {
                DatabaseType::Sqlite => Dialect::Sqlite,
                DatabaseType::Mysql => Dialect::MySql,
            },
        }
    }

    /// Text of the most recent driver error seen by this instance.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Switch the default database of the live connection.
    ///
    /// # Errors
    /// Returns `DbError` if the backend cannot switch databases or the server refuses.
    pub fn select_db(&mut self, name: &str) -> Result<&mut Self, DbError> {
        let result = self.handle_mut()?.select_db(name);
        self.record_error(result)?;
        Ok(self)
    }

    /// Close the connection explicitly, reporting driver errors.
    ///
    /// Dropping a `Db` also closes it; this variant lets callers see close failures.
    ///
    /// # Errors
    /// Returns `DbError` if the driver fails to close the connection.
    pub fn close(mut self) -> Result<(), DbError> {
        self.rs = None;
        match self.conn.take() {
            Some(conn) => conn.close(),
            None => Ok(()),
        }
    }

    fn handle_mut(&mut self) -> Result<&mut Box<dyn DriverConnection>, DbError> {
        self.conn
            .as_mut()
            .ok_or_else(|| DbError::connection(-1, "not connected"))
    }

    fn record_error<T>(&mut self, result: Result<T, DbError>) -> Result<T, DbError> {
        if let Err(err) = &result {
            self.last_error = Some(err.message().to_string());
        }
        result
    }
}

impl fmt::Debug for Db {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Db")
            .field("backend", &self.options.backend)
            .field("role", &self.role)
            .field("connected", &self.conn.is_some())
            .field("has_cursor", &self.rs.is_some())
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl Drop for Db {
    fn drop(&mut self) {
        self.rs = None;
        if let Some(conn) = self.conn.take() {
            if let Err(err) = conn.close() {
                warn!(error = %err, "failed to close connection on drop");
            }
        }
    }
}
