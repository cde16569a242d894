use serde::Deserialize;

use crate::db::Db;
use crate::error::DbError;
use crate::types::{DatabaseType, Role};

/// Where and as whom to connect.
///
/// Deserializes from either snake_case keys or the platform's legacy upper-case keys
/// (`DB_SERVER`, `DB_USERNAME`, `DB_PASSWORD`, `DB_DATABASE`, `DB_PORT`). For `SQLite`,
/// `database` is the file path and the other fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConnectionProfile {
    #[serde(alias = "DB_SERVER")]
    pub host: String,
    #[serde(alias = "DB_USERNAME")]
    pub username: String,
    #[serde(alias = "DB_PASSWORD")]
    pub password: String,
    #[serde(alias = "DB_DATABASE")]
    pub database: String,
    #[serde(alias = "DB_PORT")]
    pub port: u16,
}

impl ConnectionProfile {
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: password.into(),
            database: database.into(),
            port,
        }
    }

    /// Profile for a `SQLite` file; only the path matters.
    #[must_use]
    pub fn sqlite(path: impl Into<String>) -> Self {
        Self {
            database: path.into(),
            ..Self::default()
        }
    }

    /// A profile with neither host nor database names nothing to connect to.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.host.is_empty() && self.database.is_empty()
    }
}

/// Options for a [`Db`].
#[derive(Debug, Clone, Deserialize)]
pub struct DbOptions {
    pub backend: DatabaseType,
    pub read_write: ConnectionProfile,
    #[serde(default)]
    pub read_only: Option<ConnectionProfile>,
    /// Reopen the read/write connection before every write statement.
    ///
    /// When `false`, a write only reconnects if the live connection is read-only, so
    /// several writes can share one transaction.
    #[serde(default = "default_reconnect")]
    pub reconnect_on_every_write: bool,
}

fn default_reconnect() -> bool {
    true
}

impl DbOptions {
    #[must_use]
    pub fn new(backend: DatabaseType, read_write: ConnectionProfile) -> Self {
        Self {
            backend,
            read_write,
            read_only: None,
            reconnect_on_every_write: true,
        }
    }

    /// Parse options from a JSON document.
    ///
    /// # Errors
    /// Returns `DbError::ConfigError` if the document is malformed or the read/write
    /// profile is empty.
    pub fn from_json_str(json: &str) -> Result<Self, DbError> {
        let opts: DbOptions = serde_json::from_str(json)
            .map_err(|e| DbError::ConfigError(format!("invalid options: {e}")))?;
        opts.validate()?;
        Ok(opts)
    }

    /// # Errors
    /// Returns `DbError::ConfigError` if the read/write profile is empty.
    pub fn validate(&self) -> Result<(), DbError> {
        if self.read_write.is_empty() {
            return Err(DbError::ConfigError(
                "read/write connection profile is empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Profile used for `role`; read-only falls back to read/write when absent or empty.
    #[must_use]
    pub fn profile_for(&self, role: Role) -> &ConnectionProfile {
        match role {
            Role::ReadOnly => match &self.read_only {
                Some(profile) if !profile.is_empty() => profile,
                _ => &self.read_write,
            },
            Role::ReadWrite => &self.read_write,
        }
    }
}

/// Fluent builder for [`DbOptions`].
#[derive(Debug, Clone)]
pub struct DbOptionsBuilder {
    opts: DbOptions,
}

impl DbOptionsBuilder {
    #[must_use]
    pub fn new(backend: DatabaseType, read_write: ConnectionProfile) -> Self {
        Self {
            opts: DbOptions::new(backend, read_write),
        }
    }

    #[must_use]
    pub fn read_only(mut self, profile: ConnectionProfile) -> Self {
        self.opts.read_only = Some(profile);
        self
    }

    #[must_use]
    pub fn reconnect_on_every_write(mut self, reconnect: bool) -> Self {
        self.opts.reconnect_on_every_write = reconnect;
        self
    }

    #[must_use]
    pub fn finish(self) -> DbOptions {
        self.opts
    }

    /// Connect a [`Db`] with the built-in connector for the chosen backend.
    ///
    /// # Errors
    /// Returns `DbError` if the options are invalid or the initial read-only connect fails.
    pub fn build(self) -> Result<Db, DbError> {
        Db::new(self.finish())
    }
}
