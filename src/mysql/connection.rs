use std::fmt;

use sqlx::Connection;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection as SqlxMySqlConnection, MySqlDatabaseError};
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use super::query::build_result_set;
use crate::config::ConnectionProfile;
use crate::driver::DriverConnection;
use crate::error::DbError;
use crate::escape;
use crate::results::ResultSet;
use crate::types::{Dialect, Role, StatementKind};

/// A single sqlx `MySQL` connection plus the runtime that drives it.
pub struct MysqlConnection {
    conn: SqlxMySqlConnection,
    runtime: Runtime,
    role: Role,
    last_insert_id: i64,
}

impl MysqlConnection {
    /// Connect with `profile`. `MySQL` enforces privileges per account, so `role` only
    /// selects which profile the caller handed in.
    ///
    /// # Errors
    /// Returns `DbError::ConnectionError` carrying the server error number when available.
    pub fn open(profile: &ConnectionProfile, role: Role) -> Result<Self, DbError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| DbError::connection(-1, format!("failed to start runtime: {e}")))?;

        let mut options = MySqlConnectOptions::new()
            .host(&profile.host)
            .username(&profile.username)
            .password(&profile.password);
        if profile.port != 0 {
            options = options.port(profile.port);
        }
        if !profile.database.is_empty() {
            options = options.database(&profile.database);
        }

        let conn = runtime
            .block_on(SqlxMySqlConnection::connect_with(&options))
            .map_err(|e| DbError::ConnectionError {
                code: driver_code(&e),
                message: driver_message(&e),
            })?;
        debug!(host = %profile.host, database = %profile.database, ?role, "opened mysql connection");

        Ok(Self {
            conn,
            runtime,
            role,
            last_insert_id: 0,
        })
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    fn run(&mut self, sql: &str) -> Result<sqlx::mysql::MySqlQueryResult, sqlx::Error> {
        self.runtime
            .block_on(sqlx::raw_sql(sql).execute(&mut self.conn))
    }
}

impl fmt::Debug for MysqlConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MysqlConnection")
            .field("role", &self.role)
            .field("last_insert_id", &self.last_insert_id)
            .finish_non_exhaustive()
    }
}

impl DriverConnection for MysqlConnection {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn set_autocommit(&mut self, enabled: bool) -> Result<(), DbError> {
        let sql = if enabled {
            "SET autocommit = 1"
        } else {
            "SET autocommit = 0"
        };
        self.run(sql).map(|_| ()).map_err(|e| DbError::ConnectionError {
            code: driver_code(&e),
            message: driver_message(&e),
        })
    }

    fn query(&mut self, sql: &str, kind: StatementKind) -> Result<ResultSet, DbError> {
        match kind {
            StatementKind::Read => {
                let rows = self
                    .runtime
                    .block_on(sqlx::raw_sql(sql).fetch_all(&mut self.conn))
                    .map_err(|e| DbError::QueryError(driver_message(&e)))?;
                build_result_set(&rows)
            }
            StatementKind::Write => {
                let done = self
                    .run(sql)
                    .map_err(|e| DbError::QueryError(driver_message(&e)))?;
                self.last_insert_id = i64::try_from(done.last_insert_id()).unwrap_or(i64::MAX);
                Ok(ResultSet::affected(done.rows_affected(), self.last_insert_id))
            }
        }
    }

    fn commit(&mut self) -> Result<(), DbError> {
        self.run("COMMIT")
            .map(|_| ())
            .map_err(|e| DbError::CommitError(driver_message(&e)))
    }

    fn rollback(&mut self) -> Result<(), DbError> {
        self.run("ROLLBACK")
            .map(|_| ())
            .map_err(|e| DbError::QueryError(driver_message(&e)))
    }

    fn last_insert_id(&self) -> i64 {
        self.last_insert_id
    }

    fn select_db(&mut self, name: &str) -> Result<(), DbError> {
        let sql = format!("USE {}", escape::quote_ident(name));
        self.run(&sql)
            .map(|_| ())
            .map_err(|e| DbError::QueryError(driver_message(&e)))
    }

    fn close(self: Box<Self>) -> Result<(), DbError> {
        let MysqlConnection { conn, runtime, .. } = *self;
        runtime
            .block_on(conn.close())
            .map_err(|e| DbError::QueryError(format!("failed to close mysql connection: {}", driver_message(&e))))
    }
}

fn driver_code(err: &sqlx::Error) -> i64 {
    err.as_database_error()
        .and_then(|db| db.try_downcast_ref::<MySqlDatabaseError>())
        .map_or(-1, |e| i64::from(e.number()))
}

fn driver_message(err: &sqlx::Error) -> String {
    err.as_database_error()
        .map_or_else(|| err.to_string(), |db| db.message().to_string())
}
