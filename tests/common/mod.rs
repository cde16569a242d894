#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use appflow_db::prelude::*;
#[cfg(feature = "sqlite")]
use tempfile::TempDir;

/// Something the mock driver was asked to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Connect(Role),
    Autocommit(bool),
    Query(Role, String),
    Commit(Role),
    Rollback(Role),
    Close(Role),
}

/// Shared state between a test and the mock connections it hands out.
#[derive(Default)]
pub struct Script {
    pub log: Vec<Event>,
    /// Results handed out, in order, for non-catalog reads.
    pub reads: VecDeque<ResultSet>,
    /// Column names reported by catalog queries.
    pub catalog: Vec<String>,
    pub insert_id: i64,
    /// Writes report zero affected rows.
    pub writes_affect_nothing: bool,
    pub fail_connect: Option<Role>,
    pub fail_commit: bool,
    pub fail_rollback: bool,
}

#[derive(Clone, Default)]
pub struct RecordingConnector {
    pub script: Rc<RefCell<Script>>,
}

impl RecordingConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.script.borrow().log.clone()
    }

    pub fn queries(&self) -> Vec<(Role, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Query(role, sql) => Some((role, sql)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &Event) -> usize {
        self.events().iter().filter(|e| *e == wanted).count()
    }

    pub fn clear(&self) {
        self.script.borrow_mut().log.clear();
    }

    pub fn push_read(&self, rs: ResultSet) {
        self.script.borrow_mut().reads.push_back(rs);
    }

    /// Open a `Db` over this connector with default options.
    pub fn db(&self) -> Result<Db, DbError> {
        self.db_with(mock_options())
    }

    pub fn db_with(&self, options: DbOptions) -> Result<Db, DbError> {
        Db::with_connector(options, Box::new(self.clone()))
    }
}

pub fn mock_options() -> DbOptions {
    DbOptions::new(
        DatabaseType::Mysql,
        ConnectionProfile::new("rw.internal", "writer", "pw", "flows", 3306),
    )
}

impl Connector for RecordingConnector {
    fn connect(
        &self,
        _profile: &ConnectionProfile,
        role: Role,
    ) -> Result<Box<dyn DriverConnection>, DbError> {
        let mut script = self.script.borrow_mut();
        if script.fail_connect == Some(role) {
            return Err(DbError::ConnectionError {
                code: 2002,
                message: "Connection refused".into(),
            });
        }
        script.log.push(Event::Connect(role));
        Ok(Box::new(MockConnection {
            role,
            script: Rc::clone(&self.script),
        }))
    }
}

pub struct MockConnection {
    role: Role,
    script: Rc<RefCell<Script>>,
}

impl DriverConnection for MockConnection {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn set_autocommit(&mut self, enabled: bool) -> Result<(), DbError> {
        self.script.borrow_mut().log.push(Event::Autocommit(enabled));
        Ok(())
    }

    fn query(&mut self, sql: &str, kind: StatementKind) -> Result<ResultSet, DbError> {
        let mut script = self.script.borrow_mut();
        script.log.push(Event::Query(self.role, sql.to_string()));
        if sql.contains("FROM ghost_table") {
            return Err(DbError::QueryError("no such table: ghost_table".into()));
        }
        Ok(match kind {
            StatementKind::Write => {
                let affected = u64::from(!script.writes_affect_nothing);
                ResultSet::affected(affected, script.insert_id)
            }
            StatementKind::Read if sql.contains("pragma_table_info") => {
                let mut rs = ResultSet::with_columns(vec!["COLUMN_NAME".into()]);
                for name in script.catalog.clone() {
                    rs.add_row_values(vec![Value::Text(name)]);
                }
                rs
            }
            StatementKind::Read => script
                .reads
                .pop_front()
                .unwrap_or_else(|| ResultSet::with_columns(vec!["id".into()])),
        })
    }

    fn commit(&mut self) -> Result<(), DbError> {
        let mut script = self.script.borrow_mut();
        script.log.push(Event::Commit(self.role));
        if script.fail_commit {
            return Err(DbError::CommitError("Lock wait timeout exceeded".into()));
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), DbError> {
        let mut script = self.script.borrow_mut();
        script.log.push(Event::Rollback(self.role));
        if script.fail_rollback {
            return Err(DbError::QueryError("server has gone away".into()));
        }
        Ok(())
    }

    fn last_insert_id(&self) -> i64 {
        self.script.borrow().insert_id
    }

    fn select_db(&mut self, _name: &str) -> Result<(), DbError> {
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<(), DbError> {
        self.script.borrow_mut().log.push(Event::Close(self.role));
        Ok(())
    }
}

/// A fresh `SQLite` file seeded with `ddl`; keep the `TempDir` alive for the test.
#[cfg(feature = "sqlite")]
pub fn seeded_sqlite(ddl: &str) -> (TempDir, String) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("flows.db").to_string_lossy().into_owned();
    let conn = rusqlite::Connection::open(&path).expect("open seed connection");
    conn.execute_batch(ddl).expect("seed schema");
    drop(conn);
    (dir, path)
}

#[cfg(feature = "sqlite")]
pub fn sqlite_db(path: &str) -> Result<Db, DbError> {
    Db::builder(DatabaseType::Sqlite, ConnectionProfile::sqlite(path)).build()
}

/// Count rows through an independent connection.
#[cfg(feature = "sqlite")]
pub fn count_rows(path: &str, table: &str) -> i64 {
    let conn = rusqlite::Connection::open(path).expect("open check connection");
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .expect("count rows")
}
