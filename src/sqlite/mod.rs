//! `SQLite` backend built on rusqlite.
//!
//! - connection: opening by role, emulated autocommit-off, commit/rollback
//! - query: statement execution and result extraction

mod connection;
mod query;

pub use connection::SqliteConnection;
pub use query::{build_result_set, sqlite_extract_value};
