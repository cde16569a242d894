//! Relational data access for workflow app integrations.
//!
//! [`Db`] keeps two connection profiles, a read-only one and a read/write one, and
//! exactly one live connection. Statements are classified by their leading keyword:
//! `SELECT` runs on whatever connection is live, while `INSERT INTO`, `UPDATE`,
//! `DELETE FROM` and `CREATE` always run on a read/write connection. Autocommit is off, so
//! writes persist only after [`Db::commit`].
//!
//! ```rust,no_run
//! use appflow_db::{record, prelude::*};
//!
//! # fn main() -> Result<(), DbError> {
//! let mut db = Db::builder(DatabaseType::Sqlite, ConnectionProfile::sqlite("flows.db"))
//!     .build()?;
//! let id = db.insert("contacts", &record! { "name" => "Ada", "email" => "ada@example.com" })?;
//! let rows = db
//!     .execute(&format!("SELECT * FROM contacts WHERE id = {id}"))?
//!     .fetch_all(FetchMode::Assoc);
//! # let _ = rows;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod db;
pub mod driver;
pub mod error;
pub mod escape;
pub mod prelude;
pub mod results;
pub mod types;

#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use config::{ConnectionProfile, DbOptions, DbOptionsBuilder};
pub use db::{ColumnCatalog, Db, UpsertOutcome, WhereClause, classify};
pub use driver::{Connector, DriverConnection};
pub use error::DbError;
pub use results::{KeyedRows, Record, ResultSet, RowKey};
pub use types::{DatabaseType, Dialect, FetchMode, Role, StatementKind, Value};
