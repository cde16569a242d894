//! Convenient imports for common usage.
//!
//! ```rust
//! use appflow_db::prelude::*;
//! ```

pub use crate::config::{ConnectionProfile, DbOptions, DbOptionsBuilder};
pub use crate::db::{ColumnCatalog, Db, UpsertOutcome, WhereClause};
pub use crate::driver::{Connector, DriverConnection};
pub use crate::error::DbError;
pub use crate::results::{KeyedRows, Record, ResultSet, RowKey};
pub use crate::types::{DatabaseType, Dialect, FetchMode, Role, StatementKind, Value};
