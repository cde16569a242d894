//! `MySQL` backend built on sqlx.
//!
//! sqlx is async; each connection owns a current-thread tokio runtime and blocks on it,
//! so the rest of the crate stays synchronous.

mod connection;
mod query;

pub use connection::MysqlConnection;
pub use query::mysql_extract_value;
