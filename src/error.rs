use thiserror::Error;

/// Errors surfaced by the data-access layer.
///
/// Precondition violations (empty WHERE, empty record, no writable column) are not
/// errors; the CRUD helpers report them through their return values instead.
#[derive(Debug, Error)]
pub enum DbError {
    /// The driver refused to open a connection, or autocommit could not be disabled.
    #[error("ERROR[{code}] Failed to connect: {message}")]
    ConnectionError { code: i64, message: String },

    /// The SQL text does not start with a recognized read or write keyword.
    #[error("Invalid statement: {0}")]
    InvalidStatementError(String),

    /// The driver reported a failure while executing a statement.
    #[error("SQL execution error: {0}")]
    QueryError(String),

    /// The driver reported a failure while committing.
    #[error("Commit transaction failed: {0}")]
    CommitError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unimplemented feature: {0}")]
    Unimplemented(String),
}

impl DbError {
    /// Build a `ConnectionError` from anything printable, for drivers without numeric codes.
    pub(crate) fn connection(code: i64, message: impl ToString) -> Self {
        DbError::ConnectionError {
            code,
            message: message.to_string(),
        }
    }

    /// Driver text carried by the error, without the kind prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            DbError::ConnectionError { message, .. } => message,
            DbError::InvalidStatementError(m)
            | DbError::QueryError(m)
            | DbError::CommitError(m)
            | DbError::ConfigError(m)
            | DbError::Unimplemented(m) => m,
        }
    }
}
