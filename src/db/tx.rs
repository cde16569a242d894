use tracing::{debug, warn};

use super::Db;
use crate::error::DbError;

impl Db {
    /// Commit pending writes on the live connection.
    ///
    /// Returns `Ok(false)` without touching the driver when nothing has been executed in
    /// this session. If the commit fails, a rollback is attempted; its own failure is only
    /// logged.
    ///
    /// # Errors
    /// Returns `DbError::CommitError` if the driver refuses the commit.
    pub fn commit(&mut self) -> Result<bool, DbError> {
        if self.rs.is_none() {
            return Ok(false);
        }

        let conn = self.handle_mut()?;
        match conn.commit() {
            Ok(()) => {
                debug!(role = ?self.role, "committed");
                Ok(true)
            }
            Err(err) => {
                if let Err(rollback_err) = conn.rollback() {
                    warn!(error = %rollback_err, "rollback after failed commit also failed");
                }
                self.record_error(Err(err))
            }
        }
    }

    /// Discard pending writes on the live connection.
    ///
    /// # Errors
    /// Returns `DbError::QueryError` if the driver refuses the rollback.
    pub fn rollback(&mut self) -> Result<(), DbError> {
        let result = self.handle_mut()?.rollback();
        self.record_error(result)
    }
}
