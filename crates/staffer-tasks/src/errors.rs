//! Task error types.
//!
//! All errors are structured with typed variants for each failure mode.
//! Callers are expected to handle them, typically by turning them into an
//! HTTP error response.

use rusqlite::ErrorCode;
use thiserror::Error;

/// Errors from employee and task operations.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// No connection could be checked out of the pool.
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Entity not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity type (`"Employee"` or `"Task"`).
        entity: &'static str,
        /// The ID that was looked up.
        id: i64,
    },

    /// Operation is not valid in the record's current state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Validation failure on an incoming value.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl TaskError {
    /// Create a not-found error for an employee.
    pub fn employee_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "Employee",
            id,
        }
    }

    /// Create a not-found error for a task.
    pub fn task_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "Task",
            id,
        }
    }

    /// Whether the store itself could not be reached or was too busy to
    /// answer, as opposed to a logical failure on the request.
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Pool(_) => true,
            Self::Database(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.code,
                ErrorCode::DatabaseBusy
                    | ErrorCode::DatabaseLocked
                    | ErrorCode::CannotOpen
                    | ErrorCode::SystemIoFailure
            ),
            _ => false,
        }
    }
}
