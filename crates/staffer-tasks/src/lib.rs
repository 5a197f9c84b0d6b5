//! # staffer-tasks
//!
//! Employee and task CRUD with `SQLite` persistence.
//!
//! Provides the query layer (busy/least-busy employees, per-executor
//! counts), the executor recommendation heuristic behind "important tasks",
//! and the mutating assignment and cleanup operations.

#![deny(unsafe_code)]

pub mod connection;
pub mod errors;
pub mod migrations;
pub mod repository;
pub mod service;
pub mod types;

pub use connection::{ConnectionConfig, ConnectionPool, PooledConnection, new_file, new_in_memory};
pub use errors::TaskError;
pub use migrations::run_migrations;
pub use repository::{EmployeeRepository, TaskRepository};
pub use service::{AssignmentService, PARENT_EXECUTOR_TOLERANCE};
pub use types::*;
