//! # staffer-server
//!
//! Axum HTTP server for the staffer service.
//!
//! - Employee and task CRUD endpoints
//! - Derived queries: busy employees, important-task recommendations
//! - Task assignment and full cleanup
//! - Health check
//! - Graceful shutdown via `CancellationToken`

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod server;
pub mod shutdown;
