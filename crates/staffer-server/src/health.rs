//! `/health` endpoint.

use serde::Serialize;
use std::time::Instant;

/// Health check response body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// `"ok"` when the store answers, `"degraded"` otherwise.
    pub status: String,
    /// Seconds since the server started.
    pub uptime_secs: u64,
    /// `"ok"` or the reason the store could not be reached.
    pub database: String,
}

impl HealthResponse {
    /// Whether the service can serve requests.
    pub fn is_healthy(&self) -> bool {
        self.status == "ok"
    }
}

/// Build a health response from the start time and a store probe result.
pub fn health_check(start_time: Instant, database: Result<(), String>) -> HealthResponse {
    let (status, database) = match database {
        Ok(()) => ("ok", "ok".to_string()),
        Err(reason) => ("degraded", reason),
    };
    HealthResponse {
        status: status.into(),
        uptime_secs: start_time.elapsed().as_secs(),
        database,
    }
}
