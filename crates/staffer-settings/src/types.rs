//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]` so a settings
//! file may be partial: missing fields keep their compiled default.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings type.
///
/// ```json
/// {
///   "server": { "port": 9000 },
///   "database": { "path": "/var/lib/staffer/staffer.db" },
///   "logging": { "level": "debug", "json": true }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StafferSettings {
    /// HTTP listener.
    pub server: ServerSettings,
    /// `SQLite` store.
    pub database: DatabaseSettings,
    /// Log output.
    pub logging: LoggingSettings,
}

impl StafferSettings {
    /// Reject values the service cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(SettingsError::InvalidValue("server.host is empty".into()));
        }
        if self.database.path.trim().is_empty() {
            return Err(SettingsError::InvalidValue("database.path is empty".into()));
        }
        if self.database.pool_size == 0 {
            return Err(SettingsError::InvalidValue(
                "database.poolSize must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// HTTP listener settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Bind port (`0` picks a free port).
    pub port: u16,
    /// Seconds to wait for in-flight requests on shutdown.
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            shutdown_timeout_secs: 30,
        }
    }
}

/// Database settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseSettings {
    /// Path to the `SQLite` file (`~` is not expanded).
    pub path: String,
    /// Maximum pooled connections.
    pub pool_size: u32,
    /// `SQLite` busy timeout in milliseconds.
    pub busy_timeout_ms: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: "staffer.db".to_string(),
            pool_size: 8,
            busy_timeout_ms: 5_000,
        }
    }
}

/// Logging settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// `tracing` filter directive, e.g. `"info"` or `"staffer_tasks=debug"`.
    pub level: String,
    /// Emit JSON lines instead of compact text.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}
