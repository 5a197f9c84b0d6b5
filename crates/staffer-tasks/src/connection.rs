//! `SQLite` connection pool with foreign keys enabled.
//!
//! Uses `r2d2` connection pooling with the `r2d2_sqlite` backend. Every
//! request checks a connection out of the pool and returns it on drop,
//! whatever the outcome. [`PragmaCustomizer`] runs on each new connection so
//! foreign keys, WAL mode and the busy timeout are always in effect.

use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::errors::TaskError;

/// Alias for the connection pool type.
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// Alias for a pooled connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// How long a request waits for a free connection before giving up.
const DEFAULT_CHECKOUT_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for the connection pool.
#[derive(Clone, Debug)]
pub struct ConnectionConfig {
    /// Maximum pool size (default: 8).
    pub pool_size: u32,
    /// Busy timeout in milliseconds (default: 5000).
    pub busy_timeout_ms: u32,
    /// Wait for a free pooled connection (default: 5s).
    pub checkout_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            pool_size: 8,
            busy_timeout_ms: 5_000,
            checkout_timeout: DEFAULT_CHECKOUT_TIMEOUT,
        }
    }
}

#[derive(Debug)]
struct PragmaCustomizer {
    busy_timeout_ms: u32,
}

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for PragmaCustomizer {
    fn on_acquire(&self, conn: &mut Connection) -> Result<(), rusqlite::Error> {
        conn.execute_batch(&format!(
            "PRAGMA journal_mode = WAL;\
             PRAGMA busy_timeout = {};\
             PRAGMA foreign_keys = ON;\
             PRAGMA synchronous = NORMAL;",
            self.busy_timeout_ms
        ))?;
        Ok(())
    }
}

fn builder(config: &ConnectionConfig) -> r2d2::Builder<SqliteConnectionManager> {
    Pool::builder()
        .connection_timeout(config.checkout_timeout)
        .connection_customizer(Box::new(PragmaCustomizer {
            busy_timeout_ms: config.busy_timeout_ms,
        }))
}

/// Create an in-memory connection pool (for testing).
///
/// Every `SQLite` in-memory connection is its own database, so the pool holds
/// exactly one connection, never recycled, regardless of `config.pool_size`.
pub fn new_in_memory(config: &ConnectionConfig) -> Result<ConnectionPool, TaskError> {
    let pool = builder(config)
        .max_size(1)
        .max_lifetime(None)
        .idle_timeout(None)
        .build(SqliteConnectionManager::memory())?;
    Ok(pool)
}

/// Create a file-backed connection pool.
pub fn new_file(path: &str, config: &ConnectionConfig) -> Result<ConnectionPool, TaskError> {
    let pool = builder(config)
        .max_size(config.pool_size)
        .build(SqliteConnectionManager::file(path))?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn foreign_keys_enabled(conn: &Connection) -> bool {
        let on: i32 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        on == 1
    }

    #[test]
    fn in_memory_pool_creates_successfully() {
        let pool = new_in_memory(&ConnectionConfig::default()).unwrap();
        assert_eq!(pool.max_size(), 1);
        let conn = pool.get().unwrap();
        assert!(foreign_keys_enabled(&conn));
    }

    #[test]
    fn in_memory_pool_shares_one_database() {
        let pool = new_in_memory(&ConnectionConfig::default()).unwrap();
        {
            let conn = pool.get().unwrap();
            conn.execute_batch("CREATE TABLE probe (x INTEGER);").unwrap();
        }
        let conn = pool.get().unwrap();
        let n: i64 = conn
            .query_row("SELECT COUNT(*) FROM probe", [], |row| row.get(0))
            .unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn file_pool_uses_wal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("staffer.db");
        let pool = new_file(path.to_str().unwrap(), &ConnectionConfig::default()).unwrap();
        let conn = pool.get().unwrap();
        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode, "wal");
        assert!(foreign_keys_enabled(&conn));
    }

    #[test]
    fn file_pool_respects_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("staffer.db");
        let config = ConnectionConfig {
            pool_size: 3,
            ..Default::default()
        };
        let pool = new_file(path.to_str().unwrap(), &config).unwrap();
        assert_eq!(pool.max_size(), 3);
    }

    #[test]
    fn default_config_values() {
        let config = ConnectionConfig::default();
        assert_eq!(config.pool_size, 8);
        assert_eq!(config.busy_timeout_ms, 5_000);
        assert_eq!(config.checkout_timeout, Duration::from_secs(5));
    }

    #[test]
    fn checkout_timeout_is_unavailable() {
        let config = ConnectionConfig {
            checkout_timeout: Duration::from_millis(50),
            ..Default::default()
        };
        let pool = new_in_memory(&config).unwrap();
        let _held = pool.get().unwrap();

        let err = TaskError::from(pool.get().unwrap_err());
        assert!(matches!(err, TaskError::Pool(_)));
        assert!(err.is_unavailable());
    }
}
