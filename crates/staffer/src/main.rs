//! # staffer
//!
//! Task-assignment server binary. Loads settings, opens the `SQLite` store,
//! and serves the HTTP API until Ctrl-C.

#![deny(unsafe_code)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use staffer_server::config::ServerConfig;
use staffer_server::server::StafferServer;
use staffer_settings::StafferSettings;
use staffer_tasks::ConnectionConfig;

/// Staffer task-assignment server.
#[derive(Parser, Debug)]
#[command(name = "staffer", about = "Employee and task assignment server")]
struct Cli {
    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, 0 for auto-assign (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Path to the `SQLite` database file (overrides settings).
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Settings file (default `~/.staffer/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Log level or `EnvFilter` directive (overrides settings).
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Apply command-line flags on top of the loaded settings.
    fn apply(&self, settings: &mut StafferSettings) {
        if let Some(ref host) = self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(ref path) = self.db_path {
            settings.database.path = path.display().to_string();
        }
        if let Some(ref level) = self.log_level {
            settings.logging.level.clone_from(level);
        }
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

fn load(cli: &Cli) -> Result<StafferSettings> {
    let path = cli
        .settings
        .clone()
        .unwrap_or_else(staffer_settings::settings_path);
    let mut settings = staffer_settings::load_settings_from_path(&path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))?;
    cli.apply(&mut settings);
    settings.validate().context("Invalid settings")?;
    Ok(settings)
}

fn open_store(settings: &StafferSettings) -> Result<staffer_tasks::ConnectionPool> {
    let db_path = Path::new(&settings.database.path);
    ensure_parent_dir(db_path)?;

    let config = ConnectionConfig {
        pool_size: settings.database.pool_size,
        busy_timeout_ms: settings.database.busy_timeout_ms,
        ..ConnectionConfig::default()
    };
    let pool = staffer_tasks::new_file(&settings.database.path, &config)
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;
    let conn = pool.get().context("Failed to get database connection")?;
    staffer_tasks::run_migrations(&conn).context("Failed to run migrations")?;
    Ok(pool)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load(&cli)?;

    staffer_logging::init_from_settings(&settings.logging);

    let pool = open_store(&settings)?;
    tracing::info!(
        path = %settings.database.path,
        pool_size = settings.database.pool_size,
        "database ready"
    );

    let config = ServerConfig::from(&settings.server);
    let shutdown_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    let server = StafferServer::new(config, pool);

    let (addr, handle) = server.listen().await.context("Failed to bind server")?;
    tracing::info!("Staffer listening on http://{addr}");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutting down...");
    let failed = server
        .shutdown()
        .graceful_shutdown(vec![handle], Some(shutdown_timeout))
        .await;

    tracing::info!(failed_tasks = failed, "Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_leave_settings_alone() {
        let cli = Cli::parse_from(["staffer"]);
        let mut settings = StafferSettings::default();
        cli.apply(&mut settings);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.database.path, "staffer.db");
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn cli_flags_override_settings() {
        let cli = Cli::parse_from([
            "staffer",
            "--host",
            "0.0.0.0",
            "--port",
            "9000",
            "--db-path",
            "/tmp/staff.db",
            "--log-level",
            "debug",
        ]);
        let mut settings = StafferSettings::default();
        cli.apply(&mut settings);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.database.path, "/tmp/staff.db");
        assert_eq!(settings.logging.level, "debug");
    }

    #[test]
    fn cli_settings_path() {
        let cli = Cli::parse_from(["staffer", "--settings", "/etc/staffer.json"]);
        assert_eq!(cli.settings, Some(PathBuf::from("/etc/staffer.json")));
    }

    #[test]
    fn cli_rejects_bad_port() {
        assert!(Cli::try_parse_from(["staffer", "--port", "70000"]).is_err());
    }

    #[test]
    fn ensure_parent_dir_creates_nested() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("a").join("b").join("staffer.db");
        ensure_parent_dir(&db).unwrap();
        assert!(db.parent().unwrap().is_dir());
    }

    #[test]
    fn ensure_parent_dir_accepts_bare_file_name() {
        ensure_parent_dir(Path::new("staffer.db")).unwrap();
    }

    #[test]
    fn open_store_runs_migrations() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = StafferSettings::default();
        settings.database.path = dir.path().join("db").join("s.db").display().to_string();

        let pool = open_store(&settings).unwrap();
        let conn = pool.get().unwrap();
        let employees = staffer_tasks::EmployeeRepository::list(&conn).unwrap();
        assert!(employees.is_empty());
    }
}
