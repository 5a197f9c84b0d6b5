//! # staffer-logging
//!
//! Structured logging with `tracing`.
//!
//! Log context (request method, path, entity IDs) travels as span and event
//! fields. Output goes to stderr, either compact human-readable lines or
//! JSON lines for log shippers.

#![deny(unsafe_code)]

use staffer_settings::LoggingSettings;
use tracing_subscriber::EnvFilter;

/// Output format for the stderr subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact single-line text.
    Compact,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Format selected by the logging settings.
    pub fn from_settings(settings: &LoggingSettings) -> Self {
        if settings.json { Self::Json } else { Self::Compact }
    }
}

/// Build the filter: `RUST_LOG` wins, otherwise `level`, otherwise `info`.
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the global tracing subscriber with stderr output.
///
/// Call once at application startup. Subsequent calls are no-ops.
pub fn init_subscriber(level: &str, format: LogFormat) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(build_filter(level))
        .with_target(true)
        .with_writer(std::io::stderr);

    // try_init is a no-op if a global subscriber is already set
    let _ = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

/// Initialize from the `logging` section of the settings.
pub fn init_from_settings(settings: &LoggingSettings) {
    init_subscriber(&settings.level, LogFormat::from_settings(settings));
}
