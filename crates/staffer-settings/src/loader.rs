//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`StafferSettings::default()`]
//! 2. If the settings file exists, deep-merge its values over defaults
//! 3. Apply `STAFFER_*` environment variable overrides
//! 4. Validate the result
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::types::StafferSettings;

/// Resolve the path to the settings file (`~/.staffer/settings.json`).
///
/// `STAFFER_SETTINGS` overrides the location.
pub fn settings_path() -> PathBuf {
    if let Some(path) = read_env_string("STAFFER_SETTINGS") {
        return PathBuf::from(path);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".staffer").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<StafferSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, starts from defaults. Invalid JSON or an
/// invalid final value is an error.
pub fn load_settings_from_path(path: &Path) -> Result<StafferSettings> {
    let mut settings = load_file_layer(path)?;
    apply_env_overrides(&mut settings);
    settings.validate()?;
    Ok(settings)
}

/// Defaults with the settings file merged over them, no env overrides.
pub fn load_file_layer(path: &Path) -> Result<StafferSettings> {
    let defaults = serde_json::to_value(StafferSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Invalid values are logged and ignored (the file/default value stays).
pub fn apply_env_overrides(settings: &mut StafferSettings) {
    if let Some(v) = read_env_string("STAFFER_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = read_env_parsed("STAFFER_PORT", |s| parse_u16_range(s, 0, 65_535)) {
        settings.server.port = v;
    }
    if let Some(v) = read_env_string("STAFFER_DB_PATH") {
        settings.database.path = v;
    }
    if let Some(v) = read_env_parsed("STAFFER_POOL_SIZE", |s| parse_u32_range(s, 1, 256)) {
        settings.database.pool_size = v;
    }
    if let Some(v) = read_env_string("STAFFER_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = read_env_parsed("STAFFER_LOG_JSON", parse_bool) {
        settings.logging.json = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u16` within an inclusive range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u32` within an inclusive range.
pub fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    let n: u32 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_parsed<T>(name: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
    let val = std::env::var(name).ok()?;
    let result = parse(&val);
    if result.is_none() {
        warn!(key = name, value = %val, "invalid env var, ignoring");
    }
    result
}
