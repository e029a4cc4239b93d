//! Config loader: reads `~/.tasklink/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.tasklink/config.json`
//! 3. Environment variables `TASKLINK_<SECTION>__<FIELD>` (override JSON)
//! 4. `PORT` (overrides the health port, as hosting platforms set it)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the given path (or the default one) + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    load_config_from_path(&config_path)
}

/// Load config from a specific file path.
fn load_config_from_path(path: &Path) -> Config {
    apply_env_overrides(read_config_file(path))
}

/// Read and decode the JSON file, without env overrides.
fn read_config_file(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply process environment overrides on top of a loaded config.
fn apply_env_overrides(config: Config) -> Config {
    apply_overrides(config, |key| std::env::var(key).ok())
}

/// Apply overrides from any variable source.
///
/// Supported variables:
/// - `TASKLINK_SESSION__PATH` → `session.path`
/// - `TASKLINK_SESSION__BRIDGE_URL` → `session.bridge_url`
/// - `TASKLINK_SESSION__CONNECT_TIMEOUT` → `session.connect_timeout`
/// - `TASKLINK_AIRTABLE__API_KEY` / `__BASE_ID` / `__TABLE_ID` / `__API_BASE`
/// - `TASKLINK_AIRTABLE__TIMEOUT` / `__MAX_RETRIES`
/// - `TASKLINK_OWNER__JID` → `owner.jid`
/// - `TASKLINK_HEALTH__HOST` / `__PORT`
/// - `PORT` → `health.port` (applied last)
fn apply_overrides<F>(mut config: Config, var: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    // Session
    if let Some(val) = var("TASKLINK_SESSION__PATH") {
        config.session.path = val;
    }
    if let Some(val) = var("TASKLINK_SESSION__BRIDGE_URL") {
        config.session.bridge_url = val;
    }
    if let Some(n) = var("TASKLINK_SESSION__CONNECT_TIMEOUT").and_then(|v| v.parse().ok()) {
        config.session.connect_timeout = n;
    }

    // Airtable
    if let Some(val) = var("TASKLINK_AIRTABLE__API_KEY") {
        config.airtable.api_key = val;
    }
    if let Some(val) = var("TASKLINK_AIRTABLE__BASE_ID") {
        config.airtable.base_id = val;
    }
    if let Some(val) = var("TASKLINK_AIRTABLE__TABLE_ID") {
        config.airtable.table_id = val;
    }
    if let Some(val) = var("TASKLINK_AIRTABLE__API_BASE") {
        config.airtable.api_base = val;
    }
    if let Some(n) = var("TASKLINK_AIRTABLE__TIMEOUT").and_then(|v| v.parse().ok()) {
        config.airtable.timeout = n;
    }
    if let Some(n) = var("TASKLINK_AIRTABLE__MAX_RETRIES").and_then(|v| v.parse().ok()) {
        config.airtable.max_retries = n;
    }

    // Owner
    if let Some(val) = var("TASKLINK_OWNER__JID") {
        config.owner.jid = val;
    }

    // Health
    if let Some(val) = var("TASKLINK_HEALTH__HOST") {
        config.health.host = val;
    }
    if let Some(p) = var("TASKLINK_HEALTH__PORT").and_then(|v| v.parse().ok()) {
        config.health.port = p;
    }
    match var("PORT").map(|v| v.parse::<u16>()) {
        Some(Ok(p)) => config.health.port = p,
        Some(Err(e)) => warn!(error = %e, "ignoring invalid PORT"),
        None => {}
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
