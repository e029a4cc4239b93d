//! Configuration schema.
//!
//! Hierarchy: `Config` → `SessionConfig`, `AirtableConfig`, `OwnerConfig`,
//! `HealthConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration: loaded from `~/.tasklink/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub session: SessionConfig,
    pub airtable: AirtableConfig,
    pub owner: OwnerConfig,
    pub health: HealthConfig,
}

/// A required setting is missing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting `{key}` (set it in config.json or {env})")]
    Missing { key: &'static str, env: &'static str },
}

impl Config {
    /// Check that everything the gateway cannot run without is present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required: [(&str, &'static str, &'static str); 4] = [
            (
                &self.airtable.api_key,
                "airtable.apiKey",
                "TASKLINK_AIRTABLE__API_KEY",
            ),
            (
                &self.airtable.base_id,
                "airtable.baseId",
                "TASKLINK_AIRTABLE__BASE_ID",
            ),
            (
                &self.airtable.table_id,
                "airtable.tableId",
                "TASKLINK_AIRTABLE__TABLE_ID",
            ),
            (&self.owner.jid, "owner.jid", "TASKLINK_OWNER__JID"),
        ];

        for (value, key, env) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing { key, env });
            }
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────

/// Live connection + credential storage settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    /// Credential file. Relative paths resolve against the working directory.
    pub path: String,
    /// WebSocket URL of the WhatsApp bridge.
    pub bridge_url: String,
    /// Seconds to wait for the bridge to accept stored credentials.
    pub connect_timeout: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: "session.db".to_string(),
            bridge_url: "ws://localhost:3001".to_string(),
            connect_timeout: 30,
        }
    }
}

// ─────────────────────────────────────────────
// Airtable
// ─────────────────────────────────────────────

/// Record sink settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AirtableConfig {
    /// Personal access token, sent as a Bearer token.
    pub api_key: String,
    /// Base identifier (`app...`).
    pub base_id: String,
    /// Table identifier or name (`tbl...`).
    pub table_id: String,
    /// API root. Overridable for proxies and tests.
    pub api_base: String,
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Extra attempts after a connection failure.
    pub max_retries: u32,
}

impl Default for AirtableConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_id: String::new(),
            table_id: String::new(),
            api_base: "https://api.airtable.com/v0".to_string(),
            timeout: 30,
            max_retries: 1,
        }
    }
}

impl AirtableConfig {
    /// Whether credentials and table coordinates are all set.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.base_id.is_empty() && !self.table_id.is_empty()
    }
}

// ─────────────────────────────────────────────
// Owner
// ─────────────────────────────────────────────

/// The single address every outcome notification goes to.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OwnerConfig {
    /// Owner JID, e.g. `34612345678@s.whatsapp.net`.
    pub jid: String,
}

// ─────────────────────────────────────────────
// Health
// ─────────────────────────────────────────────

/// HTTP health endpoint settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HealthConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
