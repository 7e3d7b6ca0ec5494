//! Adapter configuration.
//!
//! The host hands each adapter an untyped, string-keyed configuration
//! ([`RawConfig`]). Validation turns it into a typed config per resource
//! domain and stops at the first missing or wrong-typed required key:
//!
//! - **ticket / deployment**: `token`, `owner`, `repo`, optional `defaultState`
//! - **team**: `token`, `organization`
//!
//! Both accept an optional `baseUrl` for GitHub Enterprise.
//!
//! # Example
//!
//! ```ignore
//! use opsorch_core::config::{RawConfig, RepoConfig};
//!
//! let raw = RawConfig::from_json_str(r#"{"token":"t","owner":"acme","repo":"api"}"#)?;
//! let config = RepoConfig::from_raw(&raw)?;
//! assert_eq!(config.default_state, "open");
//! ```

use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::{Error, Result};

/// Default GitHub API URL.
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Default issue state used when a ticket query carries no status filter.
pub const DEFAULT_TICKET_STATE: &str = "open";

// =============================================================================
// Raw configuration
// =============================================================================

/// Untyped configuration as supplied by the host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawConfig(Map<String, Value>);

impl RawConfig {
    /// Wrap an already-parsed JSON object.
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Parse a JSON object, e.g. from an environment variable.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let map: Map<String, Value> = serde_json::from_str(json)
            .map_err(|e| Error::BadRequest(format!("Failed to parse config: {}", e)))?;
        Ok(Self(map))
    }

    /// Load configuration from a file.
    ///
    /// Files ending in `.toml` are parsed as TOML, everything else as JSON.
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!(path = ?path, "Loading config");

        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::BadRequest(format!("Failed to read config file: {}", e)))?;

        let config = if path.extension().is_some_and(|ext| ext == "toml") {
            let map: Map<String, Value> = toml::from_str(&contents)
                .map_err(|e| Error::BadRequest(format!("Failed to parse config file: {}", e)))?;
            Self(map)
        } else {
            Self::from_json_str(&contents)?
        };

        info!(path = ?path, "Config loaded successfully");
        Ok(config)
    }

    /// Get a raw value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get a string value by key; non-string values read as absent.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    fn required(&self, key: &str) -> Result<String> {
        self.get_str(key)
            .map(str::to_string)
            .ok_or_else(|| Error::MissingField(key.to_string()))
    }

    fn base_url(&self) -> String {
        self.get_str("baseUrl")
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
            .to_string()
    }
}

impl From<Map<String, Value>> for RawConfig {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

// =============================================================================
// Typed configurations
// =============================================================================

/// Repository-scoped configuration (tickets and deployments).
#[derive(Debug, Clone, PartialEq)]
pub struct RepoConfig {
    /// Personal access token
    pub token: String,
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Issue state queried when no status filter is given
    pub default_state: String,
    /// GitHub API base URL
    pub base_url: String,
}

impl RepoConfig {
    /// Validate in order: `token`, `owner`, `repo`.
    pub fn from_raw(raw: &RawConfig) -> Result<Self> {
        let token = raw.required("token")?;
        let owner = raw.required("owner")?;
        let repo = raw.required("repo")?;
        let default_state = raw
            .get_str("defaultState")
            .unwrap_or(DEFAULT_TICKET_STATE)
            .to_string();

        Ok(Self {
            token,
            owner,
            repo,
            default_state,
            base_url: raw.base_url(),
        })
    }
}

/// Organization-scoped configuration (teams).
#[derive(Debug, Clone, PartialEq)]
pub struct OrgConfig {
    pub token: String,
    /// GitHub organization login
    pub organization: String,
    pub base_url: String,
}

impl OrgConfig {
    /// Validate in order: `token`, `organization`.
    pub fn from_raw(raw: &RawConfig) -> Result<Self> {
        let token = raw.required("token")?;
        let organization = raw.required("organization")?;

        Ok(Self {
            token,
            organization,
            base_url: raw.base_url(),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
