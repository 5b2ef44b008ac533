// crates/pdp-authz-config/src/config.rs
// ============================================================================
// Module: PDP Authz Configuration
// Description: Configuration loading for the enforcement mediator.
// Purpose: Provide fresh, byte-exact config snapshots with hard limits.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The configuration file is a JSON document with `pdp_addr` and
//! `allow_on_failure`. Unknown fields are ignored. A missing or unparseable
//! file is an error for the evaluation that tried to read it; the caller
//! decides how to fail.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration path used by the plugin binary.
pub const DEFAULT_CONFIG_PATH: &str = "~/.pdp/config.json";
/// Environment variable consulted when expanding a leading `~/`.
const HOME_ENV_VAR: &str = "HOME";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Plugin configuration file contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// URL of the policy decision service endpoint.
    pub pdp_addr: String,
    /// Verdict used when the decision service cannot produce one.
    #[serde(default)]
    pub allow_on_failure: bool,
}

/// Parsed configuration plus the exact bytes it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSnapshot {
    /// Parsed configuration.
    pub config: PluginConfig,
    /// Raw file bytes, hashed into decision records.
    pub raw: Vec<u8>,
}

impl PluginConfig {
    /// Reads and parses the configuration file at `path`.
    ///
    /// A leading `~/` is expanded against `$HOME`. No state is cached between
    /// calls.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, exceeds the size
    /// limit, or is not valid configuration JSON.
    pub fn load(path: &Path) -> Result<ConfigSnapshot, ConfigError> {
        let resolved = expand_home(path);
        let raw = fs::read(&resolved)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", resolved.display())))?;
        Self::from_bytes(raw)
    }

    /// Parses configuration from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the bytes exceed the size limit or are not
    /// valid configuration JSON.
    pub fn from_bytes(raw: Vec<u8>) -> Result<ConfigSnapshot, ConfigError> {
        if raw.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let config: Self =
            serde_json::from_slice(&raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        Ok(ConfigSnapshot {
            config,
            raw,
        })
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// JSON parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Expands a leading `~/` against `$HOME`; other paths pass through.
#[must_use]
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match env::var_os(HOME_ENV_VAR) {
        Some(home) => PathBuf::from(home).join(rest),
        None => path.to_path_buf(),
    }
}
