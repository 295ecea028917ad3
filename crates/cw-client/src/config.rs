//! TOML-based configuration for the client.
//!
//! A config file is optional: every field has a default, so the client runs
//! out of the box against the public MorseKOB server on the default channel.
//! Example file:
//!
//! ```toml
//! server = "mtc-kob.dyndns.org:7890"
//! channel = 103
//! id = "N0CALL, Rust client"
//! keepalive_secs = 20
//! ```
//!
//! # Serde default values
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return
//! value of `some_fn()` when the field is absent from the TOML file, so a
//! partial file (say, only `id = "..."`) is valid and picks up defaults for
//! the rest.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Client configuration loaded from disk (or defaulted).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Relay server endpoint as `host:port`.
    #[serde(default = "default_server")]
    pub server: String,

    /// Channel number to join.
    #[serde(default = "default_channel")]
    pub channel: u16,

    /// Client identifier announced on the channel.  Convention on the KOB
    /// servers is a callsign optionally followed by a free-text suffix.
    #[serde(default = "default_id")]
    pub id: String,

    /// Interval between re-identifications, in seconds.  KOB servers drop
    /// clients they have not heard from, so the client re-sends its id
    /// packet on this cadence.
    #[serde(default = "default_keepalive_secs")]
    pub keepalive_secs: u64,
}

fn default_server() -> String {
    // The long-running public MorseKOB server.
    "mtc-kob.dyndns.org:7890".to_string()
}

fn default_channel() -> u16 {
    cw_core::DEFAULT_CHANNEL
}

fn default_id() -> String {
    "cw-client".to_string()
}

fn default_keepalive_secs() -> u64 {
    20
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            channel: default_channel(),
            id: default_id(),
            keepalive_secs: default_keepalive_secs(),
        }
    }
}

impl ClientConfig {
    /// Loads the config from `path`, or returns the defaults when the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file exists but cannot be read or
    /// parsed.  A broken config file is a hard error rather than a silent
    /// fall-back: keying onto the wrong channel annoys real operators.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&text)?)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
