//! Configuration management for Palaver
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{PalaverError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for Palaver
///
/// Holds everything the client needs: where the realtime server and the
/// HTTP collaborators live, and chat behavior knobs.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server endpoints
    #[serde(default)]
    pub server: ServerConfig,
    /// Chat behavior settings
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Server endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Realtime server address (`host:port`, newline-delimited JSON over TCP)
    #[serde(default = "default_realtime_addr")]
    pub realtime_addr: String,

    /// Base URL of the upload/profile HTTP API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Base URL of the municipality autocomplete service
    #[serde(default = "default_geocode_url")]
    pub geocode_url: String,

    /// Timeout for HTTP collaborator requests (seconds)
    #[serde(default = "default_http_timeout")]
    pub http_timeout_seconds: u64,
}

fn default_realtime_addr() -> String {
    "127.0.0.1:7878".to_string()
}

fn default_api_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_geocode_url() -> String {
    "https://api-adresse.data.gouv.fr".to_string()
}

fn default_http_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            realtime_addr: default_realtime_addr(),
            api_url: default_api_url(),
            geocode_url: default_geocode_url(),
            http_timeout_seconds: default_http_timeout(),
        }
    }
}

/// Chat behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Label of the irremovable home session
    #[serde(default = "default_home_label")]
    pub home_label: String,

    /// Seconds of keyboard idleness after which a typing indicator stops
    #[serde(default = "default_typing_idle")]
    pub typing_idle_seconds: u64,

    /// Interval between automatic online-roster refreshes (seconds)
    #[serde(default = "default_roster_refresh")]
    pub roster_refresh_seconds: u64,
}

fn default_home_label() -> String {
    "Home".to_string()
}

fn default_typing_idle() -> u64 {
    3
}

fn default_roster_refresh() -> u64 {
    60
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            home_label: default_home_label(),
            typing_idle_seconds: default_typing_idle(),
            roster_refresh_seconds: default_roster_refresh(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file with environment overrides
    ///
    /// Missing files fall back to defaults so that `palaver chat` works out
    /// of the box against a local server. After file parsing, the
    /// `PALAVER_SERVER_ADDR` and `PALAVER_API_URL` environment variables
    /// override the corresponding fields.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path).map_err(PalaverError::Io)?;
            serde_yaml::from_str(&contents).map_err(PalaverError::Yaml)?
        } else {
            tracing::debug!("Config file {} not found, using defaults", path.display());
            Self::default()
        };

        if let Ok(addr) = std::env::var("PALAVER_SERVER_ADDR") {
            config.server.realtime_addr = addr;
        }
        if let Ok(url) = std::env::var("PALAVER_API_URL") {
            config.server.api_url = url;
        }

        Ok(config)
    }

    /// Default config file location (`<config dir>/palaver/config.yaml`),
    /// falling back to a relative path when the platform directories cannot
    /// be determined.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("", "", "palaver")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
            .unwrap_or_else(|| PathBuf::from("config/config.yaml"))
    }

    /// Validate the configuration
    ///
    /// Checks that the realtime address looks like `host:port` and that the
    /// HTTP base URLs parse.
    ///
    /// # Errors
    ///
    /// Returns `PalaverError::Config` describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.server.realtime_addr.is_empty() {
            return Err(PalaverError::Config("server.realtime_addr is empty".to_string()).into());
        }

        // host:port sanity check; full resolution happens at connect time
        if !self.server.realtime_addr.contains(':') {
            return Err(PalaverError::Config(format!(
                "server.realtime_addr must be host:port, got '{}'",
                self.server.realtime_addr
            ))
            .into());
        }

        for (name, value) in [
            ("server.api_url", &self.server.api_url),
            ("server.geocode_url", &self.server.geocode_url),
        ] {
            url::Url::parse(value).map_err(|e| {
                PalaverError::Config(format!("{} is not a valid URL ('{}'): {}", name, value, e))
            })?;
        }

        if self.chat.typing_idle_seconds == 0 {
            return Err(
                PalaverError::Config("chat.typing_idle_seconds must be > 0".to_string()).into(),
            );
        }

        Ok(())
    }
}
