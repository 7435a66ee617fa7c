//! Application settings and bridge configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// WhatsApp bridge connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Base URL of the bridge REST API.
    #[serde(default = "default_bridge_url")]
    pub base_url: String,

    /// Bearer token sent with every bridge request.
    #[serde(default)]
    pub token: Option<String>,
}

fn default_bridge_url() -> String {
    "http://127.0.0.1:8080".to_owned()
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::new(default_bridge_url())
    }
}

impl BridgeConfig {
    /// Creates a new bridge configuration without a token.
    #[must_use]
    pub const fn new(base_url: String) -> Self {
        Self {
            base_url,
            token: None,
        }
    }

    /// Creates configuration from environment variables.
    ///
    /// Reads `WA_BRIDGE_URL` and `WA_BRIDGE_TOKEN`, both optional.
    ///
    /// # Errors
    ///
    /// Returns an error if the bridge URL is not an http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("WA_BRIDGE_URL").unwrap_or_else(default_bridge_url);

        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBridgeUrl(base_url));
        }

        let token = lookup("WA_BRIDGE_TOKEN").filter(|t| !t.is_empty());

        Ok(Self { base_url, token })
    }
}

/// Bot-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotSettings {
    /// Port of the liveness endpoint.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Delay between acknowledging `/restart` or `/shutdown` and exiting.
    #[serde(default = "default_shutdown_delay_ms")]
    pub shutdown_delay_ms: u64,

    /// Log level for the application.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

const fn default_port() -> u16 {
    3000
}

const fn default_shutdown_delay_ms() -> u64 {
    1000
}

fn default_log_level() -> String {
    "info".to_owned()
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
            shutdown_delay_ms: default_shutdown_delay_ms(),
            log_level: default_log_level(),
        }
    }
}

impl BotSettings {
    /// Creates bot settings from environment variables with defaults.
    #[must_use]
    pub fn from_env_with_defaults() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates bot settings from an arbitrary key lookup, falling back to
    /// defaults for missing or unparseable values.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            port: lookup("PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_port),
            shutdown_delay_ms: lookup("SHUTDOWN_DELAY_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_shutdown_delay_ms),
            log_level: lookup("RUST_LOG").unwrap_or_else(default_log_level),
        }
    }

    /// Returns the shutdown delay as a `Duration`.
    #[must_use]
    pub const fn shutdown_delay(&self) -> Duration {
        Duration::from_millis(self.shutdown_delay_ms)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid bridge URL (must start with http:// or https://): {0}")]
    InvalidBridgeUrl(String),
}
