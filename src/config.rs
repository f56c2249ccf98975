//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::client::DEFAULT_GUEST_TOKEN_HEADER;
use crate::embedded::DEFAULT_RETRY_CEILING;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub embedded: EmbeddedConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Embedded page configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddedConfig {
    /// Identity of the frame's end of the channel
    #[serde(default = "default_channel_name")]
    pub channel_name: String,

    /// Verbose channel and handshake logging
    #[serde(default)]
    pub debug: bool,

    /// Highest `attempt` value that still triggers an automatic reload
    #[serde(default = "default_retry_ceiling")]
    pub retry_ceiling: u32,

    /// Header carrying the guest token, unless the page's bootstrap data names one
    #[serde(default = "default_guest_token_header")]
    pub guest_token_header_name: String,

    /// Id of the element the application is mounted into
    #[serde(default = "default_mount_element_id")]
    pub mount_element_id: String,

    /// Host origins allowed to open a channel. Empty disables the check.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_channel_name() -> String {
    "superset".to_string()
}

fn default_retry_ceiling() -> u32 {
    DEFAULT_RETRY_CEILING
}

fn default_guest_token_header() -> String {
    DEFAULT_GUEST_TOKEN_HEADER.to_string()
}

fn default_mount_element_id() -> String {
    "app".to_string()
}

impl Default for EmbeddedConfig {
    fn default() -> Self {
        Self {
            channel_name: default_channel_name(),
            debug: false,
            retry_ceiling: default_retry_ceiling(),
            guest_token_header_name: default_guest_token_header(),
            mount_element_id: default_mount_element_id(),
            allowed_origins: Vec::new(),
        }
    }
}

/// Superset API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8088".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    #[cfg(feature = "native")]
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("superset-embedded").join("config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("SUPERSET_EMBEDDED_API_URL") {
            self.api.base_url = url;
        }
        if let Some(header) = lookup("SUPERSET_EMBEDDED_GUEST_TOKEN_HEADER") {
            self.embedded.guest_token_header_name = header;
        }
        if let Some(debug) = lookup("SUPERSET_EMBEDDED_DEBUG") {
            self.embedded.debug = matches!(debug.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(origins) = lookup("SUPERSET_EMBEDDED_ALLOWED_ORIGINS") {
            self.embedded.allowed_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }

        if let Some(level) = lookup("SUPERSET_EMBEDDED_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("SUPERSET_EMBEDDED_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Superset Embedded Configuration
#
# Environment variables override these settings:
# - SUPERSET_EMBEDDED_API_URL
# - SUPERSET_EMBEDDED_GUEST_TOKEN_HEADER
# - SUPERSET_EMBEDDED_DEBUG
# - SUPERSET_EMBEDDED_ALLOWED_ORIGINS (comma-separated)
# - SUPERSET_EMBEDDED_LOG_LEVEL
# - SUPERSET_EMBEDDED_LOG_FORMAT

[embedded]
# Name of the frame's end of the channel
channel_name = "superset"

# Log handshake and channel traffic
debug = false

# Automatic reloads stop once the `attempt` URL parameter reaches this value
retry_ceiling = 3

# Header carrying the guest token on API requests
guest_token_header_name = "X-GuestToken"

# Element the application is mounted into
mount_element_id = "app"

# Host origins allowed to open a channel.
# Leave empty to accept any origin (not recommended in production).
allowed_origins = []

[api]
# Superset server URL
base_url = "http://localhost:8088"

# Request timeout in seconds
request_timeout_secs = 30

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
