//! Server configuration
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. built-in defaults (`0.0.0.0:5000`, `models/malicious_url_model.json`)
//! 2. a TOML file: `$URLSENTRY_CONFIG`, or `~/.urlsentry/config.toml` if present
//! 3. environment variables `PORT`, `URLSENTRY_HOST`, `URLSENTRY_MODEL`
//!
//! ```toml
//! host = "127.0.0.1"
//! port = 8080
//! model_path = "/srv/models/malicious_url_model.json"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Env var naming an explicit config file
pub const CONFIG_ENV: &str = "URLSENTRY_CONFIG";
/// Env var overriding the listen port
pub const PORT_ENV: &str = "PORT";
/// Env var overriding the listen host
pub const HOST_ENV: &str = "URLSENTRY_HOST";
/// Env var overriding the model artifact path
pub const MODEL_ENV: &str = "URLSENTRY_MODEL";

/// Errors loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("TOML parse error: {0}")]
    Parse(String),

    #[error("Invalid port: {0}")]
    InvalidPort(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Listen address and model location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            model_path: PathBuf::from("models/malicious_url_model.json"),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML string; missing keys keep their defaults
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    /// Load from the standard locations and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::config_file() {
            Some(path) => {
                tracing::info!("Loading config from {:?}", path);
                Self::from_file(&path)?
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Config file to read, if any
    fn config_file() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }

        let user_file = dirs::home_dir()?.join(".urlsentry").join("config.toml");
        user_file.exists().then_some(user_file)
    }

    /// Apply environment-style overrides from `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(PORT_ENV) {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        }
        if let Some(host) = lookup(HOST_ENV) {
            self.host = host;
        }
        if let Some(model) = lookup(MODEL_ENV) {
            self.model_path = PathBuf::from(model);
        }
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort("0".to_string()));
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("host must not be empty".to_string()));
        }
        if self.model_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "model_path must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Socket address to bind, as `host:port` (`[host]:port` for IPv6)
    pub fn bind_addr(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}
