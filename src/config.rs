//! Configuration management for Note Drafter
//!
//! Handles loading and validating service configuration.
//! Configuration is read from `<config_dir>/note-drafter/config.json` when it
//! exists, then overridden from the environment.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application name, also the configuration directory name
pub const APP_NAME: &str = "note-drafter";

/// Configuration file name inside the configuration directory
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Default listen address
pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";

/// Default Gemini model
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-pro";

/// Default Gemini API base URL
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default note API base URL
pub const DEFAULT_NOTE_BASE_URL: &str = "https://note.com/api/v1";

/// Base of the editor URL returned for a saved draft
pub const DEFAULT_NOTE_EDIT_URL: &str = "https://note.com/edit";

/// Outbound request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Generative backend configuration
    pub generation: GenerationConfig,

    /// Publishing backend configuration
    pub publisher: PublisherConfig,
}

impl Config {
    /// Load configuration from the default location or return defaults
    pub fn load() -> ConfigResult<Self> {
        let path = Self::config_file()?;
        let mut config = Self::load_from(&path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific file, falling back to defaults when absent
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            log::debug!("No configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadError(format!("{}: {}", path.display(), e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from a variable lookup; empty values are ignored
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("GEMINI_API_KEY") {
            self.generation.api_key = Some(key);
        }
        if let Some(model) = get("GEMINI_MODEL") {
            self.generation.model = model;
        }
        if let Some(email) = get("NOTE_EMAIL") {
            self.publisher.email = Some(email);
        }
        if let Some(password) = get("NOTE_PASSWORD") {
            self.publisher.password = Some(password);
        }
        if let Some(addr) = get("NOTE_DRAFTER_ADDR") {
            self.server.addr = addr;
        }
    }

    /// Check values that would make the service unusable
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.addr.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "server.addr".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.generation.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "generation.timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.publisher.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "publisher.timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Get the configuration directory path
    pub fn config_dir() -> ConfigResult<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .ok_or(ConfigError::DirectoryError)
    }

    /// Get the default configuration file path
    pub fn config_file() -> ConfigResult<PathBuf> {
        Self::config_dir().map(|p| p.join(CONFIG_FILE_NAME))
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address (`host:port`)
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
        }
    }
}

/// Gemini configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl GenerationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// note.com configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    pub email: Option<String>,
    pub password: Option<String>,
    /// API base, e.g. `https://note.com/api/v1`
    pub base_url: String,
    /// Prefix of the editor URL handed back after a save
    pub edit_url: String,
    pub timeout_secs: u64,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            email: None,
            password: None,
            base_url: DEFAULT_NOTE_BASE_URL.to_string(),
            edit_url: DEFAULT_NOTE_EDIT_URL.to_string(),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl PublisherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.addr, "127.0.0.1:3000");
        assert_eq!(config.generation.model, "gemini-2.0-pro");
        assert_eq!(config.generation.timeout(), Duration::from_secs(60));
        assert_eq!(config.publisher.base_url, "https://note.com/api/v1");
        assert!(config.generation.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config.server.addr, deserialized.server.addr);
        assert_eq!(config.publisher.edit_url, deserialized.publisher.edit_url);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{"generation": {"model": "gemini-1.5-flash"}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.generation.model, "gemini-1.5-flash");
        assert_eq!(config.generation.base_url, DEFAULT_GEMINI_BASE_URL);
        assert_eq!(config.server.addr, DEFAULT_ADDR);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("GEMINI_API_KEY", "key-123"),
            ("NOTE_EMAIL", "writer@example.com"),
            ("NOTE_PASSWORD", ""),
            ("NOTE_DRAFTER_ADDR", "0.0.0.0:8080"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.generation.api_key.as_deref(), Some("key-123"));
        assert_eq!(config.generation.model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.publisher.email.as_deref(), Some("writer@example.com"));
        assert!(config.publisher.password.is_none());
        assert_eq!(config.server.addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_validate_rejects_empty_addr() {
        let mut config = Config::default();
        config.server.addr = " ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { key, .. }) if key == "server.addr"
        ));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.publisher.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_missing_file() {
        let path = std::env::temp_dir().join(format!("{}-missing.json", uuid::Uuid::new_v4()));
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.server.addr, DEFAULT_ADDR);
    }

    #[test]
    fn test_load_from_invalid_file() {
        let path = std::env::temp_dir().join(format!("{}-invalid.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, "{ not json").unwrap();
        let result = Config::load_from(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
