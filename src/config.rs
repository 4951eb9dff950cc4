//! Configuration management for RAX File Manager
//!
//! Startup configuration (bind address, upload limits, where the root
//! configuration document lives) loaded from an optional `config.toml` with
//! `RAX_FM_*` environment overrides. The switchable set of storage roots is
//! not part of this; see [`crate::locations`].

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Startup configuration; changes require a restart.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IP address to bind the HTTP listener
    /// Environment: RAX_FM_BIND_ADDRESS
    pub bind_address: String,

    /// Port for the HTTP listener
    /// Environment: RAX_FM_PORT
    pub port: u16,

    /// JSON document holding the storage locations and active index
    pub config_file: String,

    /// Directory used for the built-in default location
    pub default_root: String,

    /// Maximum request body size for uploads, in MB
    /// Environment: RAX_FM_MAX_UPLOAD_SIZE_MB
    pub max_upload_size_mb: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8080,
            config_file: "fm-config.json".to_string(),
            default_root: "./storage".to_string(),
            max_upload_size_mb: 100,
        }
    }
}

impl ServerConfig {
    /// Load configuration from config.toml (if present) with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from `path` (extension optional) with environment overrides
    pub fn load_from(path: &str) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        let settings = Config::builder()
            .set_default("bind_address", defaults.bind_address)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("config_file", defaults.config_file)?
            .set_default("default_root", defaults.default_root)?
            .set_default("max_upload_size_mb", defaults.max_upload_size_mb as i64)?
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("RAX_FM"))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.port == 0 {
            return Err(config::ConfigError::Message("port cannot be 0".into()));
        }

        if self.config_file.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "config_file cannot be empty".into(),
            ));
        }

        if self.default_root.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "default_root cannot be empty".into(),
            ));
        }

        if self.max_upload_size_mb == 0 {
            return Err(config::ConfigError::Message(
                "max_upload_size_mb must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Get bind address and port as socket address
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn config_file_path(&self) -> PathBuf {
        PathBuf::from(&self.config_file)
    }

    pub fn default_root_path(&self) -> PathBuf {
        PathBuf::from(&self.default_root)
    }

    /// Get maximum upload size in bytes
    pub fn max_upload_size_bytes(&self) -> usize {
        (self.max_upload_size_mb as usize).saturating_mul(1024 * 1024)
    }
}
