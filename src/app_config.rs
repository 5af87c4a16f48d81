//! Application configuration from file and environment variables
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Environment variables (prefixed with KHIDMAT_)
//! 2. Config file (config.toml)
//! 3. Default values
//!
//! The loaded value is passed to the components that need it; there is no
//! process-global configuration.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub name: String,
    pub description: String,
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Khidmat".to_string(),
            description: "A community service portal".to_string(),
            base_url: "http://localhost:8080".to_string(),
        }
    }
}

/// Blob storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Bucket holding volunteer and lost-and-found images
    pub bucket: String,
    /// Base URL objects are publicly served from
    pub public_url: String,
    /// Upload size cap in bytes
    pub max_image_bytes: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: "volunteer-images".to_string(),
            public_url: "http://localhost:9000".to_string(),
            max_image_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Session timeout in minutes (default: 24 hours)
    pub session_timeout_minutes: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            session_timeout_minutes: 1440,
        }
    }
}

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub site: SiteConfig,
    pub storage: StorageConfig,
    pub security: SecurityConfig,
}

impl AppConfig {
    /// Load from `config.toml` (optional) and `KHIDMAT_*` environment
    /// variables, e.g. `KHIDMAT_STORAGE__BUCKET`.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::load_from("config")
    }

    /// Load from a specific config file base name.
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("KHIDMAT")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load, falling back to defaults with a logged warning.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            log::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }
}
