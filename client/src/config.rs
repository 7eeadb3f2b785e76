//! Configuration management for the PackTrace API client
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with PACKTRACE_ prefix

use std::path::PathBuf;

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main client configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Remote API configuration
    pub api: ApiConfig,

    /// Local session persistence configuration
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Base URL of the tracking API (e.g., "https://api.example.com")
    pub base_url: String,

    /// Request timeout in seconds; mobile networks need a generous bound
    pub timeout_seconds: u64,

    /// Basic-auth fallback used only when no session exists
    pub basic_auth_username: Option<String>,
    pub basic_auth_password: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// Where to persist session tokens; in-memory only when unset
    pub storage_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment =
            std::env::var("PACKTRACE_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("api.base_url", "http://localhost:3000")?
            .set_default("api.timeout_seconds", 30)?
            .set_default("session.storage_path", None::<String>)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (PACKTRACE_ prefix)
            .add_source(
                Environment::with_prefix("PACKTRACE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout_seconds: 30,
            basic_auth_username: None,
            basic_auth_password: None,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { storage_path: None }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            api: ApiConfig::default(),
            session: SessionConfig::default(),
        }
    }
}
