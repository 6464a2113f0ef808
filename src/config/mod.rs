//! Configuration for vectord

mod client;
mod logging;
mod registry;
mod server;

pub use client::ClientConfig;
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use registry::{DuplicateNamePolicy, RegistryConfig};
pub use server::{ServerConfig, DEFAULT_PORT};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration shared by the service and the CLI client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP service configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Index registry configuration
    #[serde(default)]
    pub registry: RegistryConfig,
    /// Client configuration
    #[serde(default)]
    pub client: ClientConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate all configuration fields.
    ///
    /// Collects all validation errors and reports them together.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        // Server
        if self.server.host.trim().is_empty() {
            errors.push("server host must not be empty".to_string());
        }
        if self.server.port == 0 {
            errors.push("server port must be between 1 and 65535".to_string());
        }
        if self.server.shutdown_timeout_secs == 0 {
            errors.push("shutdown_timeout_secs must be positive".to_string());
        }

        // Client
        if self.client.host.trim().is_empty() {
            errors.push("client host must not be empty".to_string());
        }
        if self.client.port == 0 {
            errors.push("client port must be between 1 and 65535".to_string());
        }
        if self.client.request_timeout_secs == 0 {
            errors.push("request_timeout_secs must be positive".to_string());
        }
        if self.client.health_check_attempts == 0 {
            errors.push("health_check_attempts must be positive".to_string());
        }

        // Logging
        errors.extend(self.logging.directive_errors());

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }
}
