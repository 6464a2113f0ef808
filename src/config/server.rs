//! Service process configuration

use serde::{Deserialize, Serialize};

/// Default port for both the service and the client
pub const DEFAULT_PORT: u16 = 7007;

/// HTTP service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// Deadline for graceful shutdown before in-flight requests are abandoned
    pub shutdown_timeout_secs: u64,
    /// Enable CORS (useful for browser-based clients)
    pub cors_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            shutdown_timeout_secs: 5,
            cors_enabled: false,
        }
    }
}

impl ServerConfig {
    /// Config bound to loopback on `port`
    pub fn local(port: u16) -> Self {
        Self {
            port,
            ..Self::default()
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
