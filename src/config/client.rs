//! Client configuration

use serde::{Deserialize, Serialize};

use super::server::DEFAULT_PORT;

/// Client connection and auto-start options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Service host; loopback hosts enable auto-start
    pub host: String,
    /// Service port
    pub port: u16,
    /// Spawn an in-process service when nothing listens on a local port
    pub auto_start_daemon: bool,
    /// Upper bound for every RPC
    pub request_timeout_secs: u64,
    /// Readiness probes after spawning before giving up
    pub health_check_attempts: u32,
    /// Delay between readiness probes
    pub health_check_interval_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            auto_start_daemon: true,
            request_timeout_secs: 30,
            health_check_attempts: 20,
            health_check_interval_ms: 50,
        }
    }
}

impl ClientConfig {
    /// Local client on `port` with auto-start enabled
    pub fn local(port: u16) -> Self {
        Self {
            port,
            ..Self::default()
        }
    }

    /// Client for a remote host; never spawns a service
    pub fn remote(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            auto_start_daemon: false,
            ..Self::default()
        }
    }

    pub fn with_auto_start(mut self, enabled: bool) -> Self {
        self.auto_start_daemon = enabled;
        self
    }
}
