//! Client Module
//!
//! Talks to a vectord daemon over HTTP. For a loopback host with auto-start
//! enabled, the client first probes the port: a free port means no daemon is
//! listening, so the client starts one in-process, owns it, and waits for
//! `/api/health` before returning. A busy port means a daemon is assumed to
//! be there already and the client only attaches.

pub mod autostart;
mod transport;

use std::time::Duration;

use reqwest::Url;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{ClientConfig, Config, ServerConfig, DEFAULT_PORT};
use crate::daemon::http::types::{
    ContainsResponse, CreateIndexRequest, HealthResponse, IndexInfo, SearchResults, VectorId,
    VectorPayload,
};
use crate::daemon::{Daemon, LifecycleError};
use crate::engine::{IndexStats, MatchResult};

/// Errors that can occur when talking to the daemon
#[derive(Debug, Error)]
pub enum ClientError {
    /// The daemon answered with a structured error body
    #[error("{message} (HTTP {status}, {code})")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// The daemon answered with an error status and no usable body
    #[error("Request failed with HTTP {status}")]
    Http { status: u16 },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Daemon did not become ready: {0}")]
    DaemonStart(String),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

impl ClientError {
    /// HTTP status reported by the daemon, if the request got that far
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::Http { status } => Some(*status),
            _ => None,
        }
    }

    /// Machine-readable error code from the daemon's error body
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }
}

/// Session with a vectord daemon
pub struct Client {
    base: Url,
    is_local: bool,
    owns_daemon: bool,
    http: reqwest::Client,
    daemon: Option<Daemon>,
}

impl Client {
    /// Connect using `config`, spawning a local daemon when allowed and needed
    pub async fn connect(config: ClientConfig) -> Result<Self, ClientError> {
        let host = if config.host.trim().is_empty() {
            "localhost".to_string()
        } else {
            config.host.trim().to_string()
        };
        let port = if config.port == 0 { DEFAULT_PORT } else { config.port };
        let is_local = autostart::is_loopback(&host);

        let base = base_url(&host, port)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        let mut client = Self {
            base,
            is_local,
            owns_daemon: false,
            http,
            daemon: None,
        };

        if is_local && config.auto_start_daemon {
            client.ensure_local_daemon(&host, port, &config).await?;
        } else {
            debug!("Attaching to {} without probing", client.base);
        }

        Ok(client)
    }

    /// Connect with default settings (`localhost:7007`, auto-start on)
    pub async fn connect_default() -> Result<Self, ClientError> {
        Self::connect(ClientConfig::default()).await
    }

    async fn ensure_local_daemon(
        &mut self,
        host: &str,
        port: u16,
        config: &ClientConfig,
    ) -> Result<(), ClientError> {
        if !autostart::is_port_available(host, port) {
            info!("Port {} in use, attaching to existing daemon", port);
            return Ok(());
        }

        let daemon = Daemon::from_config(&Config {
            server: ServerConfig {
                host: autostart::bind_host(host),
                port,
                ..ServerConfig::default()
            },
            ..Config::default()
        });

        match daemon.start().await {
            Ok(addr) => info!("Spawned local daemon on {}", addr),
            Err(LifecycleError::Bind { addr, source }) => {
                // Lost the race for the port; someone else is serving it
                warn!("Could not bind {} ({}), attaching instead", addr, source);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }

        let interval = Duration::from_millis(config.health_check_interval_ms);
        if let Err(e) =
            autostart::wait_for_health(&self.http, &self.base, config.health_check_attempts, interval)
                .await
        {
            let _ = daemon.stop().await;
            return Err(e);
        }

        self.daemon = Some(daemon);
        self.owns_daemon = true;
        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    pub fn is_local(&self) -> bool {
        self.is_local
    }

    /// Whether this client spawned the daemon it talks to
    pub fn owns_daemon(&self) -> bool {
        self.owns_daemon
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidTarget(self.base.to_string()))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    // ========================================================================
    // RPC
    // ========================================================================

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        transport::send(self.http.get(self.url(&["health"])?)).await
    }

    pub async fn create_index(
        &self,
        name: &str,
        index_type: i32,
        method: i32,
        dims: u16,
    ) -> Result<IndexInfo, ClientError> {
        let body = CreateIndexRequest {
            index_type,
            method,
            dims,
        };
        transport::send(self.http.post(self.url(&["index", name])?).json(&body)).await
    }

    pub async fn insert_vector(
        &self,
        name: &str,
        id: u64,
        vector: &[f32],
    ) -> Result<VectorPayload, ClientError> {
        let body = VectorPayload {
            id,
            vector: vector.to_vec(),
        };
        transport::send(self.http.post(self.url(&["vector", name])?).json(&body)).await
    }

    /// Nearest match for `vector`
    pub async fn search_vector(&self, name: &str, vector: &[f32]) -> Result<MatchResult, ClientError> {
        let results: SearchResults = transport::send(
            self.http
                .get(self.url(&["vector", name, "search"])?)
                .query(&[("vector", join_vector(vector))]),
        )
        .await?;
        match results {
            SearchResults::Single(m) => Ok(m),
            SearchResults::Many(_) => Err(ClientError::MalformedResponse(
                "expected a single match".to_string(),
            )),
        }
    }

    /// Up to `k` nearest matches for `vector`, nearest first
    pub async fn search_vector_n(
        &self,
        name: &str,
        vector: &[f32],
        k: usize,
    ) -> Result<Vec<MatchResult>, ClientError> {
        let results: SearchResults = transport::send(
            self.http
                .get(self.url(&["vector", name, "search"])?)
                .query(&[("vector", join_vector(vector)), ("k", k.to_string())]),
        )
        .await?;
        Ok(results.into_vec())
    }

    pub async fn delete_vector(&self, name: &str, id: u64) -> Result<(), ClientError> {
        let id_segment = id.to_string();
        let _: VectorId =
            transport::send(self.http.delete(self.url(&["vector", name, &id_segment])?)).await?;
        Ok(())
    }

    pub async fn contains_vector(&self, name: &str, id: u64) -> Result<bool, ClientError> {
        let id_segment = id.to_string();
        let response: ContainsResponse =
            transport::send(self.http.get(self.url(&["vector", name, &id_segment])?)).await?;
        Ok(response.exists)
    }

    pub async fn index_info(&self, name: &str) -> Result<IndexInfo, ClientError> {
        transport::send(self.http.get(self.url(&["index", name])?)).await
    }

    pub async fn index_stats(&self, name: &str) -> Result<IndexStats, ClientError> {
        transport::send(self.http.get(self.url(&["index", name, "stats"])?)).await
    }

    pub async fn list_indexes(&self) -> Result<Vec<IndexInfo>, ClientError> {
        transport::send(self.http.get(self.url(&["index"])?)).await
    }

    pub async fn drop_index(&self, name: &str) -> Result<(), ClientError> {
        transport::send_message(self.http.delete(self.url(&["index", name])?)).await?;
        Ok(())
    }

    /// Stop the daemon if this client spawned it. Safe to call repeatedly;
    /// a client that attached to an existing daemon never stops it.
    pub async fn close(&mut self) -> Result<(), ClientError> {
        let Some(daemon) = self.daemon.take() else {
            return Ok(());
        };
        info!("Stopping owned daemon at {}", self.base);
        daemon.stop().await?;
        Ok(())
    }
}

fn base_url(host: &str, port: u16) -> Result<Url, ClientError> {
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    let authority = if bare.contains(':') {
        format!("[{}]:{}", bare, port)
    } else {
        format!("{}:{}", bare, port)
    };
    Url::parse(&format!("http://{}/", authority))
        .map_err(|e| ClientError::InvalidTarget(format!("{}: {}", authority, e)))
}

fn join_vector(vector: &[f32]) -> String {
    vector
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
