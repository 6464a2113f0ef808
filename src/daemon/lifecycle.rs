//! Daemon Lifecycle Management
//!
//! Binds the HTTP gateway to a socket and owns startup and graceful
//! shutdown. State moves `Stopped -> Starting -> Listening -> Stopping ->
//! Stopped`. `start` returns as soon as the listener is bound and the serve
//! task is scheduled; callers that need readiness poll `/api/health`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::{Config, ServerConfig};
use crate::engine::BuiltinEngine;

use super::http::HttpServer;
use super::registry::IndexRegistry;

/// Service process state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Stopped,
    Starting,
    Listening,
    Stopping,
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Daemon is already {0:?}")]
    AlreadyRunning(ServerState),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Graceful shutdown did not finish within {0:?}")]
    ShutdownTimeout(Duration),
}

struct Running {
    shutdown_tx: broadcast::Sender<()>,
    handle: JoinHandle<()>,
    local_addr: SocketAddr,
}

/// Daemon instance owning the registry and the HTTP listener
pub struct Daemon {
    config: ServerConfig,
    registry: Arc<IndexRegistry>,
    state: Mutex<ServerState>,
    running: Mutex<Option<Running>>,
}

impl Daemon {
    pub fn new(config: ServerConfig, registry: Arc<IndexRegistry>) -> Self {
        Self {
            config,
            registry,
            state: Mutex::new(ServerState::Stopped),
            running: Mutex::new(None),
        }
    }

    /// Daemon backed by the built-in engine
    pub fn from_config(config: &Config) -> Self {
        let registry = IndexRegistry::new(
            Arc::new(BuiltinEngine::new()),
            config.registry.duplicate_names,
        );
        Self::new(config.server.clone(), Arc::new(registry))
    }

    pub fn state(&self) -> ServerState {
        *self.state.lock()
    }

    /// Bound address while listening
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.lock().as_ref().map(|r| r.local_addr)
    }

    pub fn registry(&self) -> Arc<IndexRegistry> {
        self.registry.clone()
    }

    /// Bind the listener and schedule the serve task
    pub async fn start(&self) -> Result<SocketAddr, LifecycleError> {
        {
            let mut state = self.state.lock();
            if *state != ServerState::Stopped {
                return Err(LifecycleError::AlreadyRunning(*state));
            }
            *state = ServerState::Starting;
        }

        let addr = self.config.listen_addr();
        info!("Starting vectord daemon on {}", addr);

        let listener = match TcpListener::bind(&addr).await {
            Ok(listener) => listener,
            Err(source) => {
                *self.state.lock() = ServerState::Stopped;
                return Err(LifecycleError::Bind { addr, source });
            }
        };
        let local_addr = match listener.local_addr() {
            Ok(local_addr) => local_addr,
            Err(source) => {
                *self.state.lock() = ServerState::Stopped;
                return Err(LifecycleError::Bind { addr, source });
            }
        };

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let server = HttpServer::new(self.config.clone(), self.registry.clone());
        let handle = tokio::spawn(async move {
            match server.run(listener, shutdown_rx).await {
                Ok(()) => info!("HTTP server shut down cleanly"),
                Err(e) => error!("HTTP server failed: {:#}", e),
            }
        });

        *self.running.lock() = Some(Running {
            shutdown_tx,
            handle,
            local_addr,
        });
        *self.state.lock() = ServerState::Listening;

        info!("Daemon listening on {}", local_addr);
        Ok(local_addr)
    }

    /// Graceful shutdown bounded by `shutdown_timeout_secs`.
    ///
    /// Safe to call more than once; only the first call does any work. On
    /// timeout the serve task is aborted and the error is returned, but the
    /// daemon still ends up `Stopped`.
    pub async fn stop(&self) -> Result<(), LifecycleError> {
        let running = self.running.lock().take();
        let Some(running) = running else {
            return Ok(());
        };
        *self.state.lock() = ServerState::Stopping;
        info!("Stopping daemon on {}", running.local_addr);

        let _ = running.shutdown_tx.send(());

        let deadline = Duration::from_secs(self.config.shutdown_timeout_secs);
        let abort = running.handle.abort_handle();
        let result = match tokio::time::timeout(deadline, running.handle).await {
            Ok(_) => Ok(()),
            Err(_) => {
                warn!("HTTP server did not shut down within {:?}, aborting", deadline);
                abort.abort();
                Err(LifecycleError::ShutdownTimeout(deadline))
            }
        };

        self.registry.clear();
        *self.state.lock() = ServerState::Stopped;
        info!("Daemon stopped");
        result
    }

    /// Run until Ctrl+C or SIGTERM, then shut down gracefully
    pub async fn run_until_signal(&self) -> Result<()> {
        self.start().await?;

        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down");
            }
            _ = Self::wait_for_sigterm() => {
                info!("Received SIGTERM, shutting down");
            }
        }

        if let Err(e) = self.stop().await {
            // Deadline overrun is reported but does not fail the process
            warn!("{}", e);
        }
        Ok(())
    }

    /// Wait for SIGTERM signal
    #[cfg(unix)]
    async fn wait_for_sigterm() {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to register SIGTERM handler: {}. Falling back to pending future.", e);
                std::future::pending::<()>().await;
            }
        }
    }

    #[cfg(not(unix))]
    async fn wait_for_sigterm() {
        std::future::pending::<()>().await
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        if let Some(running) = self.running.get_mut().take() {
            let _ = running.shutdown_tx.send(());
        }
    }
}
