//! HTTP API Server
//!
//! Axum-based HTTP server for the vectord REST API.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::Method;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::daemon::registry::IndexRegistry;

use super::handlers::AppState;
use super::routes::create_router;

/// HTTP API server
pub struct HttpServer {
    config: ServerConfig,
    registry: Arc<IndexRegistry>,
}

impl HttpServer {
    /// Create a new HTTP server
    pub fn new(config: ServerConfig, registry: Arc<IndexRegistry>) -> Self {
        Self { config, registry }
    }

    /// Router with CORS (if enabled) and request tracing applied
    pub fn router(&self) -> Router {
        let mut app = create_router(AppState::new(self.registry.clone()));

        if self.config.cors_enabled {
            let cors = CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
                .allow_headers(Any)
                .allow_origin(Any);
            app = app.layer(cors);
        }

        app.layer(TraceLayer::new_for_http())
    }

    /// Serve on an already bound listener until `shutdown` fires.
    ///
    /// In-flight requests are allowed to finish; new connections are refused
    /// once the signal arrives.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<()> {
        let addr: SocketAddr = listener.local_addr().context("Listener has no local address")?;
        let app = self.router();

        info!("HTTP API server listening on http://{}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                info!("HTTP server shutting down");
            })
            .await
            .context("HTTP server error")?;

        Ok(())
    }
}
