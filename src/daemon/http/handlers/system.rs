//! System handlers: health, fallbacks

use axum::{
    extract::OriginalUri,
    http::{Method, Uri},
    response::IntoResponse,
    Json,
};

use crate::daemon::http::error::ApiError;
use crate::daemon::http::types::{ApiResponse, HealthResponse};

/// Liveness endpoint; polled by clients waiting on a freshly spawned service
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::success(HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// Structured 404 for unknown routes
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::RouteNotFound(uri.path().to_string())
}

/// Structured 405 for a known path hit with the wrong method
pub async fn method_not_allowed(method: Method, OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::MethodNotAllowed(method.to_string(), uri.path().to_string())
}
