//! HTTP API Request Handlers
//!
//! Handlers that map HTTP requests to registry and engine operations.
//! Engine calls run on the blocking pool so a slow index never stalls the
//! async workers.

mod index;
mod system;
mod vector;

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::Json;

use crate::daemon::registry::{IndexRegistry, IndexResource};

use super::error::ApiError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<IndexRegistry>,
}

impl AppState {
    pub fn new(registry: Arc<IndexRegistry>) -> Self {
        Self { registry }
    }

    fn resource(&self, name: &str) -> Result<Arc<IndexResource>, ApiError> {
        self.registry
            .lookup(name)
            .ok_or_else(|| ApiError::IndexNotFound(name.to_string()))
    }
}

// Re-export all handlers
pub use index::{create_index, destroy_index, index_info, index_stats, list_indexes};
pub use system::{health, method_not_allowed, not_found};
pub use vector::{contains_vector, delete_vector, insert_vector, search_vector};

/// Run an engine call on the blocking pool
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("engine task failed: {}", e)))?
}

/// Unwrap a JSON body, turning extractor rejections into validation errors
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::Validation(format!("invalid request body: {}", rejection.body_text())))
}

fn path_params<T>(path: Result<Path<T>, PathRejection>) -> Result<T, ApiError> {
    path.map(|Path(value)| value)
        .map_err(|rejection| ApiError::Validation(format!("invalid path: {}", rejection.body_text())))
}

fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(value)| value)
        .map_err(|rejection| ApiError::Validation(format!("invalid query string: {}", rejection.body_text())))
}
