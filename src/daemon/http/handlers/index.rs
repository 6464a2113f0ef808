//! Index lifecycle handlers: create, info, stats, list, destroy

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use super::{blocking, json_body, path_params, AppState};
use crate::daemon::http::error::ApiError;
use crate::daemon::http::types::*;

/// Create index endpoint
pub async fn create_index(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<CreateIndexRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let name = path_params(path)?;
    let request = json_body(body)?;
    if name.trim().is_empty() {
        return Err(ApiError::Validation("index name must not be empty".to_string()));
    }

    debug!(
        "HTTP create index: name={}, type={}, method={}, dims={}",
        name, request.index_type, request.method, request.dims
    );

    let registry = state.registry.clone();
    let resource = blocking(move || {
        registry
            .create(&name, request.index_type, request.method, request.dims)
            .map_err(ApiError::from_create)
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(IndexInfo::from(resource.as_ref())).with_message("Index created")),
    )
        .into_response())
}

/// Index info endpoint; includes the current vector count
pub async fn index_info(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, ApiError> {
    let name = path_params(path)?;
    let resource = state.resource(&name)?;
    let info = blocking(move || {
        let size = resource.handle().size()?;
        let mut info = IndexInfo::from(resource.as_ref());
        info.size = Some(size);
        Ok(info)
    })
    .await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(info))).into_response())
}

/// Per-operation timing stats endpoint
pub async fn index_stats(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, ApiError> {
    let name = path_params(path)?;
    let resource = state.resource(&name)?;
    let stats = blocking(move || Ok(resource.handle().stats()?)).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(stats))).into_response())
}

/// List all registered indexes
pub async fn list_indexes(State(state): State<AppState>) -> impl IntoResponse {
    let infos: Vec<IndexInfo> = state
        .registry
        .list()
        .iter()
        .map(|r| IndexInfo::from(r.as_ref()))
        .collect();

    Json(ApiResponse::success(infos))
}

/// Remove an index and release its engine handle
pub async fn destroy_index(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, ApiError> {
    let name = path_params(path)?;
    let resource = state.registry.destroy(&name)?;
    let message = format!("Index '{}' destroyed", resource.name());
    // The engine index itself is freed once in-flight requests let go
    drop(resource);

    Ok((StatusCode::OK, Json(ApiResponse::message(message))).into_response())
}
