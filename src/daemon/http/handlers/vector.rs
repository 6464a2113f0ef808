//! Vector handlers: insert, search, delete, contains

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use super::{blocking, json_body, path_params, query_params, AppState};
use crate::daemon::http::error::ApiError;
use crate::daemon::http::types::*;
use crate::daemon::registry::IndexResource;

/// Insert vector endpoint
pub async fn insert_vector(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<VectorPayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let name = path_params(path)?;
    let payload = json_body(body)?;
    let resource = state.resource(&name)?;
    check_dims(&resource, &payload.vector)?;

    debug!("HTTP insert: index={}, id={}", name, payload.id);

    let payload = blocking(move || {
        resource.handle().insert(payload.id, &payload.vector)?;
        Ok(payload)
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(payload).with_message("Vector inserted")),
    )
        .into_response())
}

/// Search vector endpoint: `?vector=f,f,...&k=N`
pub async fn search_vector(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let name = path_params(path)?;
    let query = query_params(query)?;
    let raw = query
        .vector
        .ok_or_else(|| ApiError::Validation("missing 'vector' query parameter".to_string()))?;
    let vector = parse_vector(&raw)?;
    let k = parse_k(query.k.as_deref())?;

    let resource = state.resource(&name)?;
    check_dims(&resource, &vector)?;

    debug!("HTTP search: index={}, k={}", name, k);

    let results = blocking(move || {
        let handle = resource.handle();
        if k == 1 {
            Ok(SearchResults::Single(handle.search(&vector)?))
        } else {
            Ok(SearchResults::Many(handle.search_n(&vector, k)?))
        }
    })
    .await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(results))).into_response())
}

/// Delete vector endpoint
pub async fn delete_vector(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Result<Response, ApiError> {
    let (name, id) = path_params(path)?;
    let id = parse_id(&id)?;
    let resource = state.resource(&name)?;

    blocking(move || Ok(resource.handle().delete(id)?)).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(VectorId { id }).with_message("Vector deleted")),
    )
        .into_response())
}

/// Membership check endpoint
pub async fn contains_vector(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Result<Response, ApiError> {
    let (name, id) = path_params(path)?;
    let id = parse_id(&id)?;
    let resource = state.resource(&name)?;

    let exists = blocking(move || Ok(resource.handle().contains(id)?)).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(ContainsResponse { id, exists })),
    )
        .into_response())
}

fn check_dims(resource: &IndexResource, vector: &[f32]) -> Result<(), ApiError> {
    if vector.len() != resource.dims() as usize {
        return Err(ApiError::Validation(format!(
            "vector has {} dimensions, index '{}' expects {}",
            vector.len(),
            resource.name(),
            resource.dims()
        )));
    }
    Ok(())
}

/// Parse a comma-separated list of finite floats
fn parse_vector(raw: &str) -> Result<Vec<f32>, ApiError> {
    if raw.trim().is_empty() {
        return Err(ApiError::Validation("'vector' query parameter is empty".to_string()));
    }
    raw.split(',')
        .map(|token| {
            let token = token.trim();
            token
                .parse::<f32>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| {
                    ApiError::Validation(format!("invalid vector component '{}'", token))
                })
        })
        .collect()
}

fn parse_k(raw: Option<&str>) -> Result<usize, ApiError> {
    let Some(raw) = raw else {
        return Ok(1);
    };
    match raw.trim().parse::<usize>() {
        Ok(0) => Err(ApiError::Validation("'k' must be at least 1".to_string())),
        Ok(k) => Ok(k),
        Err(_) => Err(ApiError::Validation(format!("invalid 'k' value '{}'", raw))),
    }
}

fn parse_id(raw: &str) -> Result<u64, ApiError> {
    raw.parse::<u64>()
        .map_err(|_| ApiError::Validation(format!("invalid vector id '{}'", raw)))
}
