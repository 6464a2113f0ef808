//! Gateway errors and their HTTP mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, warn};

use crate::daemon::registry::RegistryError;
use crate::engine::EngineError;

use super::types::ErrorResponse;

/// Every way a gateway request can fail
#[derive(Debug, Error)]
pub enum ApiError {
    /// Locally detected bad input; never reaches the engine
    #[error("{0}")]
    Validation(String),

    #[error("Index '{0}' not found")]
    IndexNotFound(String),

    #[error("Index '{0}' already exists")]
    IndexExists(String),

    #[error("No route for '{0}'")]
    RouteNotFound(String),

    #[error("Method {0} not allowed on '{1}'")]
    MethodNotAllowed(String, String),

    /// Engine failure while allocating an index
    #[error("Upstream engine error: {0}")]
    Upstream(EngineError),

    /// Engine failure on an existing index
    #[error("{0}")]
    Engine(EngineError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::IndexNotFound(_) | Self::RouteNotFound(_) => StatusCode::NOT_FOUND,
            Self::IndexExists(_) => StatusCode::CONFLICT,
            Self::MethodNotAllowed(..) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Engine(EngineError::DuplicatedEntry) => StatusCode::CONFLICT,
            Self::Engine(EngineError::NotFoundId) => StatusCode::NOT_FOUND,
            Self::Engine(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::IndexNotFound(_) | Self::RouteNotFound(_) => "NOT_FOUND",
            Self::IndexExists(_) => "INDEX_EXISTS",
            Self::MethodNotAllowed(..) => "METHOD_NOT_ALLOWED",
            Self::Upstream(e) | Self::Engine(e) => e.as_code_str(),
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Registry failure during index creation
    pub fn from_create(err: RegistryError) -> Self {
        match err {
            RegistryError::Exists(name) => Self::IndexExists(name),
            RegistryError::NotFound(name) => Self::IndexNotFound(name),
            RegistryError::Engine(e) => Self::Upstream(e),
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Exists(name) => Self::IndexExists(name),
            RegistryError::NotFound(name) => Self::IndexNotFound(name),
            RegistryError::Engine(e) => Self::Engine(e),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        Self::Engine(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }
        (status, Json(ErrorResponse::new(self.code(), self.to_string()))).into_response()
    }
}
