//! HTTP API Request/Response Types
//!
//! JSON-serializable types for the HTTP API. Shared by the gateway and the
//! client so both sides agree on the wire shape.

use serde::{Deserialize, Serialize};

use crate::daemon::registry::IndexResource;
use crate::engine::MatchResult;

/// Envelope status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Envelope shared by every success response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: ResponseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Missing on message-only responses; decodes to `None` for any `T`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(results: T) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: None,
            results: Some(results),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    /// Success with a message and no results
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: Some(message.into()),
            results: None,
        }
    }
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: ResponseStatus,
    /// Machine-readable error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

/// Create index request body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateIndexRequest {
    pub index_type: i32,
    pub method: i32,
    pub dims: u16,
}

/// Index description returned by create, info and list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexInfo {
    /// Registry resource id
    pub id: String,
    pub index_name: String,
    pub dims: u16,
    pub index_type: i32,
    pub method: i32,
    /// Number of stored vectors; only reported by the info endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl From<&IndexResource> for IndexInfo {
    fn from(resource: &IndexResource) -> Self {
        Self {
            id: resource.resource_id().to_string(),
            index_name: resource.name().to_string(),
            dims: resource.dims(),
            index_type: resource.index_type(),
            method: resource.method(),
            size: None,
        }
    }
}

/// Insert vector request body; echoed back on success
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorPayload {
    pub id: u64,
    pub vector: Vec<f32>,
}

/// Search results: one match for `k <= 1`, a ranked list otherwise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchResults {
    Many(Vec<MatchResult>),
    Single(MatchResult),
}

impl SearchResults {
    /// Flatten into a ranked list
    pub fn into_vec(self) -> Vec<MatchResult> {
        match self {
            Self::Single(m) => vec![m],
            Self::Many(ms) => ms,
        }
    }
}

/// Query string for vector search
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    /// Comma-separated floats
    pub vector: Option<String>,
    /// Result count; parsed by the handler so bad values get a clear message
    pub k: Option<String>,
}

/// Vector id wrapper for delete responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorId {
    pub id: u64,
}

/// Membership check response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainsResponse {
    pub id: u64,
    pub exists: bool,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Whether the service is healthy
    pub healthy: bool,
    /// Service version
    pub version: String,
}
