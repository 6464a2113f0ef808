//! Request execution and response decoding.

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::daemon::http::types::{ApiResponse, ErrorResponse};

use super::ClientError;

/// Send a request and return the envelope's `results`
pub(crate) async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
    let envelope: ApiResponse<T> = send_envelope(request).await?;
    envelope
        .results
        .ok_or_else(|| ClientError::MalformedResponse("response carried no results".to_string()))
}

/// Send a request whose success carries only a message
pub(crate) async fn send_message(request: RequestBuilder) -> Result<Option<String>, ClientError> {
    let envelope: ApiResponse<serde_json::Value> = send_envelope(request).await?;
    Ok(envelope.message)
}

async fn send_envelope<T: DeserializeOwned>(
    request: RequestBuilder,
) -> Result<ApiResponse<T>, ClientError> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        return Err(decode_error(status, &body));
    }

    serde_json::from_slice(&body).map_err(|e| {
        debug!("Undecodable {} response: {}", status, String::from_utf8_lossy(&body));
        ClientError::MalformedResponse(e.to_string())
    })
}

/// Structured error body if there is one, otherwise just the status
fn decode_error(status: StatusCode, body: &[u8]) -> ClientError {
    match serde_json::from_slice::<ErrorResponse>(body) {
        Ok(err) => ClientError::Api {
            status: status.as_u16(),
            code: err.code,
            message: err.message,
        },
        Err(_) => ClientError::Http {
            status: status.as_u16(),
        },
    }
}
