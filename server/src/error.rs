//! API error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use slidemaker::ValidationError;
use thiserror::Error;
use tracing::error;

/// Message sent in place of internal error details.
const SERVER_ERROR: &str = "Server error";

/// Errors returned by the HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Opening, editing or writing the presentation failed.
    #[error(transparent)]
    Document(#[from] slidemaker::Error),

    /// Malformed request that is not a validation failure.
    #[error("{0}")]
    BadRequest(String),

    /// The blocking document task panicked or was cancelled.
    #[error("document task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Not found")]
    NotFound,
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    /// Status code and client-facing message.
    ///
    /// Internal failures never leak their details; those are logged instead.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            ApiError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Document(e) if e.is_client_error() => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            ApiError::Document(slidemaker::Error::Save(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to save presentation".to_string(),
            ),
            ApiError::Document(_) | ApiError::Task(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
