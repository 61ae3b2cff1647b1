//! Taxonomy mapping backend and input failures onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hub_logging::{hub_error, hub_warn};
use modelhub_core::{BucketKeyError, DecodeError};
use modelhub_engine::BackendError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or invalid client input; rejected before any backend call.
    #[error("{0}")]
    ClientInput(String),
    #[error("invalid token: {0}")]
    Decode(#[from] DecodeError),
    #[error("{0}")]
    NameConflict(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Permission(String),
    /// Any other backend failure; rendered as a generic server error.
    #[error("backend request failed: {0}")]
    Backend(String),
}

impl From<BucketKeyError> for ApiError {
    fn from(err: BucketKeyError) -> Self {
        Self::ClientInput(err.to_string())
    }
}

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        if err.is_conflict() {
            Self::NameConflict(err.to_string())
        } else if err.is_not_found() {
            Self::NotFound(err.to_string())
        } else if err.is_forbidden() {
            Self::Permission(err.to_string())
        } else {
            Self::Backend(err.to_string())
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::ClientInput(_) | Self::Decode(_) => StatusCode::BAD_REQUEST,
            Self::NameConflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Permission(_) => StatusCode::FORBIDDEN,
            Self::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            hub_error!("Request failed: {}", self);
        } else {
            hub_warn!("Request rejected ({}): {}", status, self);
        }
        (
            status,
            Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}
