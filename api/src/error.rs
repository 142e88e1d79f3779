//! API error responses.
//!
//! Maps validation and collaborator failures to HTTP status codes and the
//! `{"success": false, "error": ..., "message": ...}` body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use shared::engine::ValidationError;
use shared::notify::NotifyError;
use shared::storage::StoreError;
use thiserror::Error;

/// Error body returned for every failed request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Always `false`.
    pub success: bool,
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable description.
    pub message: String,
}

/// Failures surfaced by the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body is not a JSON measurement payload.
    #[error("Request body is not valid JSON: {0}")]
    InvalidPayload(String),

    /// The submission failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The report could not be stored.
    #[error("Failed to store report")]
    Storage(#[from] StoreError),

    /// The report could not be delivered.
    #[error("Failed to deliver report")]
    Notification(#[from] NotifyError),

    /// The client exceeded the submission rate.
    #[error("Too many submissions, please try again later")]
    RateLimited,
}

impl ApiError {
    /// HTTP status for this error. Validation failures are client errors;
    /// collaborator failures are server errors.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidPayload(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Notification(_) => StatusCode::BAD_GATEWAY,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// Machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPayload(_) => "invalid_payload",
            Self::Validation(e) => e.code(),
            Self::Storage(_) => "storage_error",
            Self::Notification(_) => "notification_error",
            Self::RateLimited => "rate_limited",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            let detail = match &self {
                Self::Storage(e) => e.to_string(),
                Self::Notification(e) => e.to_string(),
                _ => self.to_string(),
            };
            tracing::error!(error = %detail, code = self.code(), "Request failed");
        }

        let body = ErrorBody {
            success: false,
            error: self.code().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_client_errors() {
        let err = ApiError::from(ValidationError::InvalidSex);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "invalid_sex");
        assert_eq!(err.to_string(), "Sex must be 'male' or 'female'");
    }

    #[test]
    fn test_collaborator_errors_are_server_errors() {
        let storage = ApiError::from(StoreError::LockError);
        assert_eq!(storage.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(storage.code(), "storage_error");

        let notify = ApiError::from(NotifyError::LockError);
        assert_eq!(notify.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(notify.code(), "notification_error");
    }

    #[test]
    fn test_rate_limited() {
        assert_eq!(
            ApiError::RateLimited.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }
}
