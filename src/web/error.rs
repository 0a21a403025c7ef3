// src/web/error.rs
// HTTP error responses and the TriageError -> status mapping

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use tracing::error;

use crate::error::TriageError;

/// Standard API error response format
#[derive(Debug)]
pub struct ApiError {
    pub message: String,
    pub status_code: StatusCode,
    pub error_code: &'static str,
}

impl ApiError {
    pub fn new(status_code: StatusCode, error_code: &'static str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code,
            error_code,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "classification failed",
        )
    }

    pub fn gateway_timeout(message: impl Into<String>) -> Self {
        Self::new(StatusCode::GATEWAY_TIMEOUT, "TIMEOUT", message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": true,
            "message": self.message,
            "status": self.status_code.as_u16(),
            "error_code": self.error_code,
        });
        (self.status_code, Json(body)).into_response()
    }
}

impl From<TriageError> for ApiError {
    fn from(err: TriageError) -> Self {
        match &err {
            TriageError::EmptyInput => Self::new(StatusCode::BAD_REQUEST, "EMPTY_INPUT", err.to_string()),
            TriageError::EmptyPayload => Self::new(StatusCode::BAD_REQUEST, "EMPTY_FILE", err.to_string()),
            TriageError::UnsupportedType => Self::new(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_TYPE",
                err.to_string(),
            ),
            TriageError::PayloadTooLarge { .. } => {
                Self::new(StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", err.to_string())
            }
            TriageError::ClassificationTimeout { .. } => Self::new(
                StatusCode::GATEWAY_TIMEOUT,
                "CLASSIFICATION_TIMEOUT",
                "classification timed out",
            ),
            TriageError::ClassificationProvider(_) => Self::new(
                StatusCode::BAD_GATEWAY,
                "PROVIDER_ERROR",
                "classification provider failed",
            ),
            TriageError::MalformedDocument(_) | TriageError::Config(_) | TriageError::Internal(_) => {
                error!(error = %err, "Unhandled error while classifying");
                Self::internal()
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
