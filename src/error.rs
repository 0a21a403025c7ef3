// src/error.rs
// Error taxonomy for the triage pipeline

use std::time::Duration;

use thiserror::Error;

/// Main error type for the triage library
#[derive(Error, Debug)]
pub enum TriageError {
    #[error("empty text")]
    EmptyInput,

    #[error("unsupported file type; send a .txt or .pdf file")]
    UnsupportedType,

    #[error("empty file")]
    EmptyPayload,

    #[error("file exceeds {limit_mb} MB")]
    PayloadTooLarge { limit_mb: u64 },

    #[error("classification timed out after {timeout:?}")]
    ClassificationTimeout { timeout: Duration },

    #[error("classification provider error: {0}")]
    ClassificationProvider(String),

    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for Result using TriageError
pub type Result<T> = std::result::Result<T, TriageError>;

impl From<tokio::task::JoinError> for TriageError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_cancelled() {
            TriageError::Internal("task cancelled".to_string())
        } else {
            TriageError::Internal(err.to_string())
        }
    }
}

impl From<reqwest::Error> for TriageError {
    fn from(err: reqwest::Error) -> Self {
        // Request URLs stay out of messages that end up in logs
        TriageError::ClassificationProvider(err.without_url().to_string())
    }
}
