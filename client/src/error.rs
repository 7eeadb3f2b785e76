//! Error handling for the PackTrace API client
//!
//! Server error bodies are decoded once at the transport boundary and
//! normalized into typed variants; business logic never probes raw
//! response shapes.

use rust_decimal::Decimal;
use serde::Deserialize;
use shared::BatchStatus;
use thiserror::Error;

/// Client error types
#[derive(Error, Debug)]
pub enum ApiError {
    // Transport errors
    #[error("Network error: {0}")]
    Network(String),

    // Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    // Validation errors
    #[error("Validation failed")]
    Validation { errors: Vec<FieldError> },

    // Business logic errors
    #[error("Invalid state transition: {0}")]
    InvalidState(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Crate {qr_code} is already reconciled")]
    AlreadyReconciled { qr_code: String },

    #[error("Invalid weight: {0} kg")]
    InvalidWeight(Decimal),

    // HTTP errors without a recognized code
    #[error("Client error {status}: {detail}")]
    Client { status: u16, detail: String },

    #[error("Server error {status}: {detail}")]
    Server { status: u16, detail: String },

    // Local errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// A single field-level validation failure, surfaced verbatim to the user
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Structured error body returned by the server
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    code: String,
    message: String,
    #[serde(default)]
    field: Option<String>,
    #[serde(default)]
    errors: Option<Vec<FieldError>>,
}

impl ApiError {
    /// Build the error for an operation attempted from the wrong lifecycle state
    pub fn invalid_state(operation: &str, current: BatchStatus) -> Self {
        ApiError::InvalidState(format!("cannot {} while batch is {}", operation, current))
    }

    /// Normalize an HTTP error response into a typed error
    ///
    /// Recognized error codes map to their dedicated variants; anything
    /// else falls back to `Client`/`Server` by status class.
    pub fn from_response(status: u16, body: &str) -> Self {
        if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(body) {
            return Self::from_error_detail(status, parsed.error);
        }

        let detail = if body.is_empty() {
            "no response body".to_string()
        } else {
            body.to_string()
        };
        Self::from_status(status, detail)
    }

    fn from_error_detail(status: u16, detail: ErrorDetail) -> Self {
        match detail.code.as_str() {
            "INVALID_CREDENTIALS" | "TOKEN_EXPIRED" | "INVALID_TOKEN" | "UNAUTHORIZED" => {
                ApiError::Authentication(detail.message)
            }
            "VALIDATION_ERROR" => {
                let errors = detail.errors.unwrap_or_else(|| {
                    vec![FieldError {
                        field: detail.field.unwrap_or_default(),
                        message: detail.message,
                    }]
                });
                ApiError::Validation { errors }
            }
            "INVALID_STATE_TRANSITION" => ApiError::InvalidState(detail.message),
            "NOT_FOUND" | "CRATE_NOT_FOUND" | "CRATE_IN_OTHER_BATCH" => {
                ApiError::NotFound(detail.message)
            }
            "PRECONDITION_FAILED" | "RECONCILIATION_INCOMPLETE" => {
                ApiError::PreconditionFailed(detail.message)
            }
            "ALREADY_RECONCILED" => ApiError::AlreadyReconciled {
                qr_code: detail.field.unwrap_or_default(),
            },
            _ => Self::from_status(status, detail.message),
        }
    }

    fn from_status(status: u16, detail: String) -> Self {
        match status {
            401 | 403 => ApiError::Authentication(detail),
            404 => ApiError::NotFound(detail),
            412 => ApiError::PreconditionFailed(detail),
            400..=499 => ApiError::Client { status, detail },
            _ => ApiError::Server { status, detail },
        }
    }

    /// Whether retrying the same request can possibly succeed
    ///
    /// Network errors include timeouts, where the outcome is unknown;
    /// callers must re-fetch authoritative state before retrying a
    /// non-idempotent transition.
    pub fn is_retriable(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Server { .. })
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let errors = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("invalid value for {}", field)),
                })
            })
            .collect();
        ApiError::Validation { errors }
    }
}

/// Result type alias for client operations
pub type ApiResult<T> = Result<T, ApiError>;
