// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::StoreError;
use crate::validation::ValidationError;

/// Every failure a handler can report, with its status code and wire format
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    Validation(ValidationError),

    // 404 Not Found
    NotFound,

    // 413 Payload Too Large
    PayloadTooLarge,

    // 500 Internal Server Error (remote datastore rejected or failed the write)
    Store(StoreError),

    // 500 Internal Server Error (anything else; details stay in the logs)
    Internal,
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::NotFound => "NOT_FOUND",
            ApiError::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ApiError::Store(_) => "SUPABASE_ERROR",
            ApiError::Internal => "INTERNAL_ERROR",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::Validation(details) => json!({
                "error": self.error_code(),
                "details": details,
            }),
            ApiError::Store(err) => json!({
                "error": self.error_code(),
                "details": err.to_string(),
            }),
            _ => json!({ "error": self.error_code() }),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        tracing::warn!("Supabase insert failed: {}", err);
        ApiError::Store(err)
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Validation(err) => write!(f, "{}: {}", self.error_code(), err),
            ApiError::Store(err) => write!(f, "{}: {}", self.error_code(), err),
            _ => write!(f, "{}", self.error_code()),
        }
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
