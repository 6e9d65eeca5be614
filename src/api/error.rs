//! Unified API error handling.
//!
//! All errors are translated to one of three JSON wire shapes at the service
//! boundary:
//!
//! - validation failures: `{"errors": {field: message}}`
//! - auth/resource errors: `{"message": "..."}`
//! - proxy errors: `{"error": "...", "details": "..."}`
//!
//! Unexpected failures become 500s with a generic message; the cause is
//! logged, and diagnostic detail is exposed only outside production mode.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Whether 500-class responses may carry diagnostic detail. Set once at
/// startup from the environment mode.
static EXPOSE_DETAILS: OnceLock<bool> = OnceLock::new();

pub fn set_expose_details(expose: bool) {
    let _ = EXPOSE_DETAILS.set(expose);
}

fn expose_details() -> bool {
    *EXPOSE_DETAILS.get().unwrap_or(&false)
}

/// Error taxonomy for API responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Client errors (4xx)
    BadRequest,
    Unauthorized,
    NotFound,
    Conflict,
    TooManyRequests,
    ValidationError,

    // Server errors (5xx)
    InternalError,
    ServiceUnavailable,
    UpstreamError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::UpstreamError => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Unified API error type
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    /// Per-field validation messages (ValidationError only).
    field_errors: Option<HashMap<String, String>>,
    /// Upstream/diagnostic detail (proxy-class and 500-class errors).
    details: Option<String>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field_errors: None,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    // -------------------------------------------------------------------------
    // Convenience constructors for common error types
    // -------------------------------------------------------------------------

    /// Bad request error (400) - malformed proxy input
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// Unauthorized error (401) - bad credentials
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Not found error (404)
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Conflict error (409) - resource already exists
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Validation error (400) with per-field messages
    pub fn validation(errors: HashMap<String, String>) -> Self {
        Self {
            code: ErrorCode::ValidationError,
            message: "Validation failed".to_string(),
            field_errors: Some(errors),
            details: None,
        }
    }

    /// Upstream rate limit error (429)
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::TooManyRequests, message)
    }

    /// Upstream failure (502)
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UpstreamError, message)
    }

    /// Internal server error (500); the cause is logged, not exposed
    pub fn internal(cause: impl std::fmt::Display) -> Self {
        tracing::error!("Internal error: {}", cause);
        Self::new(ErrorCode::InternalError, "Internal server error")
            .with_details(cause.to_string())
    }

    /// Service unavailable (503)
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    pub fn field_errors(&self) -> Option<&HashMap<String, String>> {
        self.field_errors.as_ref()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status_code();

        let body = match self.code {
            ErrorCode::ValidationError => {
                json!({ "errors": self.field_errors.unwrap_or_default() })
            }
            ErrorCode::BadRequest | ErrorCode::TooManyRequests | ErrorCode::UpstreamError => {
                match self.details {
                    Some(details) => json!({ "error": self.message, "details": details }),
                    None => json!({ "error": self.message }),
                }
            }
            ErrorCode::InternalError | ErrorCode::ServiceUnavailable => {
                match (self.details, expose_details()) {
                    (Some(details), true) => {
                        json!({ "message": self.message, "details": details })
                    }
                    _ => json!({ "message": self.message }),
                }
            }
            _ => json!({ "message": self.message }),
        };

        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// -------------------------------------------------------------------------
// Conversion implementations for common error types
// -------------------------------------------------------------------------

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            // Races past the existence check land here; the unique index is
            // the arbiter and the outcome is the same 409.
            if db_err.message().contains("UNIQUE constraint failed") {
                return ApiError::conflict("Email already exists");
            }
        }
        ApiError::internal(err)
    }
}

impl From<crate::llm::LlmError> for ApiError {
    fn from(err: crate::llm::LlmError) -> Self {
        use crate::llm::LlmError;

        match err {
            LlmError::RateLimited { details } => {
                let hint = if details.is_empty() {
                    "Upstream quota exceeded. Please wait and try again.".to_string()
                } else {
                    details
                };
                ApiError::rate_limited("Rate limit exceeded").with_details(hint)
            }
            other => ApiError::upstream("Failed to generate content").with_details(other.to_string()),
        }
    }
}
