//! Protocol types for the HTTP API
//!
//! Error bodies and the system info payload.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

// =============================================================================
// Error Types
// =============================================================================

/// Error codes returned in error bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Invalid or missing parameters
    InvalidParams,
    /// Domain is not in the current snapshot
    NotFound,
    /// Unexpected server error
    InternalError,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidParams => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorData {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorData {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(domain: &str) -> Self {
        Self::new(
            ErrorCode::NotFound,
            format!("{} is not a registered .gov domain", domain),
        )
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidParams, message)
    }
}

impl IntoResponse for ErrorData {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

// =============================================================================
// System Info Types
// =============================================================================

/// System information response
#[derive(Debug, Clone, Serialize)]
pub struct SystemInfo {
    /// Server version
    pub server_version: String,

    /// Registry source
    pub source: String,

    /// Refresh interval, humantime formatted
    pub refresh_interval: String,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_serialization() {
        let error = ErrorData::new(ErrorCode::InvalidParams, "test error");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"INVALID_PARAMS\""));
        assert!(json.contains("\"message\":\"test error\""));
    }

    #[test]
    fn test_error_status() {
        assert_eq!(ErrorCode::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorData::not_found("NOPE.GOV").into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ErrorCode::InternalError.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
