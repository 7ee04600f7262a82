//! Typed error handling for the back office
//!
//! Every handler returns `Result<_, AppError>`; the error carries its HTTP
//! status and a stable machine-readable code so API clients can branch on
//! failures without string matching.
//!
//! Vendor adapters have their own error enums (see [`crate::vendors`]) and
//! never cross the handler boundary raw — handlers translate them into
//! [`AppError::Vendor`] so the response shape stays uniform.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// When enabled, internal error responses include the underlying detail.
/// Set once at startup from [`crate::config::AppConfig`].
static DEBUG_ERRORS: AtomicBool = AtomicBool::new(false);

/// Enable or disable detail leakage on internal errors.
pub fn set_debug_errors(enabled: bool) {
    DEBUG_ERRORS.store(enabled, Ordering::Relaxed);
}

/// The main error type for the back office API
#[derive(Debug)]
pub enum AppError {
    /// Input validation failed (missing or malformed field)
    Validation { field: String, message: String },

    /// A resource (order, customer, invoice, parcel) does not exist
    NotFound { resource: &'static str, id: String },

    /// A precondition failed: duplicate label, duplicate invoice,
    /// customer still referenced by orders, wrong shipping method, ...
    Conflict { message: String },

    /// Missing or wrong webhook token
    Unauthorized { message: String },

    /// A vendor call failed; the vendor message is surfaced when available
    Vendor { vendor: &'static str, message: String },

    /// Storage or other unexpected failure
    Internal { message: String },
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        AppError::NotFound {
            resource,
            id: id.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        AppError::Conflict {
            message: message.into(),
        }
    }

    /// Wrap an unexpected failure. The detail is always logged; it only
    /// reaches the response body when debug errors are enabled.
    pub fn internal(message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::error!(error = %message, "internal error");
        AppError::Internal { message }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Vendor { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the stable error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::NotFound { .. } => "NOT_FOUND",
            AppError::Conflict { .. } => "CONFLICT",
            AppError::Unauthorized { .. } => "UNAUTHORIZED",
            AppError::Vendor { .. } => "VENDOR_ERROR",
            AppError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Convert to the wire representation
    pub fn to_response(&self) -> ErrorResponse {
        let error = match self {
            AppError::Internal { message } if DEBUG_ERRORS.load(Ordering::Relaxed) => {
                format!("Internal server error: {}", message)
            }
            AppError::Internal { .. } => "Internal server error".to_string(),
            other => other.to_string(),
        };
        ErrorResponse {
            error,
            code: self.error_code().to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::Validation { field, .. } => Some(serde_json::json!({ "field": field })),
            AppError::NotFound { resource, id } => {
                Some(serde_json::json!({ "resource": resource, "id": id }))
            }
            AppError::Vendor { vendor, .. } => Some(serde_json::json!({ "vendor": vendor })),
            _ => None,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation { field, message } => {
                write!(f, "Invalid value for '{}': {}", field, message)
            }
            AppError::NotFound { resource, id } => {
                write!(f, "{} '{}' not found", resource, id)
            }
            AppError::Conflict { message } => write!(f, "{}", message),
            AppError::Unauthorized { message } => write!(f, "Unauthorized: {}", message),
            AppError::Vendor { vendor, message } => {
                write!(f, "{} error: {}", vendor, message)
            }
            AppError::Internal { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl std::error::Error for AppError {}

/// Error response structure for HTTP responses
///
/// The `error` field is the contract every endpoint shares: failures are
/// `{"error": "..."}` plus a stable `code`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::internal(err.to_string())
    }
}

/// A specialized Result type for handler code
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_returns_400() {
        let err = AppError::validation("lengthMm", "must be positive");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(err.to_string().contains("lengthMm"));
    }

    #[test]
    fn not_found_returns_404_with_details() {
        let err = AppError::not_found("order", "DTF-2025-0001");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        let response = err.to_response();
        assert_eq!(response.code, "NOT_FOUND");
        assert!(response.details.is_some());
    }

    #[test]
    fn conflict_returns_400() {
        let err = AppError::conflict("a label already exists for this order");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "CONFLICT");
    }

    #[test]
    fn vendor_error_returns_500_and_surfaces_message() {
        let err = AppError::Vendor {
            vendor: "carrier",
            message: "HTTP 503".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_response().error.contains("HTTP 503"));
    }

    #[test]
    fn internal_error_is_generic_without_debug() {
        set_debug_errors(false);
        let err = AppError::Internal {
            message: "secret detail".to_string(),
        };
        let response = err.to_response();
        assert_eq!(response.error, "Internal server error");
        assert!(!response.error.contains("secret"));
    }

    #[test]
    fn anyhow_conversion_maps_to_internal() {
        let err: AppError = anyhow::anyhow!("lock poisoned").into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
