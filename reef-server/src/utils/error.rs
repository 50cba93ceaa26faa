//! Unified error handling
//!
//! Application-level error type and response envelope:
//! - [`AppError`] - application error enum
//! - [`AppResponse`] - API response structure
//!
//! # Error codes
//!
//! | Prefix | Category | Example |
//! |--------|----------|---------|
//! | E0xxx | Request/business errors | E0003 not found |
//! | E9xxx | System errors | E9002 database error |
//!
//! Order-domain rejections keep their own machine codes
//! (`STALE_TRANSITION`, `TERMINAL_STATE`, ...) and embed the typed
//! [`OrderError`] in the envelope so clients can recover without string
//! matching.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use shared::order::OrderError;
use tracing::error;

/// Unified API response structure
///
/// ```json
/// {
///   "code": "E0000",
///   "message": "Success",
///   "data": { ... }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    /// Error code (E0000 means success)
    pub code: String,
    /// Message
    pub message: String,
    /// Response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Typed order-domain error, when the rejection came from the engine
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<OrderError>,
}

/// Application error enum
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Business errors (4xx) ==========
    #[error("Resource not found: {0}")]
    /// Resource does not exist (404)
    NotFound(String),

    #[error("Validation failed: {0}")]
    /// Validation failed (400)
    Validation(String),

    #[error(transparent)]
    /// Rejection from the fulfillment engine (mapped per variant)
    Order(#[from] OrderError),

    // ========== System errors (5xx) ==========
    #[error("Database error: {0}")]
    /// Storage error (500)
    Database(String),

    #[error("Internal server error: {0}")]
    /// Internal error (500)
    Internal(String),

    #[error("Invalid request: {0}")]
    /// Malformed request (400)
    Invalid(String),
}

/// Result type for API handlers
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, order_error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "E0003".to_string(), msg, None),

            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "E0002".to_string(), msg, None),

            AppError::Order(e) => {
                let status = match &e {
                    OrderError::NotFound { .. } => StatusCode::NOT_FOUND,
                    OrderError::StaleTransition { .. } => StatusCode::CONFLICT,
                    OrderError::TerminalState { .. } | OrderError::InvalidChoice { .. } => {
                        StatusCode::UNPROCESSABLE_ENTITY
                    }
                };
                (status, e.code().to_string(), e.to_string(), Some(e))
            }

            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9002".to_string(),
                    "Database error".to_string(),
                    None,
                )
            }

            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9001".to_string(),
                    "Internal server error".to_string(),
                    None,
                )
            }

            AppError::Invalid(msg) => (StatusCode::BAD_REQUEST, "E0006".to_string(), msg, None),
        };

        let body = Json(AppResponse::<()> {
            code,
            message,
            data: None,
            error: order_error,
        });

        (status, body).into_response()
    }
}

impl AppError {
    /// Storage-layer failure with a uniform message
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<crate::orders::EngineError> for AppError {
    fn from(e: crate::orders::EngineError) -> Self {
        use crate::orders::EngineError;
        match e {
            EngineError::Order(err) => AppError::Order(err),
            EngineError::Storage(err) => AppError::Database(err.to_string()),
            EngineError::UnknownMenuItem(id) => {
                AppError::Validation(format!("Unknown menu item: {id}"))
            }
            EngineError::InvalidInput(msg) => AppError::Validation(msg),
        }
    }
}

// ========== Helper functions ==========

/// Create a successful response envelope
pub fn ok<T: Serialize>(data: T) -> Json<AppResponse<T>> {
    Json(AppResponse {
        code: "E0000".to_string(),
        message: "Success".to_string(),
        data: Some(data),
        error: None,
    })
}
