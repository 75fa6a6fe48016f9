//! Error handling for the bookstore HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use uuid::Uuid;

use bookstore_db::StoreError;

/// Standard error response format for all HTTP errors
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
    pub details: Vec<serde_json::Value>,
    pub trace_id: String,
    pub timestamp: String,
}

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {message}")]
    Validation {
        details: Vec<serde_json::Value>,
        code: String,
        message: String,
    },

    #[error("not found: {message}")]
    NotFound { message: String, code: String },

    #[error("bad request: {message}")]
    BadRequest { message: String, code: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a validation error
    pub fn validation(details: Vec<serde_json::Value>, message: impl Into<String>) -> Self {
        Self::Validation {
            details,
            code: "validation_error".to_string(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            code: "not_found".to_string(),
        }
    }

    /// Not-found-class error for a record that exists but cannot be sold
    pub fn out_of_stock(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            code: "out_of_stock".to_string(),
        }
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            code: "bad_request".to_string(),
        }
    }

    /// Bad request caused by a malformed record identifier
    pub fn invalid_identifier(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            code: "invalid_identifier".to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidIdentifier(_) => AppError::invalid_identifier("Invalid book ID"),
            StoreError::NotFound(_) => AppError::not_found("Book not found"),
            StoreError::OutOfStock(_) => AppError::out_of_stock("Book out of stock"),
            StoreError::Validation(violations) => AppError::validation(
                violations
                    .iter()
                    .map(|violation| serde_json::json!(violation))
                    .collect(),
                "Invalid book",
            ),
            other @ (StoreError::Backend(_) | StoreError::Serialization(_)) => {
                AppError::Internal(anyhow::Error::new(other))
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();
        let timestamp = now.format(&Rfc3339).unwrap_or_else(|_| now.to_string());

        let (status, error_code, message, details) = match self {
            AppError::Validation {
                details,
                code,
                message,
            } => (StatusCode::UNPROCESSABLE_ENTITY, code, message, details),
            AppError::NotFound { message, code } => {
                (StatusCode::NOT_FOUND, code, message, Vec::new())
            }
            AppError::BadRequest { message, code } => {
                (StatusCode::BAD_REQUEST, code, message, Vec::new())
            }
            AppError::Internal(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error".to_string(),
                format!("{:#}", e),
                Vec::new(),
            ),
        };

        if status.is_server_error() {
            tracing::error!(
                error_id = %error_id,
                error_code = %error_code,
                status_code = %status.as_u16(),
                error = %message,
                "Request error"
            );
        } else {
            tracing::warn!(
                error_id = %error_id,
                error_code = %error_code,
                status_code = %status.as_u16(),
                "Request rejected"
            );
        }

        // Internal details stay in the logs for release builds
        let message = if cfg!(not(debug_assertions)) && status == StatusCode::INTERNAL_SERVER_ERROR
        {
            "An internal server error occurred".to_string()
        } else {
            message
        };

        let body = ErrorBody {
            error: message,
            code: error_code,
            details,
            trace_id: error_id.to_string(),
            timestamp,
        };

        (status, Json(body)).into_response()
    }
}
