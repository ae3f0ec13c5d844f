//! Centralized error handling.
//!
//! Every handler and service returns [`AppResult`]; the HTTP boundary turns
//! an [`AppError`] into `{"error": message}` with the matching status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication & Authorization
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    // Resource errors
    #[error("{0} not found")]
    NotFound(String),

    // Client input
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    BadRequest(String),

    // Hosted store errors
    #[error("{message}")]
    Upstream {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unauthorized")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    // Internal
    #[error("{0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl AppError {
    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream { .. } | AppError::Http(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the message written to the response body
    fn user_message(&self) -> String {
        match self {
            AppError::Upstream {
                status,
                code,
                message,
            } => {
                tracing::error!(status, code = ?code, "Store error: {}", message);
                message.clone()
            }
            AppError::Http(e) => {
                tracing::error!("Store transport error: {:?}", e);
                self.to_string()
            }
            AppError::Jwt(e) => {
                tracing::debug!("Token rejected: {:?}", e);
                self.to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                msg.clone()
            }
            _ => self.to_string(),
        }
    }

    /// Error code reported by the hosted store, if any.
    pub fn upstream_code(&self) -> Option<&str> {
        match self {
            AppError::Upstream { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// True for store failures that describe a problem with the submitted data
    /// (4xx from the store) rather than an outage.
    pub fn is_client_upstream(&self) -> bool {
        matches!(self, AppError::Upstream { status, .. } if (400..500).contains(status))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: self.user_message(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self, entity: &str) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, entity: &str) -> AppResult<T> {
        self.ok_or_else(|| AppError::NotFound(entity.to_string()))
    }
}

/// Convenience constructors
impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    pub fn upstream(status: u16, code: Option<String>, message: impl Into<String>) -> Self {
        AppError::Upstream {
            status,
            code,
            message: message.into(),
        }
    }
}
