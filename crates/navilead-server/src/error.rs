//! Error handling for the API server

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use navilead::{DataError, NavileadError, TemplateError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Result type for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Navilead(#[from] NavileadError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid JSON body: {0}")]
    Json(#[from] JsonRejection),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Configuration error".to_string(),
            ),
            ApiError::Json(rejection) => (rejection.status(), rejection.body_text()),
            ApiError::Navilead(e) => navilead_status(e),
            ApiError::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }
}

fn navilead_status(error: &NavileadError) -> (StatusCode, String) {
    let status = match error {
        NavileadError::Pricing(_) => StatusCode::UNPROCESSABLE_ENTITY,
        NavileadError::Template(TemplateError::NotFound { .. }) => StatusCode::NOT_FOUND,
        NavileadError::Template(_) => StatusCode::UNPROCESSABLE_ENTITY,
        NavileadError::Data(DataError::ServiceNotFound { .. }) => StatusCode::NOT_FOUND,
        NavileadError::Data(DataError::Serialization { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
        NavileadError::Data(_) => StatusCode::BAD_REQUEST,
        NavileadError::Storage(_) | NavileadError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        (status, "Internal server error".to_string())
    } else {
        (status, error.user_message())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = self.status_and_message();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

// Convenience functions for common errors
impl ApiError {
    pub fn validation(msg: &str) -> Self {
        Self::Validation(msg.to_string())
    }
}
