//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and the JSON
//! envelope every failed request is rendered as.

use crate::config::ConfigError;
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use casebook_core::ports::PortError;
use serde_json::json;
use tracing::error;

/// The primary error type for the `api` service.
///
/// The request-level variants carry the message shown to the client. The
/// startup variants are only ever logged.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or invalid session, or an email outside the allow-list.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated, but not allowed to use an admin route.
    #[error("{0}")]
    Forbidden(String),

    /// Malformed input from the client.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Text extraction, embedding, or generation failed.
    #[error("{0}")]
    Upstream(String),

    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents an error from running the embedded migrations.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn unauthorized() -> Self {
        Self::Unauthorized("Unauthorized".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Upstream(_)
            | Self::Config(_)
            | Self::Database(_)
            | Self::Migration(_)
            | Self::Io(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message the client sees. Internal details are never echoed.
    fn public_message(&self) -> String {
        match self {
            Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::Validation(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg)
            | Self::Upstream(msg) => msg.clone(),
            _ => "Server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR && !matches!(self, Self::Upstream(_)) {
            error!("Request failed: {}", self);
        }
        let body = Json(json!({ "ok": false, "error": self.public_message() }));
        (status, body).into_response()
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound(msg) => Self::NotFound(msg),
            PortError::Conflict(msg) => Self::Conflict(msg),
            PortError::Unauthorized => Self::unauthorized(),
            PortError::Upstream(detail) => {
                error!("Upstream service error: {}", detail);
                Self::Upstream("Upstream service error".to_string())
            }
            PortError::Unexpected(detail) => Self::Internal(detail),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::Validation(format!("Failed to read multipart data: {}", err.body_text()))
    }
}
