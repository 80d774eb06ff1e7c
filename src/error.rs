//! Error types for Memoirs

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport-level failure talking to the memoir API
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The memoir API answered with a non-success status
    #[error("Memoir API returned status {status}")]
    Upstream { status: u16 },

    /// The memoir API answered with a body that is not a record (or list of records)
    #[error("Invalid response from memoir API: {0}")]
    InvalidResponse(String),

    /// Page session unknown or expired
    #[error("Page session not found: {0}")]
    SessionNotFound(String),

    /// HTTP server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Result type alias for Memoirs operations
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// HTTP status used when this error ends a request
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Http(_) | AppError::Upstream { .. } | AppError::InvalidResponse(_) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Page-level error boundary: every error that escapes a handler becomes an HTML error page.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        let body = match &self {
            AppError::SessionNotFound(_) => crate::page::view::render_error_page(
                "Page expired",
                "This page is no longer available. Reload the list to start again.",
            ),
            _ => crate::page::view::render_error_page(
                "Something went wrong",
                "The memoir list could not be loaded. Try again in a moment.",
            ),
        };

        (status, Html(body)).into_response()
    }
}
