//! Error types for the artwork cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Artwork Error Enum ==
/// Unified error type for artwork acquisition and the HTTP surface.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArtworkError {
    /// Reachability check returned a non-success status or never completed
    #[error("Unreachable: {url} (status {})", display_status(.status))]
    Unreachable { url: String, status: Option<u16> },

    /// Reachability check succeeded but the download did not produce a usable file
    #[error("Download failed: {url} (status {}): {reason}", display_status(.status))]
    DownloadFailed {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    /// A recent attempt failed and is still inside the grace window
    #[error("Recently failed: {url}: {reason}")]
    RecentlyFailed { url: String, reason: String },

    /// Local cache directories could not be created or written
    #[error("Storage error: {0}")]
    Storage(String),

    /// Outbound HTTP client could not be configured
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// Backing key-value store could not be read or written
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

fn display_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "none".to_string(),
    }
}

impl ArtworkError {
    /// Returns the HTTP status reported by the remote side, if any.
    pub fn remote_status(&self) -> Option<u16> {
        match self {
            ArtworkError::Unreachable { status, .. } => *status,
            ArtworkError::DownloadFailed { status, .. } => *status,
            _ => None,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ArtworkError {
    fn into_response(self) -> Response {
        let status = match &self {
            ArtworkError::Unreachable { .. } => StatusCode::BAD_GATEWAY,
            ArtworkError::DownloadFailed { .. } => StatusCode::BAD_GATEWAY,
            ArtworkError::RecentlyFailed { .. } => StatusCode::NOT_FOUND,
            ArtworkError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ArtworkError::HttpClient(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ArtworkError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ArtworkError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(json!({
            "error": self.to_string(),
            "remote_status": self.remote_status(),
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the artwork cache.
pub type Result<T> = std::result::Result<T, ArtworkError>;
