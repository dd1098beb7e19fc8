//! Error taxonomy for the state retrieval and dashboard layers.
//!
//! Every failure in the read path keeps its kind end-to-end: the boundary
//! maps each variant to an HTTP status and a `{"error": ...}` body, and
//! nothing in between recovers or rewraps (the cache only invalidates its
//! slot before rethrowing).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Failures in the snapshot read/aggregate/upload pipeline.
#[derive(Debug, Error)]
pub enum StateError {
    /// No blob credential configured and no local fallback usable.
    #[error("Blob storage not configured")]
    NotConfigured,

    /// No snapshot exists yet at the selected backend. The message carries
    /// guidance ("start the bot" vs "upload state") for the dashboard.
    #[error("{0}")]
    NotFound(String),

    /// Transport-level failure: connection error or non-success status.
    #[error("Transport error: {0}")]
    Io(String),

    /// Snapshot content is not a valid state document.
    #[error("Failed to parse state snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    /// Upload credential mismatch.
    #[error("Unauthorized")]
    Unauthorized,

    /// Upload payload is not a well-formed JSON object.
    #[error("Invalid state data")]
    InvalidInput,
}

impl StateError {
    /// HTTP status the boundary serves for this failure kind.
    pub fn status_code(&self) -> StatusCode {
        match self {
            StateError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            StateError::NotFound(_) => StatusCode::NOT_FOUND,
            StateError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            StateError::Parse(_) => StatusCode::INTERNAL_SERVER_ERROR,
            StateError::Unauthorized => StatusCode::UNAUTHORIZED,
            StateError::InvalidInput => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<reqwest::Error> for StateError {
    fn from(e: reqwest::Error) -> Self {
        StateError::Io(e.to_string())
    }
}

impl IntoResponse for StateError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            StateError::NotConfigured.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            StateError::NotFound("missing".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            StateError::Io("timeout".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            StateError::Unauthorized.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            StateError::InvalidInput.status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_parse_error_maps_to_500() {
        let err: StateError = serde_json::from_str::<serde_json::Value>("not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, StateError::Parse(_)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_not_found_message_passthrough() {
        let err = StateError::NotFound("State file not found. Start the trading bot first.".into());
        assert!(err.to_string().contains("Start the trading bot"));
    }
}
