// Request-level error taxonomy and its HTTP mapping.
//
// Per-team fetch failures (stats::FetchError) and generation failures
// (strategy::GenerationError) are handled inside the orchestrator and never
// reach this type; everything here renders as a JSON error body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors the analyze-strategy endpoint can return to the caller.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body lacked a non-empty team list or an event key.
    #[error("Missing required parameters: teams and event")]
    MissingParameters,

    /// Every per-team fetch failed; nothing to aggregate.
    #[error("No valid team stats found")]
    NoValidData,

    /// Anything unexpected. The message goes into the `details` field.
    #[error("Failed to analyze strategy")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::MissingParameters => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": self.to_string() })),
            )
                .into_response(),
            ApiError::NoValidData => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": self.to_string() })),
            )
                .into_response(),
            ApiError::Internal(details) => {
                tracing::error!("Error in strategy analysis: {details}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Failed to analyze strategy",
                        "details": details,
                    })),
                )
                    .into_response()
            }
        }
    }
}
