//! Error types for moodscan-api

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use moodscan_dsp::AnalysisError;
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Endpoint exists but has no implementation yet (501)
    #[error("Not implemented: {0}")]
    Unimplemented(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure in the analysis pipeline
    #[error("Analysis failed: {0}")]
    Analysis(#[from] AnalysisError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Unimplemented(msg) => (StatusCode::NOT_IMPLEMENTED, "UNIMPLEMENTED", msg),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg,
            ),
            ApiError::Io(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "IO_ERROR",
                err.to_string(),
            ),
            ApiError::Analysis(ref err) => {
                let code = match err {
                    AnalysisError::FileNotFound(_) => "FILE_NOT_FOUND",
                    AnalysisError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
                    AnalysisError::InvalidAudio(_) => "INVALID_AUDIO",
                    _ => "ANALYSIS_FAILED",
                };
                let status = if err.is_caller_error() {
                    StatusCode::BAD_REQUEST
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                };
                (status, code, err.to_string())
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
