//! Error types for decoding and analysis

use std::path::PathBuf;

use thiserror::Error;

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Failures on the way from an audio file to a mood result.
///
/// The first three variants are caller mistakes (map to 400 at an HTTP
/// boundary); the rest are decode/processing failures.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// File does not exist
    #[error("audio file not found: {0}")]
    FileNotFound(PathBuf),

    /// Extension is not in the supported set
    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),

    /// File exists but does not hold decodable audio
    #[error("invalid audio file: {0}")]
    InvalidAudio(String),

    /// Container/codec error from the decoder
    #[error("failed to decode audio: {0}")]
    Decode(#[from] symphonia::core::errors::Error),

    /// Sample-rate conversion failure
    #[error("failed to resample audio: {0}")]
    Resample(String),

    /// Extracted features failed boundary validation
    #[error("invalid feature vector: {0}")]
    Validation(#[from] moodscan_core::ValidationError),

    /// I/O error reading the file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Worker/task failure
    #[error("internal error: {0}")]
    Internal(String),
}

impl AnalysisError {
    /// True when the failure is the caller's input rather than a
    /// processing fault.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            AnalysisError::FileNotFound(_)
                | AnalysisError::UnsupportedFormat(_)
                | AnalysisError::InvalidAudio(_)
        )
    }
}
