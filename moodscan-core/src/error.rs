//! Error types for the decision core

use thiserror::Error;

/// Feature vector validation failures.
///
/// The decision engine is total over finite numeric inputs, so malformed
/// vectors are rejected here, at the boundary, instead of silently falling
/// through comparison chains into an unintended rule band.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A field holds NaN or an infinity
    #[error("non-finite value in {field}: {value}")]
    NonFinite { field: &'static str, value: f64 },

    /// Tempo must be strictly positive
    #[error("tempo must be positive, got {0}")]
    NonPositiveTempo(f64),

    /// A field that is defined as non-negative holds a negative value
    #[error("negative value in {field}: {value}")]
    Negative { field: &'static str, value: f64 },
}
