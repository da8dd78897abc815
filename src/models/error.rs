//! Model error types

use thiserror::Error;

/// Failures of the sequence-model primitive.
///
/// Fit and score failures are recoverable by the selection layer: a failed
/// candidate is skipped, never propagated out of a search.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("not enough observations: need at least {needed}, got {got}")]
    TooFewObservations { needed: usize, got: usize },

    #[error("model has not been fitted")]
    NotFitted,

    #[error("feature dimension mismatch: model expects {expected}, data has {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("likelihood became non-finite during estimation")]
    Degenerate,
}

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;
