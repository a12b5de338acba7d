//! Training-loop error types.

use thiserror::Error;

/// Errors that can occur while driving a training run.
#[derive(Debug, Error)]
pub enum TrainError {
    /// A batch step was asked to do something its variant does not provide.
    #[error("Batch step does not implement `{operation}`")]
    NotImplemented { operation: &'static str },

    /// The run was cancelled from outside the loop.
    #[error("Training interrupted")]
    Interrupted,

    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Invalid trainer configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Tensor data error: {message}")]
    Data { message: String },

    #[error("Metric error: {message}")]
    Metric { message: String },

    #[error("Plot error: {message}")]
    Plot { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
