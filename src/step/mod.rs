//! Batch steps: the per-batch computation the trainer delegates to.
//!
//! The training loop only depends on [`BatchStep`]. Two variants ship with
//! the crate:
//! - [`InferenceStep`] wraps a forward-only model; it can predict but has no
//!   training step.
//! - [`AutodiffStep`] runs forward, loss, backward and an optimizer update on
//!   an autodiff backend.

mod autodiff;
mod inference;

pub use autodiff::AutodiffStep;
pub use inference::InferenceStep;

use crate::errors::TrainError;
use burn::tensor::{Tensor, backend::Backend};

/// Column of a two-column model output holding the positive-class score.
pub const DEFAULT_POSITIVE_CLASS: usize = 1;

/// A model collaborator: maps flat features to per-example scores.
pub trait Classifier<B: Backend> {
    /// Forward pass, `(batch_size, features_count) -> (batch_size, outputs)`.
    fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2>;
}

/// What a training step hands back to the loop.
#[derive(Debug, Clone)]
pub struct StepOutput<B: Backend> {
    /// Scalar loss of the batch.
    pub loss: f32,
    /// Prediction for the batch, shaped like [`BatchStep::predict_step`] output.
    pub prediction: Tensor<B, 2>,
}

/// Per-batch computation driven by the trainer.
pub trait BatchStep<B: Backend> {
    /// Runs a forward pass, computes the loss, back-propagates and applies a
    /// parameter update with `learning_rate`.
    fn train_step(
        &mut self,
        features: Tensor<B, 2>,
        labels: Tensor<B, 1>,
        learning_rate: f64,
    ) -> Result<StepOutput<B>, TrainError>;

    /// Forward pass only. Must not change model state.
    fn predict_step(&self, features: Tensor<B, 2>) -> Result<Tensor<B, 2>, TrainError>;
}

/// Narrows a multi-column model output to the positive-class column.
///
/// Single-column outputs and `None` pass through unchanged.
pub fn positive_class_column<B: Backend>(
    output: Tensor<B, 2>,
    positive_class: Option<usize>,
) -> Result<Tensor<B, 2>, TrainError> {
    let [_, columns] = output.dims();
    match positive_class {
        Some(index) if columns > 1 => {
            if index >= columns {
                return Err(TrainError::ShapeMismatch {
                    expected: index + 1,
                    actual: columns,
                });
            }
            Ok(output.narrow(1, index, 1))
        }
        _ => Ok(output),
    }
}
