//! Forward-only batch step.

use super::{BatchStep, Classifier, DEFAULT_POSITIVE_CLASS, StepOutput, positive_class_column};
use crate::errors::TrainError;
use burn::tensor::{Tensor, backend::Backend};

/// Wraps a model that can only run inference.
///
/// Predictions are the positive-class column of the model output. Asking it
/// to train returns [`TrainError::NotImplemented`]; a concrete training step
/// has to be supplied for that, see [`super::AutodiffStep`].
#[derive(Debug, Clone)]
pub struct InferenceStep<M> {
    model: M,
    positive_class: Option<usize>,
}

impl<M> InferenceStep<M> {
    /// Creates a step predicting column [`DEFAULT_POSITIVE_CLASS`].
    pub fn new(model: M) -> Self {
        Self {
            model,
            positive_class: Some(DEFAULT_POSITIVE_CLASS),
        }
    }

    /// Sets the positive-class column; `None` keeps the full output.
    pub fn positive_class(mut self, positive_class: Option<usize>) -> Self {
        self.positive_class = positive_class;
        self
    }

    /// The wrapped model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Unwraps the model.
    pub fn into_model(self) -> M {
        self.model
    }
}

impl<B: Backend, M: Classifier<B>> BatchStep<B> for InferenceStep<M> {
    fn train_step(
        &mut self,
        _features: Tensor<B, 2>,
        _labels: Tensor<B, 1>,
        _learning_rate: f64,
    ) -> Result<StepOutput<B>, TrainError> {
        Err(TrainError::NotImplemented {
            operation: "train_step",
        })
    }

    fn predict_step(&self, features: Tensor<B, 2>) -> Result<Tensor<B, 2>, TrainError> {
        positive_class_column(self.model.forward(features), self.positive_class)
    }
}
