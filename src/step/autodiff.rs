//! Batch step backed by Burn autodiff and an optimizer.

use super::{BatchStep, Classifier, StepOutput, positive_class_column};
use crate::errors::TrainError;
use crate::training::Loss;
use burn::{
    module::AutodiffModule,
    optim::{GradientsParams, Optimizer},
    tensor::{ElementConversion, Tensor, backend::AutodiffBackend},
};
use std::marker::PhantomData;

/// Trains a model with forward, loss, backward and an optimizer update per
/// batch.
pub struct AutodiffStep<B, M, O> {
    model: M,
    optimizer: O,
    loss: Loss,
    positive_class: Option<usize>,
    _backend: PhantomData<B>,
}

impl<B, M, O> AutodiffStep<B, M, O>
where
    B: AutodiffBackend,
    M: AutodiffModule<B> + Classifier<B>,
    O: Optimizer<M, B>,
{
    /// Creates a step; the positive-class column follows the loss.
    pub fn new(model: M, optimizer: O, loss: Loss) -> Self {
        Self {
            model,
            optimizer,
            loss,
            positive_class: loss.default_positive_class(),
            _backend: PhantomData,
        }
    }

    /// Overrides the positive-class column; `None` keeps the full output.
    pub fn positive_class(mut self, positive_class: Option<usize>) -> Self {
        self.positive_class = positive_class;
        self
    }

    pub fn loss(&self) -> Loss {
        self.loss
    }

    /// Returns the current model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Consumes the step and returns the trained model.
    pub fn into_model(self) -> M {
        self.model
    }
}

impl<B, M, O> BatchStep<B> for AutodiffStep<B, M, O>
where
    B: AutodiffBackend,
    M: AutodiffModule<B> + Classifier<B>,
    O: Optimizer<M, B>,
{
    fn train_step(
        &mut self,
        features: Tensor<B, 2>,
        labels: Tensor<B, 1>,
        learning_rate: f64,
    ) -> Result<StepOutput<B>, TrainError> {
        // Forward pass
        let output = self.model.forward(features);
        let prediction = positive_class_column(output.clone(), self.positive_class)?;

        // Compute loss
        let scores = if self.loss.uses_logits() {
            output
        } else {
            prediction.clone()
        };
        let loss = self.loss.compute(scores, labels);
        let loss_value: f32 = loss.clone().into_scalar().elem();

        // Backward pass
        let grads = loss.backward();
        let grads_params = GradientsParams::from_grads(grads, &self.model);

        // Update model parameters
        self.model = self
            .optimizer
            .step(learning_rate, self.model.clone(), grads_params);

        Ok(StepOutput {
            loss: loss_value,
            prediction: prediction.detach(),
        })
    }

    fn predict_step(&self, features: Tensor<B, 2>) -> Result<Tensor<B, 2>, TrainError> {
        let output = self.model.forward(features).detach();
        positive_class_column(output, self.positive_class)
    }
}
