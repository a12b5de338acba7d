//! Loss functions for the autodiff batch step.

use burn::nn::loss::CrossEntropyLossConfig;
use burn::tensor::{Tensor, backend::Backend};

/// Supported loss functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loss {
    /// Mean Squared Error between the positive-class score and the label.
    Mse,
    /// Binary Cross Entropy between the positive-class probability and the label.
    BinaryCrossEntropy,
    /// Cross entropy between class logits and class-index labels.
    CrossEntropy,
}

impl Loss {
    /// Whether the loss consumes the full model output rather than the
    /// positive-class column.
    pub fn uses_logits(&self) -> bool {
        matches!(self, Loss::CrossEntropy)
    }

    /// Computes the loss between scores and labels.
    ///
    /// `scores` is `(batch_size, 1)` for [`Loss::Mse`] and
    /// [`Loss::BinaryCrossEntropy`] and `(batch_size, classes)` for
    /// [`Loss::CrossEntropy`].
    pub fn compute<B: Backend>(&self, scores: Tensor<B, 2>, labels: Tensor<B, 1>) -> Tensor<B, 1> {
        let [batch_size] = labels.dims();
        match self {
            Loss::Mse => {
                let targets = labels.reshape([batch_size, 1]);
                let diff = scores - targets;
                let squared = diff.clone() * diff;
                squared.mean()
            }
            Loss::BinaryCrossEntropy => {
                // BCE = -mean(y * log(p) + (1-y) * log(1-p))
                let targets = labels.reshape([batch_size, 1]);
                let epsilon = 1e-7;
                let ones = Tensor::ones_like(&scores);
                let p_clipped = scores.clamp(epsilon, 1.0 - epsilon);
                let log_p = p_clipped.clone().log();
                let log_1_minus_p = (ones.clone() - p_clipped).log();
                let bce = targets.clone() * log_p + (ones - targets) * log_1_minus_p;
                bce.neg().mean()
            }
            Loss::CrossEntropy => CrossEntropyLossConfig::new()
                .init(&scores.device())
                .forward(scores, labels.int()),
        }
    }

    /// Positive-class column the loss expects predictions narrowed to.
    pub fn default_positive_class(&self) -> Option<usize> {
        if self.uses_logits() {
            None
        } else {
            Some(crate::step::DEFAULT_POSITIVE_CLASS)
        }
    }
}
