//! # epochwise
//!
//! A small harness that drives supervised training runs on the Burn framework.
//!
//! The harness owns the epoch loop: it feeds batches to a model-specific
//! [`step::BatchStep`], scores predictions with a [`metrics::Metric`], keeps
//! per-batch and per-epoch statistics in a [`training::RunHistory`], shows a
//! progress bar per epoch and can plot the history in the terminal.
//!
//! ## Features
//!
//! - **Pluggable batch step**: the loop only knows the `BatchStep` trait.
//!   [`step::AutodiffStep`] trains any Burn module with a Burn optimizer.
//! - **Default metrics**: binary accuracy or macro F1, or a custom function.
//! - **Cancellation**: a [`training::CancellationToken`] stops a run between
//!   batches, keeping every completed epoch.
//!
//! ## Example
//!
//! ```
//! use epochwise::prelude::*;
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//!
//! type Backend = NdArray;
//!
//! /// Scores every example with the mean of its features.
//! struct MeanScore;
//!
//! impl Classifier<Backend> for MeanScore {
//!     fn forward(&self, features: Tensor<Backend, 2>) -> Tensor<Backend, 2> {
//!         features.mean_dim(1)
//!     }
//! }
//!
//! let device = <Backend as burn::tensor::backend::Backend>::Device::default();
//! let validation = vec![Batch::new(
//!     Tensor::<Backend, 2>::from_floats([[1.0, 1.0], [0.0, 0.0]], &device),
//!     Tensor::<Backend, 1>::from_floats([1.0, 0.0], &device),
//! )];
//! let train: Vec<Batch<Backend, 2>> = Vec::new();
//!
//! let config = TrainerConfig::new().verbose(false);
//! let mut trainer = Trainer::new(InferenceStep::new(MeanScore), config).unwrap();
//! trainer.train(&train, &validation, 1).unwrap();
//!
//! assert_eq!(trainer.history().validation_metric_per_epoch(), &[1.0]);
//! ```

pub mod data;
pub mod errors;
pub mod metrics;
pub mod plot;
pub mod progress;
pub mod step;
pub mod training;

// Re-exports for convenience
pub use errors::TrainError;
pub use training::{Loss, Trainer, TrainerConfig};

/// Backend type alias for NdArray with autodiff support.
pub type Backend = burn::backend::Autodiff<burn::backend::NdArray>;

/// Backend type alias for WGPU with autodiff support.
#[cfg(feature = "wgpu")]
pub type GpuBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::data::{Batch, BatchSource, process_batch};
    pub use crate::errors::TrainError;
    pub use crate::metrics::{Metric, MetricValue, PredictionArray};
    pub use crate::plot::{Plotter, TextPlot};
    pub use crate::step::{AutodiffStep, BatchStep, Classifier, InferenceStep, StepOutput};
    pub use crate::training::{
        CancellationToken, Loss, RunHistory, TrainOutcome, Trainer, TrainerConfig,
    };
    pub use crate::Backend;
}
