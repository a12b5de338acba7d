//! Metric functions and the strategy the trainer resolves at construction.
//!
//! Metrics run on host copies of the labels and predictions of a batch.
//! A metric returns either one scalar for the whole batch or one score per
//! example, see [`MetricValue`].

mod classification;
mod value;

pub use classification::{binary_accuracy, multi_class_f1};
pub use value::{MetricValue, PredictionArray, mean};

use crate::errors::TrainError;
use std::fmt;
use std::sync::Arc;

/// Signature of a custom metric: `(ground_truth, prediction) -> score`.
pub type MetricFn =
    dyn Fn(&[f32], &PredictionArray) -> Result<MetricValue, TrainError> + Send + Sync;

/// The metric strategy used to score predictions against ground truth.
#[derive(Clone)]
pub enum Metric {
    /// Fraction of correctly thresholded binary predictions.
    BinaryAccuracy,
    /// Macro-averaged F1 over classes.
    MultiClassF1,
    /// A caller supplied function.
    Custom { name: String, function: Arc<MetricFn> },
}

impl Metric {
    /// Wraps a closure as a custom metric.
    pub fn custom<F>(name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&[f32], &PredictionArray) -> Result<MetricValue, TrainError> + Send + Sync + 'static,
    {
        Metric::Custom {
            name: name.into(),
            function: Arc::new(function),
        }
    }

    /// Picks the metric for a run: the custom one if given, otherwise the
    /// default for the task kind.
    pub fn resolve(custom: Option<&Metric>, multi_class: bool) -> Metric {
        match custom {
            Some(metric) => metric.clone(),
            None if multi_class => Metric::MultiClassF1,
            None => Metric::BinaryAccuracy,
        }
    }

    /// Scores a prediction against ground truth.
    pub fn evaluate(
        &self,
        truth: &[f32],
        prediction: &PredictionArray,
    ) -> Result<MetricValue, TrainError> {
        match self {
            Metric::BinaryAccuracy => binary_accuracy(truth, prediction),
            Metric::MultiClassF1 => multi_class_f1(truth, prediction),
            Metric::Custom { function, .. } => function(truth, prediction),
        }
    }

    /// Display name of the metric.
    pub fn name(&self) -> &str {
        match self {
            Metric::BinaryAccuracy => "binary_accuracy",
            Metric::MultiClassF1 => "multi_class_f1",
            Metric::Custom { name, .. } => name,
        }
    }
}

impl fmt::Debug for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Custom { name, .. } => f.debug_struct("Custom").field("name", name).finish(),
            _ => f.write_str(self.name()),
        }
    }
}
