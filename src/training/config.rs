//! Trainer configuration.

use crate::errors::TrainError;
use crate::metrics::Metric;

/// Epoch count used when a caller has no preference.
pub const DEFAULT_EPOCHS: usize = 15;

/// Configuration for a [`super::Trainer`].
///
/// Set once before the trainer is built; the trainer only hands out shared
/// references to it afterwards.
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    /// Learning rate passed to every training step.
    pub learning_rate: f64,
    /// Selects multi-class F1 instead of binary accuracy as default metric.
    pub multi_class: bool,
    /// Metric overriding the default one.
    pub custom_metric: Option<Metric>,
    /// Whether to show progress and log epoch summaries.
    pub verbose: bool,
    /// Epochs run by [`super::Trainer::fit`].
    pub epochs: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.001,
            multi_class: false,
            custom_metric: None,
            verbose: true,
            epochs: DEFAULT_EPOCHS,
        }
    }
}

impl TrainerConfig {
    /// Creates a new TrainerConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the learning rate.
    pub fn learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    /// Sets whether the task is multi-class.
    pub fn multi_class(mut self, multi_class: bool) -> Self {
        self.multi_class = multi_class;
        self
    }

    /// Sets a custom metric.
    pub fn custom_metric(mut self, metric: Metric) -> Self {
        self.custom_metric = Some(metric);
        self
    }

    /// Sets whether to show progress.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Sets the number of epochs for [`super::Trainer::fit`].
    pub fn epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// The metric a trainer built from this configuration uses.
    pub fn metric(&self) -> Metric {
        Metric::resolve(self.custom_metric.as_ref(), self.multi_class)
    }

    /// Checks the learning rate is a positive, finite number.
    pub fn validate(&self) -> Result<(), TrainError> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(TrainError::InvalidConfig {
                message: format!(
                    "learning rate must be positive and finite, got {}",
                    self.learning_rate
                ),
            });
        }
        Ok(())
    }
}
