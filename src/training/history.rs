//! Run statistics kept by the trainer.

use crate::errors::TrainError;
use crate::metrics::{MetricValue, mean};
use serde::{Deserialize, Serialize};

/// Loss and metric history of a training run.
///
/// Every sequence only grows. Batch-level sequences cover training batches
/// of completed and interrupted epochs alike; epoch-level sequences only
/// cover completed epochs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunHistory {
    #[serde(with = "nan_as_null")]
    losses: Vec<f32>,
    metrics: Vec<MetricValue>,
    #[serde(with = "nan_as_null")]
    losses_per_epoch: Vec<f32>,
    #[serde(with = "nan_as_null")]
    metric_per_epoch: Vec<f32>,
    #[serde(with = "nan_as_null")]
    validation_metric_per_epoch: Vec<f32>,
}

/// JSON has no NaN; undefined means (an epoch without validation batches)
/// travel as `null`.
mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(values: &[f32], serializer: S) -> Result<S::Ok, S::Error> {
        values
            .iter()
            .map(|v| if v.is_nan() { None } else { Some(*v) })
            .collect::<Vec<_>>()
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f32>, D::Error> {
        let values = Vec::<Option<f32>>::deserialize(deserializer)?;
        Ok(values.into_iter().map(|v| v.unwrap_or(f32::NAN)).collect())
    }
}

impl RunHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Training loss of every batch, in order.
    pub fn losses(&self) -> &[f32] {
        &self.losses
    }

    /// Training metric of every batch, in order.
    pub fn metrics(&self) -> &[MetricValue] {
        &self.metrics
    }

    /// Mean training loss of every completed epoch.
    pub fn losses_per_epoch(&self) -> &[f32] {
        &self.losses_per_epoch
    }

    /// Mean training metric of every completed epoch.
    pub fn metric_per_epoch(&self) -> &[f32] {
        &self.metric_per_epoch
    }

    /// Mean validation metric of every completed epoch.
    pub fn validation_metric_per_epoch(&self) -> &[f32] {
        &self.validation_metric_per_epoch
    }

    /// Number of completed epochs.
    pub fn epochs(&self) -> usize {
        self.losses_per_epoch.len()
    }

    /// Number of recorded training batches.
    pub fn steps(&self) -> usize {
        self.losses.len()
    }

    pub(crate) fn record_batch(&mut self, loss: f32, metric: MetricValue) {
        self.losses.push(loss);
        self.metrics.push(metric);
    }

    pub(crate) fn record_epoch(&mut self, summary: EpochSummary) {
        self.losses_per_epoch.push(summary.loss);
        self.metric_per_epoch.push(summary.metric);
        self.validation_metric_per_epoch
            .push(summary.validation_metric);
    }

    /// Serializes the history to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, TrainError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Restores a history from JSON.
    pub fn from_json(json: &str) -> Result<Self, TrainError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Means of one completed epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochSummary {
    pub loss: f32,
    pub metric: f32,
    pub validation_metric: f32,
}

/// Statistics of the epoch in progress.
#[derive(Debug, Default)]
pub(crate) struct EpochAccumulator {
    losses: Vec<f32>,
    metrics: Vec<MetricValue>,
    validation_metrics: Vec<f32>,
}

impl EpochAccumulator {
    pub(crate) fn record_train(&mut self, loss: f32, metric: MetricValue) {
        self.losses.push(loss);
        self.metrics.push(metric);
    }

    /// Validation batches contribute the mean of their metric.
    pub(crate) fn record_validation(&mut self, metric: &MetricValue) {
        self.validation_metrics.push(metric.mean());
    }

    pub(crate) fn running_loss(&self) -> f32 {
        mean(self.losses.iter().copied())
    }

    /// Mean over every score of every training batch so far.
    pub(crate) fn running_metric(&self) -> f32 {
        mean(
            self.metrics
                .iter()
                .flat_map(|m| m.values().iter().copied()),
        )
    }

    pub(crate) fn finish(self) -> EpochSummary {
        EpochSummary {
            loss: self.running_loss(),
            metric: self.running_metric(),
            validation_metric: mean(self.validation_metrics),
        }
    }
}
