//! Metric values, host-side prediction arrays and averaging.

use crate::data::to_host;
use crate::errors::TrainError;
use burn::tensor::{Tensor, backend::Backend};
use serde::{Deserialize, Serialize};

/// Result of scoring one batch.
///
/// Serialized untagged, with `NaN` scores written as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "MetricRepr", into = "MetricRepr")]
pub enum MetricValue {
    /// One score for the whole batch.
    Scalar(f32),
    /// One score per example.
    PerExample(Vec<f32>),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum MetricRepr {
    Scalar(Option<f32>),
    PerExample(Vec<Option<f32>>),
}

fn nan_to_none(value: f32) -> Option<f32> {
    if value.is_nan() { None } else { Some(value) }
}

impl From<MetricValue> for MetricRepr {
    fn from(value: MetricValue) -> Self {
        match value {
            MetricValue::Scalar(v) => MetricRepr::Scalar(nan_to_none(v)),
            MetricValue::PerExample(values) => {
                MetricRepr::PerExample(values.into_iter().map(nan_to_none).collect())
            }
        }
    }
}

impl From<MetricRepr> for MetricValue {
    fn from(repr: MetricRepr) -> Self {
        match repr {
            MetricRepr::Scalar(v) => MetricValue::Scalar(v.unwrap_or(f32::NAN)),
            MetricRepr::PerExample(values) => MetricValue::PerExample(
                values.into_iter().map(|v| v.unwrap_or(f32::NAN)).collect(),
            ),
        }
    }
}

impl MetricValue {
    /// Individual scores held by the value.
    pub fn values(&self) -> &[f32] {
        match self {
            MetricValue::Scalar(value) => std::slice::from_ref(value),
            MetricValue::PerExample(values) => values,
        }
    }

    /// Mean of the scores; `NaN` for an empty per-example array.
    pub fn mean(&self) -> f32 {
        mean(self.values().iter().copied())
    }
}

impl From<f32> for MetricValue {
    fn from(value: f32) -> Self {
        MetricValue::Scalar(value)
    }
}

/// Arithmetic mean, accumulated in `f64`. An empty input yields `NaN`.
pub fn mean<I: IntoIterator<Item = f32>>(values: I) -> f32 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0f64, 0usize), |(sum, count), v| (sum + v as f64, count + 1));
    if count == 0 {
        f32::NAN
    } else {
        (sum / count as f64) as f32
    }
}

/// A row-major `(rows, columns)` matrix of prediction scores on the host.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionArray {
    values: Vec<f32>,
    columns: usize,
}

impl PredictionArray {
    /// Wraps row-major values, checking they fill whole rows.
    pub fn new(values: Vec<f32>, columns: usize) -> Result<Self, TrainError> {
        if columns == 0 || values.len() % columns != 0 {
            return Err(TrainError::ShapeMismatch {
                expected: columns,
                actual: values.len(),
            });
        }
        Ok(Self { values, columns })
    }

    /// Copies a `(rows, columns)` prediction tensor to the host.
    pub fn from_tensor<B: Backend>(prediction: Tensor<B, 2>) -> Result<Self, TrainError> {
        let [_, columns] = prediction.dims();
        Self::new(to_host(prediction)?, columns)
    }

    /// A single-column prediction, one score per example.
    pub fn column(values: Vec<f32>) -> Self {
        Self { values, columns: 1 }
    }

    /// Number of examples.
    pub fn rows(&self) -> usize {
        self.values.len() / self.columns
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Iterates rows in order.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> {
        self.values.chunks(self.columns)
    }

    /// All scores, row-major.
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}
