//! Default classification metrics.

use super::{MetricValue, PredictionArray};
use crate::errors::TrainError;
use std::collections::BTreeSet;

const THRESHOLD: f32 = 0.5;

fn check_rows(truth: &[f32], prediction: &PredictionArray) -> Result<(), TrainError> {
    if truth.len() != prediction.rows() {
        return Err(TrainError::ShapeMismatch {
            expected: truth.len(),
            actual: prediction.rows(),
        });
    }
    Ok(())
}

/// Predicted class of one row: arg-max for several columns, a threshold on
/// the single score otherwise.
fn predicted_class(row: &[f32]) -> i64 {
    if let [score] = row {
        return i64::from(*score > THRESHOLD);
    }
    row.iter()
        .enumerate()
        .fold((0usize, f32::NEG_INFINITY), |best, (i, &v)| {
            if v > best.1 { (i, v) } else { best }
        })
        .0 as i64
}

/// Fraction of examples whose thresholded positive-class score matches the
/// label.
///
/// Expects a single-column prediction holding the positive-class score.
pub fn binary_accuracy(
    truth: &[f32],
    prediction: &PredictionArray,
) -> Result<MetricValue, TrainError> {
    check_rows(truth, prediction)?;
    if prediction.columns() != 1 {
        return Err(TrainError::Metric {
            message: format!(
                "binary accuracy expects one score per example, got {} columns",
                prediction.columns()
            ),
        });
    }

    let correct = truth
        .iter()
        .zip(prediction.as_slice())
        .filter(|&(&label, &score)| (score > THRESHOLD) == (label > THRESHOLD))
        .count();

    Ok(MetricValue::Scalar(if truth.is_empty() {
        f32::NAN
    } else {
        correct as f32 / truth.len() as f32
    }))
}

/// Macro-averaged F1 score over every class seen in labels or predictions.
pub fn multi_class_f1(
    truth: &[f32],
    prediction: &PredictionArray,
) -> Result<MetricValue, TrainError> {
    check_rows(truth, prediction)?;

    let actual: Vec<i64> = truth.iter().map(|&label| label.round() as i64).collect();
    let predicted: Vec<i64> = prediction.iter_rows().map(predicted_class).collect();

    let classes: BTreeSet<i64> = actual.iter().chain(predicted.iter()).copied().collect();
    if classes.is_empty() {
        return Ok(MetricValue::Scalar(f32::NAN));
    }

    let total: f32 = classes
        .iter()
        .map(|&class| {
            let mut tp = 0usize;
            let mut fp = 0usize;
            let mut fn_ = 0usize;
            for (&a, &p) in actual.iter().zip(&predicted) {
                match (a == class, p == class) {
                    (true, true) => tp += 1,
                    (false, true) => fp += 1,
                    (true, false) => fn_ += 1,
                    (false, false) => {}
                }
            }
            let denominator = 2 * tp + fp + fn_;
            if denominator == 0 {
                0.0
            } else {
                (2 * tp) as f32 / denominator as f32
            }
        })
        .sum();

    Ok(MetricValue::Scalar(total / classes.len() as f32))
}
