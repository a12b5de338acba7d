//! Batch representation and normalization.

use crate::errors::TrainError;
use burn::tensor::{Tensor, backend::Backend};

/// A raw `(features, labels)` pair as produced by a data source.
///
/// Features may have any rank; the first dimension is the batch dimension.
/// Labels hold one value per example.
#[derive(Debug, Clone)]
pub struct Batch<B: Backend, const D: usize> {
    /// Feature tensor with shape `(batch_size, ...)`.
    pub features: Tensor<B, D>,
    /// Label tensor with shape `(batch_size,)`.
    pub labels: Tensor<B, 1>,
}

impl<B: Backend, const D: usize> Batch<B, D> {
    /// Creates a new batch.
    pub fn new(features: Tensor<B, D>, labels: Tensor<B, 1>) -> Self {
        Self { features, labels }
    }

    /// Number of examples in the batch.
    pub fn len(&self) -> usize {
        self.features.dims()[0]
    }

    /// Returns true if the batch holds no examples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A batch normalized for a batch step: one flat feature row per example.
#[derive(Debug, Clone)]
pub struct ProcessedBatch<B: Backend> {
    /// Features with shape `(batch_size, features_count)`.
    pub features: Tensor<B, 2>,
    /// Labels, unchanged.
    pub labels: Tensor<B, 1>,
}

/// Flattens the feature tensor to `(batch_size, features_count)` and passes
/// labels through.
pub fn process_batch<B: Backend, const D: usize>(
    batch: Batch<B, D>,
) -> Result<ProcessedBatch<B>, TrainError> {
    let dims = batch.features.dims();
    let rows = dims[0];
    let [label_count] = batch.labels.dims();

    if rows != label_count {
        return Err(TrainError::ShapeMismatch {
            expected: rows,
            actual: label_count,
        });
    }

    let columns: usize = dims[1..].iter().product();
    let features = batch.features.reshape([rows, columns]);

    Ok(ProcessedBatch {
        features,
        labels: batch.labels,
    })
}

/// Copies a tensor to host memory as `f32` values in row-major order.
pub(crate) fn to_host<B: Backend, const D: usize>(
    tensor: Tensor<B, D>,
) -> Result<Vec<f32>, TrainError> {
    tensor
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| TrainError::Data {
            message: format!("{:?}", e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_process_batch_flattens_images() {
        let device = <TestBackend as Backend>::Device::default();
        let features = Tensor::<TestBackend, 4>::zeros([3, 1, 4, 4], &device);
        let labels = Tensor::<TestBackend, 1>::from_floats([0.0, 1.0, 1.0], &device);

        let processed = process_batch(Batch::new(features, labels)).expect("valid batch");

        assert_eq!(processed.features.dims(), [3, 16]);
        assert_eq!(processed.labels.dims(), [3]);
    }

    #[test]
    fn test_process_batch_keeps_flat_features() {
        let device = <TestBackend as Backend>::Device::default();
        let features =
            Tensor::<TestBackend, 2>::from_floats([[1.0, 2.0], [3.0, 4.0]], &device);
        let labels = Tensor::<TestBackend, 1>::from_floats([1.0, 0.0], &device);

        let processed = process_batch(Batch::new(features, labels)).expect("valid batch");
        let values = to_host(processed.features).unwrap();

        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(to_host(processed.labels).unwrap(), vec![1.0, 0.0]);
    }

    #[test]
    fn test_process_batch_label_count_mismatch() {
        let device = <TestBackend as Backend>::Device::default();
        let features = Tensor::<TestBackend, 2>::zeros([4, 3], &device);
        let labels = Tensor::<TestBackend, 1>::zeros([2], &device);

        let result = process_batch(Batch::new(features, labels));

        assert!(matches!(
            result,
            Err(TrainError::ShapeMismatch {
                expected: 4,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_batch_len() {
        let device = <TestBackend as Backend>::Device::default();
        let batch = Batch::new(
            Tensor::<TestBackend, 3>::zeros([5, 2, 2], &device),
            Tensor::<TestBackend, 1>::zeros([5], &device),
        );
        assert_eq!(batch.len(), 5);
        assert!(!batch.is_empty());
    }
}
