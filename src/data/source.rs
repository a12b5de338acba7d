//! Finite, re-iterable batch sources.

use super::Batch;
use burn::tensor::backend::Backend;

/// A finite source of batches that can be iterated once per epoch.
///
/// The length must be known before iteration starts; it sizes the progress
/// display of an epoch.
pub trait BatchSource<B: Backend, const D: usize> {
    /// Number of batches one pass yields.
    fn len(&self) -> usize;

    /// Returns true if a pass yields no batches.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Starts a fresh pass over the batches.
    fn batches(&self) -> Box<dyn Iterator<Item = Batch<B, D>> + '_>;
}

impl<B: Backend, const D: usize> BatchSource<B, D> for [Batch<B, D>] {
    fn len(&self) -> usize {
        <[Batch<B, D>]>::len(self)
    }

    fn batches(&self) -> Box<dyn Iterator<Item = Batch<B, D>> + '_> {
        Box::new(self.iter().cloned())
    }
}

impl<B: Backend, const D: usize> BatchSource<B, D> for Vec<Batch<B, D>> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn batches(&self) -> Box<dyn Iterator<Item = Batch<B, D>> + '_> {
        Box::new(self.iter().cloned())
    }
}
