//! Batches, batch normalization and batch sources.
//!
//! The harness does not load or batch data itself. Callers hand it
//! ready-made [`Batch`]es through anything implementing [`BatchSource`].

mod batch;
mod source;

pub use batch::{Batch, ProcessedBatch, process_batch};
pub(crate) use batch::to_host;
pub use source::BatchSource;
