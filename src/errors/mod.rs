//! Error types.

mod train_error;

pub use train_error::TrainError;
