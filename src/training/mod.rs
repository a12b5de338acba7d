//! The training loop and its supporting pieces.
//!
//! This module provides:
//! - The epoch/batch loop ([`Trainer`])
//! - Trainer configuration and metric resolution
//! - Run history and per-epoch aggregation
//! - Cooperative cancellation
//! - Loss functions used by the autodiff batch step

mod cancel;
mod config;
mod history;
mod loss;
mod trainer;

pub use cancel::CancellationToken;
pub use config::{DEFAULT_EPOCHS, TrainerConfig};
pub use history::{EpochSummary, RunHistory};
pub use loss::Loss;
pub use trainer::{TrainOutcome, Trainer};
