//! Cooperative cancellation of a training run.

use crate::errors::TrainError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A shared flag that asks a running training loop to stop.
///
/// Clones share the flag, so one clone can be handed to a signal handler or
/// another thread while the trainer holds the other.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested and not reset since.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Clears a previous request so the token can drive another run.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }

    /// Returns [`TrainError::Interrupted`] once cancellation was requested.
    pub fn check(&self) -> Result<(), TrainError> {
        if self.is_cancelled() {
            Err(TrainError::Interrupted)
        } else {
            Ok(())
        }
    }
}
