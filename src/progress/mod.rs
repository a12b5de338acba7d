//! Per-epoch progress display.
//!
//! The trainer opens one display per epoch through a [`ProgressFactory`],
//! advances it once per training batch, and closes it when the epoch ends
//! or the loop exits early. [`ProgressGuard`] makes sure the close happens
//! exactly once on every exit path.

mod bar;

pub use bar::{IndicatifProgress, IndicatifProgressFactory};

/// Options a progress display is opened with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressOptions {
    /// Number of steps the display expects.
    pub total: usize,
    /// Label shown in front of the bar.
    pub description: String,
    /// Whether the display is hidden.
    pub disabled: bool,
}

/// An open progress display.
pub trait Progress {
    /// Advances the display by one step.
    fn advance(&mut self);

    /// Sets the trailing summary values.
    fn set_summary(&mut self, loss: f32, metric: f32);

    /// Releases the display.
    fn close(&mut self);
}

/// Opens progress displays.
pub trait ProgressFactory {
    fn open(&self, options: ProgressOptions) -> Box<dyn Progress>;
}

/// Owns an open display and closes it exactly once.
pub struct ProgressGuard {
    progress: Option<Box<dyn Progress>>,
}

impl ProgressGuard {
    /// Opens a display through `factory`.
    pub fn open(factory: &dyn ProgressFactory, options: ProgressOptions) -> Self {
        Self {
            progress: Some(factory.open(options)),
        }
    }

    pub fn advance(&mut self) {
        if let Some(progress) = self.progress.as_mut() {
            progress.advance();
        }
    }

    pub fn set_summary(&mut self, loss: f32, metric: f32) {
        if let Some(progress) = self.progress.as_mut() {
            progress.set_summary(loss, metric);
        }
    }

    /// Closes the display now instead of on drop.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(mut progress) = self.progress.take() {
            progress.close();
        }
    }
}

impl Drop for ProgressGuard {
    fn drop(&mut self) {
        self.release();
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{Event, RecordingFactory};
    use super::*;

    fn options() -> ProgressOptions {
        ProgressOptions {
            total: 2,
            description: "Epoch 1".to_string(),
            disabled: true,
        }
    }

    #[test]
    fn test_guard_closes_on_drop() {
        let factory = RecordingFactory::default();
        {
            let mut guard = ProgressGuard::open(&factory, options());
            guard.advance();
        }
        assert_eq!(
            factory.events(),
            vec![Event::Opened(options()), Event::Advanced, Event::Closed]
        );
    }

    #[test]
    fn test_guard_closes_once() {
        let factory = RecordingFactory::default();
        let mut guard = ProgressGuard::open(&factory, options());
        guard.set_summary(0.5, 0.75);
        guard.close();

        assert_eq!(factory.count(|e| matches!(e, Event::Closed)), 1);
        assert!(factory.events().contains(&Event::Summary(0.5, 0.75)));
    }
}
