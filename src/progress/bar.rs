//! Terminal progress bar backed by indicatif.

use super::{Progress, ProgressFactory, ProgressOptions};
use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str = "{prefix}: [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} [ETA: {eta_precise}] {msg}";

/// A progress bar on stderr, hidden when disabled.
pub struct IndicatifProgress {
    bar: ProgressBar,
}

impl IndicatifProgress {
    pub fn new(options: ProgressOptions) -> Self {
        let bar = if options.disabled {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new(options.total as u64);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template(TEMPLATE)
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=>-"),
            );
            bar
        };
        bar.set_length(options.total as u64);
        bar.set_prefix(options.description);
        Self { bar }
    }
}

impl Progress for IndicatifProgress {
    fn advance(&mut self) {
        self.bar.inc(1);
    }

    fn set_summary(&mut self, loss: f32, metric: f32) {
        self.bar
            .set_message(format!("loss={:.4}, metric={:.4}", loss, metric));
    }

    fn close(&mut self) {
        self.bar.finish();
    }
}

/// Opens [`IndicatifProgress`] bars.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndicatifProgressFactory;

impl ProgressFactory for IndicatifProgressFactory {
    fn open(&self, options: ProgressOptions) -> Box<dyn Progress> {
        Box::new(IndicatifProgress::new(options))
    }
}
