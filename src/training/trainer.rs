//! Training loop implementation.

use super::history::EpochAccumulator;
use super::{CancellationToken, RunHistory, TrainerConfig};
use crate::data::{BatchSource, process_batch, to_host};
use crate::errors::TrainError;
use crate::metrics::{Metric, PredictionArray};
use crate::plot::Plotter;
use crate::progress::{IndicatifProgressFactory, ProgressFactory, ProgressGuard, ProgressOptions};
use crate::step::BatchStep;
use burn::tensor::backend::Backend;
use std::marker::PhantomData;

/// How a call to [`Trainer::train`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainOutcome {
    /// Every requested epoch ran.
    Completed { epochs: usize },
    /// The run was cancelled; only fully completed epochs were recorded.
    Cancelled { completed_epochs: usize },
}

/// Drives epochs of training and validation through a [`BatchStep`].
pub struct Trainer<B: Backend, S> {
    step: S,
    config: TrainerConfig,
    metric: Metric,
    history: RunHistory,
    cancellation: CancellationToken,
    progress: Box<dyn ProgressFactory>,
    _backend: PhantomData<B>,
}

impl<B: Backend, S: BatchStep<B>> Trainer<B, S> {
    /// Creates a trainer; the metric is resolved from the configuration here.
    pub fn new(step: S, config: TrainerConfig) -> Result<Self, TrainError> {
        config.validate()?;
        let metric = config.metric();
        Ok(Self {
            step,
            config,
            metric,
            history: RunHistory::new(),
            cancellation: CancellationToken::new(),
            progress: Box::new(IndicatifProgressFactory),
            _backend: PhantomData,
        })
    }

    /// Replaces the progress display.
    pub fn with_progress(mut self, factory: impl ProgressFactory + 'static) -> Self {
        self.progress = Box::new(factory);
        self
    }

    /// Uses `token` to cancel runs.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// A handle that cancels the current or next run.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// The validated configuration.
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// The metric resolved at construction.
    pub fn metric(&self) -> &Metric {
        &self.metric
    }

    /// Statistics of every run so far.
    pub fn history(&self) -> &RunHistory {
        &self.history
    }

    /// The batch step, e.g. to read back a trained model.
    pub fn step(&self) -> &S {
        &self.step
    }

    /// Mutable access to the batch step between runs.
    pub fn step_mut(&mut self) -> &mut S {
        &mut self.step
    }

    /// Consumes the trainer, returning the step and the recorded history.
    pub fn into_parts(self) -> (S, RunHistory) {
        (self.step, self.history)
    }

    /// Runs the configured number of epochs, see [`TrainerConfig::epochs`].
    pub fn fit<T, V, const D: usize>(
        &mut self,
        train_source: &T,
        validation_source: &V,
    ) -> Result<TrainOutcome, TrainError>
    where
        T: BatchSource<B, D> + ?Sized,
        V: BatchSource<B, D> + ?Sized,
    {
        self.train(train_source, validation_source, self.config.epochs)
    }

    /// Runs `epochs` epochs of training followed by validation.
    ///
    /// Cancellation, through the token or a step returning
    /// [`TrainError::Interrupted`], ends the run with
    /// [`TrainOutcome::Cancelled`]; statistics of the unfinished epoch are
    /// dropped from the per-epoch history and the cancellation token is
    /// cleared for the next run. Every other error is returned as is.
    pub fn train<T, V, const D: usize>(
        &mut self,
        train_source: &T,
        validation_source: &V,
        epochs: usize,
    ) -> Result<TrainOutcome, TrainError>
    where
        T: BatchSource<B, D> + ?Sized,
        V: BatchSource<B, D> + ?Sized,
    {
        let completed_before = self.history.epochs();
        log::debug!(
            "Training for {} epochs ({} batches per epoch, metric {})",
            epochs,
            train_source.len(),
            self.metric.name()
        );

        let result = (0..epochs)
            .try_for_each(|epoch| self.run_epoch(epoch, epochs, train_source, validation_source));

        match result {
            Ok(()) => Ok(TrainOutcome::Completed { epochs }),
            Err(TrainError::Interrupted) => {
                self.cancellation.reset();
                let completed_epochs = self.history.epochs() - completed_before;
                log::warn!(
                    "Training interrupted after {} of {} epochs",
                    completed_epochs,
                    epochs
                );
                Ok(TrainOutcome::Cancelled { completed_epochs })
            }
            Err(e) => Err(e),
        }
    }

    fn run_epoch<T, V, const D: usize>(
        &mut self,
        epoch: usize,
        epochs: usize,
        train_source: &T,
        validation_source: &V,
    ) -> Result<(), TrainError>
    where
        T: BatchSource<B, D> + ?Sized,
        V: BatchSource<B, D> + ?Sized,
    {
        self.cancellation.check()?;

        let mut accumulator = EpochAccumulator::default();
        let mut progress = ProgressGuard::open(
            &*self.progress,
            ProgressOptions {
                total: train_source.len(),
                description: format!("Epoch {}", epoch + 1),
                disabled: !self.config.verbose,
            },
        );

        for batch in train_source.batches() {
            self.cancellation.check()?;

            let batch = process_batch(batch)?;
            let truth = to_host(batch.labels.clone())?;
            let output =
                self.step
                    .train_step(batch.features, batch.labels, self.config.learning_rate)?;
            let prediction = PredictionArray::from_tensor(output.prediction)?;
            let batch_metric = self.metric.evaluate(&truth, &prediction)?;

            self.history.record_batch(output.loss, batch_metric.clone());
            accumulator.record_train(output.loss, batch_metric);

            progress.advance();
            progress.set_summary(accumulator.running_loss(), accumulator.running_metric());
        }

        log::debug!("Epoch {}: validation pass", epoch + 1);
        for batch in validation_source.batches() {
            self.cancellation.check()?;

            let batch = process_batch(batch)?;
            let truth = to_host(batch.labels)?;
            let prediction = PredictionArray::from_tensor(self.step.predict_step(batch.features)?)?;
            let batch_metric = self.metric.evaluate(&truth, &prediction)?;

            accumulator.record_validation(&batch_metric);
        }

        let summary = accumulator.finish();
        self.history.record_epoch(summary);
        progress.close();

        if self.config.verbose {
            log::info!(
                "Epoch {}/{}: loss = {:.6}, {} = {:.4}, validation {} = {:.4}",
                epoch + 1,
                epochs,
                summary.loss,
                self.metric.name(),
                summary.metric,
                self.metric.name(),
                summary.validation_metric
            );
        }

        Ok(())
    }

    /// Renders the recorded history.
    pub fn plot<P: Plotter + ?Sized>(&self, plotter: &mut P) -> Result<(), TrainError> {
        plotter.plot(&self.history)
    }
}
