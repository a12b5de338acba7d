//! Integration tests driving full training runs through the public API.

use burn::backend::{Autodiff, NdArray};
use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::optim::AdamConfig;
use burn::tensor::activation::softmax;
use burn::tensor::{Tensor, backend::Backend};
use epochwise::plot::{Plotter, TextPlot};
use epochwise::prelude::*;
use epochwise::progress::{Progress, ProgressFactory, ProgressOptions};
use std::sync::{Arc, Mutex};

type TestBackend = NdArray;
type TrainingBackend = Autodiff<NdArray>;

const TOLERANCE: f32 = 1e-6;

fn floats_close(a: f32, b: f32, tolerance: f32) -> bool {
    (a - b).abs() < tolerance
}

/// Returns scripted losses and echoes labels as predictions.
struct EchoStep {
    losses: Vec<f32>,
    calls: usize,
    cancel_on_call: Option<(usize, CancellationToken)>,
}

impl EchoStep {
    fn new(losses: &[f32]) -> Self {
        Self {
            losses: losses.to_vec(),
            calls: 0,
            cancel_on_call: None,
        }
    }
}

impl BatchStep<TestBackend> for EchoStep {
    fn train_step(
        &mut self,
        _features: Tensor<TestBackend, 2>,
        labels: Tensor<TestBackend, 1>,
        _learning_rate: f64,
    ) -> Result<StepOutput<TestBackend>, TrainError> {
        let loss = self.losses.get(self.calls).copied().unwrap_or(0.0);
        self.calls += 1;
        if let Some((call, token)) = &self.cancel_on_call {
            if *call == self.calls {
                token.cancel();
            }
        }
        let [rows] = labels.dims();
        Ok(StepOutput {
            loss,
            prediction: labels.reshape([rows, 1]),
        })
    }

    fn predict_step(
        &self,
        features: Tensor<TestBackend, 2>,
    ) -> Result<Tensor<TestBackend, 2>, TrainError> {
        Ok(features.mean_dim(1))
    }
}

fn image_batches(count: usize) -> Vec<Batch<TestBackend, 3>> {
    let device = <TestBackend as Backend>::Device::default();
    (0..count)
        .map(|_| {
            Batch::new(
                Tensor::<TestBackend, 3>::from_floats(
                    [[[1.0, 1.0], [1.0, 1.0]], [[0.0, 0.0], [0.0, 0.0]]],
                    &device,
                ),
                Tensor::<TestBackend, 1>::from_floats([1.0, 0.0], &device),
            )
        })
        .collect()
}

#[derive(Clone, Default)]
struct CountingProgress {
    closed: Arc<Mutex<usize>>,
}

struct CountingBar {
    closed: Arc<Mutex<usize>>,
}

impl Progress for CountingBar {
    fn advance(&mut self) {}

    fn set_summary(&mut self, _loss: f32, _metric: f32) {}

    fn close(&mut self) {
        *self.closed.lock().unwrap() += 1;
    }
}

impl ProgressFactory for CountingProgress {
    fn open(&self, _options: ProgressOptions) -> Box<dyn Progress> {
        Box::new(CountingBar {
            closed: Arc::clone(&self.closed),
        })
    }
}

#[test]
fn test_two_epoch_loss_scenario() {
    let step = EchoStep::new(&[0.9, 0.7, 0.5, 0.4, 0.3, 0.2]);
    let mut trainer = Trainer::new(step, TrainerConfig::new().verbose(false))
        .expect("Trainer creation should succeed");

    let outcome = trainer
        .train(&image_batches(3), &image_batches(2), 2)
        .expect("Training should succeed");

    assert_eq!(outcome, TrainOutcome::Completed { epochs: 2 });
    let history = trainer.history();
    assert_eq!(history.losses().len(), 6);
    assert_eq!(history.losses_per_epoch().len(), 2);
    assert!(floats_close(history.losses_per_epoch()[0], 0.70, TOLERANCE));
    assert!(floats_close(history.losses_per_epoch()[1], 0.30, TOLERANCE));
    assert_eq!(history.metric_per_epoch(), &[1.0, 1.0]);
    assert_eq!(history.validation_metric_per_epoch(), &[1.0, 1.0]);
}

#[test]
fn test_history_lengths_for_epoch_counts() {
    for epochs in 0..4 {
        let mut trainer = Trainer::new(EchoStep::new(&[]), TrainerConfig::new().verbose(false))
            .expect("Trainer creation should succeed");

        trainer
            .train(&image_batches(2), &image_batches(1), epochs)
            .expect("Training should succeed");

        let history = trainer.history();
        assert_eq!(history.losses().len(), 2 * epochs);
        assert_eq!(history.metrics().len(), 2 * epochs);
        assert_eq!(history.losses_per_epoch().len(), epochs);
        assert_eq!(history.metric_per_epoch().len(), epochs);
        assert_eq!(history.validation_metric_per_epoch().len(), epochs);
    }
}

#[test]
fn test_cancel_mid_second_epoch() {
    let progress = CountingProgress::default();
    let token = CancellationToken::new();
    let mut step = EchoStep::new(&[0.5; 9]);
    step.cancel_on_call = Some((4, token.clone()));

    let mut trainer = Trainer::new(step, TrainerConfig::new().verbose(false))
        .expect("Trainer creation should succeed")
        .with_cancellation(token)
        .with_progress(progress.clone());

    let outcome = trainer
        .train(&image_batches(3), &image_batches(1), 3)
        .expect("Cancellation must not surface as an error");

    assert_eq!(outcome, TrainOutcome::Cancelled { completed_epochs: 1 });
    assert_eq!(trainer.history().losses_per_epoch().len(), 1);
    assert_eq!(trainer.history().metric_per_epoch().len(), 1);
    assert_eq!(trainer.history().validation_metric_per_epoch().len(), 1);
    assert_eq!(*progress.closed.lock().unwrap(), 2);
}

#[test]
fn test_fit_after_cancelled_run() {
    let token = CancellationToken::new();
    let mut step = EchoStep::new(&[0.5; 12]);
    step.cancel_on_call = Some((1, token.clone()));

    let config = TrainerConfig::new().verbose(false).epochs(2);
    let mut trainer = Trainer::new(step, config)
        .expect("Trainer creation should succeed")
        .with_cancellation(token);

    let outcome = trainer
        .fit(&image_batches(2), &image_batches(1))
        .expect("Cancellation must not surface as an error");
    assert_eq!(outcome, TrainOutcome::Cancelled { completed_epochs: 0 });
    assert!(!trainer.cancellation_token().is_cancelled());

    let outcome = trainer
        .fit(&image_batches(2), &image_batches(1))
        .expect("Training should succeed");

    assert_eq!(outcome, TrainOutcome::Completed { epochs: 2 });
    assert_eq!(trainer.history().losses_per_epoch().len(), 2);
    assert_eq!(trainer.history().losses().len(), 5);
}

#[test]
fn test_empty_validation_source_is_nan() {
    let mut trainer = Trainer::new(EchoStep::new(&[0.4, 0.2]), TrainerConfig::new().verbose(false))
        .expect("Trainer creation should succeed");
    let empty: Vec<Batch<TestBackend, 3>> = Vec::new();

    trainer
        .train(&image_batches(1), &empty, 2)
        .expect("Training should succeed");

    let history = trainer.history();
    assert_eq!(history.validation_metric_per_epoch().len(), 2);
    assert!(history.validation_metric_per_epoch().iter().all(|v| v.is_nan()));
    assert!(floats_close(history.losses_per_epoch()[0], 0.4, TOLERANCE));
    assert!(floats_close(history.losses_per_epoch()[1], 0.2, TOLERANCE));
}

#[test]
fn test_inference_step_cannot_train() {
    struct Identity;

    impl Classifier<TestBackend> for Identity {
        fn forward(&self, features: Tensor<TestBackend, 2>) -> Tensor<TestBackend, 2> {
            features
        }
    }

    let mut trainer = Trainer::new(
        InferenceStep::new(Identity),
        TrainerConfig::new().verbose(false),
    )
    .expect("Trainer creation should succeed");

    let result = trainer.train(&image_batches(1), &image_batches(1), 1);

    assert!(matches!(
        result,
        Err(TrainError::NotImplemented {
            operation: "train_step"
        })
    ));
    assert_eq!(trainer.history().epochs(), 0);
}

#[derive(Module, Debug)]
struct TwoClass<B: Backend> {
    linear: Linear<B>,
}

impl<B: Backend> Classifier<B> for TwoClass<B> {
    fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        softmax(self.linear.forward(features), 1)
    }
}

fn separable_batches() -> Vec<Batch<TrainingBackend, 2>> {
    let device = <TrainingBackend as Backend>::Device::default();
    vec![
        Batch::new(
            Tensor::<TrainingBackend, 2>::from_floats([[-2.0], [2.0], [-1.5], [1.5]], &device),
            Tensor::<TrainingBackend, 1>::from_floats([0.0, 1.0, 0.0, 1.0], &device),
        ),
        Batch::new(
            Tensor::<TrainingBackend, 2>::from_floats([[-1.0], [1.0], [-2.5], [2.5]], &device),
            Tensor::<TrainingBackend, 1>::from_floats([0.0, 1.0, 0.0, 1.0], &device),
        ),
    ]
}

#[test]
fn test_autodiff_step_end_to_end() {
    let device = <TrainingBackend as Backend>::Device::default();
    let model = TwoClass {
        linear: LinearConfig::new(1, 2).init(&device),
    };
    let optimizer = AdamConfig::new().init::<TrainingBackend, TwoClass<TrainingBackend>>();
    let step = AutodiffStep::new(model, optimizer, Loss::BinaryCrossEntropy);

    let config = TrainerConfig::new().learning_rate(0.05).verbose(false);
    let mut trainer = Trainer::new(step, config).expect("Trainer creation should succeed");

    let batches = separable_batches();
    let outcome = trainer
        .train(&batches, &batches, 40)
        .expect("Training should succeed");

    assert_eq!(outcome, TrainOutcome::Completed { epochs: 40 });
    let losses = trainer.history().losses_per_epoch();
    assert_eq!(losses.len(), 40);
    assert!(
        losses[39] < losses[0],
        "Loss should decrease: initial={}, final={}",
        losses[0],
        losses[39]
    );
    assert!(
        trainer
            .history()
            .validation_metric_per_epoch()
            .iter()
            .all(|m| (0.0..=1.0).contains(m))
    );

    let mut plot = TextPlot::new(Vec::new());
    trainer.plot(&mut plot).expect("Plot should render");
    let chart = String::from_utf8(plot.into_inner()).expect("Chart should be UTF-8");
    let header = chart.lines().next().expect("Chart should have a header");
    assert!(header.contains("Training step"));
    assert!(header.contains("Epoch"));
    assert!(!chart.contains("waiting for data"));
}

#[test]
fn test_history_export() {
    let mut trainer = Trainer::new(EchoStep::new(&[0.5, 0.25]), TrainerConfig::new().verbose(false))
        .expect("Trainer creation should succeed");
    trainer
        .train(&image_batches(2), &image_batches(1), 1)
        .expect("Training should succeed");

    let json = trainer.history().to_json().expect("Export should succeed");
    let restored = RunHistory::from_json(&json).expect("Import should succeed");

    assert_eq!(&restored, trainer.history());

    let mut plot = TextPlot::new(Vec::new()).size(20, 5);
    plot.plot(&restored).expect("Plot should render");
}
