//! Rendering of run history.
//!
//! [`TextPlot`] draws two trueno-viz loss curves side by side in the
//! terminal: training loss per step on the left, training and validation
//! metric per epoch on the right.

use crate::errors::TrainError;
use crate::training::RunHistory;
use std::io::{self, Write};
use trueno_viz::output::{TerminalEncoder, TerminalMode};
use trueno_viz::plots::{LossCurve, MetricSeries};
use trueno_viz::prelude::{Rgba, WithDimensions};

/// Renders a [`RunHistory`].
pub trait Plotter {
    fn plot(&mut self, history: &RunHistory) -> Result<(), TrainError>;
}

const DEFAULT_WIDTH: u32 = 60;
const DEFAULT_HEIGHT: u32 = 24;
const MIN_SIZE: u32 = 8;
const PANEL_GAP: &str = "    ";
const WAITING: &str = "(waiting for data...)";

/// Two-panel terminal chart written to any [`Write`].
pub struct TextPlot<W: Write> {
    writer: W,
    width: u32,
    height: u32,
}

impl TextPlot<io::Stdout> {
    /// Plots to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TextPlot<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }

    /// Sets the size of each panel in pixels of the chart framebuffer.
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Plotter for TextPlot<W> {
    fn plot(&mut self, history: &RunHistory) -> Result<(), TrainError> {
        let chart = render(history, self.width, self.height)?;
        self.writer.write_all(chart.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Renders both panels into a string. Sizes below a small minimum are
/// raised to it.
pub fn render(history: &RunHistory, width: u32, height: u32) -> Result<String, TrainError> {
    let (width, height) = (width.max(MIN_SIZE), height.max(MIN_SIZE));

    let left = panel(
        "Loss / Training step",
        loss_curve(history, width, height)?,
        width,
        height,
    )?;
    let right = panel(
        "Metric [0, 1] / Epoch  (Train, Valid)",
        metric_curve(history, width, height)?,
        width,
        height,
    )?;

    let left_width = left.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    for i in 0..left.len().max(right.len()) {
        let l = left.get(i).map(String::as_str).unwrap_or("");
        let r = right.get(i).map(String::as_str).unwrap_or("");
        let pad = left_width - l.chars().count();
        let line = format!("{}{}{}{}", l, " ".repeat(pad), PANEL_GAP, r);
        out.push_str(line.trim_end());
        out.push('\n');
    }
    Ok(out)
}

fn build(curve: LossCurve) -> Result<LossCurve, TrainError> {
    curve.build().map_err(|e| TrainError::Plot {
        message: format!("{:?}", e),
    })
}

fn loss_curve(history: &RunHistory, width: u32, height: u32) -> Result<LossCurve, TrainError> {
    let mut curve = build(
        LossCurve::new()
            .add_series(MetricSeries::new("Loss", Rgba::rgb(66, 133, 244)))
            .dimensions(width, height)
            .margin(2)
            .lower_is_better(true),
    )?;
    for &loss in history.losses().iter().filter(|v| v.is_finite()) {
        curve.push(0, loss);
    }
    Ok(curve)
}

fn metric_curve(history: &RunHistory, width: u32, height: u32) -> Result<LossCurve, TrainError> {
    let mut curve = build(
        LossCurve::new()
            .add_series(MetricSeries::new("Train", Rgba::rgb(66, 133, 244)))
            .add_series(MetricSeries::new("Valid", Rgba::rgb(255, 128, 0)))
            .dimensions(width, height)
            .margin(2)
            .best_markers(true)
            .lower_is_better(false),
    )?;
    let series = [
        history.metric_per_epoch(),
        history.validation_metric_per_epoch(),
    ];
    for (index, values) in series.iter().enumerate() {
        for &value in values.iter().filter(|v| v.is_finite()) {
            curve.push(index, value.clamp(0.0, 1.0));
        }
    }
    Ok(curve)
}

/// Title line followed by the rasterized curve.
fn panel(title: &str, curve: LossCurve, width: u32, height: u32) -> Result<Vec<String>, TrainError> {
    let mut lines = vec![title.to_string()];
    if curve.max_epochs() < 2 {
        lines.push(WAITING.to_string());
        return Ok(lines);
    }

    let fb = curve.to_framebuffer().map_err(|_| TrainError::Plot {
        message: format!("failed to rasterize `{}`", title),
    })?;
    let encoder = TerminalEncoder::new()
        .mode(TerminalMode::Ascii)
        .width(width)
        .height(height / 2); // Terminal chars are ~2:1 aspect

    lines.extend(encoder.render(&fb).lines().map(str::to_string));
    Ok(lines)
}
