// ============================================================
// Layer 6 — PNG Plots
// ============================================================
// Every chart the pipeline writes, rendered with plotters'
// bitmap backend:
//
//   plot_confusion_matrix    — annotated heatmap, 600×400
//   plot_feature_importances — horizontal bars, 1000×600
//   plot_accuracy_comparison — vertical bars in [0, 1], 800×500
//   plot_training_curves     — accuracy | loss panels, 1200×500
//
// Categorical axes use segmented coordinates, so category i
// spans [Exact(i), Exact(i + 1)] and its tick sits at
// CenterOf(i).
//
// Reference: The Plotters Developer's Guide

use anyhow::{ensure, Result};
use plotters::{
    coord::Shift,
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};
use std::{ops::Range, path::Path};

use crate::domain::score::ModelScore;
use crate::infra::metrics::EpochMetrics;

const FONT: &str = "sans-serif";

const BLUES_LIGHT: (f64, f64, f64) = (247.0, 251.0, 255.0);
const BLUES_DARK:  (f64, f64, f64) = (8.0, 48.0, 107.0);

const TRAIN_COLOR: RGBColor = RGBColor(31, 119, 180);
const VAL_COLOR:   RGBColor = RGBColor(255, 127, 14);

/// Linear ramp from near-white (t = 0) to dark blue (t = 1).
fn blues(t: f64) -> RGBColor {
    let t    = t.clamp(0.0, 1.0);
    let lerp = |a: f64, b: f64| (a + (b - a) * t).round() as u8;
    RGBColor(
        lerp(BLUES_LIGHT.0, BLUES_DARK.0),
        lerp(BLUES_LIGHT.1, BLUES_DARK.1),
        lerp(BLUES_LIGHT.2, BLUES_DARK.2),
    )
}

fn category_label(labels: &[String], value: &SegmentValue<usize>) -> String {
    match value {
        SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => {
            labels.get(*i).cloned().unwrap_or_default()
        }
        SegmentValue::Last => String::new(),
    }
}

/// Heatmap of `matrix[actual][predicted]` with the count in every cell.
/// The first class is drawn in the top row, as in the printed matrix.
pub fn plot_confusion_matrix(
    path:   &Path,
    matrix: &[Vec<usize>],
    labels: &[String],
    title:  &str,
) -> Result<()> {
    let n = matrix.len();
    ensure!(n > 0, "Cannot plot an empty confusion matrix");
    ensure!(
        labels.len() == n && matrix.iter().all(|row| row.len() == n),
        "Confusion matrix must be {0}×{0} with {0} labels",
        n
    );

    let root = BitMapBackend::new(path, (600, 400)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 20))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(90)
        .build_cartesian_2d((0..n - 1).into_segmented(), (0..n - 1).into_segmented())?;

    // row r is drawn at y = n - 1 - r so actual class 0 ends up on top
    let y_labels: Vec<String> = labels.iter().rev().cloned().collect();
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Predicted")
        .y_desc("Actual")
        .x_label_formatter(&|v| category_label(labels, v))
        .y_label_formatter(&|v| category_label(&y_labels, v))
        .draw()?;

    let max = matrix.iter().flatten().copied().max().unwrap_or(0).max(1) as f64;

    let cells: Vec<(usize, usize, usize)> = matrix
        .iter()
        .enumerate()
        .flat_map(|(r, row)| row.iter().enumerate().map(move |(c, &count)| (c, n - 1 - r, count)))
        .collect();

    chart.draw_series(cells.iter().map(|&(x, y, count)| {
        Rectangle::new(
            [
                (SegmentValue::Exact(x), SegmentValue::Exact(y)),
                (SegmentValue::Exact(x + 1), SegmentValue::Exact(y + 1)),
            ],
            blues(count as f64 / max).filled(),
        )
    }))?;

    chart.draw_series(cells.iter().map(|&(x, y, count)| {
        let text_color = if count as f64 / max > 0.5 { WHITE } else { BLACK };
        Text::new(
            count.to_string(),
            (SegmentValue::CenterOf(x), SegmentValue::CenterOf(y)),
            (FONT, 18)
                .into_font()
                .color(&text_color)
                .pos(Pos::new(HPos::Center, VPos::Center)),
        )
    }))?;

    root.present()?;
    tracing::debug!("Wrote confusion matrix plot '{}'", path.display());
    Ok(())
}

/// Horizontal bars in the order given; the last entry is drawn on top.
pub fn plot_feature_importances(
    path:        &Path,
    names:       &[String],
    importances: &[f64],
    title:       &str,
) -> Result<()> {
    let n = names.len();
    ensure!(n > 0, "No feature importances to plot");
    ensure!(
        importances.len() == n,
        "Got {} feature names but {} importances",
        n,
        importances.len()
    );

    let x_max = importances.iter().copied().fold(0.0f64, f64::max).max(1e-6) * 1.1;

    let root = BitMapBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 22))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(190)
        .build_cartesian_2d(0.0..x_max, (0..n - 1).into_segmented())?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(n)
        .x_desc("Importance")
        .y_desc("Feature")
        .y_label_formatter(&|v| category_label(names, v))
        .draw()?;

    chart.draw_series(importances.iter().enumerate().map(|(i, &value)| {
        let mut bar = Rectangle::new(
            [
                (0.0, SegmentValue::Exact(i)),
                (value, SegmentValue::Exact(i + 1)),
            ],
            TRAIN_COLOR.filled(),
        );
        bar.set_margin(2, 2, 0, 0);
        bar
    }))?;

    root.present()?;
    tracing::debug!("Wrote feature importance plot '{}'", path.display());
    Ok(())
}

/// One bar per model, in the order given, with the accuracy printed above it.
pub fn plot_accuracy_comparison(path: &Path, scores: &[ModelScore], title: &str) -> Result<()> {
    let n = scores.len();
    ensure!(n > 0, "No model scores to plot");

    let names: Vec<String> = scores.iter().map(|s| s.model.clone()).collect();

    let root = BitMapBackend::new(path, (800, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 22))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d((0..n - 1).into_segmented(), 0.0..1.0f64)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Model")
        .y_desc("Accuracy")
        .x_label_formatter(&|v| category_label(&names, v))
        .draw()?;

    chart.draw_series(scores.iter().enumerate().map(|(i, score)| {
        let mut bar = Rectangle::new(
            [
                (SegmentValue::Exact(i), 0.0),
                (SegmentValue::Exact(i + 1), score.accuracy.clamp(0.0, 1.0)),
            ],
            TRAIN_COLOR.filled(),
        );
        bar.set_margin(0, 0, 30, 30);
        bar
    }))?;

    chart.draw_series(scores.iter().enumerate().map(|(i, score)| {
        Text::new(
            format!("{:.2}", score.accuracy),
            (SegmentValue::CenterOf(i), score.accuracy.clamp(0.0, 1.0)),
            (FONT, 16)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Bottom)),
        )
    }))?;

    root.present()?;
    tracing::debug!("Wrote accuracy comparison plot '{}'", path.display());
    Ok(())
}

/// Two side-by-side panels: train/validation accuracy, then train/validation loss.
pub fn plot_training_curves(path: &Path, history: &[EpochMetrics], title_prefix: &str) -> Result<()> {
    ensure!(!history.is_empty(), "No training history to plot");

    let epochs: Vec<f64> = history.iter().map(|m| m.epoch as f64).collect();
    let pick = |f: fn(&EpochMetrics) -> f64| history.iter().map(f).collect::<Vec<f64>>();

    let root = BitMapBackend::new(path, (1200, 500)).into_drawing_area();
    root.fill(&WHITE)?;
    let (left, right) = root.split_horizontally(600);

    draw_curve_panel(
        &left,
        &format!("{title_prefix} Accuracy"),
        "Accuracy",
        &epochs,
        &pick(|m| m.accuracy),
        &pick(|m| m.val_accuracy),
        0.0..1.0,
    )?;

    let losses: Vec<f64> = history
        .iter()
        .flat_map(|m| [m.loss, m.val_loss])
        .filter(|v| v.is_finite())
        .collect();
    let loss_max = losses.iter().copied().fold(0.0f64, f64::max).max(1e-3) * 1.1;

    draw_curve_panel(
        &right,
        &format!("{title_prefix} Loss"),
        "Loss",
        &epochs,
        &pick(|m| m.loss),
        &pick(|m| m.val_loss),
        0.0..loss_max,
    )?;

    root.present()?;
    tracing::debug!("Wrote training curves plot '{}'", path.display());
    Ok(())
}

fn draw_curve_panel(
    area:    &DrawingArea<BitMapBackend<'_>, Shift>,
    title:   &str,
    metric:  &str,
    epochs:  &[f64],
    train:   &[f64],
    val:     &[f64],
    y_range: Range<f64>,
) -> Result<()> {
    let x_start = epochs.first().copied().unwrap_or(1.0);
    let x_end   = epochs.last().copied().unwrap_or(1.0).max(x_start + 1.0);

    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, 20))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(55)
        .build_cartesian_2d(x_start..x_end, y_range)?;

    chart
        .configure_mesh()
        .x_desc("Epoch")
        .y_desc(metric)
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            epochs.iter().copied().zip(train.iter().copied()),
            TRAIN_COLOR.stroke_width(2),
        ))?
        .label(format!("Train {metric}"))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], TRAIN_COLOR));

    chart
        .draw_series(LineSeries::new(
            epochs.iter().copied().zip(val.iter().copied()),
            VAL_COLOR.stroke_width(2),
        ))?
        .label(format!("Validation {metric}"))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], VAL_COLOR));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}
