// ============================================================
// Layer 6 — CSV Outputs
// ============================================================
// Two CSV files are written to the output directory:
//
//   network_history.csv — one row per training epoch
//     epoch,loss,accuracy,val_loss,val_accuracy
//     1,0.412345,0.861538,0.298765,0.912088
//     ...
//
//   model_accuracy_summary.csv — one row per classical model,
//   best first
//     Model,Accuracy
//     Random Forest,0.9649122807017544
//     Decision Tree,0.9473684210526316
//
// Both are written through csv::Writer with serde so the header
// row comes from the struct field names.
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

use crate::domain::score::{rank_by_accuracy, ModelScore};

pub const HISTORY_FILE: &str = "network_history.csv";
pub const SUMMARY_FILE: &str = "model_accuracy_summary.csv";

/// One row of network metrics for a single epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Mean binary cross-entropy over the training rows
    pub loss: f64,

    /// Fraction of training rows classified correctly during the epoch
    pub accuracy: f64,

    /// Mean binary cross-entropy on the validation rows
    pub val_loss: f64,

    /// Fraction of validation rows classified correctly
    pub val_accuracy: f64,
}

impl EpochMetrics {
    pub fn new(
        epoch:        usize,
        loss:         f64,
        accuracy:     f64,
        val_loss:     f64,
        val_accuracy: f64,
    ) -> Self {
        Self { epoch, loss, accuracy, val_loss, val_accuracy }
    }
}

/// Writes epoch metrics to `network_history.csv`, one row per call.
/// A fresh file is started for every run.
pub struct MetricsLogger {
    writer:   csv::Writer<File>,
    csv_path: PathBuf,
}

impl MetricsLogger {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create output directory '{}'", dir.display()))?;

        let csv_path = dir.join(HISTORY_FILE);
        let writer = csv::Writer::from_path(&csv_path)
            .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;

        tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        Ok(Self { writer, csv_path })
    }

    /// Append one epoch and flush, so the file is complete even if a
    /// later epoch fails.
    pub fn log(&mut self, m: &EpochMetrics) -> Result<()> {
        self.writer.serialize(m)?;
        self.writer.flush()?;

        tracing::debug!(
            "Logged epoch {} metrics: loss={:.4}, val_loss={:.4}",
            m.epoch,
            m.loss,
            m.val_loss,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

/// Write `model_accuracy_summary.csv` into `dir`, sorted by accuracy
/// descending. Returns the path written.
pub fn save_accuracy_summary(dir: impl AsRef<Path>, scores: &[ModelScore]) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)
        .with_context(|| format!("Cannot create output directory '{}'", dir.display()))?;

    let mut ranked = scores.to_vec();
    rank_by_accuracy(&mut ranked);

    let path = dir.join(SUMMARY_FILE);
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("Cannot create '{}'", path.display()))?;
    for score in &ranked {
        writer.serialize(score)?;
    }
    writer.flush()?;

    Ok(path)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_writes_header_and_rows() {
        let dir        = tempfile::tempdir().unwrap();
        let mut logger = MetricsLogger::new(dir.path()).unwrap();
        logger.log(&EpochMetrics::new(1, 0.5, 0.75, 0.4, 0.8)).unwrap();
        logger.log(&EpochMetrics::new(2, 0.25, 0.9, 0.3, 0.85)).unwrap();

        let text = fs::read_to_string(logger.csv_path()).unwrap();
        assert_eq!(
            text,
            "epoch,loss,accuracy,val_loss,val_accuracy\n\
             1,0.5,0.75,0.4,0.8\n\
             2,0.25,0.9,0.3,0.85\n"
        );
    }

    #[test]
    fn test_logger_starts_fresh_each_run() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut logger = MetricsLogger::new(dir.path()).unwrap();
            logger.log(&EpochMetrics::new(1, 0.5, 0.5, 0.5, 0.5)).unwrap();
        }
        let logger = MetricsLogger::new(dir.path()).unwrap();
        let text   = fs::read_to_string(logger.csv_path()).unwrap();
        assert_eq!(text, "");
    }

    #[test]
    fn test_summary_sorted_descending() {
        let dir    = tempfile::tempdir().unwrap();
        let scores = vec![
            ModelScore::new("Decision Tree", 0.93),
            ModelScore::new("Random Forest", 0.96),
        ];
        let path = save_accuracy_summary(dir.path(), &scores).unwrap();
        assert_eq!(path.file_name().unwrap(), SUMMARY_FILE);

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Model,Accuracy\nRandom Forest,0.96\nDecision Tree,0.93\n");
    }
}
