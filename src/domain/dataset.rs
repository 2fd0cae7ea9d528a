// ============================================================
// Layer 3 — Tabular Dataset
// ============================================================
// The feature table the whole pipeline operates on.
//
//   features      — [n_samples, n_features] matrix of f32
//   labels        — one class index per row (0 = malignant, 1 = benign)
//   feature_names — column names, in column order
//   target_names  — class names, indexed by label
//
// Rows are selected by index to build train/test partitions;
// the names travel with every partition so reports and plots
// can label their axes.
//
// Reference: ndarray documentation (Array2, Axis, select)

use anyhow::{ensure, Result};
use ndarray::{Array2, Axis};

/// Features, labels and names for one table of samples.
#[derive(Debug, Clone)]
pub struct TabularDataset {
    pub features:      Array2<f32>,
    pub labels:        Vec<usize>,
    pub feature_names: Vec<String>,
    pub target_names:  Vec<String>,
}

impl TabularDataset {
    /// Build a dataset, checking that every part agrees on its shape.
    pub fn new(
        features:      Array2<f32>,
        labels:        Vec<usize>,
        feature_names: Vec<String>,
        target_names:  Vec<String>,
    ) -> Result<Self> {
        ensure!(
            features.nrows() == labels.len(),
            "Feature table has {} rows but {} labels were given",
            features.nrows(),
            labels.len()
        );
        ensure!(
            features.ncols() == feature_names.len(),
            "Feature table has {} columns but {} feature names were given",
            features.ncols(),
            feature_names.len()
        );
        if let Some(&max_label) = labels.iter().max() {
            ensure!(
                max_label < target_names.len(),
                "Label {} has no matching target name ({} names)",
                max_label,
                target_names.len()
            );
        }
        Ok(Self { features, labels, feature_names, target_names })
    }

    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn n_classes(&self) -> usize {
        self.target_names.len()
    }

    /// (rows, columns), printed the same way a data frame reports its shape
    pub fn shape(&self) -> (usize, usize) {
        self.features.dim()
    }

    /// Number of rows carrying each label, indexed by class.
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes()];
        for &label in &self.labels {
            counts[label] += 1;
        }
        counts
    }

    /// A new dataset holding only the given rows, in the given order.
    /// Indices must be in bounds.
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            features:      self.features.select(Axis(0), indices),
            labels:        indices.iter().map(|&i| self.labels[i]).collect(),
            feature_names: self.feature_names.clone(),
            target_names:  self.target_names.clone(),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn names(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{prefix}{i}")).collect()
    }

    #[test]
    fn test_rejects_label_count_mismatch() {
        let x = array![[1.0f32, 2.0], [3.0, 4.0]];
        let err = TabularDataset::new(x, vec![0], names("f", 2), names("c", 2));
        assert!(err.is_err());
    }

    #[test]
    fn test_rejects_label_without_name() {
        let x = array![[1.0f32], [2.0]];
        let err = TabularDataset::new(x, vec![0, 2], names("f", 1), names("c", 2));
        assert!(err.is_err());
    }

    #[test]
    fn test_select_keeps_order_and_names() {
        let x  = array![[1.0f32, 10.0], [2.0, 20.0], [3.0, 30.0]];
        let ds = TabularDataset::new(x, vec![0, 1, 1], names("f", 2), names("c", 2)).unwrap();

        let sub = ds.select(&[2, 0]);
        assert_eq!(sub.shape(), (2, 2));
        assert_eq!(sub.features[[0, 1]], 30.0);
        assert_eq!(sub.labels, vec![1, 0]);
        assert_eq!(sub.feature_names, ds.feature_names);
    }

    #[test]
    fn test_class_counts() {
        let x  = array![[0.0f32], [1.0], [2.0], [3.0]];
        let ds = TabularDataset::new(x, vec![1, 1, 0, 1], names("f", 1), names("c", 2)).unwrap();
        assert_eq!(ds.class_counts(), vec![1, 3]);
    }
}
