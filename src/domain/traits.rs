// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer programs against these traits:
//
//   DatasetSource — anything that can produce a TabularDataset
//                   (CsvLoader reads one from disk)
//   Classifier    — anything that can be fitted on a feature
//                   table and then predict class labels
//                   (DecisionTreeClassifier, RandomForestClassifier)
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use ndarray::Array2;

use crate::domain::dataset::TabularDataset;

// ─── DatasetSource ────────────────────────────────────────────────────────────
/// Any component that can load the feature table.
pub trait DatasetSource {
    fn load(&self) -> Result<TabularDataset>;
}

// ─── Classifier ───────────────────────────────────────────────────────────────
/// A supervised classifier over f32 feature rows.
///
/// `predict` must fail if `fit` has not succeeded first.
pub trait Classifier {
    /// Human readable model name used in reports and file names
    fn name(&self) -> &str;

    /// Learn from `x` ([n_samples, n_features]) and labels `y`.
    fn fit(&mut self, x: &Array2<f32>, y: &[usize]) -> Result<()>;

    /// Predict one class index per row of `x`.
    fn predict(&self, x: &Array2<f32>) -> Result<Vec<usize>>;
}
