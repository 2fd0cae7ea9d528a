// ============================================================
// Layer 5 — ML Layer
// ============================================================
// The three classifiers and the code that scores them.
//
//   tree.rs       — CART decision tree (Gini impurity)
//                   Grows binary splits on ndarray feature
//                   tables and records mean-decrease-in-impurity
//                   feature importances.
//
//   forest.rs     — Random forest of bootstrapped trees
//                   Soft voting, √n_features per split,
//                   out-of-bag accuracy.
//
//   model.rs      — Dense network (Burn)
//                   Two ReLU layers and a sigmoid output,
//                   trained with binary cross-entropy.
//
//   trainer.rs    — The network training loop
//                   Adam, per-epoch validation, history
//                   written to CSV.
//
//   evaluation.rs — Accuracy, confusion matrix and the
//                   per-class classification report.
//
// Burn is only imported here and by the data batcher; the
// trees work directly on ndarray.
//
// Reference: Breiman et al. (1984) Classification and Regression Trees
//            Breiman (2001) Random Forests
//            Burn Book §3 (Building Blocks), §5 (Training)

/// CART decision tree classifier
pub mod tree;

/// Random forest of bootstrapped decision trees
pub mod forest;

/// Dense binary classifier network
pub mod model;

/// Network training loop with validation
pub mod trainer;

/// Accuracy, confusion matrix and classification report
pub mod evaluation;
