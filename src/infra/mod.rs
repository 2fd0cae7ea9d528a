// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches the filesystem or the network on
// behalf of the other layers:
//
//   checkpoint.rs — network weights (gzipped MessagePack) and the
//                   run configuration as JSON
//
//   metrics.rs    — network history and accuracy summary CSVs
//
//   plots.rs      — PNG charts: confusion matrices, feature
//                   importances, accuracy comparison, training
//                   curves
//
//   download.rs   — fetches the UCI dataset file on request
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Network weight and run config persistence
pub mod checkpoint;

/// CSV writers for epoch history and the accuracy summary
pub mod metrics;

/// PNG chart rendering
pub mod plots;

/// UCI dataset download
pub mod download;
