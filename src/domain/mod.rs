// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits describing what the pipeline
// works with:
//
//   dataset.rs — the feature table, its labels and names
//   score.rs   — one row of the model accuracy summary
//   traits.rs  — where data comes from, what a classifier does
//
// Rules for this layer:
//   - NO Burn framework types
//   - NO file I/O or network calls
//   - Only plain structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// The feature table with labels and names
pub mod dataset;

// A model name paired with its test accuracy
pub mod score;

// Core abstractions (traits) that other layers implement
pub mod traits;
