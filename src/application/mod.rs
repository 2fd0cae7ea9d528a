// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates the other layers to accomplish one
// goal per CLI command.
//
// Rules for this layer:
//   - No model math here (that's Layer 5)
//   - No clap types here (that's Layer 1)
//   - Only workflow coordination and the user-facing summary
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The full load → fit → report → plot pipeline
pub mod run_use_case;

// Dataset overview without training
pub mod describe_use_case;
