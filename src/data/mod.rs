// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the CSV file on disk and the tensors the
// dense network trains on:
//
//   wdbc.data / headered CSV
//       │
//       ▼
//   CsvLoader         → parses rows into a TabularDataset
//       │
//       ▼
//   train_test_split  → seeded shuffle, test / train partitions
//       │
//       ├──────────────► decision tree, random forest (raw features)
//       ▼
//   StandardScaler    → zero mean, unit variance per feature
//       │
//       ▼
//   NetworkDataset    → implements Burn's Dataset trait
//       │
//       ▼
//   NetworkBatcher    → stacks rows into tensor batches
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            csv crate documentation

/// Reads the breast cancer table from a CSV file
pub mod loader;

/// Standard scaling of feature columns
pub mod preprocessor;

/// Implements Burn's Dataset trait for scaled rows
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Seeded train/test split and tail hold-out split
pub mod splitter;
