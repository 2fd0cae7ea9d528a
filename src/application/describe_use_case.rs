// ============================================================
// Layer 2 — DescribeUseCase
// ============================================================
// Loads the table and prints what is in it: shape, how many
// rows per class, and mean / std / min / max for every feature.
// Nothing is trained and nothing is written.

use anyhow::{ensure, Result};
use ndarray::Axis;
use std::path::Path;

use crate::data::loader::CsvLoader;
use crate::domain::{dataset::TabularDataset, traits::DatasetSource};
use crate::infra::download::ensure_dataset;

#[derive(Debug, Clone)]
pub struct DescribeConfig {
    pub data:     String,
    pub download: bool,
}

/// Column statistics; `std` is the population standard deviation.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureStats {
    pub name: String,
    pub mean: f32,
    pub std:  f32,
    pub min:  f32,
    pub max:  f32,
}

pub fn feature_stats(dataset: &TabularDataset) -> Result<Vec<FeatureStats>> {
    ensure!(dataset.n_samples() > 0, "Cannot describe an empty dataset");
    let x = &dataset.features;

    let stats = dataset
        .feature_names
        .iter()
        .zip(x.axis_iter(Axis(1)))
        .map(|(name, column)| {
            let min = column.iter().copied().fold(f32::INFINITY, f32::min);
            let max = column.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            FeatureStats {
                name: name.clone(),
                mean: column.mean().unwrap_or(0.0),
                std:  column.std(0.0),
                min,
                max,
            }
        })
        .collect();
    Ok(stats)
}

pub struct DescribeUseCase {
    config: DescribeConfig,
}

impl DescribeUseCase {
    pub fn new(config: DescribeConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<Vec<FeatureStats>> {
        let cfg = &self.config;
        ensure_dataset(Path::new(&cfg.data), cfg.download)?;
        let dataset = CsvLoader::new(&cfg.data).load()?;

        let (rows, cols) = dataset.shape();
        println!("Dataset shape: ({}, {})", rows, cols);

        println!("\nClass balance:");
        for (name, count) in dataset.target_names.iter().zip(dataset.class_counts()) {
            println!(
                "  {:<10} {:>5}  ({:.1}%)",
                name,
                count,
                100.0 * count as f64 / rows as f64
            );
        }

        let stats = feature_stats(&dataset)?;
        let width = stats.iter().map(|s| s.name.len()).max().unwrap_or(7).max(7);

        println!(
            "\n{:<width$}  {:>12} {:>12} {:>12} {:>12}",
            "feature", "mean", "std", "min", "max"
        );
        for s in &stats {
            println!(
                "{:<width$}  {:>12.4} {:>12.4} {:>12.4} {:>12.4}",
                s.name, s.mean, s.std, s.min, s.max
            );
        }

        Ok(stats)
    }
}
