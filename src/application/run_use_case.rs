// ============================================================
// Layer 2 — RunUseCase
// ============================================================
// Orchestrates the full pipeline in order:
//
//   Step 1: Fetch the dataset if asked   (Layer 6 - infra)
//   Step 2: Load the table               (Layer 4 - data)
//   Step 3: Train/test split             (Layer 4 - data)
//   Step 4: Scale features               (Layer 4 - data)
//   Step 5: Decision tree                (Layer 5 - ml)
//   Step 6: Random forest                (Layer 5 - ml)
//   Step 7: Feature importance plot      (Layer 6 - infra)
//   Step 8: Accuracy summary CSV + plot  (Layer 6 - infra)
//   Step 9: Dense network                (Layer 5 - ml)
//   Step 10: Save config and weights     (Layer 6 - infra)
//
// The trees see raw feature values; only the network is fed
// the standardised ones.

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::data::{
    dataset::NetworkDataset,
    loader::CsvLoader,
    preprocessor::StandardScaler,
    splitter::{split_train_val, train_test_split},
};
use crate::domain::{
    dataset::TabularDataset,
    score::{rank_by_accuracy, ModelScore},
    traits::{Classifier, DatasetSource},
};
use crate::infra::{
    checkpoint::CheckpointManager,
    download::ensure_dataset,
    metrics::{save_accuracy_summary, MetricsLogger},
    plots::{
        plot_accuracy_comparison, plot_confusion_matrix, plot_feature_importances,
        plot_training_curves,
    },
};
use crate::ml::{
    evaluation::{accuracy_score, confusion_matrix, ClassificationReport},
    forest::RandomForestClassifier,
    trainer::run_training,
    tree::DecisionTreeClassifier,
};

pub const FEATURE_IMPORTANCE_FILE: &str = "feature_importance_random_forest.png";
pub const ACCURACY_PLOT_FILE:      &str = "model_accuracy_comparison.png";
pub const CURVES_PLOT_FILE:        &str = "cnn_training_validation.png";

// ─── Run Configuration ───────────────────────────────────────────────────────
// Every setting of a pipeline run. Saved next to the outputs as
// run_config.json so a run can be reproduced and the network
// rebuilt with the same layer sizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub data:             String,
    pub download:         bool,
    pub output_dir:       String,
    pub test_size:        f64,
    pub seed:             u64,
    pub n_estimators:     usize,
    pub max_depth:        Option<usize>,
    pub epochs:           usize,
    pub batch_size:       usize,
    pub lr:               f64,
    pub validation_split: f64,
    pub hidden1:          usize,
    pub hidden2:          usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            data:             "data/wdbc.data".to_string(),
            download:         false,
            output_dir:       ".".to_string(),
            test_size:        0.2,
            seed:             42,
            n_estimators:     100,
            max_depth:        None,
            epochs:           5,
            batch_size:       32,
            lr:               1e-3,
            validation_split: 0.2,
            hidden1:          128,
            hidden2:          64,
        }
    }
}

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Decision tree and random forest, best first
    pub scores:           Vec<ModelScore>,
    pub forest_oob_score: Option<f64>,
    pub network_loss:     f64,
    pub network_accuracy: f64,
    pub outputs:          Vec<PathBuf>,
}

// ─── RunUseCase ───────────────────────────────────────────────────────────────
pub struct RunUseCase {
    config: RunConfig,
}

impl RunUseCase {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<RunReport> {
        let cfg = &self.config;
        ensure!(
            cfg.validation_split > 0.0 && cfg.validation_split < 1.0,
            "validation split must lie in (0, 1), got {}",
            cfg.validation_split
        );
        ensure!(cfg.epochs >= 1, "epochs must be at least 1, got {}", cfg.epochs);
        ensure!(cfg.batch_size >= 1, "batch size must be at least 1, got {}", cfg.batch_size);

        let out_dir  = Path::new(&cfg.output_dir);
        let ckpt     = CheckpointManager::new(out_dir)?;
        let mut outputs = Vec::new();

        // ── Step 1-2: Load the table ─────────────────────────────────────────
        ensure_dataset(Path::new(&cfg.data), cfg.download)?;
        let dataset = CsvLoader::new(&cfg.data).load()?;

        // ── Step 3: Train / test split ────────────────────────────────────────
        let (train, test) = train_test_split(&dataset, cfg.test_size, cfg.seed)?;

        // ── Step 4: Standardise for the network ───────────────────────────────
        let mut scaler     = StandardScaler::new();
        let train_scaled   = scaler.fit_transform(&train.features)?;
        let test_scaled    = scaler.transform(&test.features)?;

        println!("Data preprocessing complete!");
        println!("Training data shape: {:?}", train.shape());
        println!("Testing data shape: {:?}", test.shape());

        // ── Step 5: Decision tree ─────────────────────────────────────────────
        let mut tree = DecisionTreeClassifier::new().with_random_state(cfg.seed);
        if let Some(depth) = cfg.max_depth {
            tree = tree.with_max_depth(depth);
        }
        let (tree_accuracy, path) = evaluate_classifier(&mut tree, &train, &test, out_dir)?;
        outputs.push(path);
        tracing::info!(
            "Decision tree: depth={:?}, leaves={:?}",
            tree.depth(),
            tree.n_leaves()
        );

        // ── Step 6: Random forest ─────────────────────────────────────────────
        let mut forest = RandomForestClassifier::new(cfg.n_estimators).with_random_state(cfg.seed);
        if let Some(depth) = cfg.max_depth {
            forest = forest.with_max_depth(depth);
        }
        let (forest_accuracy, path) = evaluate_classifier(&mut forest, &train, &test, out_dir)?;
        outputs.push(path);
        if let Some(oob) = forest.oob_score() {
            tracing::info!("Random forest out-of-bag accuracy: {:.4}", oob);
        }

        // ── Step 7: Feature importances, smallest first ───────────────────────
        if let Some(importances) = forest.feature_importances() {
            let (names, values) = ranked_importances(&train.feature_names, importances);

            let path = out_dir.join(FEATURE_IMPORTANCE_FILE);
            plot_feature_importances(&path, &names, &values, "Feature Importance - Random Forest")?;
            println!("Feature importance plot saved as '{}'.", path.display());
            outputs.push(path);
        }

        // ── Step 8: Accuracy summary ──────────────────────────────────────────
        println!("\nModel Accuracies:");
        println!("Decision Tree Accuracy: {:.2}", tree_accuracy);
        println!("Random Forest Accuracy: {:.2}", forest_accuracy);

        let mut scores = vec![
            ModelScore::new(Classifier::name(&tree), tree_accuracy),
            ModelScore::new(Classifier::name(&forest), forest_accuracy),
        ];
        rank_by_accuracy(&mut scores);

        let path = save_accuracy_summary(out_dir, &scores)?;
        println!("Model accuracy summary saved as '{}'.", path.display());
        outputs.push(path);

        let path = out_dir.join(ACCURACY_PLOT_FILE);
        plot_accuracy_comparison(&path, &scores, "Model Accuracy Comparison")?;
        println!("Model accuracy comparison chart saved as '{}'.", path.display());
        outputs.push(path);

        // ── Step 9: Dense network ─────────────────────────────────────────────
        let samples = NetworkDataset::from_arrays(&train_scaled, &train.labels)?.into_samples();
        let (fit_rows, val_rows) = split_train_val(samples, 1.0 - cfg.validation_split);
        ensure!(
            !fit_rows.is_empty() && !val_rows.is_empty(),
            "validation split {} leaves an empty training or validation set",
            cfg.validation_split
        );
        tracing::info!(
            "Network rows: {} train, {} validation",
            fit_rows.len(),
            val_rows.len()
        );

        let mut logger = MetricsLogger::new(out_dir)?;
        let network    = run_training(
            cfg,
            NetworkDataset::new(fit_rows),
            NetworkDataset::new(val_rows),
            &mut logger,
        )?;
        outputs.push(logger.csv_path().to_path_buf());

        let (network_loss, network_accuracy) =
            network.evaluate(&test_scaled, &test.labels, cfg.batch_size)?;
        println!("\nNetwork Test Accuracy: {:.2}", network_accuracy);
        tracing::info!("Network test loss: {:.4}", network_loss);

        let network_pred = network.predict(&test_scaled)?;
        println!("Dense Network Classification Report:\n");
        println!(
            "{}",
            ClassificationReport::new(&test.labels, &network_pred, &test.target_names)?
        );

        let path = out_dir.join(CURVES_PLOT_FILE);
        plot_training_curves(&path, &network.history, "Network")?;
        println!("Training and validation plots saved as '{}'.", path.display());
        outputs.push(path);

        // ── Step 10: Persist ──────────────────────────────────────────────────
        outputs.push(ckpt.save_config(cfg)?);
        outputs.push(ckpt.save_model(&network.model)?);
        tracing::info!("Run config and network weights saved to '{}'", ckpt.dir().display());

        Ok(RunReport {
            scores,
            forest_oob_score: forest.oob_score(),
            network_loss,
            network_accuracy,
            outputs,
        })
    }
}

/// Fit on `train`, score on `test`, print the report and write the
/// confusion matrix plot. Returns (accuracy, plot path).
fn evaluate_classifier<C: Classifier>(
    model:   &mut C,
    train:   &TabularDataset,
    test:    &TabularDataset,
    out_dir: &Path,
) -> Result<(f64, PathBuf)> {
    let name = model.name().to_string();
    tracing::info!("Fitting {}", name);

    model.fit(&train.features, &train.labels)?;
    let y_pred = model.predict(&test.features)?;

    println!("{} Classification Report:\n", name);
    println!(
        "{}",
        ClassificationReport::new(&test.labels, &y_pred, &test.target_names)?
    );

    let matrix = confusion_matrix(&test.labels, &y_pred, test.target_names.len())?;
    let path   = out_dir.join(confusion_plot_file(&name));
    plot_confusion_matrix(
        &path,
        &matrix,
        &test.target_names,
        &format!("Confusion Matrix - {}", name),
    )?;
    println!("Confusion matrix for {} saved as '{}'.", name, path.display());

    Ok((accuracy_score(&test.labels, &y_pred)?, path))
}

/// Pair names with importances and sort ascending, so the largest
/// bar is drawn last (on top of the chart).
fn ranked_importances(names: &[String], values: &[f64]) -> (Vec<String>, Vec<f64>) {
    let mut ranked: Vec<(String, f64)> = names
        .iter()
        .cloned()
        .zip(values.iter().copied())
        .collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
    ranked.into_iter().unzip()
}

/// "Random Forest" → "confusion_matrix_random_forest.png"
fn confusion_plot_file(model_name: &str) -> String {
    format!(
        "confusion_matrix_{}.png",
        model_name.to_lowercase().replace(' ', "_")
    )
}
