// ============================================================
// Layer 5 — Network Training Loop
// ============================================================
// Train + validation loop for the dense network using Burn's
// DataLoader and Adam.
//
//   - Training runs on TrainBackend (Autodiff<NdArray>)
//   - model.valid() gives the same weights on EvalBackend
//     (plain NdArray), used for validation and test scoring
//   - Validation loader is never shuffled
//
// Loss and accuracy are sample-weighted means over the epoch,
// so a short final batch counts only for its own rows.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use std::sync::Arc;

use anyhow::{anyhow, ensure, Result};
use burn::{
    backend::{ndarray::NdArrayDevice, Autodiff, NdArray},
    data::dataloader::{DataLoader, DataLoaderBuilder},
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};
use ndarray::Array2;

use crate::application::run_use_case::RunConfig;
use crate::data::batcher::{NetworkBatch, NetworkBatcher};
use crate::data::dataset::NetworkDataset;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::model::{count_correct, DenseNet, DenseNetConfig};

pub type TrainBackend = Autodiff<NdArray>;
pub type EvalBackend  = NdArray;

/// A fitted network plus the per-epoch history that produced it.
pub struct TrainedNetwork {
    pub model:   DenseNet<EvalBackend>,
    pub history: Vec<EpochMetrics>,
    device:      NdArrayDevice,
}

impl TrainedNetwork {
    /// Mean BCE loss and accuracy on `(x, y)`.
    pub fn evaluate(&self, x: &Array2<f32>, y: &[usize], batch_size: usize) -> Result<(f64, f64)> {
        let dataset = NetworkDataset::from_arrays(x, y)?;
        ensure!(dataset.sample_count() > 0, "Cannot evaluate on an empty table");

        let loader = DataLoaderBuilder::new(NetworkBatcher::<EvalBackend>::new(self.device.clone()))
            .batch_size(batch_size.max(1))
            .build(dataset);

        Ok(evaluate_loader(&self.model, &loader))
    }

    /// Class per row: 1 (benign) when P(benign) >= 0.5, else 0.
    pub fn predict(&self, x: &Array2<f32>) -> Result<Vec<usize>> {
        let (rows, cols) = x.dim();
        let flat: Vec<f32> = x.iter().copied().collect();
        let features = Tensor::<EvalBackend, 2>::from_floats(
            TensorData::new(flat, [rows, cols]),
            &self.device,
        );

        let probs = self
            .model
            .forward(features)
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| anyhow!("Cannot read network output: {:?}", e))?;

        Ok(probs.into_iter().map(|p| usize::from(p >= 0.5)).collect())
    }
}

pub fn run_training(
    cfg:        &RunConfig,
    train_data: NetworkDataset,
    val_data:   NetworkDataset,
    logger:     &mut MetricsLogger,
) -> Result<TrainedNetwork> {
    ensure!(train_data.sample_count() > 0, "Network training set is empty");
    ensure!(val_data.sample_count() > 0, "Network validation set is empty");
    ensure!(cfg.batch_size > 0, "Batch size must be at least 1");

    let n_features = train_data
        .n_features()
        .ok_or_else(|| anyhow!("Network training set has no rows"))?;

    let device = NdArrayDevice::default();
    TrainBackend::seed(cfg.seed);
    tracing::info!("Using NdArray device: {:?}", device);

    // ── Build model ───────────────────────────────────────────────────────────
    let model_cfg = DenseNetConfig::new(n_features)
        .with_hidden1(cfg.hidden1)
        .with_hidden2(cfg.hidden2);
    let mut model: DenseNet<TrainBackend> = model_cfg.init(&device);
    tracing::info!(
        "Network ready: {} → {} → {} → 1",
        n_features,
        cfg.hidden1,
        cfg.hidden2
    );

    let mut optim = AdamConfig::new().init();

    // ── Training loader (AutodiffBackend, reshuffled every epoch) ─────────────
    let train_loader = DataLoaderBuilder::new(NetworkBatcher::<TrainBackend>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .build(train_data);

    // ── Validation loader (InnerBackend, fixed order) ─────────────────────────
    let val_loader = DataLoaderBuilder::new(NetworkBatcher::<EvalBackend>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .build(val_data);

    let mut history = Vec::with_capacity(cfg.epochs);

    for epoch in 1..=cfg.epochs {
        let mut loss_sum = 0.0f64;
        let mut correct  = 0usize;
        let mut seen     = 0usize;

        for batch in train_loader.iter() {
            let rows          = batch.targets.dims()[0];
            let (loss, probs) = model.forward_loss(batch.features, batch.targets.clone());

            loss_sum += loss.clone().into_scalar().elem::<f64>() * rows as f64;
            correct  += count_correct(probs.detach(), batch.targets);
            seen     += rows;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let (val_loss, val_accuracy) = evaluate_loader(&model.valid(), &val_loader);

        let metrics = EpochMetrics::new(
            epoch,
            loss_sum / seen.max(1) as f64,
            correct as f64 / seen.max(1) as f64,
            val_loss,
            val_accuracy,
        );

        println!(
            "Epoch {:>3}/{} | loss={:.4} | accuracy={:.4} | val_loss={:.4} | val_accuracy={:.4}",
            epoch, cfg.epochs, metrics.loss, metrics.accuracy,
            metrics.val_loss, metrics.val_accuracy,
        );

        logger.log(&metrics)?;
        history.push(metrics);
    }

    tracing::info!("Network training complete!");
    Ok(TrainedNetwork { model: model.valid(), history, device })
}

/// Sample-weighted (loss, accuracy) over every batch of `loader`.
fn evaluate_loader<B: Backend>(
    model:  &DenseNet<B>,
    loader: &Arc<dyn DataLoader<NetworkBatch<B>>>,
) -> (f64, f64) {
    let mut loss_sum = 0.0f64;
    let mut correct  = 0usize;
    let mut seen     = 0usize;

    for batch in loader.iter() {
        let rows          = batch.targets.dims()[0];
        let (loss, probs) = model.forward_loss(batch.features, batch.targets.clone());

        loss_sum += loss.into_scalar().elem::<f64>() * rows as f64;
        correct  += count_correct(probs, batch.targets);
        seen     += rows;
    }

    if seen == 0 {
        return (f64::NAN, 0.0);
    }
    (loss_sum / seen as f64, correct as f64 / seen as f64)
}
