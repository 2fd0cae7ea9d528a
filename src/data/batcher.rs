// ============================================================
// Layer 4 — Network Batcher
// ============================================================
// Implements Burn's Batcher trait to turn a Vec<NetworkSample>
// into tensors for one forward pass.
//
//   Input:  N samples, each with F features
//   Output: features [N, F], targets [N, 1]
//
// All rows have the same width, so the rows are flattened into
// one Vec<f32> and given the 2D shape directly.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::NetworkSample;

/// A batch of rows ready for the forward pass.
#[derive(Debug, Clone)]
pub struct NetworkBatch<B: Backend> {
    /// Scaled features — shape: [batch_size, n_features]
    pub features: Tensor<B, 2>,

    /// 0.0 / 1.0 labels — shape: [batch_size, 1]
    pub targets: Tensor<B, 2>,
}

/// Holds the target device so tensors are created in the right place.
#[derive(Clone, Debug)]
pub struct NetworkBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> NetworkBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<NetworkSample, NetworkBatch<B>> for NetworkBatcher<B> {
    fn batch(&self, items: Vec<NetworkSample>) -> NetworkBatch<B> {
        let batch_size = items.len();
        let n_features = items.first().map_or(0, |s| s.features.len());

        let flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.features.iter().copied())
            .collect();
        let labels: Vec<f32> = items.iter().map(|s| s.label).collect();

        let features = Tensor::<B, 2>::from_floats(
            TensorData::new(flat, [batch_size, n_features]),
            &self.device,
        );
        let targets = Tensor::<B, 2>::from_floats(
            TensorData::new(labels, [batch_size, 1]),
            &self.device,
        );

        NetworkBatch { features, targets }
    }
}
