use burn::{
    nn::{Linear, LinearConfig},
    prelude::*,
    tensor::activation::{relu, sigmoid},
};

/// Probabilities are clamped into [EPS, 1 - EPS] before taking logs.
pub const PROB_EPSILON: f64 = 1e-7;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct DenseNetConfig {
    pub n_features: usize,
    #[config(default = 128)]
    pub hidden1: usize,
    #[config(default = 64)]
    pub hidden2: usize,
}

impl DenseNetConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> DenseNet<B> {
        DenseNet {
            input:  LinearConfig::new(self.n_features, self.hidden1).init(device),
            hidden: LinearConfig::new(self.hidden1, self.hidden2).init(device),
            output: LinearConfig::new(self.hidden2, 1).init(device),
        }
    }
}

/// Two ReLU hidden layers and a single sigmoid output unit.
#[derive(Module, Debug)]
pub struct DenseNet<B: Backend> {
    pub input:  Linear<B>,
    pub hidden: Linear<B>,
    pub output: Linear<B>,
}

impl<B: Backend> DenseNet<B> {
    /// features: [batch, n_features] → P(benign): [batch, 1]
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = relu(self.input.forward(features));
        let x = relu(self.hidden.forward(x));
        sigmoid(self.output.forward(x))
    }

    /// Returns (mean binary cross-entropy, probabilities).
    pub fn forward_loss(
        &self,
        features: Tensor<B, 2>,
        targets:  Tensor<B, 2>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let probs = self.forward(features);
        let loss  = binary_cross_entropy(probs.clone(), targets);
        (loss, probs)
    }
}

/// BCE = -mean( y·log(p) + (1 - y)·log(1 - p) )
pub fn binary_cross_entropy<B: Backend>(probs: Tensor<B, 2>, targets: Tensor<B, 2>) -> Tensor<B, 1> {
    let p = probs.clamp(PROB_EPSILON, 1.0 - PROB_EPSILON);

    let positive = targets.clone() * p.clone().log();
    let negative = targets.neg().add_scalar(1.0) * p.neg().add_scalar(1.0).log();

    (positive + negative).mean().neg()
}

/// Rows where (p >= 0.5) agrees with the 0/1 target.
pub fn count_correct<B: Backend>(probs: Tensor<B, 2>, targets: Tensor<B, 2>) -> usize {
    let predicted = probs.greater_equal_elem(0.5);
    let actual    = targets.greater_equal_elem(0.5);
    predicted
        .equal(actual)
        .int()
        .sum()
        .into_scalar()
        .elem::<i64>() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn tensor(values: Vec<f32>, rows: usize, cols: usize) -> Tensor<TestBackend, 2> {
        Tensor::from_floats(TensorData::new(values, [rows, cols]), &Default::default())
    }

    #[test]
    fn test_forward_output_shape_and_range() {
        let model: DenseNet<TestBackend> = DenseNetConfig::new(4)
            .with_hidden1(8)
            .with_hidden2(4)
            .init(&Default::default());

        let probs = model.forward(tensor(vec![0.5; 12], 3, 4));
        assert_eq!(probs.dims(), [3, 1]);

        let values = probs.into_data().to_vec::<f32>().unwrap();
        assert!(values.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }

    #[test]
    fn test_default_hidden_sizes() {
        let cfg = DenseNetConfig::new(30);
        assert_eq!(cfg.hidden1, 128);
        assert_eq!(cfg.hidden2, 64);
    }

    #[test]
    fn test_bce_matches_hand_computation() {
        let probs   = tensor(vec![0.9, 0.2], 2, 1);
        let targets = tensor(vec![1.0, 0.0], 2, 1);
        let loss    = binary_cross_entropy(probs, targets).into_scalar().elem::<f64>();

        let expected = -((0.9f64).ln() + (0.8f64).ln()) / 2.0;
        assert!((loss - expected).abs() < 1e-5);
    }

    #[test]
    fn test_bce_is_finite_at_extremes() {
        let probs   = tensor(vec![0.0, 1.0], 2, 1);
        let targets = tensor(vec![1.0, 0.0], 2, 1);
        let loss    = binary_cross_entropy(probs, targets).into_scalar().elem::<f64>();
        assert!(loss.is_finite());
        assert!(loss > 10.0);
    }

    #[test]
    fn test_count_correct_thresholds_at_half() {
        let probs   = tensor(vec![0.7, 0.4, 0.5, 0.1], 4, 1);
        let targets = tensor(vec![1.0, 1.0, 1.0, 0.0], 4, 1);
        assert_eq!(count_correct(probs, targets), 3);
    }
}
