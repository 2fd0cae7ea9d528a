use anyhow::{ensure, Result};
use burn::data::dataset::Dataset;
use ndarray::Array2;

/// One scaled feature row with its label as a float (0.0 or 1.0),
/// the form the sigmoid output is compared against.
#[derive(Debug, Clone)]
pub struct NetworkSample {
    pub features: Vec<f32>,
    pub label:    f32,
}

pub struct NetworkDataset {
    samples: Vec<NetworkSample>,
}

impl NetworkDataset {
    pub fn new(samples: Vec<NetworkSample>) -> Self { Self { samples } }

    /// Pair each row of `x` with its label from `y`.
    pub fn from_arrays(x: &Array2<f32>, y: &[usize]) -> Result<Self> {
        ensure!(
            x.nrows() == y.len(),
            "Feature table has {} rows but {} labels were given",
            x.nrows(),
            y.len()
        );
        let samples = x
            .rows()
            .into_iter()
            .zip(y)
            .map(|(row, &label)| NetworkSample {
                features: row.to_vec(),
                label:    label as f32,
            })
            .collect();
        Ok(Self { samples })
    }

    pub fn sample_count(&self) -> usize { self.samples.len() }

    pub fn into_samples(self) -> Vec<NetworkSample> { self.samples }

    pub fn n_features(&self) -> Option<usize> {
        self.samples.first().map(|s| s.features.len())
    }
}

impl Dataset<NetworkSample> for NetworkDataset {
    fn get(&self, index: usize) -> Option<NetworkSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_from_arrays_pairs_rows_with_labels() {
        let x  = array![[1.0f32, 2.0], [3.0, 4.0]];
        let ds = NetworkDataset::from_arrays(&x, &[1, 0]).unwrap();

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.n_features(), Some(2));
        let second = ds.get(1).unwrap();
        assert_eq!(second.features, vec![3.0, 4.0]);
        assert_eq!(second.label, 0.0);
        assert!(ds.get(2).is_none());
    }

    #[test]
    fn test_from_arrays_rejects_length_mismatch() {
        let x = array![[1.0f32], [2.0]];
        assert!(NetworkDataset::from_arrays(&x, &[1]).is_err());
    }
}
