// ============================================================
// Layer 4 — Splitters
// ============================================================
// Two ways of dividing rows:
//
//   train_test_split — seeded shuffle of all row indices, the
//                      first ceil(test_size × n) become the test
//                      set and the rest the training set.
//                      Same seed, same split.
//
//   split_train_val  — keeps order and holds out the TAIL of a
//                      vector, the way the network's validation
//                      rows are taken from the end of the
//                      (already shuffled) training rows.
//
// Shuffling is a Fisher-Yates shuffle via
// rand::seq::SliceRandom on a seeded StdRng.
//
// Reference: rand crate documentation

use anyhow::{ensure, Result};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::domain::dataset::TabularDataset;

/// Row indices `0..n` in a seeded random order.
pub fn shuffled_indices(n: usize, seed: u64) -> Vec<usize> {
    let mut rng     = StdRng::seed_from_u64(seed);
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut rng);
    indices
}

/// Split a dataset into (train, test).
///
/// `test_size` is the fraction of rows for testing and must lie in
/// (0, 1). The test count is rounded up; both partitions must end up
/// non-empty.
pub fn train_test_split(
    dataset:   &TabularDataset,
    test_size: f64,
    seed:      u64,
) -> Result<(TabularDataset, TabularDataset)> {
    ensure!(
        test_size > 0.0 && test_size < 1.0,
        "test_size must be between 0 and 1 (exclusive), got {}",
        test_size
    );

    let total  = dataset.n_samples();
    let n_test = ((total as f64) * test_size).ceil() as usize;
    ensure!(
        n_test > 0 && n_test < total,
        "Cannot split {} samples with test_size={}: one side would be empty",
        total,
        test_size
    );

    let indices = shuffled_indices(total, seed);
    let (test_idx, train_idx) = indices.split_at(n_test);

    tracing::debug!(
        "Train/test split: {} training, {} testing (seed={})",
        train_idx.len(),
        test_idx.len(),
        seed
    );

    Ok((dataset.select(train_idx), dataset.select(test_idx)))
}

/// Split `samples` into (train, validation) without shuffling; the
/// validation part is the last `1 - train_fraction` of the input.
///
/// # Example
/// ```ignore
/// let (train, val) = split_train_val((0..10).collect::<Vec<_>>(), 0.8);
/// assert_eq!(val, vec![8, 9]);
/// ```
pub fn split_train_val<T>(mut samples: Vec<T>, train_fraction: f64) -> (Vec<T>, Vec<T>) {
    let total    = samples.len();
    let n_val    = ((total as f64) * (1.0 - train_fraction)).round() as usize;
    let split_at = total - n_val.min(total);

    // split_off(n) removes elements [n..] and returns them
    let val = samples.split_off(split_at);

    tracing::debug!(
        "Hold-out split: {} training, {} validation",
        samples.len(),
        val.len(),
    );

    (samples, val)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn dataset(n: usize) -> TabularDataset {
        let x = Array2::from_shape_fn((n, 2), |(i, j)| (i * 10 + j) as f32);
        let y = (0..n).map(|i| i % 2).collect();
        TabularDataset::new(
            x,
            y,
            vec!["a".into(), "b".into()],
            vec!["malignant".into(), "benign".into()],
        )
        .unwrap()
    }

    #[test]
    fn test_train_test_sizes_round_test_up() {
        // 569 × 0.2 = 113.8 → 114 test rows, 455 training rows
        let (train, test) = train_test_split(&dataset(569), 0.2, 42).unwrap();
        assert_eq!(test.n_samples(),  114);
        assert_eq!(train.n_samples(), 455);
    }

    #[test]
    fn test_split_is_deterministic_per_seed() {
        let ds = dataset(50);
        let (a_train, a_test) = train_test_split(&ds, 0.3, 7).unwrap();
        let (b_train, b_test) = train_test_split(&ds, 0.3, 7).unwrap();
        assert_eq!(a_train.features, b_train.features);
        assert_eq!(a_test.labels,    b_test.labels);

        let (c_train, _) = train_test_split(&ds, 0.3, 8).unwrap();
        assert_ne!(a_train.features, c_train.features);
    }

    #[test]
    fn test_split_preserves_every_row_once() {
        let ds = dataset(40);
        let (train, test) = train_test_split(&ds, 0.25, 1).unwrap();

        let mut firsts: Vec<f32> = train
            .features
            .column(0)
            .iter()
            .chain(test.features.column(0).iter())
            .copied()
            .collect();
        firsts.sort_by(f32::total_cmp);
        let expected: Vec<f32> = (0..40).map(|i| (i * 10) as f32).collect();
        assert_eq!(firsts, expected);
    }

    #[test]
    fn test_rejects_out_of_range_test_size() {
        let ds = dataset(10);
        assert!(train_test_split(&ds, 0.0, 1).is_err());
        assert!(train_test_split(&ds, 1.0, 1).is_err());
    }

    #[test]
    fn test_rejects_split_leaving_empty_side() {
        // ceil(1 × 0.5) = 1 test row, 0 training rows
        assert!(train_test_split(&dataset(1), 0.5, 1).is_err());
    }

    #[test]
    fn test_hold_out_takes_tail() {
        let items: Vec<usize> = (0..10).collect();
        let (train, val)      = split_train_val(items, 0.8);
        assert_eq!(train, (0..8).collect::<Vec<_>>());
        assert_eq!(val,   vec![8, 9]);
    }

    #[test]
    fn test_hold_out_empty_and_full() {
        let (train, val) = split_train_val(Vec::<usize>::new(), 0.8);
        assert!(train.is_empty() && val.is_empty());

        let (train, val) = split_train_val((0..10).collect::<Vec<usize>>(), 1.0);
        assert_eq!(train.len(), 10);
        assert!(val.is_empty());
    }
}
