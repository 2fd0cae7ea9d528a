// ============================================================
// Layer 5 — Random Forest
// ============================================================
// An ensemble of decision trees, each grown on its own
// bootstrap sample (n rows drawn with replacement) and looking
// at only √n_features candidate features per split.
//
//   predict_proba = mean of the trees' leaf distributions
//   predict       = argmax of predict_proba
//
// Tree i is seeded with random_state + i, so the whole forest
// is reproducible from one seed.
//
// Rows left out of a tree's bootstrap sample ("out of bag")
// give a free generalisation estimate: each training row is
// scored only by the trees that never saw it.
//
// Reference: Breiman (2001) Random Forests

use anyhow::{bail, ensure, Result};
use ndarray::Array2;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::domain::traits::Classifier;
use crate::ml::tree::{argmax, DecisionTreeClassifier, MaxFeatures};

#[derive(Debug, Clone)]
pub struct RandomForestClassifier {
    n_estimators: usize,
    max_depth:    Option<usize>,
    max_features: MaxFeatures,
    random_state: Option<u64>,
    trees:        Vec<DecisionTreeClassifier>,
    n_features:   usize,
    n_classes:    usize,
    importances:  Vec<f64>,
    oob_score:    Option<f64>,
}

impl RandomForestClassifier {
    pub fn new(n_estimators: usize) -> Self {
        Self {
            n_estimators,
            max_depth:    None,
            max_features: MaxFeatures::Sqrt,
            random_state: None,
            trees:        Vec::new(),
            n_features:   0,
            n_classes:    0,
            importances:  Vec::new(),
            oob_score:    None,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = Some(random_state);
        self
    }

    pub fn n_estimators(&self) -> usize {
        self.n_estimators
    }

    pub fn trees(&self) -> &[DecisionTreeClassifier] {
        &self.trees
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Mean of the per-tree importances, normalised to sum to 1.
    pub fn feature_importances(&self) -> Option<&[f64]> {
        self.is_fitted().then_some(self.importances.as_slice())
    }

    /// Out-of-bag accuracy on the training rows; `None` before fit or
    /// when no row was ever left out.
    pub fn oob_score(&self) -> Option<f64> {
        self.oob_score
    }

    pub fn fit(&mut self, x: &Array2<f32>, y: &[usize]) -> Result<()> {
        ensure!(self.n_estimators > 0, "A random forest needs at least one tree");
        ensure!(x.nrows() > 0, "Cannot fit a random forest on an empty feature table");
        ensure!(
            x.nrows() == y.len(),
            "Feature table has {} rows but {} labels were given",
            x.nrows(),
            y.len()
        );

        let n_samples  = x.nrows();
        let n_features = x.ncols();
        let n_classes  = y.iter().copied().max().unwrap_or(0) + 1;
        let base_seed  = self.random_state.unwrap_or_else(rand::random);

        let mut trees        = Vec::with_capacity(self.n_estimators);
        let mut importances  = vec![0.0f64; n_features];
        let mut oob_proba    = Array2::<f64>::zeros((n_samples, n_classes));
        let mut oob_seen     = vec![false; n_samples];

        for i in 0..self.n_estimators {
            let seed    = base_seed.wrapping_add(i as u64);
            let mut rng = StdRng::seed_from_u64(seed);

            let bootstrap: Vec<usize> = (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();
            let mut in_bag = vec![false; n_samples];
            for &r in &bootstrap {
                in_bag[r] = true;
            }

            let mut tree = DecisionTreeClassifier::new()
                .with_max_features(self.max_features)
                .with_random_state(seed);
            if let Some(depth) = self.max_depth {
                tree = tree.with_max_depth(depth);
            }
            tree.fit_rows(x, y, &bootstrap, n_classes)?;

            if let Some(tree_importances) = tree.feature_importances() {
                for (acc, v) in importances.iter_mut().zip(tree_importances) {
                    *acc += v;
                }
            }

            for r in (0..n_samples).filter(|&r| !in_bag[r]) {
                if let Some(proba) = tree.row_proba(x.row(r)) {
                    for (c, p) in proba.iter().enumerate() {
                        oob_proba[[r, c]] += p;
                    }
                    oob_seen[r] = true;
                }
            }

            trees.push(tree);
        }

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            importances.iter_mut().for_each(|v| *v /= total);
        }

        let (correct, scored) = oob_proba
            .rows()
            .into_iter()
            .zip(y)
            .zip(&oob_seen)
            .filter(|(_, seen)| **seen)
            .fold((0usize, 0usize), |(correct, scored), ((row, &label), _)| {
                let hit = argmax(row.as_slice().unwrap_or(&[])) == label;
                (correct + usize::from(hit), scored + 1)
            });
        self.oob_score = (scored > 0).then(|| correct as f64 / scored as f64);

        tracing::debug!(
            "Random forest fitted: {} trees, oob_score={:?}",
            trees.len(),
            self.oob_score
        );

        self.trees       = trees;
        self.n_features  = n_features;
        self.n_classes   = n_classes;
        self.importances = importances;
        Ok(())
    }

    /// Mean class probabilities over all trees, shape [n_samples, n_classes].
    pub fn predict_proba(&self, x: &Array2<f32>) -> Result<Array2<f64>> {
        if !self.is_fitted() {
            bail!("Random forest must be fitted before predicting");
        }
        ensure!(
            x.ncols() == self.n_features,
            "Random forest was fitted on {} features but got {}",
            self.n_features,
            x.ncols()
        );

        let mut proba = Array2::<f64>::zeros((x.nrows(), self.n_classes));
        for tree in &self.trees {
            proba += &tree.predict_proba(x)?;
        }
        proba /= self.trees.len() as f64;
        Ok(proba)
    }

    pub fn predict(&self, x: &Array2<f32>) -> Result<Vec<usize>> {
        let proba = self.predict_proba(x)?;
        Ok(proba
            .rows()
            .into_iter()
            .map(|row| argmax(&row.to_vec()))
            .collect())
    }
}

impl Classifier for RandomForestClassifier {
    fn name(&self) -> &str {
        "Random Forest"
    }

    fn fit(&mut self, x: &Array2<f32>, y: &[usize]) -> Result<()> {
        RandomForestClassifier::fit(self, x, y)
    }

    fn predict(&self, x: &Array2<f32>) -> Result<Vec<usize>> {
        RandomForestClassifier::predict(self, x)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    /// Two noisy blobs: class = (x0 + x1 > 1), plus two noise columns.
    fn blobs(n: usize, seed: u64) -> (Array2<f32>, Vec<usize>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut x   = Array2::<f32>::zeros((n, 4));
        let mut y   = Vec::with_capacity(n);
        for i in 0..n {
            let a: f32 = rng.gen();
            let b: f32 = rng.gen();
            x[[i, 0]] = a;
            x[[i, 1]] = b;
            x[[i, 2]] = rng.gen();
            x[[i, 3]] = rng.gen();
            y.push(usize::from(a + b > 1.0));
        }
        (x, y)
    }

    #[test]
    fn test_fit_creates_requested_number_of_trees() {
        let (x, y) = blobs(60, 1);
        let mut rf = RandomForestClassifier::new(7).with_random_state(42);
        rf.fit(&x, &y).unwrap();
        assert_eq!(rf.trees().len(), 7);
    }

    #[test]
    fn test_reasonable_accuracy_on_held_out_rows() {
        let (x, y)         = blobs(300, 3);
        let (x_test, y_te) = blobs(100, 4);
        let mut rf = RandomForestClassifier::new(25).with_random_state(42);
        rf.fit(&x, &y).unwrap();

        let pred    = rf.predict(&x_test).unwrap();
        let correct = pred.iter().zip(&y_te).filter(|(p, t)| p == t).count();
        assert!(correct as f64 / y_te.len() as f64 > 0.85);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (x, y) = blobs(80, 5);
        let mut a  = RandomForestClassifier::new(10).with_random_state(9);
        let mut b  = RandomForestClassifier::new(10).with_random_state(9);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();

        assert_eq!(a.predict_proba(&x).unwrap(), b.predict_proba(&x).unwrap());
        assert_eq!(a.feature_importances(), b.feature_importances());
        assert_eq!(a.oob_score(), b.oob_score());
    }

    #[test]
    fn test_predict_proba_rows_sum_to_one() {
        let (x, y) = blobs(50, 6);
        let mut rf = RandomForestClassifier::new(5).with_random_state(1);
        rf.fit(&x, &y).unwrap();

        let proba = rf.predict_proba(&x).unwrap();
        assert_eq!(proba.dim(), (50, 2));
        for row in proba.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-9);
            assert!(row.iter().all(|&p| (0.0..=1.0).contains(&p)));
        }
    }

    #[test]
    fn test_importances_normalised_and_favour_signal() {
        let (x, y) = blobs(300, 7);
        let mut rf = RandomForestClassifier::new(30).with_random_state(42);
        rf.fit(&x, &y).unwrap();

        let imp = rf.feature_importances().unwrap();
        assert!((imp.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(imp.iter().all(|&v| v >= 0.0));
        // the two signal columns outweigh the two noise columns
        assert!(imp[0] + imp[1] > imp[2] + imp[3]);
    }

    #[test]
    fn test_oob_score_in_unit_range() {
        let (x, y) = blobs(100, 8);
        let mut rf = RandomForestClassifier::new(20).with_random_state(3);
        assert!(rf.oob_score().is_none());

        rf.fit(&x, &y).unwrap();
        let oob = rf.oob_score().unwrap();
        assert!((0.0..=1.0).contains(&oob));
    }

    #[test]
    fn test_unfitted_forest_errors() {
        let (x, _) = blobs(5, 9);
        let rf = RandomForestClassifier::new(3);
        assert!(rf.predict(&x).is_err());
        assert!(rf.feature_importances().is_none());
    }

    #[test]
    fn test_zero_trees_rejected() {
        let (x, y) = blobs(10, 10);
        let mut rf = RandomForestClassifier::new(0);
        assert!(rf.fit(&x, &y).is_err());
    }

    #[test]
    fn test_feature_count_mismatch_is_error() {
        let (x, y) = blobs(20, 11);
        let mut rf = RandomForestClassifier::new(2).with_random_state(0);
        rf.fit(&x, &y).unwrap();
        assert!(rf.predict(&Array2::zeros((3, 2))).is_err());
    }
}
