// ============================================================
// Layer 5 — Decision Tree (CART)
// ============================================================
// A binary classification tree grown greedily top-down:
//
//   at each node, over the candidate features:
//     sort the node's rows by the feature value
//     sweep left → right, moving one row at a time
//     at every boundary between two distinct values,
//       threshold = midpoint, left = value <= threshold
//       score     = weighted Gini impurity of the children
//   keep the lowest score, recurse on both children
//
//   Gini(node) = 1 - Σ p_c²
//
// A node becomes a leaf when it is pure, too small to split,
// at max_depth, or no threshold separates its rows. Leaves keep
// the class distribution of their training rows, so the tree can
// report probabilities as well as labels.
//
// Feature importance is the total weighted impurity decrease
// contributed by each feature, normalised to sum to 1:
//
//   Δ(node) = (n_t·G_t - n_l·G_l - n_r·G_r) / N
//
// With max_features < n_features a random subset of features
// is examined at every node; this is what the random forest
// uses to decorrelate its trees.
//
// Reference: Breiman et al. (1984) Classification and
//            Regression Trees

use anyhow::{bail, ensure, Result};
use ndarray::{Array2, ArrayView1};
use rand::{rngs::StdRng, seq::index, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::domain::traits::Classifier;

/// How many features to examine at each split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaxFeatures {
    All,
    Sqrt,
    Log2,
    Count(usize),
}

impl MaxFeatures {
    /// Number of features to draw out of `n_features`, at least 1.
    pub fn resolve(self, n_features: usize) -> usize {
        let k = match self {
            MaxFeatures::All      => n_features,
            MaxFeatures::Sqrt     => (n_features as f64).sqrt() as usize,
            MaxFeatures::Log2     => (n_features as f64).log2() as usize,
            MaxFeatures::Count(k) => k,
        };
        k.clamp(1, n_features.max(1))
    }
}

/// A node of a fitted tree.
#[derive(Debug, Clone)]
pub enum TreeNode {
    Split {
        feature:   usize,
        threshold: f32,
        /// rows with value <= threshold
        left:      Box<TreeNode>,
        right:     Box<TreeNode>,
    },
    Leaf {
        /// fraction of training rows per class
        probabilities: Vec<f64>,
        n_samples:     usize,
    },
}

impl TreeNode {
    /// Leaves have depth 0.
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }

    fn leaf_for(&self, row: ArrayView1<f32>) -> &[f64] {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { probabilities, .. } => return probabilities,
                TreeNode::Split { feature, threshold, left, right } => {
                    node = if row[*feature] <= *threshold { &**left } else { &**right };
                }
            }
        }
    }
}

/// Everything that exists only after a successful fit.
#[derive(Debug, Clone)]
struct FittedTree {
    root:        TreeNode,
    n_features:  usize,
    n_classes:   usize,
    importances: Vec<f64>,
}

/// CART classifier using Gini impurity.
#[derive(Debug, Clone)]
pub struct DecisionTreeClassifier {
    max_depth:         Option<usize>,
    min_samples_split: usize,
    min_samples_leaf:  usize,
    max_features:      MaxFeatures,
    random_state:      Option<u64>,
    fitted:            Option<FittedTree>,
}

impl Default for DecisionTreeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTreeClassifier {
    /// Unlimited depth, every feature considered at every split.
    pub fn new() -> Self {
        Self {
            max_depth:         None,
            min_samples_split: 2,
            min_samples_leaf:  1,
            max_features:      MaxFeatures::All,
            random_state:      None,
            fitted:            None,
        }
    }

    /// Root has depth 0.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples.max(2);
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Seed for the per-node feature draws.
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.fitted.as_ref().map(|f| &f.root)
    }

    pub fn depth(&self) -> Option<usize> {
        self.root().map(TreeNode::depth)
    }

    pub fn n_leaves(&self) -> Option<usize> {
        self.root().map(TreeNode::n_leaves)
    }

    pub fn n_classes(&self) -> Option<usize> {
        self.fitted.as_ref().map(|f| f.n_classes)
    }

    /// Normalised impurity decrease per feature; all zeros for a
    /// single-leaf tree.
    pub fn feature_importances(&self) -> Option<&[f64]> {
        self.fitted.as_ref().map(|f| f.importances.as_slice())
    }

    /// Fit on every row of `x`; the class count is taken from the
    /// largest label.
    pub fn fit(&mut self, x: &Array2<f32>, y: &[usize]) -> Result<()> {
        ensure!(x.nrows() > 0, "Cannot fit a decision tree on an empty feature table");
        ensure!(
            x.nrows() == y.len(),
            "Feature table has {} rows but {} labels were given",
            x.nrows(),
            y.len()
        );
        let n_classes = y.iter().copied().max().unwrap_or(0) + 1;
        let rows: Vec<usize> = (0..x.nrows()).collect();
        self.fit_rows(x, y, &rows, n_classes)
    }

    /// Fit on the given rows of `x` (repeats allowed, as in a
    /// bootstrap sample). Leaves report `n_classes` probabilities
    /// even if some class is absent from `rows`.
    pub fn fit_rows(
        &mut self,
        x:         &Array2<f32>,
        y:         &[usize],
        rows:      &[usize],
        n_classes: usize,
    ) -> Result<()> {
        ensure!(!rows.is_empty(), "Cannot fit a decision tree on zero rows");
        ensure!(x.ncols() > 0, "Cannot fit a decision tree without features");
        ensure!(
            x.nrows() == y.len(),
            "Feature table has {} rows but {} labels were given",
            x.nrows(),
            y.len()
        );
        if let Some(&bad) = y.iter().find(|&&label| label >= n_classes) {
            bail!("Label {} is out of range for {} classes", bad, n_classes);
        }

        let n_features = x.ncols();
        let mut grower = Grower {
            x,
            y,
            n_classes,
            n_total:           rows.len(),
            max_depth:         self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf:  self.min_samples_leaf,
            n_candidates:      self.max_features.resolve(n_features),
            rng:               StdRng::seed_from_u64(self.random_state.unwrap_or_else(rand::random)),
            importances:       vec![0.0; n_features],
        };
        let root = grower.grow(rows.to_vec(), 0);

        let mut importances = grower.importances;
        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            importances.iter_mut().for_each(|v| *v /= total);
        }

        tracing::debug!(
            "Decision tree fitted: depth={}, leaves={}",
            root.depth(),
            root.n_leaves()
        );

        self.fitted = Some(FittedTree { root, n_features, n_classes, importances });
        Ok(())
    }

    /// Class probabilities, shape [n_samples, n_classes].
    pub fn predict_proba(&self, x: &Array2<f32>) -> Result<Array2<f64>> {
        let fitted = self.check_input(x)?;
        let mut proba = Array2::zeros((x.nrows(), fitted.n_classes));
        for (i, row) in x.rows().into_iter().enumerate() {
            for (c, &p) in fitted.root.leaf_for(row).iter().enumerate() {
                proba[[i, c]] = p;
            }
        }
        Ok(proba)
    }

    /// Leaf distribution for one row; the caller has already checked
    /// the model is fitted and the width matches.
    pub(crate) fn row_proba(&self, row: ArrayView1<f32>) -> Option<&[f64]> {
        self.fitted.as_ref().map(|f| f.root.leaf_for(row))
    }

    pub fn predict(&self, x: &Array2<f32>) -> Result<Vec<usize>> {
        let fitted = self.check_input(x)?;
        Ok(x.rows()
            .into_iter()
            .map(|row| argmax(fitted.root.leaf_for(row)))
            .collect())
    }

    fn check_input(&self, x: &Array2<f32>) -> Result<&FittedTree> {
        let Some(fitted) = &self.fitted else {
            bail!("Decision tree must be fitted before predicting");
        };
        ensure!(
            x.ncols() == fitted.n_features,
            "Decision tree was fitted on {} features but got {}",
            fitted.n_features,
            x.ncols()
        );
        Ok(fitted)
    }
}

impl Classifier for DecisionTreeClassifier {
    fn name(&self) -> &str {
        "Decision Tree"
    }

    fn fit(&mut self, x: &Array2<f32>, y: &[usize]) -> Result<()> {
        DecisionTreeClassifier::fit(self, x, y)
    }

    fn predict(&self, x: &Array2<f32>) -> Result<Vec<usize>> {
        DecisionTreeClassifier::predict(self, x)
    }
}

/// Index of the largest value; the first one wins ties.
pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Gini impurity from per-class counts.
pub fn gini(counts: &[usize], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / n;
            p * p
        })
        .sum::<f64>()
}

// ─── Tree growing ─────────────────────────────────────────────────────────────

struct Grower<'a> {
    x:                 &'a Array2<f32>,
    y:                 &'a [usize],
    n_classes:         usize,
    n_total:           usize,
    max_depth:         Option<usize>,
    min_samples_split: usize,
    min_samples_leaf:  usize,
    n_candidates:      usize,
    rng:               StdRng,
    importances:       Vec<f64>,
}

struct BestSplit {
    feature:       usize,
    threshold:     f32,
    /// n_l·G_l + n_r·G_r
    weighted_gini: f64,
}

impl Grower<'_> {
    fn grow(&mut self, rows: Vec<usize>, depth: usize) -> TreeNode {
        let n        = rows.len();
        let counts   = self.class_counts(&rows);
        let impurity = gini(&counts, n);

        let depth_reached = self.max_depth.is_some_and(|max| depth >= max);
        let too_small     = n < self.min_samples_split || n < 2 * self.min_samples_leaf;

        if impurity <= f64::EPSILON || depth_reached || too_small {
            return self.leaf(&counts, n);
        }

        let Some(best) = self.best_split(&rows, &counts) else {
            return self.leaf(&counts, n);
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .iter()
            .partition(|&&r| self.x[[r, best.feature]] <= best.threshold);

        self.importances[best.feature] +=
            (n as f64 * impurity - best.weighted_gini) / self.n_total as f64;

        let left  = self.grow(left_rows, depth + 1);
        let right = self.grow(right_rows, depth + 1);

        TreeNode::Split {
            feature:   best.feature,
            threshold: best.threshold,
            left:      Box::new(left),
            right:     Box::new(right),
        }
    }

    fn leaf(&self, counts: &[usize], n: usize) -> TreeNode {
        TreeNode::Leaf {
            probabilities: counts.iter().map(|&c| c as f64 / n as f64).collect(),
            n_samples:     n,
        }
    }

    fn class_counts(&self, rows: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes];
        for &r in rows {
            counts[self.y[r]] += 1;
        }
        counts
    }

    fn candidate_features(&mut self) -> Vec<usize> {
        let n_features = self.x.ncols();
        if self.n_candidates >= n_features {
            (0..n_features).collect()
        } else {
            index::sample(&mut self.rng, n_features, self.n_candidates).into_vec()
        }
    }

    fn best_split(&mut self, rows: &[usize], counts: &[usize]) -> Option<BestSplit> {
        let n        = rows.len();
        let min_leaf = self.min_samples_leaf;
        let mut best: Option<BestSplit> = None;

        let mut sorted = rows.to_vec();
        for feature in self.candidate_features() {
            let column = self.x.column(feature);
            sorted.sort_by(|&a, &b| column[a].total_cmp(&column[b]));

            let mut left_counts  = vec![0usize; self.n_classes];
            let mut right_counts = counts.to_vec();

            for pos in 0..n - 1 {
                let label = self.y[sorted[pos]];
                left_counts[label]  += 1;
                right_counts[label] -= 1;

                let value = column[sorted[pos]];
                let next  = column[sorted[pos + 1]];
                // No threshold fits between equal values
                if next <= value {
                    continue;
                }

                let n_left  = pos + 1;
                let n_right = n - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let weighted = n_left as f64 * gini(&left_counts, n_left)
                    + n_right as f64 * gini(&right_counts, n_right);

                if best.as_ref().map_or(true, |b| weighted < b.weighted_gini) {
                    best = Some(BestSplit {
                        feature,
                        threshold: midpoint(value, next),
                        weighted_gini: weighted,
                    });
                }
            }
        }

        best
    }
}

/// A threshold t with low <= t < high.
fn midpoint(low: f32, high: f32) -> f32 {
    let mid = low / 2.0 + high / 2.0;
    if mid >= high || !mid.is_finite() {
        low
    } else {
        mid
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    /// Class is decided by feature 1; feature 0 is noise.
    fn separable() -> (Array2<f32>, Vec<usize>) {
        let x = array![
            [0.3f32, 1.0], [0.9, 2.0], [0.1, 3.0], [0.5, 4.0],
            [0.2, 10.0], [0.8, 11.0], [0.4, 12.0], [0.6, 13.0],
        ];
        (x, vec![0, 0, 0, 0, 1, 1, 1, 1])
    }

    #[test]
    fn test_gini_values() {
        assert_eq!(gini(&[4, 0], 4), 0.0);
        assert!((gini(&[2, 2], 4) - 0.5).abs() < 1e-12);
        assert_eq!(gini(&[], 0), 0.0);
    }

    #[test]
    fn test_fits_separable_data_with_one_split() {
        let (x, y) = separable();
        let mut tree = DecisionTreeClassifier::new();
        tree.fit(&x, &y).unwrap();

        assert_eq!(tree.depth(), Some(1));
        assert_eq!(tree.n_leaves(), Some(2));
        match tree.root().unwrap() {
            TreeNode::Split { feature, threshold, .. } => {
                assert_eq!(*feature, 1);
                assert!((threshold - 7.0).abs() < 1e-6);
            }
            TreeNode::Leaf { .. } => panic!("expected a split at the root"),
        }
        assert_eq!(tree.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_importance_goes_to_deciding_feature() {
        let (x, y) = separable();
        let mut tree = DecisionTreeClassifier::new();
        tree.fit(&x, &y).unwrap();

        let imp = tree.feature_importances().unwrap();
        assert_eq!(imp.len(), 2);
        assert!((imp[1] - 1.0).abs() < 1e-12);
        assert_eq!(imp[0], 0.0);
    }

    #[test]
    fn test_memorises_xor_without_depth_limit() {
        let x = array![[0.0f32, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
        let y = vec![0, 1, 1, 0];
        let mut tree = DecisionTreeClassifier::new();
        tree.fit(&x, &y).unwrap();
        assert_eq!(tree.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_max_depth_limits_tree() {
        let x = array![[0.0f32, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
        let y = vec![0, 1, 1, 0];
        let mut tree = DecisionTreeClassifier::new().with_max_depth(0);
        tree.fit(&x, &y).unwrap();

        assert_eq!(tree.depth(), Some(0));
        // single leaf → no importance anywhere
        assert!(tree.feature_importances().unwrap().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_min_samples_leaf_respected() {
        let (x, y) = separable();
        let mut tree = DecisionTreeClassifier::new().with_min_samples_leaf(3);
        tree.fit(&x, &y).unwrap();

        fn smallest_leaf(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { n_samples, .. } => *n_samples,
                TreeNode::Split { left, right, .. } => smallest_leaf(left).min(smallest_leaf(right)),
            }
        }
        assert!(smallest_leaf(tree.root().unwrap()) >= 3);
    }

    #[test]
    fn test_constant_features_give_single_leaf() {
        let x = array![[1.0f32], [1.0], [1.0]];
        let mut tree = DecisionTreeClassifier::new();
        tree.fit(&x, &[0, 1, 1]).unwrap();

        assert_eq!(tree.n_leaves(), Some(1));
        let proba = tree.predict_proba(&x).unwrap();
        assert!((proba[[0, 1]] - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(tree.predict(&x).unwrap(), vec![1, 1, 1]);
    }

    #[test]
    fn test_predict_proba_rows_sum_to_one() {
        let (x, y) = separable();
        let mut tree = DecisionTreeClassifier::new().with_max_depth(1);
        tree.fit(&x, &y).unwrap();

        let proba = tree.predict_proba(&x).unwrap();
        assert_eq!(proba.dim(), (8, 2));
        for row in proba.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_fit_rows_keeps_all_classes() {
        let (x, y) = separable();
        let mut tree = DecisionTreeClassifier::new();
        // only class-0 rows, but three classes declared
        tree.fit_rows(&x, &y, &[0, 1, 1, 2], 3).unwrap();

        assert_eq!(tree.n_classes(), Some(3));
        assert_eq!(tree.predict_proba(&x).unwrap().dim(), (8, 3));
    }

    #[test]
    fn test_predict_before_fit_is_error() {
        let (x, _) = separable();
        let tree = DecisionTreeClassifier::new();
        assert!(tree.predict(&x).is_err());
        assert!(tree.predict_proba(&x).is_err());
    }

    #[test]
    fn test_feature_count_mismatch_is_error() {
        let (x, y) = separable();
        let mut tree = DecisionTreeClassifier::new();
        tree.fit(&x, &y).unwrap();
        assert!(tree.predict(&array![[1.0f32]]).is_err());
    }

    #[test]
    fn test_invalid_training_input_is_error() {
        let (x, _) = separable();
        let mut tree = DecisionTreeClassifier::new();
        assert!(tree.fit(&x, &[0, 1]).is_err());
        assert!(tree.fit(&Array2::zeros((0, 2)), &[]).is_err());
    }

    #[test]
    fn test_max_features_resolution() {
        assert_eq!(MaxFeatures::Sqrt.resolve(30), 5);
        assert_eq!(MaxFeatures::Log2.resolve(30), 4);
        assert_eq!(MaxFeatures::All.resolve(30), 30);
        assert_eq!(MaxFeatures::Count(100).resolve(30), 30);
        assert_eq!(MaxFeatures::Count(0).resolve(30), 1);
        assert_eq!(MaxFeatures::Sqrt.resolve(1), 1);
    }

    #[test]
    fn test_midpoint_stays_below_upper_value() {
        assert_eq!(midpoint(1.0, 3.0), 2.0);
        let low  = 1.0f32;
        let high = f32::from_bits(low.to_bits() + 1);
        let t    = midpoint(low, high);
        assert!(t >= low && t < high);
    }

    #[test]
    fn test_argmax_prefers_first_on_tie() {
        assert_eq!(argmax(&[0.5, 0.5]), 0);
        assert_eq!(argmax(&[0.2, 0.8]), 1);
    }
}
