//! CART regression tree (MSE criterion)

use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::seq::index;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::{MaxFeatures, Regressor};
use crate::error::{EvalError, Result};

/// Decision tree node
#[derive(Debug, Clone)]
pub enum TreeNode {
    /// Leaf node with prediction value
    Leaf { value: f64, n_samples: usize },
    /// Internal node with split
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
    },
}

impl TreeNode {
    fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { value, .. } => return *value,
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    node = if row[*feature_idx] <= *threshold { left } else { right };
                }
            }
        }
    }

    fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Best split found for one node.
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    gain: f64,
}

/// Regression tree
#[derive(Debug, Clone)]
pub struct RegressionTree {
    root: Option<TreeNode>,
    /// Maximum depth
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features considered per split
    pub max_features: MaxFeatures,
    /// Seed for the per-split feature draw
    pub random_state: u64,
    n_features: usize,
}

impl Default for RegressionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RegressionTree {
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            random_state: 0,
            n_features: 0,
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set minimum samples to split
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples.max(2);
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn is_fitted(&self) -> bool {
        self.root.is_some()
    }

    /// Depth of the fitted tree (0 for a single leaf).
    pub fn depth(&self) -> Option<usize> {
        self.root.as_ref().map(TreeNode::depth)
    }

    /// Fit on the rows listed in `indices` (repeats allowed, as in a
    /// bootstrap sample).
    pub(crate) fn fit_rows(
        &mut self,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
        indices: &[usize],
        rng: &mut ChaCha8Rng,
    ) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(EvalError::rows_mismatch(x.nrows(), y.len()));
        }
        if indices.is_empty() {
            return Err(EvalError::EmptyTrainingSet);
        }
        self.n_features = x.ncols();
        let mut indices = indices.to_vec();
        self.root = Some(self.build_tree(x, y, &mut indices, 0, rng));
        Ok(())
    }

    fn build_tree(
        &self,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
        indices: &mut [usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let n_samples = indices.len();
        let mean = indices.iter().map(|&i| y[i]).sum::<f64>() / n_samples as f64;
        let sse: f64 = indices.iter().map(|&i| (y[i] - mean).powi(2)).sum();

        // Spread below the rounding noise of the mean counts as constant.
        let noise = n_samples as f64 * f64::EPSILON * mean.abs();
        let should_stop = n_samples < self.min_samples_split
            || n_samples < 2 * self.min_samples_leaf
            || self.max_depth.is_some_and(|d| depth >= d)
            || sse <= n_samples as f64 * noise * noise;

        if should_stop {
            return TreeNode::Leaf { value: mean, n_samples };
        }

        let Some(split) = self.find_best_split(x, y, indices, mean, sse, rng) else {
            return TreeNode::Leaf { value: mean, n_samples };
        };

        // Partition in place: rows going left first.
        let mut n_left = 0;
        for k in 0..n_samples {
            if x[[indices[k], split.feature_idx]] <= split.threshold {
                indices.swap(k, n_left);
                n_left += 1;
            }
        }
        if n_left == 0 || n_left == n_samples {
            return TreeNode::Leaf { value: mean, n_samples };
        }
        let (left_idx, right_idx) = indices.split_at_mut(n_left);

        let left = Box::new(self.build_tree(x, y, left_idx, depth + 1, rng));
        let right = Box::new(self.build_tree(x, y, right_idx, depth + 1, rng));

        TreeNode::Split {
            feature_idx: split.feature_idx,
            threshold: split.threshold,
            left,
            right,
            n_samples,
        }
    }

    /// Scan candidate features with a sorted sweep. Gain is the drop in the
    /// sum of squared errors, computed from running sums of the targets
    /// centered on the node mean.
    fn find_best_split(
        &self,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
        indices: &[usize],
        mean: f64,
        sse: f64,
        rng: &mut ChaCha8Rng,
    ) -> Option<SplitCandidate> {
        let n_features = x.ncols();
        let n_try = self.max_features.resolve(n_features);
        let features: Vec<usize> = if n_try >= n_features {
            (0..n_features).collect()
        } else {
            index::sample(rng, n_features, n_try).into_vec()
        };

        let n = indices.len();
        let total_sum: f64 = indices.iter().map(|&i| y[i] - mean).sum();
        let parent_score = total_sum * total_sum / n as f64;
        let min_gain = sse * 1e-12;
        let mut best: Option<SplitCandidate> = None;
        let mut pairs: Vec<(f64, f64)> = Vec::with_capacity(n);

        for feature_idx in features {
            pairs.clear();
            pairs.extend(indices.iter().map(|&i| (x[[i, feature_idx]], y[i] - mean)));
            pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_sum = 0.0;
            for k in 0..n - 1 {
                left_sum += pairs[k].1;
                let n_left = k + 1;
                let n_right = n - n_left;
                if pairs[k].0 == pairs[k + 1].0 {
                    continue;
                }
                if n_left < self.min_samples_leaf || n_right < self.min_samples_leaf {
                    continue;
                }
                let right_sum = total_sum - left_sum;
                let score = left_sum * left_sum / n_left as f64 + right_sum * right_sum / n_right as f64;
                let gain = score - parent_score;
                if gain > best.as_ref().map_or(min_gain, |b| b.gain) {
                    let mut threshold = (pairs[k].0 + pairs[k + 1].0) / 2.0;
                    // Midpoint can round up to the right value for adjacent floats.
                    if threshold >= pairs[k + 1].0 {
                        threshold = pairs[k].0;
                    }
                    // NaN never compares `<=`, so such a split sends every row right.
                    if !threshold.is_finite() {
                        continue;
                    }
                    best = Some(SplitCandidate {
                        feature_idx,
                        threshold,
                        gain,
                    });
                }
            }
        }

        best
    }
}

impl Regressor for RegressionTree {
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> Result<()> {
        let indices: Vec<usize> = (0..x.nrows()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state);
        self.fit_rows(x, y, &indices, &mut rng)
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(EvalError::NotFitted)?;
        if x.ncols() != self.n_features {
            return Err(EvalError::FeatureCountMismatch {
                expected: self.n_features,
                actual: x.ncols(),
            });
        }
        Ok(x.outer_iter().map(|row| root.predict_row(row)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    fn fits_step_function_exactly() {
        let x = Array2::from_shape_fn((20, 1), |(r, _)| r as f64);
        let y: Array1<f64> = (0..20).map(|r| if r < 10 { 1.0 } else { 5.0 }).collect();

        let mut tree = RegressionTree::new();
        tree.fit(x.view(), y.view()).unwrap();

        assert_eq!(tree.depth(), Some(1));
        let pred = tree.predict(array![[3.0], [9.4], [9.6], [15.0]].view()).unwrap();
        assert_eq!(pred, array![1.0, 1.0, 5.0, 5.0]);
    }

    #[test]
    fn picks_the_informative_feature() {
        // Column 0 is noise-free signal, column 1 is constant.
        let x = array![[0.0, 3.0], [1.0, 3.0], [2.0, 3.0], [3.0, 3.0]];
        let y = array![0.0, 0.0, 10.0, 10.0];
        let mut tree = RegressionTree::new();
        tree.fit(x.view(), y.view()).unwrap();
        let pred = tree.predict(array![[0.5, 99.0], [2.5, -1.0]].view()).unwrap();
        assert_eq!(pred, array![0.0, 10.0]);
    }

    #[test]
    fn max_depth_limits_growth() {
        let x = Array2::from_shape_fn((32, 1), |(r, _)| r as f64);
        let y: Array1<f64> = (0..32).map(|r| (r * r) as f64).collect();
        let mut tree = RegressionTree::new().with_max_depth(Some(2));
        tree.fit(x.view(), y.view()).unwrap();
        assert!(tree.depth().unwrap() <= 2);
    }

    #[test]
    fn constant_target_is_a_single_leaf() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![4.0, 4.0, 4.0];
        let mut tree = RegressionTree::new();
        tree.fit(x.view(), y.view()).unwrap();
        assert_eq!(tree.depth(), Some(0));
    }

    #[test]
    fn step_on_a_large_offset_is_learned() {
        let x = Array2::from_shape_fn((20, 1), |(r, _)| r as f64);
        let y: Array1<f64> = (0..20).map(|r| if r < 10 { 1e9 } else { 1e9 + 10.0 }).collect();

        let mut tree = RegressionTree::new();
        tree.fit(x.view(), y.view()).unwrap();

        assert_eq!(tree.depth(), Some(1));
        let pred = tree.predict(array![[2.0], [17.0]].view()).unwrap();
        assert_eq!(pred, array![1e9, 1e9 + 10.0]);
    }

    #[test]
    fn non_finite_features_do_not_recurse_forever() {
        let y = array![0.0, 0.0, 100.0];
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let x = array![[0.0], [1.0], [bad]];
            let mut tree = RegressionTree::new();
            tree.fit(x.view(), y.view()).unwrap();
            assert!(tree.depth().unwrap() <= 2);
            let pred = tree.predict(array![[0.5]].view()).unwrap();
            assert!(pred[0].is_finite());
        }

        // Only NaN separates the rows: no usable split, one leaf.
        let x = array![[f64::NAN], [f64::NAN], [f64::NAN]];
        let mut tree = RegressionTree::new();
        tree.fit(x.view(), y.view()).unwrap();
        assert_eq!(tree.depth(), Some(0));
    }

    #[test]
    fn min_samples_leaf_is_respected() {
        let x = array![[0.0], [1.0], [2.0], [3.0], [4.0]];
        let y = array![100.0, 0.0, 0.0, 0.0, 0.0];
        let mut tree = RegressionTree::new().with_min_samples_leaf(2);
        tree.fit(x.view(), y.view()).unwrap();
        // The lone outlier cannot get its own leaf.
        let pred = tree.predict(array![[0.0]].view()).unwrap();
        assert!(pred[0] < 100.0);
    }

    #[test]
    fn errors() {
        let tree = RegressionTree::new();
        assert_eq!(
            tree.predict(array![[1.0]].view()).unwrap_err(),
            EvalError::NotFitted
        );

        let mut tree = RegressionTree::new();
        let empty_x = Array2::<f64>::zeros((0, 2));
        let empty_y = Array1::<f64>::zeros(0);
        assert_eq!(
            tree.fit(empty_x.view(), empty_y.view()).unwrap_err(),
            EvalError::EmptyTrainingSet
        );

        tree.fit(array![[1.0, 2.0], [2.0, 1.0]].view(), array![1.0, 2.0].view())
            .unwrap();
        assert!(matches!(
            tree.predict(array![[1.0]].view()).unwrap_err(),
            EvalError::FeatureCountMismatch { expected: 2, actual: 1 }
        ));
    }
}
