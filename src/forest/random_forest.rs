//! Random forest regressor (bootstrap aggregation of regression trees)

use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use super::tree::RegressionTree;
use super::{MaxFeatures, Regressor};
use crate::error::{EvalError, Result};

/// Random forest model
#[derive(Debug, Clone)]
pub struct RandomForestRegressor {
    /// Fitted trees, in tree-index order
    trees: Vec<RegressionTree>,
    /// Number of trees
    pub n_estimators: usize,
    /// Maximum depth per tree
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features considered per split
    pub max_features: MaxFeatures,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Base seed; tree `i` uses `random_state + i`
    pub random_state: u64,
    n_features: usize,
}

impl Default for RandomForestRegressor {
    fn default() -> Self {
        Self::new(100)
    }
}

impl RandomForestRegressor {
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators: n_estimators.max(1),
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            bootstrap: true,
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
        self.min_samples_split = min_samples;
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    /// Set max features strategy
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    /// Set random state
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    fn template_tree(&self, seed: u64) -> RegressionTree {
        RegressionTree::new()
            .with_max_depth(self.max_depth)
            .with_min_samples_split(self.min_samples_split)
            .with_min_samples_leaf(self.min_samples_leaf)
            .with_max_features(self.max_features)
            .with_random_state(seed)
    }
}

impl Regressor for RandomForestRegressor {
    /// Fit the forest to training data
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(EvalError::rows_mismatch(n_samples, y.len()));
        }
        if n_samples == 0 {
            return Err(EvalError::EmptyTrainingSet);
        }

        // Build trees in parallel; collect keeps tree-index order.
        let trees: Vec<RegressionTree> = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| -> Result<RegressionTree> {
                let seed = self.random_state.wrapping_add(tree_idx as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(seed);

                let sample_indices: Vec<usize> = if self.bootstrap {
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
                } else {
                    (0..n_samples).collect()
                };

                let mut tree = self.template_tree(seed);
                tree.fit_rows(x, y, &sample_indices, &mut rng)?;
                Ok(tree)
            })
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "fitted {} trees on {n_samples} samples x {} features",
            trees.len(),
            x.ncols()
        );

        self.trees = trees;
        self.n_features = x.ncols();
        Ok(())
    }

    /// Mean of the tree predictions.
    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(EvalError::NotFitted);
        }
        if x.ncols() != self.n_features {
            return Err(EvalError::FeatureCountMismatch {
                expected: self.n_features,
                actual: x.ncols(),
            });
        }

        let per_tree: Vec<Array1<f64>> = self
            .trees
            .par_iter()
            .map(|tree| tree.predict(x))
            .collect::<Result<Vec<_>>>()?;

        let mut sum = Array1::<f64>::zeros(x.nrows());
        for p in &per_tree {
            sum += p;
        }
        Ok(sum / self.trees.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    fn step_data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((60, 2), |(r, c)| if c == 0 { r as f64 } else { (r % 7) as f64 });
        let y: Array1<f64> = (0..60).map(|r| if r < 30 { 2.0 } else { 8.0 }).collect();
        (x, y)
    }

    #[test]
    fn same_seed_same_predictions() {
        let (x, y) = step_data();
        let mut a = RandomForestRegressor::new(10).with_random_state(3);
        let mut b = a.clone();
        a.fit(x.view(), y.view()).unwrap();
        b.fit(x.view(), y.view()).unwrap();
        assert_eq!(a.predict(x.view()).unwrap(), b.predict(x.view()).unwrap());
    }

    #[test]
    fn learns_a_step_function() {
        let (x, y) = step_data();
        let mut forest = RandomForestRegressor::new(20).with_random_state(0);
        forest.fit(x.view(), y.view()).unwrap();
        assert_eq!(forest.trees().len(), 20);

        let pred = forest.predict(array![[5.0, 1.0], [50.0, 1.0]].view()).unwrap();
        assert!((pred[0] - 2.0).abs() < 0.5, "{pred}");
        assert!((pred[1] - 8.0).abs() < 0.5, "{pred}");
    }

    #[test]
    fn without_bootstrap_trees_agree() {
        let (x, y) = step_data();
        let mut forest = RandomForestRegressor::new(5).with_bootstrap(false);
        forest.fit(x.view(), y.view()).unwrap();
        let pred = forest.predict(x.view()).unwrap();
        assert_eq!(pred, y);
    }

    #[test]
    fn unfitted_and_empty() {
        let forest = RandomForestRegressor::new(3);
        assert_eq!(
            forest.predict(array![[1.0]].view()).unwrap_err(),
            EvalError::NotFitted
        );
        let mut forest = RandomForestRegressor::new(3);
        let x = Array2::<f64>::zeros((0, 1));
        let y = Array1::<f64>::zeros(0);
        assert_eq!(
            forest.fit(x.view(), y.view()).unwrap_err(),
            EvalError::EmptyTrainingSet
        );
    }
}
