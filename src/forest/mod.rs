//! Tree-ensemble regression: a CART regression tree and a bagged random
//! forest built from it.

pub mod random_forest;
pub mod tree;

use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use random_forest::RandomForestRegressor;
pub use tree::RegressionTree;

/// A model that can be fitted on numeric features and predict a numeric target.
///
/// `Clone` is how cross-validation gets a fresh, unfitted copy per fold.
pub trait Regressor: Clone + Send + Sync {
    /// Fit on `x` (rows × features) and `y` (one target per row).
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> Result<()>;

    /// Predict one value per row of `x`.
    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>>;
}

/// How many features a split may look at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    /// Square root of n_features
    Sqrt,
    /// Log2 of n_features
    Log2,
    /// Fraction of n_features
    Fraction(f64),
    /// Fixed number
    Fixed(usize),
    /// All features
    #[default]
    All,
}

impl MaxFeatures {
    /// Number of candidate features per split, always in `1..=n_features`.
    pub fn resolve(self, n_features: usize) -> usize {
        let n = n_features as f64;
        let k = match self {
            MaxFeatures::Sqrt => n.sqrt() as usize,
            MaxFeatures::Log2 => n.log2() as usize,
            MaxFeatures::Fraction(f) => (n * f) as usize,
            MaxFeatures::Fixed(k) => k,
            MaxFeatures::All => n_features,
        };
        k.clamp(1, n_features.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_features_resolution() {
        assert_eq!(MaxFeatures::All.resolve(13), 13);
        assert_eq!(MaxFeatures::Sqrt.resolve(13), 3);
        assert_eq!(MaxFeatures::Log2.resolve(13), 3);
        assert_eq!(MaxFeatures::Fraction(0.5).resolve(13), 6);
        assert_eq!(MaxFeatures::Fixed(40).resolve(13), 13);
        assert_eq!(MaxFeatures::Fraction(0.01).resolve(13), 1);
    }

    #[test]
    fn max_features_from_json() {
        let all: MaxFeatures = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(all, MaxFeatures::All);
        let frac: MaxFeatures = serde_json::from_str(r#"{"fraction": 0.3}"#).unwrap();
        assert_eq!(frac, MaxFeatures::Fraction(0.3));
    }
}
