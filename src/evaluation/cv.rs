//! K-fold cross-validation of a [`Regressor`].
//!
//! Folds are contiguous and unshuffled: fold `i` takes the next block of
//! rows as its test set and trains on the rest. The first `n % k` folds hold
//! one extra row. Shuffle the data beforehand if the row order carries
//! structure.

use std::fmt;

use ndarray::{ArrayView1, ArrayView2, Axis};

use super::metrics::Scoring;
use crate::data::model::check_rows;
use crate::error::{EvalError, Result};
use crate::forest::Regressor;

/// Fold count used when none is configured.
pub const DEFAULT_N_SPLITS: usize = 5;

/// A single train/test split
#[derive(Debug, Clone, PartialEq)]
pub struct CVSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub fold_idx: usize,
}

/// Generate the `n_splits` contiguous folds over `n_samples` rows.
pub fn k_fold_splits(n_samples: usize, n_splits: usize) -> Result<Vec<CVSplit>> {
    if n_splits < 2 {
        return Err(EvalError::InvalidFoldCount(n_splits));
    }
    if n_samples < n_splits {
        return Err(EvalError::InsufficientSamples {
            n_samples,
            n_splits,
        });
    }

    let base = n_samples / n_splits;
    let remainder = n_samples % n_splits;

    let mut splits = Vec::with_capacity(n_splits);
    let mut current = 0;
    for fold_idx in 0..n_splits {
        let fold_size = if fold_idx < remainder { base + 1 } else { base };
        let test_indices: Vec<usize> = (current..current + fold_size).collect();
        let train_indices: Vec<usize> = (0..current).chain(current + fold_size..n_samples).collect();

        splits.push(CVSplit {
            train_indices,
            test_indices,
            fold_idx,
        });
        current += fold_size;
    }

    Ok(splits)
}

/// Ordered per-fold scores of one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct FoldScores(pub Vec<f64>);

impl FoldScores {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn mean(&self) -> f64 {
        if self.0.is_empty() {
            return f64::NAN;
        }
        self.0.iter().sum::<f64>() / self.0.len() as f64
    }

    pub fn std(&self) -> f64 {
        if self.0.is_empty() {
            return f64::NAN;
        }
        let mean = self.mean();
        let var = self.0.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / self.0.len() as f64;
        var.sqrt()
    }
}

/// Printed as a bracketed, space-separated list: `[0.81 0.77 0.64]`.
impl fmt::Display for FoldScores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, s) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{s:.8}")?;
        }
        f.write_str("]")
    }
}

/// Fit a fresh clone of `model` on each training fold and score it on the
/// held-out fold. Scores come back in fold order; the first failing fold
/// aborts the call.
pub fn cross_validate<M: Regressor>(
    model: &M,
    features: ArrayView2<'_, f64>,
    targets: ArrayView1<'_, f64>,
    scoring: Scoring,
    n_splits: usize,
) -> Result<FoldScores> {
    check_rows(features, targets)?;
    let splits = k_fold_splits(targets.len(), n_splits)?;

    let mut scores = Vec::with_capacity(splits.len());
    for split in &splits {
        let x_train = features.select(Axis(0), &split.train_indices);
        let y_train = targets.select(Axis(0), &split.train_indices);
        let x_test = features.select(Axis(0), &split.test_indices);
        let y_test = targets.select(Axis(0), &split.test_indices);

        let mut fold_model = model.clone();
        fold_model.fit(x_train.view(), y_train.view())?;
        let pred = fold_model.predict(x_test.view())?;
        let score = scoring.score(y_test.view(), pred.view())?;

        log::debug!(
            "fold {}: train={} test={} {scoring}={score:.6}",
            split.fold_idx,
            split.train_indices.len(),
            split.test_indices.len()
        );
        scores.push(score);
    }

    Ok(FoldScores(scores))
}
