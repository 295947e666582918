use std::collections::BTreeSet;
use std::fmt;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::error::{EvalError, Result};

// ---------------------------------------------------------------------------
// FeatureValue – a single numeric cell
// ---------------------------------------------------------------------------

/// One feature cell, ordered by `f64::total_cmp` so it can live in a
/// `BTreeSet` / `BTreeMap` (distinct values, colour maps). `-0.0` and `0.0`
/// are the same value, as they are for `filter_by_feature`.
#[derive(Debug, Clone, Copy)]
pub struct FeatureValue(pub f64);

impl FeatureValue {
    fn key(self) -> f64 {
        if self.0 == 0.0 {
            0.0
        } else {
            self.0
        }
    }
}

impl PartialEq for FeatureValue {
    fn eq(&self, other: &Self) -> bool {
        self.key().total_cmp(&other.key()).is_eq()
    }
}

impl Eq for FeatureValue {}

impl PartialOrd for FeatureValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FeatureValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key().total_cmp(&other.key())
    }
}

impl std::hash::Hash for FeatureValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key().to_bits().hash(state);
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 && self.0.abs() < 1e15 {
            write!(f, "{}", self.0 as i64)
        } else {
            write!(f, "{:.4}", self.0)
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – features paired 1:1 with targets
// ---------------------------------------------------------------------------

/// A tabular regression dataset: `features` is rows × columns, `targets` has
/// one value per row.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub features: Array2<f64>,
    pub targets: Array1<f64>,
    /// Column names, one per feature column.
    pub feature_names: Vec<String>,
    pub target_name: String,
}

impl Dataset {
    /// Build a dataset, checking that rows, targets and names line up.
    pub fn new(
        features: Array2<f64>,
        targets: Array1<f64>,
        feature_names: Vec<String>,
        target_name: impl Into<String>,
    ) -> Result<Self> {
        check_rows(features.view(), targets.view())?;
        if feature_names.len() != features.ncols() {
            return Err(EvalError::ShapeMismatch {
                expected: format!("{} feature names", features.ncols()),
                actual: format!("{} feature names", feature_names.len()),
            });
        }
        Ok(Dataset {
            features,
            targets,
            feature_names,
            target_name: target_name.into(),
        })
    }

    /// Same layout, different rows. Used for shuffled copies and subsets.
    pub(crate) fn with_rows(&self, features: Array2<f64>, targets: Array1<f64>) -> Self {
        Dataset {
            features,
            targets,
            feature_names: self.feature_names.clone(),
            target_name: self.target_name.clone(),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// View of one feature column.
    pub fn column(&self, column: usize) -> Result<ArrayView1<'_, f64>> {
        if column >= self.n_features() {
            return Err(EvalError::ColumnOutOfRange {
                column,
                n_features: self.n_features(),
            });
        }
        Ok(self.features.column(column))
    }

    /// Sorted distinct values of one feature column.
    pub fn unique_values(&self, column: usize) -> Result<BTreeSet<FeatureValue>> {
        Ok(self.column(column)?.iter().map(|&v| FeatureValue(v)).collect())
    }
}

/// Row-count check shared by every operation taking features and targets.
pub(crate) fn check_rows(features: ArrayView2<'_, f64>, targets: ArrayView1<'_, f64>) -> Result<()> {
    if features.len_of(Axis(0)) != targets.len() {
        return Err(EvalError::rows_mismatch(features.nrows(), targets.len()));
    }
    Ok(())
}
