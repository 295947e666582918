use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use super::model::{check_rows, Dataset};
use crate::error::{EvalError, Result};

// ---------------------------------------------------------------------------
// Row selection by exact feature value
// ---------------------------------------------------------------------------

/// Indices of rows whose `column` equals `value` exactly, in row order.
pub fn matching_indices(features: ArrayView2<'_, f64>, column: usize, value: f64) -> Result<Vec<usize>> {
    if column >= features.ncols() {
        return Err(EvalError::ColumnOutOfRange {
            column,
            n_features: features.ncols(),
        });
    }
    Ok(features
        .column(column)
        .iter()
        .enumerate()
        .filter(|(_, v)| **v == value)
        .map(|(i, _)| i)
        .collect())
}

/// Keep the rows where `features[row][column] == value`, together with their
/// targets. Relative order is preserved; the result may be empty.
pub fn filter_by_feature(
    features: ArrayView2<'_, f64>,
    targets: ArrayView1<'_, f64>,
    column: usize,
    value: f64,
) -> Result<(Array2<f64>, Array1<f64>)> {
    check_rows(features, targets)?;
    let indices = matching_indices(features, column, value)?;
    Ok((
        features.select(Axis(0), &indices),
        targets.select(Axis(0), &indices),
    ))
}

impl Dataset {
    /// Subset of rows where `column` equals `value`.
    pub fn filter_by_feature(&self, column: usize, value: f64) -> Result<Dataset> {
        let (features, targets) =
            filter_by_feature(self.features.view(), self.targets.view(), column, value)?;
        Ok(self.with_rows(features, targets))
    }
}
