use std::fmt;

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::error::{EvalError, Result};

/// Scoring function applied to each fold. Higher is better for both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scoring {
    /// Coefficient of determination
    #[default]
    R2,
    /// Mean squared error, negated
    NegMeanSquaredError,
}

impl Scoring {
    pub fn score(self, y_true: ArrayView1<'_, f64>, y_pred: ArrayView1<'_, f64>) -> Result<f64> {
        if y_true.len() != y_pred.len() {
            return Err(EvalError::ShapeMismatch {
                expected: format!("{} predictions", y_true.len()),
                actual: format!("{} predictions", y_pred.len()),
            });
        }
        if y_true.is_empty() {
            return Err(EvalError::InsufficientSamples {
                n_samples: 0,
                n_splits: 1,
            });
        }
        Ok(match self {
            Scoring::R2 => r2_score(y_true, y_pred),
            Scoring::NegMeanSquaredError => -mean_squared_error(y_true, y_pred),
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Scoring::R2 => "r2",
            Scoring::NegMeanSquaredError => "neg_mean_squared_error",
        }
    }
}

impl fmt::Display for Scoring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn mean_squared_error(y_true: ArrayView1<'_, f64>, y_pred: ArrayView1<'_, f64>) -> f64 {
    let sse: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    sse / y_true.len() as f64
}

/// `1 - SS_res / SS_tot`. A constant `y_true` scores 1.0 for a perfect
/// prediction and 0.0 otherwise.
pub fn r2_score(y_true: ArrayView1<'_, f64>, y_pred: ArrayView1<'_, f64>) -> f64 {
    let mean = y_true.sum() / y_true.len() as f64;
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn r2_perfect_and_mean() {
        let y = array![1.0, 2.0, 3.0, 4.0];
        assert_eq!(Scoring::R2.score(y.view(), y.view()).unwrap(), 1.0);
        let mean = array![2.5, 2.5, 2.5, 2.5];
        assert_eq!(Scoring::R2.score(y.view(), mean.view()).unwrap(), 0.0);
    }

    #[test]
    fn r2_can_be_negative() {
        let y = array![1.0, 2.0, 3.0];
        let bad = array![3.0, 2.0, 1.0];
        // ss_res = 8, ss_tot = 2
        assert_eq!(r2_score(y.view(), bad.view()), -3.0);
    }

    #[test]
    fn r2_constant_target() {
        let y = array![5.0, 5.0];
        assert_eq!(r2_score(y.view(), array![5.0, 5.0].view()), 1.0);
        assert_eq!(r2_score(y.view(), array![5.0, 6.0].view()), 0.0);
    }

    #[test]
    fn neg_mse() {
        let y = array![1.0, 2.0, 3.0];
        let p = array![1.0, 4.0, 3.0];
        assert_eq!(
            Scoring::NegMeanSquaredError.score(y.view(), p.view()).unwrap(),
            -4.0 / 3.0
        );
    }

    #[test]
    fn length_mismatch() {
        let y = array![1.0, 2.0];
        let p = array![1.0];
        assert!(Scoring::R2.score(y.view(), p.view()).is_err());
    }

    #[test]
    fn names_round_trip_through_json() {
        let s: Scoring = serde_json::from_str("\"neg_mean_squared_error\"").unwrap();
        assert_eq!(s, Scoring::NegMeanSquaredError);
        assert_eq!(serde_json::to_string(&Scoring::R2).unwrap(), "\"r2\"");
    }
}
