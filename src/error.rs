use thiserror::Error;

/// Errors raised by the data, model and evaluation layers.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    /// Feature rows and targets (or names and columns) disagree in length.
    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    #[error("column {column} is out of range for {n_features} features")]
    ColumnOutOfRange { column: usize, n_features: usize },

    #[error("cross-validation needs at least 2 folds, got {0}")]
    InvalidFoldCount(usize),

    /// Fewer samples than folds, including the empty subset.
    #[error("cannot split {n_samples} samples into {n_splits} folds")]
    InsufficientSamples { n_samples: usize, n_splits: usize },

    #[error("cannot fit a model on an empty training set")]
    EmptyTrainingSet,

    #[error("model must be fitted before predicting")]
    NotFitted,

    #[error("model was fitted on {expected} features but got {actual}")]
    FeatureCountMismatch { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, EvalError>;

impl EvalError {
    pub(crate) fn rows_mismatch(features: usize, targets: usize) -> Self {
        EvalError::ShapeMismatch {
            expected: format!("{features} targets"),
            actual: format!("{targets} targets"),
        }
    }
}
