//! Model evaluation: scoring functions and k-fold cross-validation.

pub mod cv;
pub mod metrics;

pub use cv::{cross_validate, k_fold_splits, CVSplit, FoldScores, DEFAULT_N_SPLITS};
pub use metrics::Scoring;
