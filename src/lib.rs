//! forest-lens: load a tabular regression dataset, plot every feature
//! against the target, and cross-validate a random forest on the full data
//! and on the strata of a categorical feature.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod evaluation;
pub mod forest;
pub mod pipeline;
pub mod state;
pub mod ui;

pub use data::filter::filter_by_feature;
pub use data::model::Dataset;
pub use data::shuffle::shuffle;
pub use error::{EvalError, Result};
pub use evaluation::{cross_validate, Scoring};
pub use forest::{RandomForestRegressor, Regressor};
