use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::evaluation::{Scoring, DEFAULT_N_SPLITS};
use crate::forest::{MaxFeatures, RandomForestRegressor};

/// File picked up from the working directory when present.
pub const CONFIG_FILE_NAME: &str = "forest-lens.json";

// ---------------------------------------------------------------------------
// Pipeline configuration
// ---------------------------------------------------------------------------

/// Everything the evaluation pipeline and viewer can be told. Every field has
/// a default, so a config file only lists what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Data file to load at start-up.
    pub data_path: Option<PathBuf>,
    /// Target column name; the last column when unset.
    pub target_column: Option<String>,
    /// Y-axis label of the scatter plots.
    pub target_label: String,
    pub shuffle_seed: u64,
    pub n_splits: usize,
    /// Feature index whose values define the evaluated subsets.
    pub stratify_column: Option<usize>,
    pub stratify_values: Vec<f64>,
    /// Scorings applied to each subset, in order.
    pub scorings: Vec<Scoring>,
    pub forest: ForestConfig,
    /// Open the viewer window after the console report.
    pub show_plots: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            target_column: None,
            target_label: "Price (US$)".to_string(),
            shuffle_seed: 0,
            n_splits: DEFAULT_N_SPLITS,
            stratify_column: Some(3),
            stratify_values: vec![0.0, 1.0],
            scorings: vec![Scoring::R2, Scoring::NegMeanSquaredError],
            forest: ForestConfig::default(),
            show_plots: true,
        }
    }
}

impl PipelineConfig {
    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// `forest-lens.json` from `dir` if it exists, defaults otherwise.
    pub fn discover(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            log::info!("Using config {}", path.display());
            Self::load(&path)
        } else {
            log::debug!("No {CONFIG_FILE_NAME} in {}, using defaults", dir.display());
            Ok(Self::default())
        }
    }
}

// ---------------------------------------------------------------------------
// Forest hyper-parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub bootstrap: bool,
    pub random_state: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            bootstrap: true,
            random_state: 0,
        }
    }
}

impl ForestConfig {
    /// Unfitted forest with these settings.
    pub fn build(&self) -> RandomForestRegressor {
        RandomForestRegressor::new(self.n_estimators)
            .with_max_depth(self.max_depth)
            .with_min_samples_split(self.min_samples_split)
            .with_min_samples_leaf(self.min_samples_leaf)
            .with_max_features(self.max_features)
            .with_bootstrap(self.bootstrap)
            .with_random_state(self.random_state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "n_splits": 3, "forest": { "n_estimators": 10, "max_features": "sqrt" } }"#,
        )
        .unwrap();

        let config = PipelineConfig::discover(dir.path()).unwrap();
        assert_eq!(config.n_splits, 3);
        assert_eq!(config.forest.n_estimators, 10);
        assert_eq!(config.forest.max_features, MaxFeatures::Sqrt);
        assert_eq!(config.forest.min_samples_split, 2);
        assert_eq!(config.stratify_column, Some(3));
        assert_eq!(config.target_label, "Price (US$)");
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(PipelineConfig::discover(dir.path()).unwrap(), PipelineConfig::default());
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "{ not json").unwrap();
        assert!(PipelineConfig::load(&path).is_err());
    }

    #[test]
    fn forest_config_builds_matching_model() {
        let cfg = ForestConfig {
            n_estimators: 7,
            max_depth: Some(4),
            bootstrap: false,
            ..ForestConfig::default()
        };
        let forest = cfg.build();
        assert_eq!(forest.n_estimators, 7);
        assert_eq!(forest.max_depth, Some(4));
        assert!(!forest.bootstrap);
    }
}
