use std::collections::BTreeSet;
use std::path::Path;

use crate::color::ColorMap;
use crate::config::PipelineConfig;
use crate::data::loader::load_file;
use crate::data::model::Dataset;
use crate::pipeline::{self, EvaluationReport, PipelineOutput};
use crate::ui::plot::{scatter_series, ScatterSeries};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: PipelineConfig,

    /// Shuffled dataset (None until a file is loaded).
    pub dataset: Option<Dataset>,

    /// One scatter series per feature column.
    pub series: Vec<ScatterSeries>,

    /// Feature columns whose plots are shown.
    pub visible_features: BTreeSet<usize>,

    /// Which feature column is used for colouring.
    pub color_column: Option<usize>,

    /// Active colour map.
    pub color_map: Option<ColorMap>,

    /// One entry per evaluation of the last pipeline run.
    pub reports: Vec<EvaluationReport>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            dataset: None,
            series: Vec::new(),
            visible_features: BTreeSet::new(),
            color_column: None,
            color_map: None,
            reports: Vec::new(),
            status_message: None,
        }
    }

    /// Ingest a pipeline run: plots, colouring and the evaluation report.
    pub fn set_output(&mut self, output: PipelineOutput) {
        let dataset = output.dataset;
        self.series = scatter_series(&dataset, &self.config.target_label);
        self.visible_features = (0..dataset.n_features()).collect();

        // Default colour column: the stratify column (if it exists).
        self.color_column = self
            .config
            .stratify_column
            .filter(|&c| c < dataset.n_features());
        self.color_map = build_color_map(&dataset, self.color_column);

        self.reports = output.reports;
        self.dataset = Some(dataset);
        self.status_message = None;
    }

    /// Load a file, run the pipeline on it and show the result.
    pub fn load_path(&mut self, path: &Path) {
        let result = load_file(path, self.config.target_column.as_deref()).and_then(|dataset| {
            log::info!(
                "Loaded {} rows with features {:?}",
                dataset.len(),
                dataset.feature_names
            );
            pipeline::run(&self.config, &dataset).map_err(anyhow::Error::from)
        });
        match result {
            Ok(output) => self.set_output(output),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Set colour column and rebuild the map.
    pub fn set_color_column(&mut self, column: Option<usize>) {
        self.color_column = column;
        self.color_map = self
            .dataset
            .as_ref()
            .and_then(|ds| build_color_map(ds, column));
    }

    /// Show or hide one feature's plot.
    pub fn toggle_feature(&mut self, column: usize) {
        if !self.visible_features.remove(&column) {
            self.visible_features.insert(column);
        }
    }

    pub fn show_all_features(&mut self) {
        self.visible_features = (0..self.series.len()).collect();
    }

    pub fn hide_all_features(&mut self) {
        self.visible_features.clear();
    }

    /// Series of the visible features, in column order.
    pub fn visible_series(&self) -> impl Iterator<Item = &ScatterSeries> {
        self.series
            .iter()
            .filter(|s| self.visible_features.contains(&s.feature_idx))
    }
}

fn build_color_map(dataset: &Dataset, column: Option<usize>) -> Option<ColorMap> {
    let column = column?;
    let values = dataset.unique_values(column).ok()?;
    ColorMap::new(column, &dataset.feature_names[column], &values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForestConfig;
    use std::io::Write;

    fn small_config() -> PipelineConfig {
        PipelineConfig {
            n_splits: 2,
            stratify_column: Some(1),
            forest: ForestConfig {
                n_estimators: 3,
                ..ForestConfig::default()
            },
            ..PipelineConfig::default()
        }
    }

    fn write_csv() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "RM,CHAS,PRICE").unwrap();
        for r in 0..16 {
            writeln!(file, "{},{},{}", 5.0 + r as f64 * 0.25, r % 2, 10.0 + r as f64).unwrap();
        }
        file
    }

    #[test]
    fn loading_a_file_fills_plots_and_reports() {
        let file = write_csv();
        let mut state = AppState::new(small_config());
        state.load_path(file.path());

        assert!(state.status_message.is_none());
        assert_eq!(state.series.len(), 2);
        assert_eq!(state.visible_series().count(), 2);
        assert_eq!(state.reports.len(), 5);
        assert_eq!(state.color_column, Some(1));
        assert!(state.color_map.is_some());
    }

    #[test]
    fn load_failure_sets_status() {
        let mut state = AppState::new(small_config());
        state.load_path(Path::new("/nonexistent/data.csv"));
        assert!(state.status_message.is_some());
        assert!(state.dataset.is_none());
    }

    #[test]
    fn successful_load_clears_earlier_failure() {
        let file = write_csv();
        let mut state = AppState::new(small_config());
        state.load_path(Path::new("/nonexistent/data.csv"));
        assert!(state.status_message.is_some());

        state.load_path(file.path());
        assert!(state.status_message.is_none());
        assert_eq!(state.dataset.as_ref().map(Dataset::len), Some(16));
    }

    #[test]
    fn feature_visibility_toggles() {
        let file = write_csv();
        let mut state = AppState::new(small_config());
        state.load_path(file.path());

        state.toggle_feature(0);
        let shown: Vec<usize> = state.visible_series().map(|s| s.feature_idx).collect();
        assert_eq!(shown, vec![1]);
        state.hide_all_features();
        assert_eq!(state.visible_series().count(), 0);
        state.show_all_features();
        assert_eq!(state.visible_series().count(), 2);
    }

    #[test]
    fn colouring_by_continuous_column_is_dropped() {
        let file = write_csv();
        let mut state = AppState::new(small_config());
        state.load_path(file.path());
        state.set_color_column(Some(0));
        assert!(state.color_map.is_none());
        state.set_color_column(None);
        assert!(state.color_map.is_none());
    }
}
