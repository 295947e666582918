use std::collections::BTreeMap;

use eframe::egui::{self, Color32, Ui};
use egui_plot::{Legend, Plot, Points};

use crate::color::ColorMap;
use crate::data::model::{Dataset, FeatureValue};
use crate::state::AppState;

const PLOT_WIDTH: f32 = 400.0;
const PLOT_HEIGHT: f32 = 300.0;

// ---------------------------------------------------------------------------
// Scatter series: one per feature column
// ---------------------------------------------------------------------------

/// Points of one feature column against the target, in row order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    pub feature_idx: usize,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<[f64; 2]>,
}

impl ScatterSeries {
    /// Split points by the value of `color_column` in the same row.
    pub fn grouped_points(
        &self,
        dataset: &Dataset,
        color_column: usize,
    ) -> BTreeMap<FeatureValue, Vec<[f64; 2]>> {
        let mut groups: BTreeMap<FeatureValue, Vec<[f64; 2]>> = BTreeMap::new();
        for (row, point) in self.points.iter().enumerate() {
            let key = FeatureValue(dataset.features[[row, color_column]]);
            groups.entry(key).or_default().push(*point);
        }
        groups
    }
}

/// One scatter series per feature column, x = feature, y = target.
pub fn scatter_series(dataset: &Dataset, target_label: &str) -> Vec<ScatterSeries> {
    dataset
        .feature_names
        .iter()
        .enumerate()
        .map(|(idx, name)| ScatterSeries {
            feature_idx: idx,
            x_label: name.clone(),
            y_label: target_label.to_string(),
            points: dataset
                .features
                .column(idx)
                .iter()
                .zip(dataset.targets.iter())
                .map(|(&x, &y)| [x, y])
                .collect(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Plot grid (central panel)
// ---------------------------------------------------------------------------

/// Render one scatter plot per visible feature in a wrapping grid.
pub fn feature_plots(ui: &mut Ui, state: &AppState) {
    let dataset = match &state.dataset {
        Some(ds) => ds,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a file to explore it  (File → Open…)");
            });
            return;
        }
    };

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.horizontal_wrapped(|ui: &mut Ui| {
                for series in state.visible_series() {
                    ui.vertical(|ui: &mut Ui| {
                        ui.strong(&series.x_label);
                        scatter_plot(ui, series, dataset, state.color_map.as_ref());
                    });
                }
            });
        });
}

fn scatter_plot(ui: &mut Ui, series: &ScatterSeries, dataset: &Dataset, color_map: Option<&ColorMap>) {
    Plot::new(("feature_plot", series.feature_idx))
        .width(PLOT_WIDTH)
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(series.x_label.clone())
        .y_axis_label(series.y_label.clone())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true)
        .show(ui, |plot_ui| match color_map {
            Some(cm) => {
                for (value, points) in series.grouped_points(dataset, cm.column) {
                    plot_ui.points(
                        Points::new(points)
                            .name(format!("{} = {value}", cm.column_name))
                            .color(cm.color_for(value))
                            .radius(2.5),
                    );
                }
            }
            None => {
                plot_ui.points(
                    Points::new(series.points.clone())
                        .color(Color32::LIGHT_BLUE)
                        .radius(2.5),
                );
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn dataset() -> Dataset {
        Dataset::new(
            array![[0.0, 1.0], [1.0, 1.0], [0.0, 2.0], [1.0, 2.0]],
            array![10.0, 20.0, 30.0, 40.0],
            vec!["CHAS".into(), "RM".into()],
            "PRICE",
        )
        .unwrap()
    }

    #[test]
    fn one_series_per_feature() {
        let ds = dataset();
        let series = scatter_series(&ds, "Price (US$)");
        assert_eq!(series.len(), 2);
        assert_eq!(series[1].x_label, "RM");
        assert_eq!(series[1].y_label, "Price (US$)");
        assert_eq!(
            series[1].points,
            vec![[1.0, 10.0], [1.0, 20.0], [2.0, 30.0], [2.0, 40.0]]
        );
    }

    #[test]
    fn points_group_by_colour_column() {
        let ds = dataset();
        let series = scatter_series(&ds, "Price");
        let groups = series[1].grouped_points(&ds, 0);
        assert_eq!(groups[&FeatureValue(0.0)], vec![[1.0, 10.0], [2.0, 30.0]]);
        assert_eq!(groups[&FeatureValue(1.0)], vec![[1.0, 20.0], [2.0, 40.0]]);
    }

    #[test]
    fn negative_zero_groups_with_its_filter_stratum() {
        let ds = Dataset::new(
            array![[-0.0, 1.0], [0.0, 2.0], [1.0, 3.0]],
            array![10.0, 20.0, 30.0],
            vec!["chas".into(), "rm".into()],
            "price",
        )
        .unwrap();
        let series = scatter_series(&ds, "price");
        let groups = series[1].grouped_points(&ds, 0);

        let stratum = ds.filter_by_feature(0, 0.0).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&FeatureValue(0.0)].len(), stratum.len());
        assert_eq!(groups[&FeatureValue(0.0)], vec![[1.0, 10.0], [2.0, 20.0]]);
    }
}
