use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::FeatureValue;

/// Columns with more distinct values than this are treated as continuous and
/// not coloured.
pub const MAX_CATEGORIES: usize = 12;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: feature value → Color32
// ---------------------------------------------------------------------------

/// Maps the distinct values of a categorical feature column to colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    pub column: usize,
    pub column_name: String,
    mapping: BTreeMap<FeatureValue, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map for a column, or `None` when it has too many
    /// distinct values to be a category.
    pub fn new(column: usize, column_name: &str, unique_values: &BTreeSet<FeatureValue>) -> Option<Self> {
        if unique_values.is_empty() || unique_values.len() > MAX_CATEGORIES {
            return None;
        }
        let palette = generate_palette(unique_values.len());
        let mapping: BTreeMap<FeatureValue, Color32> = unique_values
            .iter()
            .copied()
            .zip(palette)
            .collect();

        Some(ColorMap {
            column,
            column_name: column_name.to_string(),
            mapping,
            default_color: Color32::GRAY,
        })
    }

    /// Look up the colour for a given feature value.
    pub fn color_for(&self, value: FeatureValue) -> Color32 {
        self.mapping
            .get(&value)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Return the legend entries (value label → colour) for the UI.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.mapping
            .iter()
            .map(|(v, c)| (format!("{} = {v}", self.column_name), *c))
            .collect()
    }
}
