use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – features, colouring, evaluation report
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Features");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone what we need so we can mutate state inside the loop.
    let names = dataset.feature_names.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Colour-by selector ----
            ui.strong("Color by");
            let current = state
                .color_column
                .and_then(|c| names.get(c).cloned())
                .unwrap_or_else(|| "none".to_string());
            egui::ComboBox::from_id_salt("color_by")
                .selected_text(current)
                .show_ui(ui, |ui: &mut Ui| {
                    if ui.selectable_label(state.color_column.is_none(), "none").clicked() {
                        state.set_color_column(None);
                    }
                    for (idx, name) in names.iter().enumerate() {
                        if ui
                            .selectable_label(state.color_column == Some(idx), name)
                            .clicked()
                        {
                            state.set_color_column(Some(idx));
                        }
                    }
                });
            if state.color_column.is_some() && state.color_map.is_none() {
                ui.label(RichText::new("Too many distinct values to colour by").weak());
            }
            if let Some(cm) = &state.color_map {
                for (label, color) in cm.legend_entries() {
                    ui.label(RichText::new(label).color(color));
                }
            }
            ui.separator();

            // ---- Plot visibility ----
            let header = format!("Plots  ({}/{})", state.visible_features.len(), names.len());
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("plots")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.show_all_features();
                        }
                        if ui.small_button("None").clicked() {
                            state.hide_all_features();
                        }
                    });
                    for (idx, name) in names.iter().enumerate() {
                        let mut checked = state.visible_features.contains(&idx);
                        if ui.checkbox(&mut checked, name).changed() {
                            state.toggle_feature(idx);
                        }
                    }
                });
            ui.separator();

            // ---- Cross-validation report ----
            ui.strong("Cross-validation");
            for report in &state.reports {
                let color = if report.outcome.is_ok() {
                    ui.visuals().text_color()
                } else {
                    Color32::RED
                };
                ui.label(RichText::new(report.summary()).color(color));
                ui.label(RichText::new(report.to_string()).monospace().small());
                ui.add_space(4.0);
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} rows, {} features, target '{}' (shuffled, seed {})",
                ds.len(),
                ds.n_features(),
                ds.target_name,
                state.config.shuffle_seed
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open tabular data")
        .add_filter("Supported files", &["parquet", "pq", "json", "csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
        for report in &state.reports {
            println!("{report}");
        }
    }
}
