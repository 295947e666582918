use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use eframe::egui;

use forest_lens::app::ForestLensApp;
use forest_lens::config::PipelineConfig;
use forest_lens::data::loader::load_file;
use forest_lens::pipeline;
use forest_lens::state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let cwd = std::env::current_dir().context("resolving working directory")?;
    let config = PipelineConfig::discover(&cwd)?;

    // First positional argument wins over the config file.
    let data_path: Option<PathBuf> = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| config.data_path.clone());

    let mut state = AppState::new(config.clone());

    match &data_path {
        Some(path) => {
            let dataset = load_file(path, config.target_column.as_deref())
                .with_context(|| format!("loading {}", path.display()))?;
            log::info!(
                "Loaded {} rows with features {:?}",
                dataset.len(),
                dataset.feature_names
            );
            let output = pipeline::run(&config, &dataset)?;
            for report in &output.reports {
                println!("{report}");
            }
            state.set_output(output);
        }
        None if !config.show_plots => bail!("No data file given and plots are disabled"),
        None => log::info!("No data file given; use File → Open… in the viewer"),
    }

    if !config.show_plots {
        return Ok(());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Forest Lens – Feature Scatter & CV",
        options,
        Box::new(|_cc| Ok(Box::new(ForestLensApp::new(state)))),
    )
    .map_err(|e| anyhow!("viewer failed: {e}"))
}
