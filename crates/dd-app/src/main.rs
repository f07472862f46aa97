//! Main application entry point

use anyhow::{Context, Result};
use eframe::egui;
use tracing::{error, info};

use dd_data::DashboardConfig;
use dd_ui::StatusLine;

mod app;
mod startup;

use app::DashboardApp;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = DashboardConfig::resolve().context("Invalid dashboard configuration")?;
    info!(
        "Starting drought dashboard with dataset {} and model {}",
        config.dataset_path.display(),
        config.model_path.display()
    );

    let state = DashboardApp::initial_state(&config)?;
    let status = StatusLine::new();
    status.subscribe(&state.event_bus);

    let dataset = startup::load_dataset(&config, &state.event_bus).map_err(|e| {
        error!("{:#}", e);
        e
    })?;
    let model = startup::load_model(&config, &state.event_bus);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([800.0, 600.0]),
        default_theme: eframe::Theme::Light,
        ..Default::default()
    };

    eframe::run_native(
        "Project DataViz",
        options,
        Box::new(move |cc| Box::new(DashboardApp::new(cc, state, status, dataset, model))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run app: {}", e))?;

    Ok(())
}
