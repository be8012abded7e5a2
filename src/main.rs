mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;

use app::SolarDashboardApp;
use eframe::egui;
use solar_dashboard::DashboardConfig;

fn main() -> eframe::Result {
    env_logger::init();

    // Optional JSON config: first argument, else $SOLAR_DASHBOARD_CONFIG.
    let config = match DashboardConfig::resolve(std::env::args_os().nth(1).map(PathBuf::from)) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid config: {e:#}, falling back to defaults");
            DashboardConfig::default()
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Solar Dashboard – Cross-Country Analysis",
        options,
        Box::new(move |_cc| Ok(Box::new(SolarDashboardApp::new(config)))),
    )
}
