mod app;
mod color;
mod data;
mod state;
mod ui;

use anyhow::Context;
use app::SalaryExplorerApp;
use eframe::egui;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Without the dataset there is nothing to show, so a failed fetch is fatal.
    let dataset = match data::loader::load_default().context("loading the salary dataset") {
        Ok(ds) => ds,
        Err(e) => {
            log::error!("{e:#}");
            return Err(e);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Salary Explorer – Data Careers",
        options,
        Box::new(|_cc| Ok(Box::new(SalaryExplorerApp::new(dataset)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
