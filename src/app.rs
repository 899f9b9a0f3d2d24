use std::sync::Arc;

use eframe::egui;

use crate::data::model::Dataset;
use crate::state::AppState;
use crate::ui::{charts, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SalaryExplorerApp {
    pub state: AppState,
}

impl SalaryExplorerApp {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self {
            state: AppState::new(dataset),
        }
    }
}

impl eframe::App for SalaryExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics, chart tabs, detail table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    panels::metric_cards(ui, &self.state);
                    ui.separator();
                    charts::chart_tabs(ui, &mut self.state);
                    ui.separator();
                    panels::detail_table(ui, &self.state);
                });
        });
    }
}
