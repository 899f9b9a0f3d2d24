use std::sync::Arc;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::{Dimension, Field};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    // Hold our own handle so the domains stay borrowable while state mutates.
    let dataset = Arc::clone(&state.dataset);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for dim in Dimension::ALL {
                let all_values = dataset.domain(dim);

                // Show count of selected / total in the header
                let n_selected = state
                    .selection
                    .get(&dim)
                    .map_or(0, |sel| sel.intersection(all_values).count());
                let header_text = format!("{}  ({n_selected}/{})", dim.label(), all_values.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(dim.label())
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(dim);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(dim);
                            }
                        });

                        for val in all_values {
                            let label = val.to_string();
                            let mut checked = state
                                .selection
                                .get(&dim)
                                .is_some_and(|sel| sel.contains(val));

                            let mut text = RichText::new(&label);
                            if dim == Dimension::Seniority {
                                text = text.color(state.seniority_colors.color_for(&label));
                            }

                            if ui.checkbox(&mut checked, text).changed() {
                                state.toggle_filter_value(dim, val);
                            }
                        }
                    });
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
            if ui.button("Open local dataset…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Export filtered CSV…").clicked() {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} records loaded, {} visible",
            format_count(state.dataset.len()),
            format_count(state.dashboard.indices.len())
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Metric cards
// ---------------------------------------------------------------------------

/// The six headline figures for the current selection.
pub fn metric_cards(ui: &mut Ui, state: &AppState) {
    ui.heading("Key metrics (annual salary, USD)");

    let s = &state.dashboard.summary;
    let cards = [
        ("Mean salary", format_usd(s.mean)),
        ("Maximum salary", format_usd(s.max)),
        ("Minimum salary", format_usd(s.min)),
        ("Median salary", format_usd(s.median)),
        ("Records", format_count(s.count)),
        ("Most common job", s.top_job.clone()),
    ];

    ui.columns(cards.len(), |cols: &mut [Ui]| {
        for (col, (label, value)) in cols.iter_mut().zip(cards.iter()) {
            col.group(|ui: &mut Ui| {
                ui.set_min_width(ui.available_width());
                ui.label(RichText::new(*label).small());
                ui.label(RichText::new(value).heading().strong());
            });
        }
    });
}

// ---------------------------------------------------------------------------
// Detail table
// ---------------------------------------------------------------------------

/// The filtered records, all columns.
pub fn detail_table(ui: &mut Ui, state: &AppState) {
    ui.heading("Detailed records");

    let rows = &state.dashboard.indices;
    if rows.is_empty() {
        ui.label("No records match the current filters.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(400.0)
        .columns(Column::auto().at_least(70.0), Field::ALL.len())
        .header(20.0, |mut header| {
            for field in Field::ALL {
                header.col(|ui: &mut Ui| {
                    ui.strong(field.label());
                });
            }
        })
        .body(|body| {
            body.rows(18.0, rows.len(), |mut row| {
                let rec = &state.dataset.records[rows[row.index()]];
                for field in Field::ALL {
                    row.col(|ui: &mut Ui| {
                        ui.label(rec.display(field));
                    });
                }
            });
        });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open salary dataset")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_file(&path);
    }
}

pub fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered records")
        .set_file_name("filtered_salaries.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match state.export_csv(&path) {
            Ok(()) => {
                log::info!(
                    "Exported {} records to {}",
                    state.dashboard.indices.len(),
                    path.display()
                );
                state.status_message = None;
            }
            Err(e) => {
                log::warn!("Export failed: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Number formatting
// ---------------------------------------------------------------------------

/// `1234567` → `"1,234,567"`.
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Whole-dollar amount with thousands separators, e.g. `$150,000`.
pub fn format_usd(amount: f64) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}${}", format_count(rounded.abs() as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_get_thousands_separators() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn usd_amounts_round_to_whole_dollars() {
        assert_eq!(format_usd(0.0), "$0");
        assert_eq!(format_usd(150_000.0), "$150,000");
        assert_eq!(format_usd(73_499.6), "$73,500");
        assert_eq!(format_usd(-1_500.0), "-$1,500");
    }
}
