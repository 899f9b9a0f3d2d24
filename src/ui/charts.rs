use std::collections::BTreeSet;
use std::f32::consts::{FRAC_PI_2, TAU};
use std::ops::RangeInclusive;

use eframe::egui::{self, pos2, vec2, Align2, Color32, FontId, Pos2, Rect, Sense, Shape, Stroke, Ui};
use egui_plot::{
    uniform_grid_spacer, Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, Plot,
    PlotPoints, Points,
};

use crate::color::{generate_palette, normalize, viridis};
use crate::data::views::{
    CategoryCount, ChartKind, GroupCenter, GroupMean, Heatmap, Histogram, ScatterPoint, SeniorityDistribution,
    ViewData, ViewKind, ViewOutput, YearlyPoint,
};
use crate::state::{AppState, Tab};
use crate::ui::panels::format_usd;

const CHART_HEIGHT: f32 = 320.0;
/// Largest scatter marker, used for the highest salary in the subset.
const MAX_MARKER_RADIUS: f32 = 10.0;

// ---------------------------------------------------------------------------
// Tabs and per-view frame
// ---------------------------------------------------------------------------

/// Tab strip plus the charts of the active tab, two per row.
pub fn chart_tabs(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Charts");
    ui.horizontal(|ui: &mut Ui| {
        for tab in Tab::ALL {
            ui.selectable_value(&mut state.tab, tab, tab.label());
        }
    });
    ui.add_space(6.0);

    let state: &AppState = state;
    for row in state.tab.views().chunks(2) {
        ui.columns(2, |cols: &mut [Ui]| {
            for (col, &kind) in cols.iter_mut().zip(row) {
                view_panel(col, state, kind);
            }
        });
        ui.add_space(8.0);
    }
}

fn view_panel(ui: &mut Ui, state: &AppState, kind: ViewKind) {
    ui.strong(kind.title());
    match state.dashboard.view(kind) {
        ViewOutput::NoData => placeholder(ui, "No data to display for the current filters."),
        ViewOutput::InsufficientData(reason) => placeholder(ui, reason),
        ViewOutput::Ready(data) => match (kind.chart(), data) {
            (ChartKind::HorizontalBar, ViewData::Ranking(rows)) => ranking_chart(ui, kind, rows),
            (ChartKind::Histogram, ViewData::Histogram(hist)) => histogram_chart(ui, hist),
            (ChartKind::BoxPlot, ViewData::Distributions(dists)) => box_chart(ui, state, dists),
            (ChartKind::Scatter, ViewData::Scatter(points)) => scatter_chart(ui, state, points),
            (ChartKind::Line, ViewData::Yearly(points)) => yearly_chart(ui, points),
            (ChartKind::Donut, ViewData::Counts(counts)) => {
                let hole = if kind == ViewKind::CompanySize { 0.4 } else { 0.5 };
                donut_chart(ui, counts, hole);
            }
            (ChartKind::Heatmap, ViewData::Heatmap(map)) => heatmap_chart(ui, map),
            (ChartKind::GroupedBar, ViewData::Centers(rows)) => grouped_bar_chart(ui, rows),
            (chart, _) => {
                log::warn!("{kind:?}: result does not fit a {chart:?} chart");
                placeholder(ui, "Chart unavailable.");
            }
        },
    }
}

fn placeholder(ui: &mut Ui, text: &str) {
    ui.allocate_ui(vec2(ui.available_width(), CHART_HEIGHT), |ui: &mut Ui| {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label(egui::RichText::new(text).italics().weak());
        });
    });
}

/// Axis labels for categorical charts: integer grid positions map to `labels`.
fn category_formatter(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let idx = mark.value.round();
        if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        labels.get(idx as usize).cloned().unwrap_or_default()
    }
}

fn unit_grid() -> impl Fn(egui_plot::GridInput) -> Vec<GridMark> {
    uniform_grid_spacer(|_input| [1.0, 5.0, 10.0])
}

// ---------------------------------------------------------------------------
// egui_plot charts
// ---------------------------------------------------------------------------

fn ranking_chart(ui: &mut Ui, kind: ViewKind, rows: &[GroupMean]) {
    let lo = rows.iter().map(|r| r.mean).fold(f64::INFINITY, f64::min);
    let hi = rows.iter().map(|r| r.mean).fold(f64::NEG_INFINITY, f64::max);

    let bars: Vec<Bar> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            Bar::new(i as f64, row.mean)
                .name(format!("{} ({} records)", row.key, row.count))
                .fill(viridis(normalize(row.mean, lo, hi)))
                .width(0.7)
        })
        .collect();
    let labels = rows.iter().map(|r| r.key.clone()).collect();

    Plot::new(format!("{kind:?}"))
        .height(CHART_HEIGHT)
        .allow_scroll(false)
        .x_axis_label("Mean annual salary (USD)")
        .y_axis_formatter(category_formatter(labels))
        .y_grid_spacer(unit_grid())
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}

fn histogram_chart(ui: &mut Ui, hist: &Histogram) {
    let bars: Vec<Bar> = if hist.bin_width > 0.0 {
        hist.counts
            .iter()
            .enumerate()
            .map(|(i, &count)| {
                let (lo, hi) = hist.bin_range(i);
                Bar::new((lo + hi) / 2.0, count as f64)
                    .width(hist.bin_width)
                    .name(format!("{} – {}", format_usd(lo), format_usd(hi)))
            })
            .collect()
    } else {
        let width = (hist.min * 0.05).max(1.0);
        vec![Bar::new(hist.min, hist.total() as f64)
            .width(width)
            .name(format_usd(hist.min))]
    };

    Plot::new("salary_histogram")
        .height(CHART_HEIGHT)
        .allow_scroll(false)
        .x_axis_label("Salary range (USD)")
        .y_axis_label("Frequency")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(viridis(0.25)));
        });
}

fn box_chart(ui: &mut Ui, state: &AppState, dists: &[SeniorityDistribution]) {
    let labels: Vec<String> = dists.iter().map(|d| d.seniority.clone()).collect();

    Plot::new("salary_by_seniority")
        .height(CHART_HEIGHT)
        .allow_scroll(false)
        .x_axis_label("Seniority")
        .y_axis_label("Salary (USD)")
        .x_axis_formatter(category_formatter(labels))
        .x_grid_spacer(unit_grid())
        .show(ui, |plot_ui| {
            for (i, dist) in dists.iter().enumerate() {
                let color = state.seniority_colors.color_for(&dist.seniority);
                let s = &dist.stats;
                let elem = BoxElem::new(
                    i as f64,
                    BoxSpread::new(s.lower_whisker, s.q1, s.median, s.q3, s.upper_whisker),
                )
                .name(&dist.seniority)
                .box_width(0.5)
                .fill(color.gamma_multiply(0.4))
                .stroke(Stroke::new(1.5, color));
                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(&dist.seniority));

                if !s.outliers.is_empty() {
                    let outliers: Vec<[f64; 2]> = s.outliers.iter().map(|&v| [i as f64, v]).collect();
                    plot_ui.points(Points::new(outliers).radius(2.5).color(color).name(&dist.seniority));
                }
            }
        });
}

/// Marker radius for `salary`; area grows linearly with salary.
pub fn marker_radius(salary: f64, max_salary: f64) -> f32 {
    if max_salary <= 0.0 {
        return 1.0;
    }
    (MAX_MARKER_RADIUS * (salary / max_salary).clamp(0.0, 1.0).sqrt() as f32).max(1.0)
}

fn scatter_chart(ui: &mut Ui, state: &AppState, points: &[ScatterPoint]) {
    let levels: Vec<String> = points
        .iter()
        .map(|p| p.seniority.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let max_salary = points.iter().map(|p| p.salary).fold(0.0, f64::max);

    Plot::new("seniority_scatter")
        .height(CHART_HEIGHT)
        .allow_scroll(false)
        .legend(Legend::default())
        .x_axis_label("Seniority")
        .y_axis_label("Salary (USD)")
        .x_axis_formatter(category_formatter(levels.clone()))
        .x_grid_spacer(unit_grid())
        .show(ui, |plot_ui| {
            for (i, level) in levels.iter().enumerate() {
                let color = state.seniority_colors.color_for(level);
                // one series per whole-pixel radius, since a series has a single radius
                let mut by_radius: Vec<Vec<[f64; 2]>> =
                    vec![Vec::new(); MAX_MARKER_RADIUS as usize + 1];
                for p in points.iter().filter(|p| &p.seniority == level) {
                    let r = marker_radius(p.salary, max_salary).round() as usize;
                    by_radius[r.min(MAX_MARKER_RADIUS as usize)].push([i as f64, p.salary]);
                }
                for (r, series) in by_radius.into_iter().enumerate() {
                    if series.is_empty() {
                        continue;
                    }
                    plot_ui.points(
                        Points::new(series)
                            .radius(r as f32)
                            .filled(true)
                            .color(color.gamma_multiply(0.6))
                            .name(level),
                    );
                }
            }
        });
}

fn yearly_chart(ui: &mut Ui, points: &[YearlyPoint]) {
    let palette = generate_palette(2);
    let series = [
        ("mean", points.iter().map(|p| [f64::from(p.year), p.mean]).collect::<Vec<_>>()),
        ("median", points.iter().map(|p| [f64::from(p.year), p.median]).collect()),
    ];

    Plot::new("yearly_evolution")
        .height(CHART_HEIGHT)
        .allow_scroll(false)
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label("Salary (USD)")
        .x_axis_formatter(|mark, _range| {
            if mark.value.fract() == 0.0 {
                format!("{:.0}", mark.value)
            } else {
                String::new()
            }
        })
        .x_grid_spacer(unit_grid())
        .show(ui, |plot_ui| {
            for ((name, values), color) in series.into_iter().zip(palette) {
                plot_ui.line(
                    Line::new(PlotPoints::from(values.clone()))
                        .name(name)
                        .color(color)
                        .width(3.0),
                );
                plot_ui.points(Points::new(values).radius(4.0).color(color).name(name));
            }
        });
}

fn grouped_bar_chart(ui: &mut Ui, rows: &[GroupCenter]) {
    let palette = generate_palette(2);
    let labels: Vec<String> = rows.iter().map(|r| r.label.clone()).collect();
    let bars = |offset: f64, pick: fn(&GroupCenter) -> f64| -> Vec<Bar> {
        rows.iter()
            .enumerate()
            .map(|(i, row)| {
                Bar::new(i as f64 + offset, pick(row))
                    .width(0.4)
                    .name(&row.label)
            })
            .collect()
    };

    Plot::new("remote_salary")
        .height(CHART_HEIGHT)
        .allow_scroll(false)
        .legend(Legend::default())
        .x_axis_label("Work type")
        .y_axis_label("Salary (USD)")
        .x_axis_formatter(category_formatter(labels))
        .x_grid_spacer(unit_grid())
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars(-0.2, |r| r.mean)).name("mean").color(palette[0]));
            plot_ui.bar_chart(BarChart::new(bars(0.2, |r| r.median)).name("median").color(palette[1]));
        });
}

// ---------------------------------------------------------------------------
// Painter charts
// ---------------------------------------------------------------------------

fn polar(center: Pos2, radius: f32, angle: f32) -> Pos2 {
    center + vec2(angle.cos(), angle.sin()) * radius
}

/// Ring chart with a legend on the right. `hole` is the inner radius as a
/// fraction of the outer one.
fn donut_chart(ui: &mut Ui, counts: &[CategoryCount], hole: f32) {
    let total: usize = counts.iter().map(|c| c.count).sum();
    if total == 0 {
        placeholder(ui, "No data to display for the current filters.");
        return;
    }

    let (response, painter) =
        ui.allocate_painter(vec2(ui.available_width(), CHART_HEIGHT), Sense::hover());
    let rect = response.rect;
    let legend_w = 170.0_f32.min(rect.width() * 0.4);
    let chart_w = rect.width() - legend_w;
    let center = pos2(rect.left() + chart_w / 2.0, rect.center().y);
    let outer = (chart_w.min(rect.height()) / 2.0 - 8.0).max(10.0);
    let inner = outer * hole;
    let font = FontId::proportional(12.0);
    let text_color = ui.visuals().text_color();

    let palette = generate_palette(counts.len());
    let mut start = -FRAC_PI_2;
    for (i, (entry, &color)) in counts.iter().zip(&palette).enumerate() {
        let share = entry.count as f32 / total as f32;
        let sweep = TAU * share;
        let steps = ((sweep / 0.05).ceil() as usize).max(1);
        for s in 0..steps {
            let a0 = start + sweep * s as f32 / steps as f32;
            let a1 = start + sweep * (s + 1) as f32 / steps as f32;
            let quad = vec![
                polar(center, outer, a0),
                polar(center, outer, a1),
                polar(center, inner, a1),
                polar(center, inner, a0),
            ];
            painter.add(Shape::convex_polygon(quad, color, Stroke::NONE));
        }
        if sweep > 0.3 {
            painter.text(
                polar(center, (outer + inner) / 2.0, start + sweep / 2.0),
                Align2::CENTER_CENTER,
                format!("{:.1}%", share * 100.0),
                font.clone(),
                Color32::WHITE,
            );
        }
        start += sweep;

        let y = rect.top() + 12.0 + i as f32 * 20.0;
        let swatch = Rect::from_min_size(pos2(rect.right() - legend_w, y), vec2(12.0, 12.0));
        painter.rect_filled(swatch, 2.0, color);
        painter.text(
            pos2(swatch.right() + 6.0, swatch.center().y),
            Align2::LEFT_CENTER,
            format!("{} ({})", entry.label, entry.count),
            font.clone(),
            text_color,
        );
    }
}

/// Compact dollar label for heatmap cells, e.g. `$152k`.
fn compact_usd(v: f64) -> String {
    if v.abs() >= 1_000.0 {
        format!("${:.0}k", v / 1_000.0)
    } else {
        format!("${v:.0}")
    }
}

fn heatmap_chart(ui: &mut Ui, map: &Heatmap) {
    let Some((lo, hi)) = map.value_range() else {
        placeholder(ui, "No data to display for the current filters.");
        return;
    };

    let label_w = 150.0;
    let header_h = 20.0;
    let n_cols = map.seniorities.len().max(1) as f32;
    let n_rows = map.jobs.len().max(1) as f32;
    let cell_w = ((ui.available_width() - label_w) / n_cols).max(40.0);
    let cell_h = ((CHART_HEIGHT - header_h) / n_rows).clamp(18.0, 40.0);

    let (response, painter) = ui.allocate_painter(
        vec2(label_w + cell_w * n_cols, header_h + cell_h * n_rows),
        Sense::hover(),
    );
    let origin = response.rect.min;
    let font = FontId::proportional(11.0);
    let text_color = ui.visuals().text_color();

    for (c, level) in map.seniorities.iter().enumerate() {
        painter.text(
            origin + vec2(label_w + cell_w * (c as f32 + 0.5), header_h / 2.0),
            Align2::CENTER_CENTER,
            level,
            font.clone(),
            text_color,
        );
    }

    let mut hovered: Option<String> = None;
    for (r, job) in map.jobs.iter().enumerate() {
        let row_y = header_h + cell_h * r as f32;
        painter.text(
            origin + vec2(label_w - 6.0, row_y + cell_h / 2.0),
            Align2::RIGHT_CENTER,
            job,
            font.clone(),
            text_color,
        );
        for (c, level) in map.seniorities.iter().enumerate() {
            let cell = Rect::from_min_size(
                origin + vec2(label_w + cell_w * c as f32, row_y),
                vec2(cell_w, cell_h),
            )
            .shrink(1.0);
            match map.get(r, c) {
                Some(v) => {
                    let t = normalize(v, lo, hi);
                    painter.rect_filled(cell, 2.0, viridis(t));
                    let ink = if t > 0.6 { Color32::BLACK } else { Color32::WHITE };
                    painter.text(cell.center(), Align2::CENTER_CENTER, compact_usd(v), font.clone(), ink);
                    if response.hover_pos().is_some_and(|p| cell.contains(p)) {
                        hovered = Some(format!("{job} · {level}: {}", format_usd(v)));
                    }
                }
                None => {
                    painter.rect_filled(cell, 2.0, ui.visuals().faint_bg_color);
                }
            }
        }
    }

    if let Some(text) = hovered {
        response.on_hover_text_at_pointer(text);
    }
}
