use std::f64::consts::TAU;

use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints, Points, Polygon};

use crate::color::{generate_palette, SERIES_COLOR};
use crate::data::chart::{ChartData, ChartKind, ChartSpec};

// ---------------------------------------------------------------------------
// Chart rendering (visualisation section)
// ---------------------------------------------------------------------------

/// Render prepared chart data.
pub fn chart(ui: &mut Ui, spec: &ChartSpec, data: &ChartData) {
    ui.strong(spec.title());
    match data {
        ChartData::Categorical { kind, points } => categorical_chart(ui, spec, *kind, points),
        ChartData::Scatter { points } => scatter_chart(ui, spec, points),
        ChartData::Pie { slices } => pie_chart(ui, slices),
    }
}

/// Bar / line chart: one point per row at x = 0, 1, 2, … labelled by category.
fn categorical_chart(ui: &mut Ui, spec: &ChartSpec, kind: ChartKind, points: &[(String, f64)]) {
    let labels: Vec<String> = points.iter().map(|(label, _)| label.clone()).collect();

    Plot::new("categorical_chart")
        .height(360.0)
        .x_axis_label(spec.x.clone())
        .y_axis_label(spec.y.clone())
        .x_axis_formatter(move |mark: GridMark, _range| category_label(&labels, mark.value))
        .allow_drag(true)
        .allow_zoom(true)
        .allow_scroll(true)
        .show(ui, |plot_ui| match kind {
            ChartKind::Line => {
                let line_points: PlotPoints = points
                    .iter()
                    .enumerate()
                    .map(|(i, (_, y))| [i as f64, *y])
                    .collect();
                plot_ui.line(Line::new(line_points).color(SERIES_COLOR).width(1.5));
            }
            _ => {
                let bars = points
                    .iter()
                    .enumerate()
                    .map(|(i, (label, y))| Bar::new(i as f64, *y).name(label).width(0.8))
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars).color(SERIES_COLOR).name(&spec.y));
            }
        });
}

/// Axis ticks fall on whole numbers; anything in between stays blank.
fn category_label(labels: &[String], value: f64) -> String {
    if value.fract() != 0.0 || value < 0.0 {
        return String::new();
    }
    labels.get(value as usize).cloned().unwrap_or_default()
}

fn scatter_chart(ui: &mut Ui, spec: &ChartSpec, points: &[[f64; 2]]) {
    Plot::new("scatter_chart")
        .height(360.0)
        .x_axis_label(spec.x.clone())
        .y_axis_label(spec.y.clone())
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            let pts: PlotPoints = points.iter().copied().collect();
            plot_ui.points(Points::new(pts).radius(3.0).color(SERIES_COLOR));
        });
}

/// Pie chart drawn as polygon wedges on a unit circle, one legend entry per slice.
fn pie_chart(ui: &mut Ui, slices: &[(String, f64)]) {
    let total: f64 = slices.iter().map(|(_, v)| v.max(0.0)).sum();
    if total <= 0.0 {
        ui.label("Nothing to plot: every group sums to zero.");
        return;
    }
    let colors = generate_palette(slices.len());

    Plot::new("pie_chart")
        .height(360.0)
        .data_aspect(1.0)
        .show_axes([false, false])
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            let mut start = 0.0;
            for ((label, value), color) in slices.iter().zip(colors) {
                let share = value.max(0.0) / total;
                if share == 0.0 {
                    continue;
                }
                let end = start + share * TAU;
                let name = format!("{label} ({:.1}%)", share * 100.0);
                // Polygons are filled as convex shapes: split wide slices
                // into pieces of at most a quarter turn sharing one legend name.
                let pieces = ((end - start) / (TAU / 4.0)).ceil().max(1.0) as usize;
                for p in 0..pieces {
                    let a = start + (end - start) * p as f64 / pieces as f64;
                    let b = start + (end - start) * (p + 1) as f64 / pieces as f64;
                    plot_ui.polygon(
                        Polygon::new(wedge(a, b))
                            .name(&name)
                            .fill_color(color)
                            .stroke((0.0, Color32::TRANSPARENT)),
                    );
                }
                start = end;
            }
        });
}

/// Wedge outline from `start` to `end` radians, starting at 12 o'clock, clockwise.
fn wedge(start: f64, end: f64) -> Vec<[f64; 2]> {
    let steps = (((end - start) / TAU) * 128.0).ceil().max(2.0) as usize;
    let mut pts = vec![[0.0, 0.0]];
    for i in 0..=steps {
        let angle = start + (end - start) * i as f64 / steps as f64;
        pts.push([angle.sin(), angle.cos()]);
    }
    pts
}
