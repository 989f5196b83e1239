use std::sync::Arc;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::chart::ChartKind;
use crate::data::model::{Dataset, View};
use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the central panel: overview, search, advanced filter, charts.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = state.dataset.clone() else {
        welcome(ui);
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Route Data Search 📈");
            overview(ui, state, &dataset);
            ui.separator();
            search_section(ui, state, &dataset);
            ui.separator();
            include_section(ui, state, &dataset);
            ui.separator();
            chart_section(ui, state);
        });
}

fn welcome(ui: &mut Ui) {
    ui.heading("Route Data Search 📈");
    ui.label("Open a spreadsheet to begin  (File → Open…, or drop a file on the window).");
    ui.add_space(12.0);
    ui.strong("Expected data format:");
    let example = Dataset::example();
    table::data_table(ui, "example_table", &example, &View::all(&example), 200.0);
}

fn notice(ui: &mut Ui, text: impl Into<String>) {
    ui.label(RichText::new(text.into()).color(Color32::from_rgb(230, 160, 30)));
}

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

fn overview(ui: &mut Ui, state: &AppState, dataset: &Dataset) {
    ui.strong("Descriptive statistics");
    ui.label(format!("Total records: {}", state.summary().row_count));
    egui::CollapsingHeader::new("Show all data")
        .id_salt("all_data")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            table::data_table(ui, "all_data_table", dataset, &state.filtered, 400.0);
        });
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

fn search_section(ui: &mut Ui, state: &mut AppState, dataset: &Arc<Dataset>) {
    ui.strong("Search");

    ui.horizontal_wrapped(|ui: &mut Ui| {
        ui.label("Columns:");
        for name in dataset.column_names() {
            let mut checked = state.search.columns.contains(&name);
            if ui.checkbox(&mut checked, &name).changed() {
                state.toggle_search_column(&name);
            }
        }
    });

    let mut submit = false;
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Term:");
        let response = ui.text_edit_singleline(&mut state.search.term);
        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            submit = true;
        }
        if ui.button("Search").clicked() {
            submit = true;
        }
    });
    if submit {
        state.run_search();
    }

    if let Some(n) = &state.search.notice {
        notice(ui, format!("Please {n}."));
    }

    let Some((term, view)) = state.search.results.clone() else {
        return;
    };
    if view.is_empty() {
        notice(ui, format!("No results found for '{term}' in the selected columns."));
        return;
    }
    ui.label(RichText::new(format!("Found {} results.", view.len())).color(Color32::GREEN));
    table::data_table(ui, "search_table", dataset, &view, 300.0);
    if ui.button("Download results as CSV").clicked() {
        let file_name = state.config.search_export_file.clone();
        panels::save_csv_dialog(state, dataset, &view, &file_name);
    }
}

// ---------------------------------------------------------------------------
// Advanced (inclusion) filter
// ---------------------------------------------------------------------------

fn include_section(ui: &mut Ui, state: &mut AppState, dataset: &Arc<Dataset>) {
    ui.strong("Advanced filters");

    let current = state.include.column.clone().unwrap_or_default();
    let mut picked_column = None;
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Column:");
        egui::ComboBox::from_id_salt("include_column")
            .selected_text(&current)
            .show_ui(ui, |ui: &mut Ui| {
                for name in dataset.column_names() {
                    if ui.selectable_label(current == name, &name).clicked() {
                        picked_column = Some(name);
                    }
                }
            });
    });
    if let Some(column) = picked_column {
        state.set_include_column(column);
    }

    let options = state.include_options();
    let mut toggled = None;
    egui::CollapsingHeader::new(format!(
        "Filter {current} by specific values  ({}/{})",
        state.include.selected.len(),
        options.len()
    ))
    .id_salt("include_values")
    .show(ui, |ui: &mut Ui| {
        ScrollArea::vertical()
            .id_salt("include_values_scroll")
            .max_height(200.0)
            .show(ui, |ui: &mut Ui| {
                for value in &options {
                    let mut checked = state.include.selected.contains(value);
                    if ui.checkbox(&mut checked, value.to_string()).changed() {
                        toggled = Some(value.clone());
                    }
                }
            });
    });
    if let Some(value) = toggled {
        state.toggle_include_value(&value);
    }

    // Nothing picked yet means no filtering, so there is no separate result to show.
    if state.include.selected.is_empty() {
        return;
    }
    let view = state.include.view.clone();
    table::data_table(ui, "include_table", dataset, &view, 300.0);
    if ui.button("Download filtered results as CSV").clicked() {
        let file_name = state.config.filter_export_file.clone();
        panels::save_csv_dialog(state, dataset, &view, &file_name);
    }
}

// ---------------------------------------------------------------------------
// Visualisations
// ---------------------------------------------------------------------------

fn chart_section(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Visualizations");

    if state.column_classes.numeric.is_empty() {
        notice(ui, "No numeric columns found for visualization.");
        return;
    }

    let mut kind = state.chart.kind;
    let mut y = state.chart.y.clone().unwrap_or_default();
    let mut x = state.chart.x.clone().unwrap_or_default();
    let x_options = state.column_classes.x_candidates(kind);
    let y_options = state.column_classes.numeric.clone();

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Chart type:");
        egui::ComboBox::from_id_salt("chart_kind")
            .selected_text(kind.label())
            .show_ui(ui, |ui: &mut Ui| {
                for k in ChartKind::ALL {
                    ui.selectable_value(&mut kind, k, k.label());
                }
            });

        ui.label("Y axis:");
        egui::ComboBox::from_id_salt("chart_y")
            .selected_text(&y)
            .show_ui(ui, |ui: &mut Ui| {
                for name in &y_options {
                    ui.selectable_value(&mut y, name.clone(), name);
                }
            });

        ui.label(if kind == ChartKind::Pie { "Categories:" } else { "X axis:" });
        egui::ComboBox::from_id_salt("chart_x")
            .selected_text(&x)
            .show_ui(ui, |ui: &mut Ui| {
                for name in &x_options {
                    ui.selectable_value(&mut x, name.clone(), name);
                }
            });
    });

    state.chart.y = Some(y).filter(|s| !s.is_empty());
    state.chart.x = Some(x).filter(|s| !s.is_empty());
    if kind != state.chart.kind {
        state.set_chart_kind(kind);
    }

    if ui.button("Generate chart").clicked() {
        state.build_chart();
    }
    if let Some(n) = &state.chart.notice {
        notice(ui, format!("Cannot build chart: {n}."));
    }
    if let Some((spec, data)) = &state.chart.output {
        plot::chart(ui, spec, data);
    }
}
