use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::export;
use crate::data::filter::Selection;
use crate::data::loader::SUPPORTED_EXTENSIONS;
use crate::data::model::{Dataset, View};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – group filter
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters 🔎");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No file loaded.");
        return;
    }

    let group_column = state.config.group_column.clone();
    if !state.has_group_column() {
        ui.label(format!("No \"{group_column}\" column in this file."));
        return;
    }

    let options = state.group_options();
    let current = match &state.group_selection {
        Selection::All => "All".to_string(),
        Selection::Only(v) => v.to_string(),
    };

    ui.strong(&group_column);
    let mut picked = None;
    egui::ComboBox::from_id_salt("group_selection")
        .selected_text(current)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            ScrollArea::vertical().max_height(320.0).show(ui, |ui: &mut Ui| {
                if ui
                    .selectable_label(state.group_selection == Selection::All, "All")
                    .clicked()
                {
                    picked = Some(Selection::All);
                }
                for value in &options {
                    let selection = Selection::Only(value.clone());
                    if ui
                        .selectable_label(state.group_selection == selection, value.to_string())
                        .clicked()
                    {
                        picked = Some(selection);
                    }
                }
            });
        });

    if let Some(selection) = picked {
        state.set_group_selection(selection);
    }
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

        if let (Some(ds), Some(name)) = (&state.dataset, &state.source_name) {
            ui.label(format!(
                "{name}: {} rows, {} columns, {} after filters",
                ds.len(),
                ds.columns().len(),
                state.filtered.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog / drag-and-drop
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open route spreadsheet")
        .add_filter("Spreadsheets", SUPPORTED_EXTENSIONS)
        .add_filter("Excel", &["xlsx", "xls", "xlsm", "xlsb"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        upload_path(state, &path);
    }
}

/// Load a file dropped onto the window.
pub fn handle_dropped_files(ctx: &egui::Context, state: &mut AppState) {
    let dropped = ctx.input(|i| i.raw.dropped_files.clone());
    let Some(file) = dropped.into_iter().next() else {
        return;
    };
    match (&file.bytes, &file.path) {
        (Some(bytes), _) => state.upload(&file.name, bytes),
        (None, Some(path)) => upload_path(state, path),
        (None, None) => log::warn!("dropped file {:?} has neither bytes nor path", file.name),
    }
}

fn upload_path(state: &mut AppState, path: &Path) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match std::fs::read(path).with_context(|| format!("reading {}", path.display())) {
        Ok(bytes) => state.upload(&name, &bytes),
        Err(e) => {
            log::error!("Failed to open file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

/// Ask where to save `view` as CSV, pre-filled with `file_name`.
pub fn save_csv_dialog(state: &mut AppState, dataset: &Dataset, view: &View, file_name: &str) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Save results as CSV")
        .set_file_name(file_name)
        .add_filter("CSV", &["csv"])
        .save_file()
    else {
        return;
    };
    match write_csv(dataset, view, &path) {
        Ok(()) => {
            log::info!("saved {} rows to {}", view.len(), path.display());
            state.status_message = None;
        }
        Err(e) => {
            log::error!("Failed to save CSV: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

fn write_csv(dataset: &Dataset, view: &View, path: &Path) -> Result<()> {
    let bytes = export::to_csv(dataset, view).context("encoding CSV")?;
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
}
