use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::{ColumnKind, Dataset, View};

const ROW_HEIGHT: f32 = 18.0;

/// Render the rows of `view` as a scrollable, striped table.
/// `id` keeps scroll state apart when several tables are on screen.
pub fn data_table(ui: &mut Ui, id: &str, dataset: &Dataset, view: &View, max_height: f32) {
    let columns = dataset.columns();
    ui.push_id(id, |ui: &mut Ui| {
        egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .max_scroll_height(max_height)
                .columns(Column::auto().at_least(60.0).clip(true), columns.len())
                .header(ROW_HEIGHT + 4.0, |mut header| {
                    for col in columns {
                        header.col(|ui: &mut Ui| {
                            ui.strong(&col.name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, view.len(), |mut row| {
                        let dataset_row = view.rows()[row.index()];
                        for col in columns {
                            row.col(|ui: &mut Ui| {
                                let text = col.values[dataset_row].to_string();
                                if col.kind.is_numeric() || col.kind == ColumnKind::Date {
                                    ui.with_layout(
                                        egui::Layout::right_to_left(egui::Align::Center),
                                        |ui: &mut Ui| ui.label(text),
                                    );
                                } else {
                                    ui.label(text);
                                }
                            });
                        }
                    });
                });
        });
    });
}
