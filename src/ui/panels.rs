use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use solar_dashboard::Metric;

use crate::state::AppState;
use crate::ui::charts::legend_entry;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Options");
    ui.separator();

    let countries = match state.cache.get() {
        Some(ds) => ds.countries().to_vec(),
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Countries ----
            let header_text = format!("Countries  ({}/{})", state.selection.len(), countries.len());
            egui::CollapsingHeader::new(RichText::new(header_text).strong())
                .id_salt("countries")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.select_all();
                        }
                        if ui.small_button("None").clicked() {
                            state.select_none();
                        }
                    });

                    for country in &countries {
                        let mut checked = state.selection.contains(country);
                        let text = RichText::new(country.name()).color(state.colors.color_for(country));
                        if ui.checkbox(&mut checked, text).changed() {
                            state.toggle_country(country);
                        }
                    }
                });
            ui.separator();

            // ---- Metric selectors ----
            ui.strong("Metric for Analysis");
            let mut metric = state.metric;
            metric_combo(ui, "metric", &mut metric);
            state.set_metric(metric);

            ui.add_space(6.0);
            ui.strong("Rank countries by");
            let mut ranking_metric = state.ranking_metric;
            metric_combo(ui, "ranking_metric", &mut ranking_metric);
            state.set_ranking_metric(ranking_metric);
            ui.separator();

            // ---- Legend ----
            ui.strong("Legend");
            for country in &countries {
                legend_entry(ui, country.name(), state.colors.color_for(country));
            }
        });
}

fn metric_combo(ui: &mut Ui, id: &str, metric: &mut Metric) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(metric.label())
        .show_ui(ui, |ui: &mut Ui| {
            for m in Metric::ALL {
                ui.selectable_value(metric, m, m.label());
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
            if ui.button("Open data folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = state.cache.get() {
            let visible = state.views.as_ref().map_or(0, |v| v.rows);
            ui.label(format!("{} records loaded, {} selected", ds.len(), visible));
        }

        ui.separator();
        ui.label(format!("Data: {}", state.config.data_dir.display()));

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Folder dialog
// ---------------------------------------------------------------------------

pub fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Open folder with cleaned CSV files")
        .set_directory(&state.config.data_dir)
        .pick_folder();

    if let Some(dir) = folder {
        state.set_data_dir(dir);
    }
}
