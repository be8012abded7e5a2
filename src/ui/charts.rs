use chrono::DateTime;
use eframe::egui::{self, Color32, RichText, ScrollArea, Stroke, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoints};

use solar_dashboard::{CleaningImpactRow, CleaningStatus, Country, Metric};

use crate::color::{cleaning_color, CountryColors};
use crate::state::{AppState, DerivedViews, LoadProblem};

/// Points drawn per country in the time series; longer series are strided.
const MAX_SERIES_POINTS: usize = 5_000;

const CHART_HEIGHT: f32 = 300.0;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render every chart for the current selection, or the reason there is
/// nothing to draw.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    ui.heading("Cross-Country Solar Farm Analysis Dashboard");
    ui.separator();

    if let Some(problem) = &state.load_problem {
        load_problem(ui, problem);
        return;
    }

    let Some(views) = &state.views else {
        ui.centered_and_justified(|ui: &mut Ui| {
            if state.selection.is_empty() {
                ui.label("Please select at least one country to view data.");
            } else {
                ui.label("The selected countries have no rows.");
            }
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let metric = state.metric;

            ui.strong(format!("Distribution of {metric} Across Selected Countries"));
            box_plot(ui, views, metric, &state.colors);
            ui.add_space(12.0);

            ui.strong(format!("Time Series of {metric}"));
            time_series_plot(ui, views, metric, &state.colors);
            ui.add_space(12.0);

            ui.strong(format!(
                "Average {} Ranking (Selected Countries)",
                state.ranking_metric
            ));
            ranking_table(ui, views, state.ranking_metric);
            ui.add_space(12.0);

            if let Some(rows) = views.cleaning.rows() {
                ui.strong("Average ModA & ModB by Cleaning Event");
                cleaning_chart(ui, rows);
            }
        });
}

fn load_problem(ui: &mut Ui, problem: &LoadProblem) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.add_space(40.0);
        match problem {
            LoadProblem::MissingFile { country, path } => {
                ui.label(
                    RichText::new(format!(
                        "Cleaned data file not found for {country} at {}.",
                        path.display()
                    ))
                    .color(Color32::RED),
                );
                ui.label("Run the cleaning notebooks first, or open another data folder (File → Open data folder…).");
            }
            LoadProblem::Other(message) => {
                ui.label(RichText::new("No data loaded.").color(Color32::RED));
                ui.label(message.as_str());
            }
        }
    });
}

/// Tick labels for plots whose x positions are country indices.
fn country_axis(countries: Vec<Country>) -> impl Fn(egui_plot::GridMark, &std::ops::RangeInclusive<f64>) -> String {
    move |mark, _range| {
        let idx = mark.value.round();
        if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
            return String::new();
        }
        countries
            .get(idx as usize)
            .map(|c| c.to_string())
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Box plot
// ---------------------------------------------------------------------------

fn box_plot(ui: &mut Ui, views: &DerivedViews, metric: Metric, colors: &CountryColors) {
    let countries: Vec<Country> = views.distribution.iter().map(|d| d.country.clone()).collect();

    Plot::new("distribution_plot")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Country")
        .y_axis_label(metric.label())
        .x_axis_formatter(country_axis(countries))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (i, summary) in views.distribution.iter().enumerate() {
                let color = colors.color_for(&summary.country);
                let elem = BoxElem::new(
                    i as f64,
                    BoxSpread::new(
                        summary.lower_whisker,
                        summary.q1,
                        summary.median,
                        summary.q3,
                        summary.upper_whisker,
                    ),
                )
                .name(format!("{} (n = {}, mean = {:.2})", summary.country, summary.count, summary.mean))
                .box_width(0.5)
                .fill(color.gamma_multiply(0.3))
                .stroke(Stroke::new(1.5, color));

                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(summary.country.to_string()));
            }
        });
}

// ---------------------------------------------------------------------------
// Time series
// ---------------------------------------------------------------------------

fn time_series_plot(ui: &mut Ui, views: &DerivedViews, metric: Metric, colors: &CountryColors) {
    Plot::new("time_series_plot")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Timestamp")
        .y_axis_label(metric.label())
        .x_axis_formatter(|mark, _range| {
            DateTime::from_timestamp(mark.value as i64, 0)
                .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default()
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for series in &views.series {
                let stride = series.points.len().div_ceil(MAX_SERIES_POINTS).max(1);
                let points: PlotPoints = series
                    .points
                    .iter()
                    .step_by(stride)
                    .map(|(t, v)| [t.and_utc().timestamp() as f64, *v])
                    .collect();

                let line = Line::new(points)
                    .name(series.country.to_string())
                    .color(colors.color_for(&series.country))
                    .width(1.0);

                plot_ui.line(line);
            }
        });
}

// ---------------------------------------------------------------------------
// Ranking table
// ---------------------------------------------------------------------------

fn ranking_table(ui: &mut Ui, views: &DerivedViews, metric: Metric) {
    if views.ranking.is_empty() {
        ui.label(format!("{metric} data not available for ranking in filtered selection."));
        return;
    }

    ui.push_id("ranking_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .column(Column::auto().at_least(40.0))
            .column(Column::auto().at_least(140.0))
            .column(Column::remainder())
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong("#");
                });
                header.col(|ui| {
                    ui.strong("Country");
                });
                header.col(|ui| {
                    ui.strong(format!("Average {}", metric.label()));
                });
            })
            .body(|mut body| {
                for (rank, entry) in views.ranking.iter().enumerate() {
                    body.row(18.0, |mut row| {
                        row.col(|ui| {
                            ui.label((rank + 1).to_string());
                        });
                        row.col(|ui| {
                            ui.label(entry.country.to_string());
                        });
                        row.col(|ui| {
                            ui.label(format!("{:.2}", entry.mean));
                        });
                    });
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Cleaning impact
// ---------------------------------------------------------------------------

fn cleaning_chart(ui: &mut Ui, rows: &[CleaningImpactRow]) {
    let mut countries: Vec<Country> = Vec::new();
    for row in rows {
        if !countries.contains(&row.country) {
            countries.push(row.country.clone());
        }
    }

    // One chart per (module, cleaning status), offset around the country tick.
    let series = [
        ("ModA", CleaningStatus::NoCleaning, -0.3),
        ("ModA", CleaningStatus::CleaningOccurred, -0.1),
        ("ModB", CleaningStatus::NoCleaning, 0.1),
        ("ModB", CleaningStatus::CleaningOccurred, 0.3),
    ];

    let positions = countries.clone();
    Plot::new("cleaning_plot")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Country")
        .y_axis_label("Mean module reading (W/m²)")
        .x_axis_formatter(country_axis(countries))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (module, status, offset) in series {
                let occurred = status == CleaningStatus::CleaningOccurred;
                let color = if module == "ModA" {
                    cleaning_color(occurred)
                } else {
                    cleaning_color(occurred).gamma_multiply(0.6)
                };
                let bars: Vec<Bar> = rows
                    .iter()
                    .filter(|r| r.status == status)
                    .filter_map(|r| {
                        let idx = positions.iter().position(|c| c == &r.country)?;
                        let value = if module == "ModA" { r.mean_mod_a } else { r.mean_mod_b };
                        Some(
                            Bar::new(idx as f64 + offset, value)
                                .width(0.18)
                                .name(format!("{} · {module} · {status}", r.country)),
                        )
                    })
                    .collect();

                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .name(format!("{module} · {status}"))
                        .color(color),
                );
            }
        });
}

/// Small swatch + label used in the side panel legend.
pub fn legend_entry(ui: &mut Ui, label: &str, color: Color32) {
    ui.horizontal(|ui: &mut Ui| {
        let (rect, _) = ui.allocate_exact_size(egui::vec2(10.0, 10.0), egui::Sense::hover());
        ui.painter().rect_filled(rect, 2.0, color);
        ui.label(label);
    });
}
