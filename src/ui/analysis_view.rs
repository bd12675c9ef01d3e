use egui::{Color32, RichText, Vec2b};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Line, PlotPoints, Points};
use itertools::Itertools;

use crate::strategy::fallback;

use super::{PALETTE_AMBER, PALETTE_GRAY, PALETTE_GREEN, PALETTE_RED, PitwallApp};

impl PitwallApp {
    pub(crate) fn analysis_view(&mut self, ui: &mut egui::Ui) {
        ui.columns(2, |columns| {
            {
                let ui = &mut columns[0];
                self.sector_table(ui);
                ui.separator();
                self.prediction_card(ui);
            }
            {
                let ui = &mut columns[1];
                self.pace_trend_plot(ui);
                ui.separator();
                self.track_map(ui);
            }
        });
    }

    fn sector_table(&self, ui: &mut egui::Ui) {
        ui.heading("Sector Performance");
        let sectors = &self.race_state.sectors;
        let rows = [
            ("S1", sectors.s1, sectors.s1_benchmark),
            ("S2", sectors.s2, sectors.s2_benchmark),
            ("S3", sectors.s3, sectors.s3_benchmark),
        ];
        let (problem_sector, _) = fallback::worst_sector(sectors);

        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto().at_least(40.))
            .column(Column::auto().at_least(80.))
            .column(Column::auto().at_least(80.))
            .column(Column::remainder())
            .header(20., |mut header| {
                header.col(|ui| {
                    ui.strong("Sector");
                });
                header.col(|ui| {
                    ui.strong("Current");
                });
                header.col(|ui| {
                    ui.strong("Benchmark");
                });
                header.col(|ui| {
                    ui.strong("Delta");
                });
            })
            .body(|mut body| {
                for (name, current, benchmark) in rows {
                    body.row(18., |mut row| {
                        row.col(|ui| {
                            if name == problem_sector.to_string() {
                                ui.label(RichText::new(name).color(PALETTE_RED).strong());
                            } else {
                                ui.label(name);
                            }
                        });
                        row.col(|ui| {
                            ui.label(format!("{current:.3}"));
                        });
                        row.col(|ui| {
                            ui.label(format!("{benchmark:.3}"));
                        });
                        row.col(|ui| {
                            let delta = current - benchmark;
                            let color = if delta > 0.2 { PALETTE_RED } else { PALETTE_GREEN };
                            ui.label(RichText::new(format!("{delta:+.3}")).color(color));
                        });
                    });
                }
            });

        if let Some(strategy) = &self.strategy {
            ui.add_space(6.);
            ui.label(
                RichText::new(&strategy.sector_analysis.advice).color(PALETTE_AMBER),
            );
        }
    }

    fn prediction_card(&self, ui: &mut egui::Ui) {
        ui.heading("Race Prediction");
        match &self.strategy {
            Some(strategy) => {
                let prediction = &strategy.race_prediction;
                egui::Grid::new("race_prediction")
                    .num_columns(2)
                    .spacing([24., 4.])
                    .show(ui, |ui| {
                        ui.label("Finish position");
                        ui.label(format!("P{}", prediction.predicted_finish_pos));
                        ui.end_row();
                        ui.label("Tire life");
                        ui.label(format!("{} laps", prediction.tire_life_remaining_laps));
                        ui.end_row();
                        ui.label("Degradation");
                        ui.label(prediction.degradation_curve.to_string());
                        ui.end_row();
                        ui.label("Qualifying pace");
                        ui.label(&prediction.predicted_qualifying_pace);
                        ui.end_row();
                    });
            }
            None => {
                ui.label(
                    RichText::new("No prediction yet - request a recommendation.")
                        .color(PALETTE_GRAY),
                );
            }
        }
    }

    fn pace_trend_plot(&self, ui: &mut egui::Ui) {
        ui.heading("Rival Pace Trend");

        // median over the window, same percentile trick as the smoothed line
        let median = self
            .pace_trend
            .iter()
            .map(|(raw, _)| *raw)
            .sorted_by(|a, b| a.partial_cmp(b).expect("pace deltas are finite"))
            .nth(self.pace_trend.len() / 2);
        if let Some(median) = median {
            ui.label(
                RichText::new(format!("Median delta {median:+.2}s"))
                    .size(11.)
                    .color(PALETTE_GRAY),
            );
        }

        let raw_points: Vec<[f64; 2]> = self
            .pace_trend
            .iter()
            .enumerate()
            .map(|(i, (raw, _))| [i as f64, *raw as f64])
            .collect();
        let smoothed_points: Vec<[f64; 2]> = self
            .pace_trend
            .iter()
            .enumerate()
            .map(|(i, (_, smoothed))| [i as f64, *smoothed as f64])
            .collect();

        egui_plot::Plot::new("pace_trend")
            .allow_drag(false)
            .allow_scroll(false)
            .allow_zoom(false)
            .height(160.)
            .include_y(-3.)
            .include_y(3.)
            .auto_bounds(Vec2b::new(true, false))
            .show_grid(false)
            .show_background(false)
            .show(ui, |plot_ui| {
                plot_ui.line(Line::new("Delta", PlotPoints::new(raw_points)).color(PALETTE_GRAY));
                plot_ui.line(
                    Line::new("Trend", PlotPoints::new(smoothed_points)).color(PALETTE_AMBER),
                );
            });
    }

    /// Stylized top-down track map: our car and the rival placed on an oval
    /// by lap progress, the rival offset by the current gap.
    fn track_map(&self, ui: &mut egui::Ui) {
        ui.heading("Track Position");

        let state = &self.race_state;
        let sectors = &state.sectors;
        let nominal_lap_s =
            sectors.s1_benchmark + sectors.s2_benchmark + sectors.s3_benchmark;

        let outline: Vec<[f64; 2]> = (0..=100)
            .map(|i| track_point(i as f32))
            .collect();
        let our_pos = track_point(state.lap_progress);
        // positive gap = we are ahead, rival trails behind us on the oval
        let rival_progress =
            (state.lap_progress - state.rival_gap / nominal_lap_s * 100.).rem_euclid(100.);
        let rival_pos = track_point(rival_progress);

        egui_plot::Plot::new("track_map")
            .allow_drag(false)
            .allow_scroll(false)
            .allow_zoom(false)
            .height(200.)
            .data_aspect(1.)
            .show_axes(Vec2b::new(false, false))
            .show_grid(false)
            .show_background(false)
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new("Track", PlotPoints::new(outline)).color(Color32::DARK_GRAY),
                );
                plot_ui.points(
                    Points::new("Car", PlotPoints::new(vec![our_pos]))
                        .color(PALETTE_RED)
                        .radius(6.),
                );
                plot_ui.points(
                    Points::new("Rival", PlotPoints::new(vec![rival_pos]))
                        .color(PALETTE_GRAY)
                        .radius(5.),
                );
            });
    }
}

fn track_point(progress_pct: f32) -> [f64; 2] {
    let angle = (progress_pct / 100.) * std::f32::consts::TAU;
    [angle.cos() as f64, 0.6 * angle.sin() as f64]
}
