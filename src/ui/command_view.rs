use egui::{Color32, RichText};

use crate::strategy::{CommandType, ResponseSource};

use super::{PALETTE_AMBER, PALETTE_GRAY, PALETTE_GREEN, PALETTE_RED, PitwallApp};

/// Placeholder glyph shown wherever strategy data is not available yet.
const PLACEHOLDER: &str = "---";

fn command_color(command: CommandType) -> Color32 {
    match command {
        CommandType::BoxNow => PALETTE_AMBER,
        CommandType::HoldStint => PALETTE_GREEN,
        CommandType::MandatoryPit => PALETTE_RED,
    }
}

impl PitwallApp {
    pub(crate) fn command_view(&mut self, ui: &mut egui::Ui) {
        self.status_strip(ui);
        ui.separator();

        ui.columns(2, |columns| {
            self.command_card(&mut columns[0]);
            self.pit_detail_card(&mut columns[1]);
        });

        ui.separator();
        self.telemetry_section(ui);
    }

    fn status_strip(&self, ui: &mut egui::Ui) {
        let state = &self.race_state;
        ui.horizontal(|ui| {
            ui.label(
                RichText::new(format!("LAP {}/{}", state.current_lap, state.total_laps)).strong(),
            );
            ui.separator();

            ui.label("Tire");
            ui.add(
                egui::ProgressBar::new(state.tire_wear / 100.)
                    .desired_width(120.)
                    .text(format!("{:.1}%", state.tire_wear)),
            );
            ui.label("Fuel");
            ui.add(
                egui::ProgressBar::new(state.fuel_remaining / state.fuel_capacity)
                    .desired_width(120.)
                    .text(format!("{:.1}L", state.fuel_remaining)),
            );
            ui.separator();

            let gap_color = if state.rival_gap >= 0. {
                PALETTE_GREEN
            } else {
                PALETTE_RED
            };
            ui.label(RichText::new(format!("Gap {:+.2}s", state.rival_gap)).color(gap_color));
            ui.label(
                RichText::new(format!("Pace {:+.2}s", state.rival_pace_delta)).color(PALETTE_GRAY),
            );

            if state.is_safety_car {
                ui.label(
                    RichText::new("SAFETY CAR")
                        .color(Color32::BLACK)
                        .background_color(PALETTE_AMBER)
                        .strong(),
                );
            }
        });
    }

    fn command_card(&self, ui: &mut egui::Ui) {
        ui.heading("Strategy Command");
        match &self.strategy {
            Some(strategy) => {
                ui.label(
                    RichText::new(strategy.primary_command.call_sign())
                        .size(32.)
                        .color(command_color(strategy.primary_command))
                        .strong(),
                );
                ui.label(&strategy.strategy_rationale);
                ui.add_space(6.);
                ui.label(RichText::new(&strategy.driver_execution).italics());
                ui.add_space(6.);
                let source_label = match strategy.source {
                    ResponseSource::Model => "LIVE MODEL",
                    ResponseSource::Simulation => "LOCAL SIM",
                };
                ui.label(RichText::new(source_label).size(10.).color(PALETTE_GRAY));
            }
            None => {
                ui.label(RichText::new(PLACEHOLDER).size(32.).color(PALETTE_GRAY));
                ui.label(
                    RichText::new("Request a recommendation to populate this panel.")
                        .color(PALETTE_GRAY),
                );
            }
        }
    }

    fn pit_detail_card(&self, ui: &mut egui::Ui) {
        ui.heading("Pit Parameters");
        egui::Grid::new("pit_parameters")
            .num_columns(2)
            .spacing([24., 4.])
            .show(ui, |ui| {
                let strategy = self.strategy.as_ref();

                ui.label("Compound");
                ui.label(
                    strategy
                        .map(|s| s.pit_parameters.tire_compound.clone())
                        .unwrap_or_else(|| PLACEHOLDER.to_string()),
                );
                ui.end_row();

                ui.label("Fuel");
                ui.label(
                    strategy
                        .map(|s| format!("{}L", s.pit_parameters.fuel_liters))
                        .unwrap_or_else(|| PLACEHOLDER.to_string()),
                );
                ui.end_row();

                ui.label("Pit window");
                ui.label(
                    strategy
                        .map(|s| format!("Lap {} - {}", s.pit_window.start_lap, s.pit_window.end_lap))
                        .unwrap_or_else(|| PLACEHOLDER.to_string()),
                );
                ui.end_row();

                ui.label("Rejoin score");
                ui.label(
                    strategy
                        .map(|s| format!("{}/100", s.rejoin_analysis.pra_score))
                        .unwrap_or_else(|| PLACEHOLDER.to_string()),
                );
                ui.end_row();

                ui.label("Rival exit gap");
                ui.label(
                    strategy
                        .map(|s| s.rejoin_analysis.rival_exit_gap.clone())
                        .unwrap_or_else(|| PLACEHOLDER.to_string()),
                );
                ui.end_row();
            });

        if let Some(strategy) = &self.strategy {
            ui.add_space(8.);
            ui.label(RichText::new(&strategy.debrief_summary).color(PALETTE_GRAY));
        }
    }
}
