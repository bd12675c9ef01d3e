use egui::{Color32, RichText, Vec2b};
use egui_plot::{Line, PlotPoints};

use super::{PALETTE_GRAY, PitwallApp};

impl PitwallApp {
    /// Live readouts plus throttle/brake/steering traces over the history
    /// window.
    pub(crate) fn telemetry_section(&mut self, ui: &mut egui::Ui) {
        let telemetry = &self.race_state.telemetry;
        ui.horizontal(|ui| {
            ui.label(
                RichText::new(format!("{:.0}", telemetry.speed_kph))
                    .size(28.)
                    .strong(),
            );
            ui.label(RichText::new("km/h").color(PALETTE_GRAY));
            ui.separator();
            ui.label(RichText::new(format!("G{}", telemetry.gear)).size(28.).strong());
            ui.separator();
            ui.label(RichText::new(format!("{:.0} rpm", telemetry.rpm)).size(20.));
            ui.separator();
            ui.label(format!("Steer {:+.0}°", telemetry.steering_angle_deg));
            ui.label(format!(
                "G {:+.2}/{:+.2}",
                telemetry.lat_g, telemetry.long_g
            ));
            ui.separator();

            let weather = &self.race_state.weather;
            ui.label(format!(
                "Track {:.1}C  Air {:.1}C  Hum {:.0}%  Wind {:.0}km/h",
                weather.track_temp_c, weather.air_temp_c, weather.humidity_pct,
                weather.wind_speed_kph
            ));
            if weather.rain {
                ui.label(RichText::new("RAIN").color(Color32::LIGHT_BLUE).strong());
            }
        });

        let plot = egui_plot::Plot::new("telemetry_traces")
            .allow_drag(false)
            .allow_scroll(false)
            .allow_zoom(false)
            .height(180.)
            .include_x(0.)
            .include_x(self.window_size_points as f64)
            .include_y(0.)
            .include_y(100.)
            .auto_bounds(Vec2b::new(true, false))
            .show_grid(false);

        let mut throttle_vec = Vec::<[f64; 2]>::new();
        let mut brake_vec = Vec::<[f64; 2]>::new();
        let mut steering_vec = Vec::<[f64; 2]>::new();
        for (i, point) in self.state_history.iter().enumerate() {
            let t = &point.telemetry;
            throttle_vec.push([i as f64, t.throttle_pedal as f64]);
            // brake pressures peak around 65 bar; scale to the same 0-100 axis
            brake_vec.push([
                i as f64,
                (t.brake_pressure_front + t.brake_pressure_rear) as f64 / 65. * 100.,
            ]);
            steering_vec.push([i as f64, 50. + (t.steering_angle_deg as f64 / 30.) * 50.]);
        }

        plot.show_background(false).show(ui, |plot_ui| {
            plot_ui.line(
                Line::new("Throttle", PlotPoints::new(throttle_vec))
                    .color(Color32::GREEN)
                    .fill(0.),
            );
            plot_ui.line(
                Line::new("Brake", PlotPoints::new(brake_vec))
                    .color(Color32::RED)
                    .fill(0.),
            );
            plot_ui.line(
                Line::new("Steering", PlotPoints::new(steering_vec)).color(Color32::LIGHT_GRAY),
            );
        });
    }
}
