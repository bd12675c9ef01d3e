pub(crate) mod collector;
pub mod producer;
pub mod simulator;

pub use collector::run_session;
use serde::{Deserialize, Serialize};

/// One reading of the car's raw data channels, regenerated on every tick.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CarTelemetry {
    /// Current speed (km/h)
    pub speed_kph: f32,
    /// Current gear (1-6)
    pub gear: u32,
    /// Current engine RPM
    pub rpm: f32,
    /// Throttle pedal position, 0-100%
    pub throttle_pedal: f32,
    /// Throttle blade opening, 0-100%; trails the pedal under traction control
    pub throttle_blade: f32,
    /// Front brake line pressure (bar)
    pub brake_pressure_front: f32,
    /// Rear brake line pressure (bar)
    pub brake_pressure_rear: f32,
    /// Steering wheel angle (deg)
    pub steering_angle_deg: f32,
    /// Lateral acceleration (g)
    pub lat_g: f32,
    /// Longitudinal acceleration (g)
    pub long_g: f32,
}

impl Default for CarTelemetry {
    fn default() -> Self {
        Self {
            speed_kph: 185.,
            gear: 4,
            rpm: 6200.,
            throttle_pedal: 85.,
            throttle_blade: 85.,
            brake_pressure_front: 0.,
            brake_pressure_rear: 0.,
            steering_angle_deg: 0.,
            lat_g: 0.1,
            long_g: 0.2,
        }
    }
}

/// Ambient and track conditions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WeatherData {
    /// Air temperature (Celsius)
    pub air_temp_c: f32,
    /// Track surface temperature (Celsius)
    pub track_temp_c: f32,
    /// Relative humidity, 0-100%
    pub humidity_pct: f32,
    /// Wind speed (km/h)
    pub wind_speed_kph: f32,
    /// Whether it is currently raining
    pub rain: bool,
}

impl Default for WeatherData {
    fn default() -> Self {
        Self {
            air_temp_c: 28.6,
            track_temp_c: 43.2,
            humidity_pct: 62.,
            wind_speed_kph: 23.,
            rain: false,
        }
    }
}

/// Current sector times against the session's benchmark times.
///
/// Current times are regenerated each tick and never fall below their
/// benchmark; the benchmarks are static for the session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SectorTimes {
    pub s1: f32,
    pub s2: f32,
    pub s3: f32,
    pub s1_benchmark: f32,
    pub s2_benchmark: f32,
    pub s3_benchmark: f32,
}

impl Default for SectorTimes {
    fn default() -> Self {
        Self {
            s1: 32.8,
            s2: 54.8,
            s3: 60.5,
            s1_benchmark: 32.6,
            s2_benchmark: 54.3,
            s3_benchmark: 59.9,
        }
    }
}

/// A full snapshot of the simulated race world.
///
/// Snapshots are value types: the simulator produces a fresh one per tick
/// from the previous one, and nothing outside the simulator mutates them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RaceState {
    /// Lap currently being driven
    pub current_lap: u32,
    /// Scheduled race distance in laps
    pub total_laps: u32,
    /// Tire wear, 0-100%; monotonically non-decreasing
    pub tire_wear: f32,
    /// Fuel left in the tank (liters); monotonically non-increasing
    pub fuel_remaining: f32,
    /// Tank capacity (liters)
    pub fuel_capacity: f32,
    /// Gap to the rival (seconds, positive = we are ahead)
    pub rival_gap: f32,
    /// Pace difference to the rival (seconds per lap, positive = we are faster)
    pub rival_pace_delta: f32,
    /// Distance through the current lap, 0-100%
    pub lap_progress: f32,
    /// Whether the safety car is deployed
    pub is_safety_car: bool,
    pub telemetry: CarTelemetry,
    pub weather: WeatherData,
    pub sectors: SectorTimes,
}

impl Default for RaceState {
    fn default() -> Self {
        Self {
            current_lap: 22,
            total_laps: 65,
            tire_wear: 55.,
            fuel_remaining: 40.,
            fuel_capacity: 100.,
            rival_gap: 1.5,
            rival_pace_delta: 0.1,
            lap_progress: 0.,
            is_safety_car: false,
            telemetry: CarTelemetry::default(),
            weather: WeatherData::default(),
            sectors: SectorTimes::default(),
        }
    }
}

/// Session-scoped metadata, emitted once at the start of a session and
/// whenever the producer switches sessions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionMeta {
    pub event_name: String,
    pub total_laps: u32,
    pub fuel_capacity: f32,
}

impl Default for SessionMeta {
    fn default() -> Self {
        Self {
            event_name: "GR Cup".to_string(),
            total_laps: 65,
            fuel_capacity: 100.,
        }
    }
}

/// Wire format of a recorded session: a header record followed by one
/// snapshot per tick, one JSON object per line.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum SessionOutput {
    SessionChange(SessionMeta),
    Snapshot(Box<RaceState>),
}
