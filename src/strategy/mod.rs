use serde::{Deserialize, Serialize};

pub mod engine;
pub mod fallback;
pub mod model;

pub use engine::StrategyEngine;
pub use model::{ModelClient, StrategyModel};

/// The primary call a strategy recommendation can issue to the driver.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum CommandType {
    /// Pit at the end of this lap
    #[serde(rename = "BOX_NOW")]
    BoxNow,
    /// Stay out and extend the current stint
    #[serde(rename = "HOLD_STINT")]
    HoldStint,
    /// Pit immediately, the car cannot safely continue on these tires
    #[serde(rename = "MANDATORY_PIT")]
    MandatoryPit,
}

impl CommandType {
    /// Radio call used for voice alerts and chat log lines.
    pub fn call_sign(&self) -> &'static str {
        match self {
            CommandType::BoxNow => "BOX NOW",
            CommandType::HoldStint => "HOLD STINT",
            CommandType::MandatoryPit => "MANDATORY PIT",
        }
    }
}

impl std::fmt::Display for CommandType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandType::BoxNow => write!(f, "BOX_NOW"),
            CommandType::HoldStint => write!(f, "HOLD_STINT"),
            CommandType::MandatoryPit => write!(f, "MANDATORY_PIT"),
        }
    }
}

/// One of the three timing sectors of the lap.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Sector {
    S1,
    S2,
    S3,
}

impl std::fmt::Display for Sector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sector::S1 => write!(f, "S1"),
            Sector::S2 => write!(f, "S2"),
            Sector::S3 => write!(f, "S3"),
        }
    }
}

/// Predicted shape of the tire degradation curve for the rest of the stint.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum DegradationCurve {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for DegradationCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DegradationCurve::Low => write!(f, "Low"),
            DegradationCurve::Medium => write!(f, "Medium"),
            DegradationCurve::High => write!(f, "High"),
        }
    }
}

/// Which path produced a recommendation.
///
/// Tagged as an explicit variant rather than a string so callers can match
/// on it; the model client never sets this itself, the engine stamps it
/// after a successful remote round trip.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum ResponseSource {
    /// The external generative model produced the recommendation
    #[serde(rename = "MODEL")]
    Model,
    /// The deterministic local generator produced it
    #[default]
    #[serde(rename = "SIMULATION")]
    Simulation,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PitParameters {
    pub tire_compound: String,
    pub fuel_liters: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RejoinAnalysis {
    /// Probability of rejoining ahead of traffic, 0-100
    pub pra_score: u8,
    /// Estimated gap to the rival at pit exit, e.g. "-20.5s"
    pub rival_exit_gap: String,
}

/// Recommended pit-stop lap range, expressed relative to the lap at which
/// the decision was made.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PitWindow {
    pub start_lap: u32,
    pub end_lap: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SectorAnalysis {
    /// The sector where the most time is being lost against benchmark
    pub problem_sector: Sector,
    /// Seconds lost in that sector
    pub time_loss: f32,
    pub advice: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RacePrediction {
    pub predicted_finish_pos: u32,
    pub tire_life_remaining_laps: u32,
    pub degradation_curve: DegradationCurve,
    /// Forecast qualifying lap, e.g. "1:34.218"
    pub predicted_qualifying_pace: String,
}

/// A complete strategy recommendation.
///
/// Produced once per user-triggered request, immutable after creation, and
/// superseded wholesale by the next request - fields are never merged across
/// responses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StrategyResponse {
    pub primary_command: CommandType,
    pub strategy_rationale: String,
    pub pit_parameters: PitParameters,
    pub rejoin_analysis: RejoinAnalysis,
    pub pit_window: PitWindow,
    /// Specific execution advice for the driver, e.g. a sector to attack
    pub driver_execution: String,
    pub debrief_summary: String,
    pub sector_analysis: SectorAnalysis,
    pub race_prediction: RacePrediction,
    #[serde(default)]
    pub source: ResponseSource,
}
