use rand::Rng;

use crate::race::{RaceState, SectorTimes};

use super::{
    CommandType, DegradationCurve, PitParameters, PitWindow, RacePrediction, RejoinAnalysis,
    ResponseSource, Sector, SectorAnalysis, StrategyResponse,
};

/// Tire wear above which a pit stop is no longer optional.
const CRITICAL_WEAR_PCT: f32 = 75.0;
/// Minimum wear before an undercut buys anything.
const UNDERCUT_MIN_WEAR_PCT: f32 = 40.0;
/// Rival must be within this gap for an undercut to clear traffic.
const UNDERCUT_MAX_GAP_S: f32 = 1.5;
/// Upper bound of the random pace bonus folded into the PNPA draw.
const PACE_BONUS_MAX_S: f32 = 0.8;
/// Approximate total time lost to a pit stop.
const PIT_LOSS_S: f32 = 22.0;
/// Track temperature above which degradation is forecast as High.
const HIGH_DEG_TRACK_TEMP_C: f32 = 45.0;
/// Laps of tire life bought per percent of remaining wear.
const WEAR_PCT_PER_LAP: f32 = 2.5;
const PIT_WINDOW_LAPS: u32 = 5;

fn round2(value: f32) -> f32 {
    (value * 100.).round() / 100.
}

/// Pick the primary command for a race state given an already-drawn
/// predicted net pace advantage. First matching rule wins.
pub(crate) fn decide(state: &RaceState, pnpa: f32) -> (CommandType, String) {
    if state.tire_wear > CRITICAL_WEAR_PCT {
        return (
            CommandType::MandatoryPit,
            format!(
                "CRITICAL WEAR ({:.1}%). Structural integrity at risk. Mandatory stop required immediately to avoid delamination.",
                state.tire_wear
            ),
        );
    }
    if state.is_safety_car {
        return (
            CommandType::BoxNow,
            "SAFETY CAR DEPLOYED. Cheap pit stop opportunity. Minimize time loss while field is neutralized.".to_string(),
        );
    }
    if pnpa > 0.
        && state.rival_gap < UNDERCUT_MAX_GAP_S
        && state.tire_wear > UNDERCUT_MIN_WEAR_PCT
    {
        return (
            CommandType::BoxNow,
            format!(
                "UNDERCUT OPPORTUNITY. PNPA is +{pnpa:.2}s. Rival pace fading. Box now to clear traffic and capitalize on fresh tire delta."
            ),
        );
    }
    let sign = if pnpa > 0. { "+" } else { "" };
    (
        CommandType::HoldStint,
        format!(
            "EXTEND STINT. PNPA is {sign}{pnpa:.2}s. Current pace optimal. Overcut strategy favored to shorten final stint."
        ),
    )
}

/// Probability of rejoining ahead of traffic after a stop, clamped to
/// [0, 100] for any gap/delta input.
pub(crate) fn rejoin_score(rival_gap: f32, rival_pace_delta: f32) -> u8 {
    (75. + rival_gap * 5. + rival_pace_delta * 10.)
        .floor()
        .clamp(0., 100.) as u8
}

/// The sector with the largest loss against benchmark.
///
/// Chained strict-greater comparisons seeded with S1, so an exact tie always
/// reports the earlier sector.
pub fn worst_sector(sectors: &SectorTimes) -> (Sector, f32) {
    let s1_diff = sectors.s1 - sectors.s1_benchmark;
    let s2_diff = sectors.s2 - sectors.s2_benchmark;
    let s3_diff = sectors.s3 - sectors.s3_benchmark;

    let mut problem_sector = Sector::S1;
    let mut max_diff = s1_diff;
    if s2_diff > max_diff {
        problem_sector = Sector::S2;
        max_diff = s2_diff;
    }
    if s3_diff > max_diff {
        problem_sector = Sector::S3;
        max_diff = s3_diff;
    }
    (problem_sector, max_diff)
}

/// Deterministic strategy generator used whenever the external model is
/// unavailable or returns garbage.
///
/// All randomness comes from the injected generator; with a fixed seed the
/// full response is reproducible.
pub fn generate(state: &RaceState, rng: &mut impl Rng) -> StrategyResponse {
    // predicted net pace advantage: measured delta plus a bounded bonus,
    // sign-tested after rounding to two decimals
    let pace_bonus = rng.gen_range(0.0..PACE_BONUS_MAX_S);
    let pnpa = round2(state.rival_pace_delta + pace_bonus);

    let (primary_command, strategy_rationale) = decide(state, pnpa);

    let (problem_sector, max_diff) = worst_sector(&state.sectors);
    let time_loss = round2(max_diff);

    let tire_compound = if rng.r#gen::<f32>() > 0.6 {
        "Soft"
    } else {
        "Medium"
    };
    let fuel_liters = 40 + rng.gen_range(0..10u32);
    let rival_exit_gap = state.rival_gap - PIT_LOSS_S + rng.gen_range(0.0..2.0f32);
    let attack_sector = rng.gen_range(1..=3u32);
    let apex_speed_gain = rng.gen_range(0.0..8.0f32);
    let predicted_finish_pos = rng.gen_range(1..=5u32);
    let quali_fraction = rng.r#gen::<f32>();

    StrategyResponse {
        primary_command,
        strategy_rationale,
        pit_parameters: PitParameters {
            tire_compound: tire_compound.to_string(),
            fuel_liters,
        },
        rejoin_analysis: RejoinAnalysis {
            pra_score: rejoin_score(state.rival_gap, state.rival_pace_delta),
            rival_exit_gap: format!("{rival_exit_gap:.1}s"),
        },
        pit_window: PitWindow {
            start_lap: state.current_lap + 1,
            end_lap: state.current_lap + PIT_WINDOW_LAPS,
        },
        driver_execution: format!(
            "Sector {attack_sector} Attack. Target Apex Speed +{apex_speed_gain:.0}kph."
        ),
        debrief_summary:
            "Telemetry indicates varying grip levels. Tire thermal degradation strictly within predicted limits."
                .to_string(),
        sector_analysis: SectorAnalysis {
            problem_sector,
            time_loss,
            advice: format!("Losing {time_loss:.2}s in {problem_sector}. Focus on exit rotation."),
        },
        race_prediction: RacePrediction {
            predicted_finish_pos,
            tire_life_remaining_laps: ((100. - state.tire_wear).max(0.) / WEAR_PCT_PER_LAP).floor()
                as u32,
            degradation_curve: if state.weather.track_temp_c > HIGH_DEG_TRACK_TEMP_C {
                DegradationCurve::High
            } else {
                DegradationCurve::Medium
            },
            predicted_qualifying_pace: format!("1:{:.3}", 34. + quali_fraction),
        },
        source: ResponseSource::Simulation,
    }
}
