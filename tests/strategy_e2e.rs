// Integration tests for the strategy decision path
//
// This suite validates the complete dual-path flow:
// 1. Scenario table from race snapshots to primary commands
// 2. Silent degradation to the local generator on model failure
// 3. Output invariants (rejoin clamp, relative pit window, sector tie-break)

use rand::{SeedableRng, rngs::SmallRng};

use pitwall::strategy::{StrategyModel, fallback};
use pitwall::{
    CommandType, PitwallError, RaceState, ResponseSource, StrategyEngine, StrategyResponse,
};

/// A model endpoint that always fails, simulating an unreachable service.
struct UnreachableModel;

impl StrategyModel for UnreachableModel {
    fn request_strategy(&self, _: &RaceState) -> Result<StrategyResponse, PitwallError> {
        Err(PitwallError::ModelStatusError { status: 503 })
    }

    fn answer_query(&self, _: &str, _: &RaceState) -> Result<String, PitwallError> {
        Err(PitwallError::ModelStatusError { status: 503 })
    }

    fn synthesize_speech(&self, _: &str) -> Result<String, PitwallError> {
        Err(PitwallError::ModelStatusError { status: 503 })
    }
}

fn scenario(tire_wear: f32, is_safety_car: bool) -> RaceState {
    RaceState {
        tire_wear,
        is_safety_car,
        ..Default::default()
    }
}

#[test]
fn test_critical_wear_scenario_returns_mandatory_pit() {
    let engine = StrategyEngine::new(None);
    let mut rng = SmallRng::seed_from_u64(0);
    let response = engine.recommend(&scenario(80., false), &mut rng);
    assert_eq!(response.primary_command, CommandType::MandatoryPit);
}

#[test]
fn test_safety_car_scenario_returns_box_now() {
    let engine = StrategyEngine::new(None);
    let mut rng = SmallRng::seed_from_u64(0);
    let response = engine.recommend(&scenario(50., true), &mut rng);
    assert_eq!(response.primary_command, CommandType::BoxNow);
}

#[test]
fn test_undercut_scenario_depends_on_pace_draw() {
    let engine = StrategyEngine::new(None);

    // rival within reach and a pace delta that stays positive for any draw
    let mut undercut = scenario(50., false);
    undercut.rival_gap = 1.0;
    undercut.rival_pace_delta = 0.5;
    for seed in 0..20 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let response = engine.recommend(&undercut, &mut rng);
        assert_eq!(response.primary_command, CommandType::BoxNow);
    }

    // a pace delta that stays non-positive for any draw extends the stint
    let mut holding = undercut.clone();
    holding.rival_pace_delta = -5.;
    for seed in 0..20 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let response = engine.recommend(&holding, &mut rng);
        assert_eq!(response.primary_command, CommandType::HoldStint);
    }
}

#[test]
fn test_model_failure_never_raises_and_tags_fallback() {
    let engine = StrategyEngine::new(Some(Box::new(UnreachableModel)));
    let mut rng = SmallRng::seed_from_u64(9);

    let response = engine.recommend(&scenario(80., false), &mut rng);
    assert_eq!(response.source, ResponseSource::Simulation);
    assert_eq!(response.primary_command, CommandType::MandatoryPit);

    // the chat path degrades to its fixed placeholder the same way
    let reply = engine.answer_query("should we box?", &scenario(50., false));
    assert_eq!(reply, "Say again?");
    assert!(engine.synthesize_speech("BOX NOW").is_none());
}

#[test]
fn test_rejoin_score_clamped_for_extreme_states() {
    let engine = StrategyEngine::new(None);
    let mut rng = SmallRng::seed_from_u64(0);

    let mut runaway = scenario(50., false);
    runaway.rival_gap = 1e6;
    runaway.rival_pace_delta = 1e6;
    let response = engine.recommend(&runaway, &mut rng);
    assert_eq!(response.rejoin_analysis.pra_score, 100);

    let mut buried = scenario(50., false);
    buried.rival_gap = -1e6;
    buried.rival_pace_delta = -1e6;
    let response = engine.recommend(&buried, &mut rng);
    assert_eq!(response.rejoin_analysis.pra_score, 0);
}

#[test]
fn test_pit_window_tracks_decision_lap() {
    let engine = StrategyEngine::new(None);
    for lap in [1, 22, 60] {
        let mut state = scenario(50., false);
        state.current_lap = lap;
        let mut rng = SmallRng::seed_from_u64(3);
        let response = engine.recommend(&state, &mut rng);
        assert_eq!(response.pit_window.start_lap, lap + 1);
        assert_eq!(response.pit_window.end_lap, lap + 5);
    }
}

#[test]
fn test_equal_sector_deltas_report_s1() {
    // exactly representable benchmarks so the three deltas tie exactly
    let mut state = scenario(50., false);
    state.sectors.s1_benchmark = 32.0;
    state.sectors.s2_benchmark = 54.0;
    state.sectors.s3_benchmark = 60.0;
    state.sectors.s1 = 32.25;
    state.sectors.s2 = 54.25;
    state.sectors.s3 = 60.25;

    let (sector, _) = fallback::worst_sector(&state.sectors);
    assert_eq!(sector.to_string(), "S1");

    let engine = StrategyEngine::new(None);
    let mut rng = SmallRng::seed_from_u64(5);
    let response = engine.recommend(&state, &mut rng);
    assert_eq!(response.sector_analysis.problem_sector.to_string(), "S1");
}
