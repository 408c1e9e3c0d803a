use std::collections::BTreeMap;

use ordnance::ballistics::{
    Affector, AirResistance, BallisticEngine, BallisticInputs, BallisticsError, FlightHook,
    Gravity, HookPhase, Parachute, ParachuteTriggers, ShotState, TraceMode, Vector, Wind,
    PARACHUTE_DAMPING, TICK_SECONDS,
};
use ordnance::config::EngineConfig;

fn approx_eq(a: f64, b: f64, tol: f64) {
    assert!((a - b).abs() <= tol, "expected {b}, got {a}");
}

fn state(velocity: Vector) -> ShotState {
    ShotState::new(1.0, 0.01, Vector::new(0.0, 0.0, 100.0), velocity)
}

fn inputs(angle_deg: f64, initial_velocity: f64, surface_area: f64) -> BallisticInputs {
    BallisticInputs {
        angle_deg,
        deflection_deg: 0.0,
        initial_velocity,
        shell_weight: 10.0,
        surface_area,
        area_of_effect: 0.0,
    }
}

#[test]
fn gravity_is_independent_of_state() {
    let earth = Gravity::default().acceleration(&state(Vector::new(300.0, 5.0, -40.0)), TICK_SECONDS);
    assert_eq!(earth, Vector::new(0.0, 0.0, -9.81));

    let moon = Gravity::new(1.62).acceleration(&state(Vector::ZERO), TICK_SECONDS);
    assert_eq!(moon, Vector::new(0.0, 0.0, -1.62));
}

#[test]
fn drag_opposes_velocity_with_quadratic_magnitude() {
    let drag = AirResistance::default().acceleration(&state(Vector::new(10.0, 0.0, 0.0)), TICK_SECONDS);
    approx_eq(drag.x, -0.287875, 1e-9);
    approx_eq(drag.y, 0.0, 1e-15);
    approx_eq(drag.z, 0.0, 1e-15);
}

#[test]
fn drag_is_zero_at_rest() {
    let drag = AirResistance::default().acceleration(&state(Vector::ZERO), TICK_SECONDS);
    assert_eq!(drag, Vector::ZERO);
}

#[test]
fn wind_scales_with_surface_area_only() {
    let wind = Wind::new(Vector::new(3.0, -1.0, 0.0));
    let slow = wind.acceleration(&state(Vector::ZERO), TICK_SECONDS);
    let fast = wind.acceleration(&state(Vector::new(500.0, 0.0, 0.0)), TICK_SECONDS);
    assert_eq!(slow, fast);
    approx_eq(slow.x, 0.03, 1e-15);
    approx_eq(slow.y, -0.01, 1e-15);
}

#[test]
fn affectors_accumulate_into_acceleration() {
    let mut shot = state(Vector::new(10.0, 0.0, 0.0));
    Gravity::default().apply(&mut shot, TICK_SECONDS);
    AirResistance::default().apply(&mut shot, TICK_SECONDS);
    approx_eq(shot.acceleration.x, -0.287875, 1e-9);
    approx_eq(shot.acceleration.z, -9.81, 1e-12);
}

#[test]
fn parachute_damps_velocity_exactly_once() {
    let mut parachute = Parachute::new(ParachuteTriggers {
        time: Some(1.0),
        ..ParachuteTriggers::default()
    });
    let mut shot = state(Vector::new(100.0, 0.0, -50.0));
    shot.time = 1.0;
    parachute.on_tick(&mut shot, TICK_SECONDS);
    assert!(parachute.deployed());
    approx_eq(shot.velocity.x, 100.0 * PARACHUTE_DAMPING, 1e-12);

    shot.time = 2.0;
    parachute.on_tick(&mut shot, TICK_SECONDS);
    approx_eq(shot.velocity.x, 30.0, 1e-12);
    approx_eq(shot.velocity.z, -15.0, 1e-12);
}

#[test]
fn from_values_rejects_missing_mandatory_inputs() {
    let mut values = BTreeMap::new();
    values.insert("angle_deg".to_string(), 45.0);
    values.insert("initial_velocity".to_string(), 200.0);
    assert_eq!(
        BallisticInputs::from_values(&values),
        Err(BallisticsError::MissingInput("shell_weight"))
    );

    values.insert("shell_weight".to_string(), 5.0);
    let parsed = BallisticInputs::from_values(&values).unwrap();
    assert_eq!(parsed.deflection_deg, 0.0);
    assert_eq!(parsed.surface_area, 0.0);
}

#[test]
fn vacuum_flight_matches_closed_form_within_a_tick() {
    let mut engine = BallisticEngine::bare(&EngineConfig::default())
        .with_affector(Box::new(Gravity::default()));
    let outcome = engine.simulate(&inputs(45.0, 100.0, 0.0)).unwrap();

    let expected_time = 2.0 * 100.0 * 45f64.to_radians().sin() / 9.81;
    approx_eq(outcome.flight_time, expected_time, 2.0 * TICK_SECONDS);
    let expected_range = 100.0 * 100.0 / 9.81;
    assert!((outcome.range() - expected_range).abs() / expected_range < 0.02);
    assert!(outcome.impact_xyz[2] <= 0.0);
}

#[test]
fn drag_shortens_the_shot() {
    let config = EngineConfig::default();
    let vacuum = BallisticEngine::bare(&config)
        .with_affector(Box::new(Gravity::default()))
        .simulate(&inputs(40.0, 300.0, 0.02))
        .unwrap();
    let with_air = BallisticEngine::from_config(&config)
        .simulate(&inputs(40.0, 300.0, 0.02))
        .unwrap();
    assert!(with_air.range() < vacuum.range());
}

#[test]
fn trace_rises_then_falls_and_ends_at_ground() {
    let outcome = BallisticEngine::default()
        .simulate(&inputs(60.0, 150.0, 0.01))
        .unwrap();
    let apex = outcome.apex().unwrap();
    assert!(apex > outcome.trace[0][2]);
    let last = outcome.trace.last().unwrap();
    assert!(last[2] <= 0.0);
    assert!(outcome.trace.len() as u32 == outcome.ticks);
}

#[test]
fn first_tick_runs_even_when_launched_at_ground() {
    let outcome = BallisticEngine::default()
        .simulate(&inputs(-10.0, 50.0, 0.0))
        .unwrap();
    assert_eq!(outcome.ticks, 1);
}

#[test]
fn tick_ceiling_reports_non_termination() {
    let config = EngineConfig {
        max_ticks: 10,
        ..EngineConfig::default()
    };
    let err = BallisticEngine::from_config(&config)
        .simulate(&inputs(80.0, 500.0, 0.0))
        .unwrap_err();
    assert!(matches!(err, BallisticsError::DidNotTerminate { ticks: 10, .. }));
}

#[test]
fn trace_off_records_nothing() {
    let outcome = BallisticEngine::default()
        .with_trace_mode(TraceMode::Off)
        .simulate(&inputs(30.0, 120.0, 0.0))
        .unwrap();
    assert!(outcome.trace.is_empty());
    assert!(outcome.flight_time > 0.0);
}

#[test]
fn hooks_route_by_phase_and_reset_between_shots() {
    let parachute = Parachute::new(ParachuteTriggers {
        time: Some(0.5),
        ..ParachuteTriggers::default()
    })
    .with_phase(HookPhase::AfterTick);
    let mut engine = BallisticEngine::default().with_hook(Box::new(parachute));
    assert_eq!(engine.hook_names(), vec!["parachute"]);

    let first = engine.simulate(&inputs(45.0, 200.0, 0.01)).unwrap();
    let second = engine.simulate(&inputs(45.0, 200.0, 0.01)).unwrap();
    assert_eq!(first.impact_xyz, second.impact_xyz);
    assert_eq!(first.ticks, second.ticks);
}
