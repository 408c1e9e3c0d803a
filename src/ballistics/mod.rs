pub mod affectors;
pub mod engine;
pub mod export_csv;
pub mod hooks;
pub mod state;
pub mod vector;

pub use affectors::{
    Affector, AirResistance, Gravity, Wind, SPHERE_DRAG_COEFFICIENT, STANDARD_AIR_DENSITY,
    STANDARD_GRAVITY,
};
pub use engine::{
    BallisticEngine, BallisticInputs, BallisticsError, ShotOutcome, TraceMode, DEFAULT_MAX_TICKS,
    TICK_SECONDS,
};
pub use export_csv::{export_trace_csv, write_trace_csv};
pub use hooks::{FlightHook, HookPhase, Parachute, ParachuteTriggers, PARACHUTE_DAMPING};
pub use state::ShotState;
pub use vector::Vector;
