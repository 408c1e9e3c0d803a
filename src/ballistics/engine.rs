//! Fixed-timestep shot integrator.
//!
//! Each tick runs before-tick hooks, then every affector (additive acceleration),
//! then an explicit Euler step, then after-tick hooks, and finally records the
//! position. The first tick always runs; the loop stops once the shell is at or
//! below the ground plane, or fails after `max_ticks`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ballistics::affectors::{Affector, AirResistance, Gravity, Wind};
use crate::ballistics::hooks::{FlightHook, HookPhase};
use crate::ballistics::state::ShotState;
use crate::ballistics::vector::Vector;
use crate::config::EngineConfig;
use crate::pipeline::keys;

/// Integration step (seconds).
pub const TICK_SECONDS: f64 = 0.05;
pub const DEFAULT_MAX_TICKS: u32 = 100_000;

#[derive(Debug, Clone, PartialEq)]
pub enum BallisticsError {
    MissingInput(&'static str),
    InvalidInput { field: &'static str, value: f64 },
    DidNotTerminate { ticks: u32, altitude: f64 },
}

impl fmt::Display for BallisticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInput(field) => write!(f, "missing mandatory ballistic input '{field}'"),
            Self::InvalidInput { field, value } => {
                write!(f, "invalid ballistic input '{field}': {value}")
            }
            Self::DidNotTerminate { ticks, altitude } => write!(
                f,
                "shot did not terminate after {ticks} ticks (altitude {altitude:.2} m)"
            ),
        }
    }
}

impl std::error::Error for BallisticsError {}

/// Resolved firing parameters for one shot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallisticInputs {
    pub angle_deg: f64,
    #[serde(default)]
    pub deflection_deg: f64,
    pub initial_velocity: f64,
    pub shell_weight: f64,
    #[serde(default)]
    pub surface_area: f64,
    /// Carried through to the outcome for the hit evaluator; unused by the physics.
    #[serde(default)]
    pub area_of_effect: f64,
}

impl BallisticInputs {
    /// Builds inputs from named values. Angle, velocity and shell weight are mandatory;
    /// the rest default to zero.
    pub fn from_values(values: &BTreeMap<String, f64>) -> Result<Self, BallisticsError> {
        let required = |key: &'static str| {
            values
                .get(key)
                .copied()
                .ok_or(BallisticsError::MissingInput(key))
        };
        let optional = |key: &str| values.get(key).copied().unwrap_or(0.0);

        let inputs = Self {
            angle_deg: required(keys::ANGLE_DEG)?,
            deflection_deg: optional(keys::DEFLECTION_DEG),
            initial_velocity: required(keys::INITIAL_VELOCITY)?,
            shell_weight: required(keys::SHELL_WEIGHT)?,
            surface_area: optional(keys::SURFACE_AREA),
            area_of_effect: optional(keys::AREA_OF_EFFECT),
        };
        inputs.validate()?;
        Ok(inputs)
    }

    pub fn validate(&self) -> Result<(), BallisticsError> {
        let checks: [(&'static str, f64, bool); 5] = [
            (keys::ANGLE_DEG, self.angle_deg, self.angle_deg.is_finite()),
            (keys::DEFLECTION_DEG, self.deflection_deg, self.deflection_deg.is_finite()),
            (keys::INITIAL_VELOCITY, self.initial_velocity, self.initial_velocity > 0.0),
            (keys::SHELL_WEIGHT, self.shell_weight, self.shell_weight > 0.0),
            (keys::SURFACE_AREA, self.surface_area, self.surface_area >= 0.0),
        ];
        for (field, value, ok) in checks {
            if !ok || !value.is_finite() {
                return Err(BallisticsError::InvalidInput { field, value });
            }
        }
        Ok(())
    }

    /// Spherical decomposition of the muzzle velocity.
    pub fn launch_velocity(&self) -> Vector {
        let angle = self.angle_deg.to_radians();
        let deflection = self.deflection_deg.to_radians();
        let v = self.initial_velocity;
        Vector::new(
            v * angle.cos() * deflection.cos(),
            v * angle.cos() * deflection.sin(),
            v * angle.sin(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceMode {
    /// No per-tick recording (batch runs).
    Off,
    /// Positions only.
    #[default]
    Positions,
    /// Positions plus full state snapshots.
    Full,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShotOutcome {
    /// Final position rounded to 2 decimals.
    pub impact_xyz: [f64; 3],
    pub flight_time: f64,
    pub ticks: u32,
    pub area_of_effect: f64,
    pub trace: Vec<[f64; 3]>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub snapshots: Vec<ShotState>,
}

impl ShotOutcome {
    pub fn impact(&self) -> Vector {
        Vector::from(self.impact_xyz)
    }

    /// Horizontal distance from the launch point to the impact.
    pub fn range(&self) -> f64 {
        self.impact_xyz[0].hypot(self.impact_xyz[1])
    }

    pub fn apex(&self) -> Option<f64> {
        self.trace.iter().map(|p| p[2]).reduce(f64::max)
    }
}

#[derive(Debug)]
pub struct BallisticEngine {
    max_ticks: u32,
    launch_height: f64,
    trace_mode: TraceMode,
    affectors: Vec<Box<dyn Affector>>,
    before_hooks: Vec<Box<dyn FlightHook>>,
    after_hooks: Vec<Box<dyn FlightHook>>,
}

impl Default for BallisticEngine {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl BallisticEngine {
    /// Engine with no affectors or hooks; everything must be added explicitly.
    pub fn bare(config: &EngineConfig) -> Self {
        Self {
            max_ticks: config.max_ticks,
            launch_height: config.launch_height,
            trace_mode: config.trace_mode,
            affectors: Vec::new(),
            before_hooks: Vec::new(),
            after_hooks: Vec::new(),
        }
    }

    /// Engine with gravity and air resistance, plus wind when configured.
    pub fn from_config(config: &EngineConfig) -> Self {
        let mut engine = Self::bare(config);
        engine.add_affector(Box::new(Gravity::new(config.gravity)));
        engine.add_affector(Box::new(AirResistance::new(
            config.air_density,
            config.drag_coefficient,
        )));
        if let Some(wind) = config.wind {
            engine.add_affector(Box::new(Wind::new(Vector::from(wind))));
        }
        engine
    }

    pub fn add_affector(&mut self, affector: Box<dyn Affector>) {
        self.affectors.push(affector);
    }

    /// Registers a hook in the phase it declares.
    pub fn add_hook(&mut self, hook: Box<dyn FlightHook>) {
        match hook.phase() {
            HookPhase::BeforeTick => self.before_hooks.push(hook),
            HookPhase::AfterTick => self.after_hooks.push(hook),
        }
    }

    pub fn with_affector(mut self, affector: Box<dyn Affector>) -> Self {
        self.add_affector(affector);
        self
    }

    pub fn with_hook(mut self, hook: Box<dyn FlightHook>) -> Self {
        self.add_hook(hook);
        self
    }

    pub fn with_trace_mode(mut self, trace_mode: TraceMode) -> Self {
        self.trace_mode = trace_mode;
        self
    }

    pub fn affector_names(&self) -> Vec<&'static str> {
        self.affectors.iter().map(|a| a.name()).collect()
    }

    pub fn hook_names(&self) -> Vec<&'static str> {
        self.before_hooks
            .iter()
            .chain(self.after_hooks.iter())
            .map(|h| h.name())
            .collect()
    }

    pub fn initial_state(&self, inputs: &BallisticInputs) -> ShotState {
        ShotState::new(
            inputs.shell_weight,
            inputs.surface_area,
            Vector::new(0.0, 0.0, self.launch_height),
            inputs.launch_velocity(),
        )
    }

    pub fn simulate(&mut self, inputs: &BallisticInputs) -> Result<ShotOutcome, BallisticsError> {
        inputs.validate()?;
        for hook in self.before_hooks.iter_mut().chain(self.after_hooks.iter_mut()) {
            hook.reset();
        }

        let mut state = self.initial_state(inputs);
        let mut trace = Vec::new();
        let mut snapshots = Vec::new();
        let mut ticks = 0u32;

        loop {
            if ticks >= self.max_ticks {
                tracing::warn!(ticks, altitude = state.altitude(), "shot exceeded tick ceiling");
                return Err(BallisticsError::DidNotTerminate {
                    ticks,
                    altitude: state.altitude(),
                });
            }

            for hook in self.before_hooks.iter_mut() {
                hook.on_tick(&mut state, TICK_SECONDS);
            }
            for affector in &self.affectors {
                affector.apply(&mut state, TICK_SECONDS);
            }
            state.integrate(TICK_SECONDS);
            for hook in self.after_hooks.iter_mut() {
                hook.on_tick(&mut state, TICK_SECONDS);
            }
            ticks += 1;

            match self.trace_mode {
                TraceMode::Off => {}
                TraceMode::Positions => trace.push(state.position.to_array()),
                TraceMode::Full => {
                    trace.push(state.position.to_array());
                    snapshots.push(state.clone());
                }
            }

            if state.altitude() <= 0.0 {
                break;
            }
        }

        let impact = state.position.rounded(2);
        tracing::debug!(
            ticks,
            flight_time = state.time,
            x = impact.x,
            y = impact.y,
            z = impact.z,
            "shot landed"
        );

        Ok(ShotOutcome {
            impact_xyz: impact.to_array(),
            flight_time: state.time,
            ticks,
            area_of_effect: inputs.area_of_effect,
            trace,
            snapshots,
        })
    }
}
