//! Conditional mid-flight events checked every tick, before or after integration.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ballistics::state::ShotState;
use crate::ballistics::vector::Vector;

/// Velocity factor applied once when a parachute opens.
pub const PARACHUTE_DAMPING: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookPhase {
    #[default]
    BeforeTick,
    AfterTick,
}

pub trait FlightHook: fmt::Debug + Send {
    fn name(&self) -> &'static str;

    fn phase(&self) -> HookPhase {
        HookPhase::BeforeTick
    }

    /// Clears per-shot bookkeeping. The engine calls this before every simulation.
    fn reset(&mut self) {}

    fn on_tick(&mut self, state: &mut ShotState, dt: f64);
}

/// Deployment conditions; the parachute opens when any configured one holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ParachuteTriggers {
    #[serde(default)]
    pub altitude: Option<f64>,
    #[serde(default)]
    pub time: Option<f64>,
    #[serde(default)]
    pub distance: Option<f64>,
}

impl ParachuteTriggers {
    pub fn is_empty(&self) -> bool {
        self.altitude.is_none() && self.time.is_none() && self.distance.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct Parachute {
    triggers: ParachuteTriggers,
    phase: HookPhase,
    deployed_at: Option<f64>,
    launch_position: Option<Vector>,
}

impl Parachute {
    pub fn new(triggers: ParachuteTriggers) -> Self {
        Self {
            triggers,
            phase: HookPhase::BeforeTick,
            deployed_at: None,
            launch_position: None,
        }
    }

    pub fn with_phase(mut self, phase: HookPhase) -> Self {
        self.phase = phase;
        self
    }

    pub fn triggers(&self) -> ParachuteTriggers {
        self.triggers
    }

    pub fn deployed(&self) -> bool {
        self.deployed_at.is_some()
    }

    /// Flight time at which the canopy opened.
    pub fn deployed_at(&self) -> Option<f64> {
        self.deployed_at
    }

    fn should_deploy(&self, state: &ShotState, launch: Vector) -> bool {
        // Only armed on the way down; a ground launch starts at altitude 0.
        let altitude_hit = self
            .triggers
            .altitude
            .is_some_and(|threshold| state.velocity.z < 0.0 && state.altitude() <= threshold);
        let time_hit = self
            .triggers
            .time
            .is_some_and(|threshold| state.time >= threshold);
        let distance_hit = self
            .triggers
            .distance
            .is_some_and(|threshold| state.position.distance_to(launch) >= threshold);
        altitude_hit || time_hit || distance_hit
    }
}

impl FlightHook for Parachute {
    fn name(&self) -> &'static str {
        "parachute"
    }

    fn phase(&self) -> HookPhase {
        self.phase
    }

    fn reset(&mut self) {
        self.deployed_at = None;
        self.launch_position = None;
    }

    fn on_tick(&mut self, state: &mut ShotState, _dt: f64) {
        let launch = *self.launch_position.get_or_insert(state.position);
        if self.deployed() || !self.should_deploy(state, launch) {
            return;
        }
        state.velocity.scale_mut(PARACHUTE_DAMPING);
        self.deployed_at = Some(state.time);
        tracing::debug!(time = state.time, altitude = state.altitude(), "parachute deployed");
    }
}
