//! Per-tick force contributors. An affector only ever adds to `state.acceleration`,
//! so the order in which the engine runs them does not change the result.

use std::fmt;

use crate::ballistics::state::ShotState;
use crate::ballistics::vector::Vector;

pub const STANDARD_GRAVITY: f64 = 9.81;
/// Sea-level air density (kg/m³).
pub const STANDARD_AIR_DENSITY: f64 = 1.225;
/// Drag coefficient of a sphere.
pub const SPHERE_DRAG_COEFFICIENT: f64 = 0.47;

pub trait Affector: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Acceleration contributed for this tick. Must not depend on other affectors.
    fn acceleration(&self, state: &ShotState, dt: f64) -> Vector;

    fn apply(&self, state: &mut ShotState, dt: f64) {
        let contribution = self.acceleration(state, dt);
        state.acceleration += contribution;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gravity {
    pub g: f64,
}

impl Gravity {
    pub fn new(g: f64) -> Self {
        Self { g }
    }
}

impl Default for Gravity {
    fn default() -> Self {
        Self::new(STANDARD_GRAVITY)
    }
}

impl Affector for Gravity {
    fn name(&self) -> &'static str {
        "gravity"
    }

    fn acceleration(&self, _state: &ShotState, _dt: f64) -> Vector {
        Vector::new(0.0, 0.0, -self.g)
    }
}

/// Quadratic drag: `F = 0.5·ρ·v²·Cd·A`, opposing the velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirResistance {
    pub air_density: f64,
    pub drag_coefficient: f64,
}

impl AirResistance {
    pub fn new(air_density: f64, drag_coefficient: f64) -> Self {
        Self {
            air_density,
            drag_coefficient,
        }
    }
}

impl Default for AirResistance {
    fn default() -> Self {
        Self::new(STANDARD_AIR_DENSITY, SPHERE_DRAG_COEFFICIENT)
    }
}

impl Affector for AirResistance {
    fn name(&self) -> &'static str {
        "air_resistance"
    }

    fn acceleration(&self, state: &ShotState, _dt: f64) -> Vector {
        let speed = state.speed();
        if speed == 0.0 {
            return Vector::ZERO;
        }
        let drag_force =
            0.5 * self.air_density * speed * speed * self.drag_coefficient * state.surface_area;
        let drag_accel = drag_force / state.mass;
        let mut drag = state.velocity;
        drag.normalize_mut();
        drag.scale_mut(-drag_accel);
        drag
    }
}

/// Constant push per unit of cross-sectional area. Independent of the shell's velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wind {
    pub wind: Vector,
}

impl Wind {
    pub fn new(wind: Vector) -> Self {
        Self { wind }
    }
}

impl Affector for Wind {
    fn name(&self) -> &'static str {
        "wind"
    }

    fn acceleration(&self, state: &ShotState, _dt: f64) -> Vector {
        self.wind * state.surface_area
    }
}
