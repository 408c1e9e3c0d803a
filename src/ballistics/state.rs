use serde::Serialize;

use crate::ballistics::vector::Vector;

/// Mutable per-shot simulation state. One instance lives for one `simulate` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShotState {
    pub time: f64,
    pub mass: f64,
    /// Cross-sectional area used by drag and wind (m²).
    pub surface_area: f64,
    pub position: Vector,
    pub velocity: Vector,
    pub acceleration: Vector,
}

impl ShotState {
    pub fn new(mass: f64, surface_area: f64, position: Vector, velocity: Vector) -> Self {
        Self {
            time: 0.0,
            mass,
            surface_area,
            position,
            velocity,
            acceleration: Vector::ZERO,
        }
    }

    pub fn altitude(&self) -> f64 {
        self.position.z
    }

    pub fn set_altitude(&mut self, altitude: f64) {
        self.position.z = altitude;
    }

    pub fn speed(&self) -> f64 {
        self.velocity.magnitude()
    }

    /// Explicit Euler step. Clears the acceleration accumulator for the next tick.
    pub fn integrate(&mut self, dt: f64) {
        let mut delta_v = self.acceleration;
        delta_v.scale_mut(dt);
        self.velocity += delta_v;

        let mut delta_p = self.velocity;
        delta_p.scale_mut(dt);
        self.position += delta_p;

        self.time += dt;
        self.acceleration = Vector::ZERO;
    }
}
