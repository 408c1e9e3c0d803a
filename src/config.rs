use std::env;

use serde::{Deserialize, Serialize};

use crate::ballistics::{
    TraceMode, DEFAULT_MAX_TICKS, SPHERE_DRAG_COEFFICIENT, STANDARD_AIR_DENSITY, STANDARD_GRAVITY,
};

/// Engine tuning. Every field has a default so scenario files only list overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub max_ticks: u32,
    pub launch_height: f64,
    pub gravity: f64,
    pub air_density: f64,
    pub drag_coefficient: f64,
    /// Wind acceleration per m² of cross-section.
    pub wind: Option<[f64; 3]>,
    pub trace_mode: TraceMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_ticks: DEFAULT_MAX_TICKS,
            launch_height: 0.0,
            gravity: STANDARD_GRAVITY,
            air_density: STANDARD_AIR_DENSITY,
            drag_coefficient: SPHERE_DRAG_COEFFICIENT,
            wind: None,
            trace_mode: TraceMode::Positions,
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with `ORDNANCE_MAX_TICKS`, `ORDNANCE_LAUNCH_HEIGHT` and `ORDNANCE_GRAVITY`.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(max_ticks) = env_parse::<u32>("ORDNANCE_MAX_TICKS") {
            self.max_ticks = max_ticks;
        }
        if let Some(launch_height) = env_parse::<f64>("ORDNANCE_LAUNCH_HEIGHT") {
            self.launch_height = launch_height;
        }
        if let Some(gravity) = env_parse::<f64>("ORDNANCE_GRAVITY") {
            self.gravity = gravity;
        }
        self
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(name, value = %raw, "ignoring unparseable environment override");
            None
        }
    }
}
