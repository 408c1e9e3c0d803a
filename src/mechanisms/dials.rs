//! Input converters: turn discrete player input (dial clicks, screw turns) into angles.

use serde_json::json;

use crate::mechanisms::definition::{MechanismDefinition, MechanismError};
use crate::mechanisms::rng::Rng;
use crate::mechanisms::runtime::{metadata, Metadata, MechanismRuntime};
use crate::pipeline::{keys, PipelineContext, PipelineError, PipelineTransform};

/// Shared calibration: seeded degrees-per-step plus a clamp window.
#[derive(Debug, Clone, Copy, PartialEq)]
struct StepCalibration {
    degrees_per_step: f64,
    min: f64,
    max: f64,
}

impl StepCalibration {
    fn new(
        definition: &MechanismDefinition,
        seed: u64,
        step_key: &str,
        min: f64,
        max: f64,
    ) -> Result<Self, MechanismError> {
        let nominal = definition.positive_modifier(step_key)?;
        if min > max {
            return Err(definition.invalid_modifier(step_key, min, "clamp minimum exceeds maximum"));
        }
        let variance = definition.modifier_or("variance", 0.0).abs() / definition.upgrade_factor();
        let mut rng = Rng::for_mechanism(seed, definition.id);
        Ok(Self {
            degrees_per_step: nominal * rng.variance_factor(variance),
            min,
            max,
        })
    }

    fn convert(&self, mechanism: &str, input_key: &str, steps: f64) -> f64 {
        let raw = steps * self.degrees_per_step;
        let clamped = raw.clamp(self.min, self.max);
        if clamped != raw {
            tracing::warn!(mechanism, input = input_key, raw, clamped, "player input clamped");
        }
        clamped
    }
}

#[derive(Debug, Clone)]
pub struct ElevationDial {
    definition: MechanismDefinition,
    calibration: StepCalibration,
}

impl ElevationDial {
    pub fn new(definition: &MechanismDefinition, seed: u64) -> Result<Self, MechanismError> {
        let min = definition.required_modifier("min_angle")?;
        let max = definition.required_modifier("max_angle")?;
        let calibration = StepCalibration::new(definition, seed, "degrees_per_click", min, max)?;
        Ok(Self {
            definition: definition.clone(),
            calibration,
        })
    }

    pub fn degrees_per_click(&self) -> f64 {
        self.calibration.degrees_per_step
    }
}

impl MechanismRuntime for ElevationDial {
    fn definition(&self) -> &MechanismDefinition {
        &self.definition
    }

    fn resolve(&self, context: &PipelineContext) -> Result<Vec<PipelineTransform>, PipelineError> {
        let Some(clicks) = context.get(keys::ELEVATION_CLICKS) else {
            return Ok(Vec::new());
        };
        let angle = self
            .calibration
            .convert(self.name(), keys::ELEVATION_CLICKS, clicks);
        Ok(vec![PipelineTransform::set(keys::ANGLE_DEG, angle)?])
    }

    fn ui_metadata(&self) -> Metadata {
        metadata([
            ("degrees_per_click", json!(self.calibration.degrees_per_step)),
            ("min_angle", json!(self.calibration.min)),
            ("max_angle", json!(self.calibration.max)),
        ])
    }
}

#[derive(Debug, Clone)]
pub struct DeflectionScrew {
    definition: MechanismDefinition,
    calibration: StepCalibration,
}

impl DeflectionScrew {
    pub fn new(definition: &MechanismDefinition, seed: u64) -> Result<Self, MechanismError> {
        let limit = definition.positive_modifier("max_deflection")?;
        let calibration =
            StepCalibration::new(definition, seed, "degrees_per_turn", -limit, limit)?;
        Ok(Self {
            definition: definition.clone(),
            calibration,
        })
    }

    pub fn degrees_per_turn(&self) -> f64 {
        self.calibration.degrees_per_step
    }
}

impl MechanismRuntime for DeflectionScrew {
    fn definition(&self) -> &MechanismDefinition {
        &self.definition
    }

    fn resolve(&self, context: &PipelineContext) -> Result<Vec<PipelineTransform>, PipelineError> {
        let Some(turns) = context.get(keys::DEFLECTION_TURNS) else {
            return Ok(Vec::new());
        };
        let deflection = self
            .calibration
            .convert(self.name(), keys::DEFLECTION_TURNS, turns);
        Ok(vec![PipelineTransform::set(keys::DEFLECTION_DEG, deflection)?])
    }

    fn ui_metadata(&self) -> Metadata {
        metadata([
            ("degrees_per_turn", json!(self.calibration.degrees_per_step)),
            ("max_deflection", json!(self.calibration.max)),
        ])
    }
}
