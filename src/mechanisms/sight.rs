//! Assistance-tier mechanism: estimates where the final resolved shot will land.

use serde_json::json;

use crate::ballistics::STANDARD_GRAVITY;
use crate::mechanisms::definition::{MechanismDefinition, MechanismError};
use crate::mechanisms::rng::Rng;
use crate::mechanisms::runtime::{metadata, AssistanceProvider, Metadata, MechanismRuntime};
use crate::pipeline::{keys, PipelineContext, PipelineError, PipelineTransform};

/// Relative range error of a sight with accuracy 1 and no upgrades.
pub const BASE_ERROR: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct Sight {
    definition: MechanismDefinition,
    accuracy: f64,
    /// Gravity the sight's range tables are computed for.
    gravity: f64,
    /// Signed relative error applied to every range estimate this match.
    range_error: f64,
    error_margin: f64,
}

impl Sight {
    pub fn new(definition: &MechanismDefinition, seed: u64) -> Result<Self, MechanismError> {
        let accuracy = definition.positive_modifier("accuracy")?;
        let gravity = definition.modifier_or("gravity", STANDARD_GRAVITY);
        if !(gravity > 0.0) {
            return Err(definition.invalid_modifier("gravity", gravity, "must be positive"));
        }
        let error_margin =
            BASE_ERROR / (accuracy * (1.0 + 0.25 * definition.upgrade_level as f64));
        let mut rng = Rng::for_mechanism(seed, definition.id);
        Ok(Self {
            definition: definition.clone(),
            accuracy,
            gravity,
            range_error: rng.symmetric(1.0) * error_margin,
            error_margin,
        })
    }

    pub fn error_margin(&self) -> f64 {
        self.error_margin
    }

    pub fn gravity(&self) -> f64 {
        self.gravity
    }

    /// Drag-free range estimate for the given launch parameters.
    pub fn estimate_range(&self, velocity: f64, angle_deg: f64) -> f64 {
        let ideal = velocity * velocity * (2.0 * angle_deg.to_radians()).sin() / self.gravity;
        ideal * (1.0 + self.range_error)
    }
}

impl MechanismRuntime for Sight {
    fn definition(&self) -> &MechanismDefinition {
        &self.definition
    }

    fn resolve(&self, _context: &PipelineContext) -> Result<Vec<PipelineTransform>, PipelineError> {
        Ok(Vec::new())
    }

    fn ui_metadata(&self) -> Metadata {
        metadata([
            ("accuracy", json!(self.accuracy)),
            ("gravity", json!(self.gravity)),
            ("error_margin", json!(self.error_margin)),
        ])
    }

    fn assistance(&self) -> Option<&dyn AssistanceProvider> {
        Some(self)
    }
}

impl AssistanceProvider for Sight {
    fn assistance_data(&self, context: &PipelineContext) -> Metadata {
        let Some(angle) = context.get(keys::ANGLE_DEG) else {
            return Metadata::new();
        };
        let velocity = context
            .get(keys::INITIAL_VELOCITY)
            .or_else(|| context.get(keys::BASE_INITIAL_VELOCITY));
        let Some(velocity) = velocity else {
            return Metadata::new();
        };
        metadata([
            ("estimated_range", json!(self.estimate_range(velocity, angle))),
            (
                "estimated_bearing",
                json!(context.get_or(keys::DEFLECTION_DEG, 0.0)),
            ),
            ("error_margin", json!(self.error_margin)),
        ])
    }
}
