//! Multiplicative modifier: scales muzzle velocity and nudges elevation.

use serde_json::json;

use crate::mechanisms::definition::{MechanismDefinition, MechanismError};
use crate::mechanisms::rng::Rng;
use crate::mechanisms::runtime::{metadata, Metadata, MechanismRuntime};
use crate::pipeline::{keys, PipelineContext, PipelineError, PipelineTransform};

/// A barrel of quality 1.0 with no explicit variance leaves velocity untouched.
pub const DEFAULT_VARIANCE: f64 = 0.0;
/// Degrees.
pub const DEFAULT_ACCURACY_SPREAD: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct Barrel {
    definition: MechanismDefinition,
    velocity_multiplier: f64,
    accuracy_offset: f64,
}

impl Barrel {
    pub fn new(definition: &MechanismDefinition, seed: u64) -> Result<Self, MechanismError> {
        let quality = definition.positive_modifier("quality")?;
        let wear = definition.modifier_or("wear", 1.0);
        if !(wear > 0.0) {
            return Err(definition.invalid_modifier("wear", wear, "must be positive"));
        }
        let variance = definition.modifier_or("variance", DEFAULT_VARIANCE).abs();
        let spread = definition
            .modifier_or("accuracy_spread", DEFAULT_ACCURACY_SPREAD)
            .abs();

        let mut rng = Rng::for_mechanism(seed, definition.id);
        let velocity_multiplier = quality * wear * rng.variance_factor(variance);
        let accuracy_offset = rng.symmetric(spread) / definition.upgrade_factor();

        Ok(Self {
            definition: definition.clone(),
            velocity_multiplier,
            accuracy_offset,
        })
    }

    pub fn velocity_multiplier(&self) -> f64 {
        self.velocity_multiplier
    }

    pub fn accuracy_offset(&self) -> f64 {
        self.accuracy_offset
    }
}

impl MechanismRuntime for Barrel {
    fn definition(&self) -> &MechanismDefinition {
        &self.definition
    }

    fn resolve(&self, context: &PipelineContext) -> Result<Vec<PipelineTransform>, PipelineError> {
        let mut transforms = vec![PipelineTransform::multiply(
            keys::INITIAL_VELOCITY,
            self.velocity_multiplier,
        )?];
        // Only bias an angle some earlier mechanism produced; an increment on an
        // untouched key would replace the player's raw angle with the offset.
        if context.transformed(keys::ANGLE_DEG) {
            transforms.push(PipelineTransform::increment(
                keys::ANGLE_DEG,
                self.accuracy_offset,
            )?);
        }
        Ok(transforms)
    }

    fn ui_metadata(&self) -> Metadata {
        metadata([
            ("velocity_multiplier", json!(self.velocity_multiplier)),
            ("accuracy_offset", json!(self.accuracy_offset)),
        ])
    }
}
