//! Drogue fuse: no pipeline output, installs a parachute hook on the flight engine.

use serde_json::json;

use crate::ballistics::{FlightHook, HookPhase, Parachute, ParachuteTriggers};
use crate::mechanisms::definition::{MechanismDefinition, MechanismError};
use crate::mechanisms::rng::Rng;
use crate::mechanisms::runtime::{metadata, Metadata, MechanismRuntime};
use crate::pipeline::{PipelineContext, PipelineError, PipelineTransform};

const TRIGGER_KEYS: &str = "deploy_altitude|deploy_time|deploy_distance";

#[derive(Debug, Clone)]
pub struct Drogue {
    definition: MechanismDefinition,
    triggers: ParachuteTriggers,
    phase: HookPhase,
}

impl Drogue {
    pub fn new(definition: &MechanismDefinition, seed: u64) -> Result<Self, MechanismError> {
        let mut triggers = ParachuteTriggers {
            altitude: non_negative(definition, "deploy_altitude")?,
            time: non_negative(definition, "deploy_time")?,
            distance: non_negative(definition, "deploy_distance")?,
        };
        if triggers.is_empty() {
            return Err(MechanismError::MissingModifier {
                mechanism: definition.name.clone(),
                key: TRIGGER_KEYS.to_string(),
            });
        }

        let fuse_variance = definition.modifier_or("fuse_variance", 0.0).abs();
        if let Some(time) = triggers.time.as_mut() {
            let mut rng = Rng::for_mechanism(seed, definition.id);
            *time *= rng.variance_factor(fuse_variance / definition.upgrade_factor());
        }

        let phase = if definition.modifier_or("after_tick", 0.0) != 0.0 {
            HookPhase::AfterTick
        } else {
            HookPhase::BeforeTick
        };

        Ok(Self {
            definition: definition.clone(),
            triggers,
            phase,
        })
    }

    pub fn triggers(&self) -> ParachuteTriggers {
        self.triggers
    }
}

fn non_negative(definition: &MechanismDefinition, key: &str) -> Result<Option<f64>, MechanismError> {
    match definition.modifier(key) {
        Some(value) if value < 0.0 || !value.is_finite() => {
            Err(definition.invalid_modifier(key, value, "must be a non-negative number"))
        }
        other => Ok(other),
    }
}

impl MechanismRuntime for Drogue {
    fn definition(&self) -> &MechanismDefinition {
        &self.definition
    }

    fn resolve(&self, _context: &PipelineContext) -> Result<Vec<PipelineTransform>, PipelineError> {
        Ok(Vec::new())
    }

    fn ui_metadata(&self) -> Metadata {
        metadata([
            ("deploy_altitude", json!(self.triggers.altitude)),
            ("deploy_time", json!(self.triggers.time)),
            ("deploy_distance", json!(self.triggers.distance)),
        ])
    }

    fn engine_hooks(&self) -> Vec<Box<dyn FlightHook>> {
        vec![Box::new(Parachute::new(self.triggers).with_phase(self.phase))]
    }
}
