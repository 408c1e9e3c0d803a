use serde_json::json;

use crate::mechanisms::definition::{MechanismDefinition, MechanismError};
use crate::mechanisms::rng::Rng;
use crate::mechanisms::runtime::{metadata, Metadata, MechanismRuntime};
use crate::pipeline::{PipelineContext, PipelineError, PipelineTransform};

pub const DEFAULT_VARIANCE: f64 = 0.1;

/// Loading mechanism. Contributes turn delay only.
#[derive(Debug, Clone)]
pub struct Breech {
    definition: MechanismDefinition,
    load_time: f64,
}

impl Breech {
    pub fn new(definition: &MechanismDefinition, seed: u64) -> Result<Self, MechanismError> {
        let nominal = definition.positive_modifier("load_time")?;
        let variance = definition.modifier_or("variance", DEFAULT_VARIANCE).abs();
        let mut rng = Rng::for_mechanism(seed, definition.id);
        let load_time = nominal * rng.variance_factor(variance)
            / (1.0 + 0.1 * definition.upgrade_level as f64);
        Ok(Self {
            definition: definition.clone(),
            load_time,
        })
    }
}

impl MechanismRuntime for Breech {
    fn definition(&self) -> &MechanismDefinition {
        &self.definition
    }

    fn resolve(&self, _context: &PipelineContext) -> Result<Vec<PipelineTransform>, PipelineError> {
        Ok(Vec::new())
    }

    fn ui_metadata(&self) -> Metadata {
        metadata([("load_time", json!(self.load_time))])
    }

    fn turn_order_delay(&self) -> f64 {
        self.load_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mechanisms::MechanismKind;

    #[test]
    fn delay_only() {
        let definition = MechanismDefinition::new(51, "Sliding breech", MechanismKind::Breech)
            .with_modifier("load_time", 4.0)
            .with_modifier("variance", 0.0)
            .with_upgrade_level(5);
        let runtime = Breech::new(&definition, 8).unwrap();
        assert!(runtime.resolve(&PipelineContext::default()).unwrap().is_empty());
        assert!((runtime.turn_order_delay() - 4.0 / 1.5).abs() < 1e-12);
    }

    #[test]
    fn zero_load_time_is_rejected() {
        let definition = MechanismDefinition::new(51, "Broken breech", MechanismKind::Breech)
            .with_modifier("load_time", 0.0);
        assert!(matches!(
            Breech::new(&definition, 8),
            Err(MechanismError::InvalidModifier { .. })
        ));
    }
}
