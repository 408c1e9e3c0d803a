use serde_json::json;

use crate::mechanisms::definition::{MechanismDefinition, MechanismError};
use crate::mechanisms::rng::Rng;
use crate::mechanisms::runtime::{metadata, Metadata, MechanismRuntime};
use crate::pipeline::{keys, PipelineContext, PipelineError, PipelineTransform};

pub const DEFAULT_VARIANCE: f64 = 0.1;
/// Each upgrade level shortens recovery to this fraction of the previous level.
pub const UPGRADE_RECOVERY_FACTOR: f64 = 0.9;

/// Carriage recoil: delays the next turn and optionally jolts the barrel.
#[derive(Debug, Clone)]
pub struct Recoil {
    definition: MechanismDefinition,
    recovery_time: f64,
    /// Degrees of angle disturbance per unit of muzzle velocity.
    noise_per_velocity: f64,
    /// Signed fraction in `±[0.5, 1)` of the full disturbance.
    noise_fraction: f64,
}

impl Recoil {
    pub fn new(definition: &MechanismDefinition, seed: u64) -> Result<Self, MechanismError> {
        let nominal = definition.positive_modifier("recovery_time")?;
        let variance = definition.modifier_or("variance", DEFAULT_VARIANCE).abs();
        let noise_per_velocity = definition.modifier_or("noise_per_velocity", 0.0);
        if noise_per_velocity < 0.0 {
            return Err(definition.invalid_modifier(
                "noise_per_velocity",
                noise_per_velocity,
                "must not be negative",
            ));
        }

        let mut rng = Rng::for_mechanism(seed, definition.id);
        let upgrade_scale = UPGRADE_RECOVERY_FACTOR.powi(definition.upgrade_level as i32);
        let recovery_time = nominal * rng.variance_factor(variance) * upgrade_scale;
        let noise_fraction = rng.sign() * rng.uniform(0.5, 1.0);

        Ok(Self {
            definition: definition.clone(),
            recovery_time,
            noise_per_velocity,
            noise_fraction,
        })
    }

    pub fn recovery_time(&self) -> f64 {
        self.recovery_time
    }
}

impl MechanismRuntime for Recoil {
    fn definition(&self) -> &MechanismDefinition {
        &self.definition
    }

    fn resolve(&self, context: &PipelineContext) -> Result<Vec<PipelineTransform>, PipelineError> {
        if self.noise_per_velocity == 0.0
            || !context.transformed(keys::ANGLE_DEG)
            || !context.transformed(keys::INITIAL_VELOCITY)
        {
            return Ok(Vec::new());
        }
        let Some(velocity) = context.get(keys::INITIAL_VELOCITY) else {
            return Ok(Vec::new());
        };
        let disturbance = self.noise_fraction * self.noise_per_velocity * velocity;
        Ok(vec![PipelineTransform::increment(keys::ANGLE_DEG, disturbance)?])
    }

    fn ui_metadata(&self) -> Metadata {
        metadata([("recovery_time", json!(self.recovery_time))])
    }

    fn turn_order_delay(&self) -> f64 {
        self.recovery_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mechanisms::MechanismKind;
    use crate::pipeline::PlayerInput;

    fn definition() -> MechanismDefinition {
        MechanismDefinition::new(41, "Hydraulic recoil", MechanismKind::Recoil)
            .with_modifier("recovery_time", 2.0)
    }

    #[test]
    fn delay_stays_within_variance() {
        for seed in 0..20 {
            let delay = Recoil::new(&definition(), seed).unwrap().turn_order_delay();
            assert!((1.8..=2.2).contains(&delay), "seed {seed}: {delay}");
        }
    }

    #[test]
    fn upgrades_shorten_recovery() {
        let base = Recoil::new(&definition(), 4).unwrap();
        let upgraded = Recoil::new(&definition().with_upgrade_level(2), 4).unwrap();
        let ratio = upgraded.recovery_time() / base.recovery_time();
        assert!((ratio - 0.81).abs() < 1e-12);
    }

    #[test]
    fn silent_without_noise() {
        let runtime = Recoil::new(&definition(), 4).unwrap();
        let mut context = PipelineContext::default();
        context
            .set_or_update(&PipelineTransform::set(keys::ANGLE_DEG, 30.0).unwrap())
            .unwrap();
        assert!(runtime.resolve(&context).unwrap().is_empty());
    }

    #[test]
    fn noise_scales_with_velocity() {
        let runtime =
            Recoil::new(&definition().with_modifier("noise_per_velocity", 0.001), 4).unwrap();
        let mut context = PipelineContext::default();
        context
            .set_or_update(&PipelineTransform::set(keys::ANGLE_DEG, 30.0).unwrap())
            .unwrap();
        context
            .set_or_update(&PipelineTransform::set(keys::INITIAL_VELOCITY, 500.0).unwrap())
            .unwrap();
        let transforms = runtime.resolve(&context).unwrap();
        let magnitude = transforms[0].value().abs();
        assert!((0.25..0.5).contains(&magnitude), "{magnitude}");
    }

    #[test]
    fn raw_player_velocity_does_not_disturb_the_angle() {
        let runtime =
            Recoil::new(&definition().with_modifier("noise_per_velocity", 0.001), 4).unwrap();
        let mut input = PlayerInput::new();
        input.insert(keys::INITIAL_VELOCITY.to_string(), 500.0);
        let mut context = PipelineContext::new(input);
        context
            .set_or_update(&PipelineTransform::set(keys::ANGLE_DEG, 30.0).unwrap())
            .unwrap();
        assert_eq!(context.get(keys::INITIAL_VELOCITY), Some(500.0));
        assert!(runtime.resolve(&context).unwrap().is_empty());
    }
}
