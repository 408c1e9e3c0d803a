//! Runs a loadout's mechanism runtimes against one turn of player input.

use serde::Serialize;

use crate::ballistics::{Affector, BallisticInputs, FlightHook};
use crate::mechanisms::{MechanismRuntime, Metadata};
use crate::pipeline::context::{PipelineContext, PlayerInput};
use crate::pipeline::error::PipelineError;
use crate::pipeline::keys;
use crate::pipeline::orderer::MechanismOrderer;

/// Ballistic inputs as produced by the pipeline.
pub type BallisticAttributes = BallisticInputs;

pub const DEFAULT_ANGLE_DEG: f64 = 45.0;
pub const DEFAULT_INITIAL_VELOCITY: f64 = 500.0;
pub const DEFAULT_SHELL_WEIGHT: f64 = 25.0;
pub const DEFAULT_SURFACE_AREA: f64 = 0.05;

/// UI metadata published by one mechanism.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UiEntry {
    pub mechanism_id: u64,
    pub name: String,
    pub slot_key: String,
    pub metadata: Metadata,
}

pub struct PipelineResolver<'a> {
    runtimes: Vec<&'a dyn MechanismRuntime>,
    player_input: &'a PlayerInput,
}

impl<'a> PipelineResolver<'a> {
    pub fn new(runtimes: &'a [Box<dyn MechanismRuntime>], player_input: &'a PlayerInput) -> Self {
        Self {
            runtimes: MechanismOrderer::ordered(runtimes),
            player_input,
        }
    }

    /// Runtimes in execution order.
    pub fn runtimes(&self) -> &[&'a dyn MechanismRuntime] {
        &self.runtimes
    }

    /// Runs every runtime in order against a fresh context and returns it frozen.
    /// The first failing runtime aborts the turn.
    pub fn resolve(&self) -> Result<PipelineContext, PipelineError> {
        let mut context = PipelineContext::new(self.player_input.clone());
        for runtime in &self.runtimes {
            let _span = tracing::debug_span!(
                "mechanism",
                name = runtime.name(),
                priority = runtime.priority()
            )
            .entered();

            let transforms = runtime
                .resolve(&context)
                .map_err(|source| abort(*runtime, source))?;
            for transform in &transforms {
                let value = context
                    .set_or_update(transform)
                    .map_err(|source| abort(*runtime, source))?;
                tracing::debug!(
                    key = transform.key(),
                    operation = %transform.operation(),
                    operand = transform.value(),
                    value,
                    "transform applied"
                );
            }
        }
        context.freeze();
        Ok(context)
    }

    pub fn ballistic_attributes(&self) -> Result<BallisticAttributes, PipelineError> {
        Ok(Self::attributes_from(&self.resolve()?))
    }

    /// Reads ballistic attributes out of a resolved context, filling defaults.
    pub fn attributes_from(context: &PipelineContext) -> BallisticAttributes {
        let initial_velocity = context
            .get(keys::INITIAL_VELOCITY)
            .or_else(|| context.get(keys::BASE_INITIAL_VELOCITY))
            .unwrap_or(DEFAULT_INITIAL_VELOCITY);
        BallisticAttributes {
            angle_deg: context.get_or(keys::ANGLE_DEG, DEFAULT_ANGLE_DEG),
            deflection_deg: context.get_or(keys::DEFLECTION_DEG, 0.0),
            initial_velocity,
            shell_weight: context.get_or(keys::SHELL_WEIGHT, DEFAULT_SHELL_WEIGHT),
            surface_area: context.get_or(keys::SURFACE_AREA, DEFAULT_SURFACE_AREA),
            area_of_effect: context.get_or(keys::AREA_OF_EFFECT, 0.0),
        }
    }

    pub fn turn_order_delay(&self) -> f64 {
        self.runtimes.iter().map(|runtime| runtime.turn_order_delay()).sum()
    }

    pub fn ui_metadata(&self) -> Vec<UiEntry> {
        self.runtimes
            .iter()
            .filter_map(|runtime| {
                let metadata = runtime.ui_metadata();
                if metadata.is_empty() {
                    return None;
                }
                let definition = runtime.definition();
                Some(UiEntry {
                    mechanism_id: definition.id,
                    name: definition.name.clone(),
                    slot_key: definition.slot_key.clone(),
                    metadata,
                })
            })
            .collect()
    }

    pub fn assistance_data(&self) -> Result<Metadata, PipelineError> {
        Ok(self.assistance_from(&self.resolve()?))
    }

    /// Merges every provider's output in pipeline order; later keys overwrite earlier ones.
    pub fn assistance_from(&self, context: &PipelineContext) -> Metadata {
        let mut merged = Metadata::new();
        for provider in self.runtimes.iter().filter_map(|runtime| runtime.assistance()) {
            merged.extend(provider.assistance_data(context));
        }
        merged
    }

    pub fn engine_affectors(&self) -> Vec<Box<dyn Affector>> {
        self.runtimes
            .iter()
            .flat_map(|runtime| runtime.engine_affectors())
            .collect()
    }

    pub fn engine_hooks(&self) -> Vec<Box<dyn FlightHook>> {
        self.runtimes
            .iter()
            .flat_map(|runtime| runtime.engine_hooks())
            .collect()
    }
}

fn abort(runtime: &dyn MechanismRuntime, source: PipelineError) -> PipelineError {
    tracing::warn!(mechanism = runtime.name(), error = %source, "pipeline aborted");
    PipelineError::Aborted {
        mechanism: runtime.name().to_string(),
        source: Box::new(source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mechanisms::{MechanismDefinition, MechanismKind};

    #[test]
    fn empty_pipeline_uses_defaults() {
        let runtimes: Vec<Box<dyn MechanismRuntime>> = Vec::new();
        let input = PlayerInput::new();
        let resolver = PipelineResolver::new(&runtimes, &input);
        let attributes = resolver.ballistic_attributes().unwrap();
        assert_eq!(attributes.angle_deg, 45.0);
        assert_eq!(attributes.initial_velocity, 500.0);
        assert_eq!(attributes.shell_weight, 25.0);
        assert_eq!(attributes.surface_area, 0.05);
        assert_eq!(resolver.turn_order_delay(), 0.0);
        assert!(resolver.ui_metadata().is_empty());
    }

    #[test]
    fn resolved_context_is_frozen() {
        let runtimes: Vec<Box<dyn MechanismRuntime>> = Vec::new();
        let input = PlayerInput::new();
        let context = PipelineResolver::new(&runtimes, &input).resolve().unwrap();
        assert!(context.is_frozen());
    }

    #[test]
    fn base_velocity_backs_up_missing_initial_velocity() {
        let mut input = PlayerInput::new();
        input.insert(keys::BASE_INITIAL_VELOCITY.to_string(), 320.0);
        let attributes = PipelineResolver::attributes_from(&PipelineContext::new(input));
        assert_eq!(attributes.initial_velocity, 320.0);
    }

    #[test]
    fn delays_sum_across_runtimes() {
        let runtimes = vec![
            MechanismDefinition::new(1, "Breech", MechanismKind::Breech)
                .with_modifier("load_time", 3.0)
                .with_modifier("variance", 0.0)
                .to_runtime(0)
                .unwrap(),
            MechanismDefinition::new(2, "Recoil", MechanismKind::Recoil)
                .with_modifier("recovery_time", 2.0)
                .with_modifier("variance", 0.0)
                .to_runtime(0)
                .unwrap(),
        ];
        let input = PlayerInput::new();
        let resolver = PipelineResolver::new(&runtimes, &input);
        assert!((resolver.turn_order_delay() - 5.0).abs() < 1e-12);
        assert_eq!(resolver.runtimes()[0].name(), "Recoil");
    }
}
