//! Match-facing entry points: resolve a turn from equipped mechanisms and fly the shot.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ballistics::{
    Affector, BallisticEngine, BallisticsError, FlightHook, ShotOutcome,
};
use crate::config::EngineConfig;
use crate::mechanisms::{MechanismDefinition, MechanismError, MechanismRuntime, Metadata};
use crate::pipeline::{BallisticAttributes, PipelineError, PipelineResolver, PlayerInput, UiEntry};

#[derive(Debug)]
pub enum TurnError {
    Mechanism(MechanismError),
    Pipeline(PipelineError),
    Ballistics(BallisticsError),
}

impl fmt::Display for TurnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mechanism(e) => write!(f, "{e}"),
            Self::Pipeline(e) => write!(f, "{e}"),
            Self::Ballistics(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for TurnError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Mechanism(e) => Some(e),
            Self::Pipeline(e) => Some(e),
            Self::Ballistics(e) => Some(e),
        }
    }
}

impl From<MechanismError> for TurnError {
    fn from(err: MechanismError) -> Self {
        Self::Mechanism(err)
    }
}

impl From<PipelineError> for TurnError {
    fn from(err: PipelineError) -> Self {
        Self::Pipeline(err)
    }
}

impl From<BallisticsError> for TurnError {
    fn from(err: BallisticsError) -> Self {
        Self::Ballistics(err)
    }
}

/// One slot of a loadout as handed over by the match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquippedMechanism {
    pub definition: MechanismDefinition,
    pub seed: u64,
}

impl EquippedMechanism {
    pub fn new(definition: MechanismDefinition, seed: u64) -> Self {
        Self { definition, seed }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnResolution {
    pub ballistic_attributes: BallisticAttributes,
    pub turn_order_delay: f64,
    pub ui_metadata: Vec<UiEntry>,
    pub assistance_data: Metadata,
}

/// Calibrated runtimes for one match. Build once, resolve every turn.
#[derive(Debug)]
pub struct Armament {
    runtimes: Vec<Box<dyn MechanismRuntime>>,
}

impl Armament {
    pub fn new(equipped: &[EquippedMechanism]) -> Result<Self, MechanismError> {
        let runtimes = equipped
            .iter()
            .map(|slot| slot.definition.to_runtime(slot.seed))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { runtimes })
    }

    /// Same seed for every mechanism; identities keep their streams apart.
    pub fn from_definitions(
        definitions: &[MechanismDefinition],
        seed: u64,
    ) -> Result<Self, MechanismError> {
        let runtimes = definitions
            .iter()
            .map(|definition| definition.to_runtime(seed))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { runtimes })
    }

    pub fn runtimes(&self) -> &[Box<dyn MechanismRuntime>] {
        &self.runtimes
    }

    pub fn resolver<'a>(&'a self, player_input: &'a PlayerInput) -> PipelineResolver<'a> {
        PipelineResolver::new(&self.runtimes, player_input)
    }

    pub fn resolve_turn(&self, player_input: &PlayerInput) -> Result<TurnResolution, PipelineError> {
        let resolver = self.resolver(player_input);
        let context = resolver.resolve()?;
        Ok(TurnResolution {
            ballistic_attributes: PipelineResolver::attributes_from(&context),
            turn_order_delay: resolver.turn_order_delay(),
            ui_metadata: resolver.ui_metadata(),
            assistance_data: resolver.assistance_from(&context),
        })
    }

    /// Resolves the turn and flies the shot with every affector and hook the
    /// loadout contributes.
    pub fn fire(
        &self,
        player_input: &PlayerInput,
        config: &EngineConfig,
    ) -> Result<(TurnResolution, ShotOutcome), TurnError> {
        let resolution = self.resolve_turn(player_input)?;
        let resolver = self.resolver(player_input);
        let outcome = simulate_shot(
            &resolution.ballistic_attributes,
            resolver.engine_affectors(),
            resolver.engine_hooks(),
            config,
        )?;
        Ok((resolution, outcome))
    }
}

pub fn resolve_turn(
    equipped: &[EquippedMechanism],
    player_input: &PlayerInput,
) -> Result<TurnResolution, TurnError> {
    Ok(Armament::new(equipped)?.resolve_turn(player_input)?)
}

pub fn simulate_shot(
    attributes: &BallisticAttributes,
    extra_affectors: Vec<Box<dyn Affector>>,
    extra_hooks: Vec<Box<dyn FlightHook>>,
    config: &EngineConfig,
) -> Result<ShotOutcome, BallisticsError> {
    let mut engine = BallisticEngine::from_config(config);
    for affector in extra_affectors {
        engine.add_affector(affector);
    }
    for hook in extra_hooks {
        engine.add_hook(hook);
    }
    let outcome = engine.simulate(attributes)?;
    tracing::info!(
        range = outcome.range(),
        flight_time = outcome.flight_time,
        ticks = outcome.ticks,
        "shot landed"
    );
    Ok(outcome)
}
