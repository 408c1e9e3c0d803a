//! YAML scenario files: one loadout, one turn of player input, optional engine overrides.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::mechanisms::{MechanismDefinition, MechanismError};
use crate::pipeline::PlayerInput;
use crate::turn::{Armament, EquippedMechanism};

pub const DEFAULT_SCENARIO_PATH: &str = "data/scenarios/field_gun.yaml";

#[derive(Debug)]
pub enum ScenarioError {
    Read(std::io::Error),
    Parse(serde_yaml::Error),
    Mechanism(MechanismError),
}

impl fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(err) => write!(f, "failed to read scenario file: {err}"),
            Self::Parse(err) => write!(f, "failed to parse scenario YAML: {err}"),
            Self::Mechanism(err) => write!(f, "invalid mechanism: {err}"),
        }
    }
}

impl std::error::Error for ScenarioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Mechanism(err) => Some(err),
        }
    }
}

impl From<MechanismError> for ScenarioError {
    fn from(err: MechanismError) -> Self {
        Self::Mechanism(err)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Match seed shared by every equipped mechanism.
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub input: PlayerInput,
    #[serde(default)]
    pub mechanisms: Vec<MechanismDefinition>,
    #[serde(default)]
    pub engine: EngineConfig,
}

impl Scenario {
    pub fn parse(raw: &str) -> Result<Self, ScenarioError> {
        serde_yaml::from_str(raw).map_err(ScenarioError::Parse)
    }

    pub fn with_seed(&self, seed: u64) -> Self {
        Self {
            seed,
            ..self.clone()
        }
    }

    pub fn equipped(&self) -> Vec<EquippedMechanism> {
        self.mechanisms
            .iter()
            .map(|definition| EquippedMechanism::new(definition.clone(), self.seed))
            .collect()
    }

    pub fn armament(&self) -> Result<Armament, ScenarioError> {
        Ok(Armament::from_definitions(&self.mechanisms, self.seed)?)
    }
}

pub fn load_scenario(path: impl AsRef<Path>) -> Result<Scenario, ScenarioError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(ScenarioError::Read)?;
    let scenario = Scenario::parse(&raw)?;
    tracing::debug!(
        path = %path.display(),
        seed = scenario.seed,
        mechanisms = scenario.mechanisms.len(),
        "scenario loaded"
    );
    Ok(scenario)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mechanisms::MechanismKind;

    const MINIMAL: &str = r#"
seed: 12
input:
  elevation: 30
mechanisms:
  - id: 1
    kind: elevation_dial
    modifiers:
      degrees_per_click: 1.0
      min_angle: 5
      max_angle: 45
"#;

    #[test]
    fn parses_minimal_scenario_with_default_engine() {
        let scenario = Scenario::parse(MINIMAL).unwrap();
        assert_eq!(scenario.seed, 12);
        assert_eq!(scenario.input.get("elevation"), Some(&30.0));
        assert_eq!(scenario.mechanisms[0].kind, MechanismKind::ElevationDial);
        assert_eq!(scenario.engine, EngineConfig::default());
        assert_eq!(scenario.equipped()[0].seed, 12);
    }

    #[test]
    fn unknown_kind_is_a_parse_error() {
        let err = Scenario::parse("mechanisms:\n  - id: 1\n    kind: trebuchet\n").unwrap_err();
        assert!(matches!(err, ScenarioError::Parse(_)));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = load_scenario("does/not/exist.yaml").unwrap_err();
        assert!(matches!(err, ScenarioError::Read(_)));
    }
}
