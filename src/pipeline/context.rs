use std::collections::BTreeMap;

use serde::Serialize;

use crate::pipeline::error::PipelineError;
use crate::pipeline::transform::PipelineTransform;

/// Named numeric values (player input, resolved attributes).
pub type ValueMap = BTreeMap<String, f64>;

/// Raw per-turn input from the player: dial clicks, screw turns, charge counts.
pub type PlayerInput = ValueMap;

/// Per-turn accumulator. Reads prefer values written by transforms and fall back
/// to the raw player input, so an untouched input passes straight through.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineContext {
    player_input: ValueMap,
    transforms: ValueMap,
    #[serde(skip)]
    frozen: bool,
}

impl PipelineContext {
    pub fn new(player_input: PlayerInput) -> Self {
        Self {
            player_input,
            transforms: ValueMap::new(),
            frozen: false,
        }
    }

    pub fn player_input(&self) -> &ValueMap {
        &self.player_input
    }

    pub fn transforms(&self) -> &ValueMap {
        &self.transforms
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.transforms
            .get(key)
            .or_else(|| self.player_input.get(key))
            .copied()
    }

    pub fn get_or(&self, key: &str, default: f64) -> f64 {
        self.get(key).unwrap_or(default)
    }

    /// Present in either layer.
    pub fn has(&self, key: &str) -> bool {
        self.transforms.contains_key(key) || self.player_input.contains_key(key)
    }

    /// Written by at least one transform.
    pub fn transformed(&self, key: &str) -> bool {
        self.transforms.contains_key(key)
    }

    /// Applies `transform` against the transform layer and returns the stored value.
    /// A multiplier on a key no transform has written stores 0.
    pub fn set_or_update(&mut self, transform: &PipelineTransform) -> Result<f64, PipelineError> {
        if self.frozen {
            return Err(PipelineError::FrozenContext {
                key: transform.key().to_string(),
            });
        }
        let current = self.transforms.get(transform.key()).copied();
        let next = match current {
            None if transform.is_multiplicative() => 0.0,
            _ => transform.apply(current),
        };
        self.transforms.insert(transform.key().to_string(), next);
        Ok(next)
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Both layers merged, transforms winning.
    pub fn resolved_values(&self) -> ValueMap {
        let mut merged = self.player_input.clone();
        merged.extend(self.transforms.iter().map(|(k, v)| (k.clone(), *v)));
        merged
    }
}
