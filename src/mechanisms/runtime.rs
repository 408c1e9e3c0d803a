use std::fmt;

use serde_json::{Map, Value};

use crate::ballistics::{Affector, FlightHook};
use crate::mechanisms::definition::MechanismDefinition;
use crate::pipeline::{PipelineContext, PipelineError, PipelineTransform};

/// Free-form data for rendering and assistance. Never fed to the physics.
pub type Metadata = Map<String, Value>;

/// Per-match behaviour of one equipped mechanism.
///
/// Runtimes calibrate themselves once at construction and are read-only afterwards,
/// so every turn of a match sees the same constants.
pub trait MechanismRuntime: fmt::Debug + Send + Sync {
    fn definition(&self) -> &MechanismDefinition;

    /// Transforms this mechanism contributes for the turn, given everything resolved
    /// by earlier mechanisms.
    fn resolve(&self, context: &PipelineContext) -> Result<Vec<PipelineTransform>, PipelineError>;

    fn ui_metadata(&self) -> Metadata {
        Metadata::new()
    }

    /// Seconds this mechanism adds to the owner's next turn.
    fn turn_order_delay(&self) -> f64 {
        0.0
    }

    fn assistance(&self) -> Option<&dyn AssistanceProvider> {
        None
    }

    fn engine_affectors(&self) -> Vec<Box<dyn Affector>> {
        Vec::new()
    }

    fn engine_hooks(&self) -> Vec<Box<dyn FlightHook>> {
        Vec::new()
    }

    fn name(&self) -> &str {
        &self.definition().name
    }

    fn priority(&self) -> i32 {
        self.definition().priority
    }
}

/// Optional capability: read the final resolved context and report aiming help.
pub trait AssistanceProvider {
    fn assistance_data(&self, context: &PipelineContext) -> Metadata;
}

pub(crate) fn metadata<I, K>(entries: I) -> Metadata
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    entries.into_iter().map(|(k, v)| (k.into(), v)).collect()
}
