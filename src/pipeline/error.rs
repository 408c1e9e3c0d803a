use std::fmt;

use crate::pipeline::transform::TransformError;

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    Transform(TransformError),
    /// A frozen context rejected a late write.
    FrozenContext { key: String },
    /// A runtime could not produce its contribution for this turn.
    Runtime { mechanism: String, message: String },
    /// Resolution stopped at `mechanism`; nothing from this turn was committed.
    Aborted {
        mechanism: String,
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    pub fn runtime(mechanism: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Runtime {
            mechanism: mechanism.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transform(err) => write!(f, "{err}"),
            Self::FrozenContext { key } => {
                write!(f, "pipeline context is frozen; cannot update '{key}'")
            }
            Self::Runtime { mechanism, message } => write!(f, "{mechanism}: {message}"),
            Self::Aborted { mechanism, source } => {
                write!(f, "pipeline aborted at '{mechanism}': {source}")
            }
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transform(err) => Some(err),
            Self::Aborted { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<TransformError> for PipelineError {
    fn from(err: TransformError) -> Self {
        Self::Transform(err)
    }
}
