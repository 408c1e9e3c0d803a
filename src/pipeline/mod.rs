//! Per-turn mechanism pipeline: ordered runtimes emit transforms into a two-layer
//! context, which is then read back as ballistic attributes.

pub mod context;
pub mod error;
pub mod keys;
pub mod orderer;
pub mod resolver;
pub mod transform;

pub use context::{PipelineContext, PlayerInput, ValueMap};
pub use error::PipelineError;
pub use orderer::{ordered_by, MechanismOrderer, PriorityTier};
pub use resolver::{BallisticAttributes, PipelineResolver, UiEntry};
pub use transform::{is_symbolic_key, PipelineTransform, TransformError, TransformOperation};
