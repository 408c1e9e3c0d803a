pub mod registry;
pub mod scenario;
pub mod validate;

pub use registry::MechanismRegistry;
pub use scenario::{load_scenario, Scenario, ScenarioError, DEFAULT_SCENARIO_PATH};
pub use validate::{validate_scenario, ValidationDiagnostic, ValidationReport, ValidationSeverity};
