use std::fmt;

use serde::Serialize;

use crate::ballistics::STANDARD_GRAVITY;
use crate::data::registry::MechanismRegistry;
use crate::data::scenario::Scenario;
use crate::mechanisms::MechanismKind;
use crate::pipeline::PriorityTier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.count(ValidationSeverity::Error) > 0
    }

    pub fn count(&self, severity: ValidationSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == severity)
            .count()
    }

    /// Most severe first, then in discovery order.
    pub fn sorted(&self) -> Vec<&ValidationDiagnostic> {
        let mut sorted: Vec<_> = self.diagnostics.iter().collect();
        sorted.sort_by_key(|diag| diag.severity);
        sorted
    }
}

/// Checks a loadout for problems that would fail at match start, plus softer
/// convention breaks a designer probably wants to hear about.
pub fn validate_scenario(scenario: &Scenario) -> ValidationReport {
    let mut report = ValidationReport::default();
    let registry = MechanismRegistry::new(scenario.mechanisms.clone());

    for (id, count) in registry.duplicate_ids() {
        report.push(
            ValidationSeverity::Error,
            format!("mechanism[{id}]"),
            format!("id {id} is used by {count} mechanisms"),
        );
    }

    for (slot, occupants) in registry.contested_slots() {
        let names: Vec<&str> = occupants.iter().map(|d| d.name.as_str()).collect();
        report.push(
            ValidationSeverity::Warning,
            format!("slot '{slot}'"),
            format!("occupied by {} mechanisms: {}", names.len(), names.join(", ")),
        );
    }

    for (index, definition) in scenario.mechanisms.iter().enumerate() {
        let context = format!("mechanisms[{index}] '{}'", definition.name);

        if let Err(err) = definition.to_runtime(scenario.seed) {
            report.push(ValidationSeverity::Error, context.clone(), err.to_string());
        }

        let tier = definition.kind.tier();
        if !tier.contains(definition.priority) {
            let actual = PriorityTier::for_priority(definition.priority)
                .map(|t| t.as_str())
                .unwrap_or("out of range");
            report.push(
                ValidationSeverity::Warning,
                context.clone(),
                format!(
                    "priority {} is outside the {} tier {tier} ({actual})",
                    definition.priority, definition.kind
                ),
            );
        }

        if definition.kind == MechanismKind::Sight {
            let sight_gravity = definition.modifier_or("gravity", STANDARD_GRAVITY);
            if (sight_gravity - scenario.engine.gravity).abs() > 1e-9 {
                report.push(
                    ValidationSeverity::Warning,
                    context.clone(),
                    format!(
                        "sight assumes gravity {sight_gravity} but the engine flies with {}",
                        scenario.engine.gravity
                    ),
                );
            }
        }

        for key in definition.kind.input_keys() {
            if !scenario.input.contains_key(*key) {
                report.push(
                    ValidationSeverity::Info,
                    context.clone(),
                    format!("player input '{key}' not provided; mechanism will pass through"),
                );
            }
        }
    }

    if scenario.mechanisms.is_empty() {
        report.push(
            ValidationSeverity::Info,
            "mechanisms",
            "no mechanisms equipped; every ballistic attribute uses its default",
        );
    }

    report
}
