//! Base-value source: powder charges in, muzzle velocity, shell weight and drag area out.

use std::f64::consts::PI;

use serde_json::json;

use crate::mechanisms::definition::{MechanismDefinition, MechanismError};
use crate::mechanisms::rng::Rng;
use crate::mechanisms::runtime::{metadata, Metadata, MechanismRuntime};
use crate::pipeline::{keys, PipelineContext, PipelineError, PipelineTransform};

pub const DEFAULT_VELOCITY_VARIANCE: f64 = 0.05;
pub const DEFAULT_WEIGHT_VARIANCE: f64 = 0.02;

#[derive(Debug, Clone)]
pub struct Cartridge {
    definition: MechanismDefinition,
    base_velocity: f64,
    velocity_per_charge: f64,
    velocity_factor: f64,
    shell_weight: f64,
    surface_area: f64,
    max_charges: Option<f64>,
    area_of_effect: Option<f64>,
}

impl Cartridge {
    pub fn new(definition: &MechanismDefinition, seed: u64) -> Result<Self, MechanismError> {
        let base_velocity = definition.positive_modifier("base_velocity")?;
        let velocity_per_charge = definition.required_modifier("velocity_per_charge")?;
        let nominal_weight = definition.positive_modifier("shell_weight")?;
        let caliber = definition.positive_modifier("caliber")?;
        let max_charges = definition.modifier("max_charges");
        if let Some(max) = max_charges.filter(|max| *max < 0.0) {
            return Err(definition.invalid_modifier("max_charges", max, "must not be negative"));
        }

        let upgrade = definition.upgrade_factor();
        let velocity_variance =
            definition.modifier_or("velocity_variance", DEFAULT_VELOCITY_VARIANCE).abs() / upgrade;
        let weight_variance =
            definition.modifier_or("weight_variance", DEFAULT_WEIGHT_VARIANCE).abs() / upgrade;

        let mut rng = Rng::for_mechanism(seed, definition.id);
        let velocity_factor = rng.variance_factor(velocity_variance);
        let shell_weight = nominal_weight * rng.variance_factor(weight_variance);
        let radius = caliber / 2.0;

        Ok(Self {
            definition: definition.clone(),
            base_velocity,
            velocity_per_charge,
            velocity_factor,
            shell_weight,
            surface_area: PI * radius * radius,
            max_charges,
            area_of_effect: definition.modifier("area_of_effect"),
        })
    }

    pub fn velocity_factor(&self) -> f64 {
        self.velocity_factor
    }

    pub fn shell_weight(&self) -> f64 {
        self.shell_weight
    }

    pub fn surface_area(&self) -> f64 {
        self.surface_area
    }

    /// Muzzle velocity for `charges`, after clamping to `[0, max_charges]`.
    pub fn velocity_for(&self, charges: f64) -> f64 {
        let upper = self.max_charges.unwrap_or(f64::INFINITY);
        let clamped = charges.clamp(0.0, upper);
        if clamped != charges {
            tracing::warn!(
                mechanism = self.name(),
                requested = charges,
                clamped,
                "powder charges clamped"
            );
        }
        (self.base_velocity + clamped * self.velocity_per_charge) * self.velocity_factor
    }
}

impl MechanismRuntime for Cartridge {
    fn definition(&self) -> &MechanismDefinition {
        &self.definition
    }

    fn resolve(&self, context: &PipelineContext) -> Result<Vec<PipelineTransform>, PipelineError> {
        let charges = context.get_or(keys::POWDER_CHARGES, 0.0);
        let velocity = self.velocity_for(charges);

        let mut transforms = vec![
            PipelineTransform::set(keys::BASE_INITIAL_VELOCITY, velocity)?,
            PipelineTransform::set(keys::INITIAL_VELOCITY, velocity)?,
            PipelineTransform::set(keys::SHELL_WEIGHT, self.shell_weight)?,
            PipelineTransform::set(keys::SURFACE_AREA, self.surface_area)?,
        ];
        if let Some(area_of_effect) = self.area_of_effect {
            transforms.push(PipelineTransform::set(keys::AREA_OF_EFFECT, area_of_effect)?);
        }
        Ok(transforms)
    }

    fn ui_metadata(&self) -> Metadata {
        metadata([
            ("base_velocity", json!(self.base_velocity * self.velocity_factor)),
            ("velocity_per_charge", json!(self.velocity_per_charge * self.velocity_factor)),
            ("shell_weight", json!(self.shell_weight)),
            ("surface_area", json!(self.surface_area)),
            ("max_charges", json!(self.max_charges)),
        ])
    }
}
