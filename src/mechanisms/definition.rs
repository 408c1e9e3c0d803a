use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::mechanisms::runtime::MechanismRuntime;
use crate::mechanisms::{barrel, breech, cartridge, dials, drogue, recoil, sight};
use crate::pipeline::keys;
use crate::pipeline::orderer::PriorityTier;

#[derive(Debug, Clone, PartialEq)]
pub enum MechanismError {
    MissingModifier { mechanism: String, key: String },
    InvalidModifier {
        mechanism: String,
        key: String,
        value: f64,
        reason: &'static str,
    },
}

impl fmt::Display for MechanismError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingModifier { mechanism, key } => {
                write!(f, "mechanism '{mechanism}' is missing required modifier '{key}'")
            }
            Self::InvalidModifier {
                mechanism,
                key,
                value,
                reason,
            } => write!(f, "mechanism '{mechanism}' modifier '{key}' = {value}: {reason}"),
        }
    }
}

impl std::error::Error for MechanismError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MechanismKind {
    ElevationDial,
    DeflectionScrew,
    Cartridge,
    Barrel,
    Recoil,
    Breech,
    Drogue,
    Sight,
}

impl MechanismKind {
    pub const ALL: [MechanismKind; 8] = [
        Self::ElevationDial,
        Self::DeflectionScrew,
        Self::Cartridge,
        Self::Barrel,
        Self::Recoil,
        Self::Breech,
        Self::Drogue,
        Self::Sight,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ElevationDial => "elevation_dial",
            Self::DeflectionScrew => "deflection_screw",
            Self::Cartridge => "cartridge",
            Self::Barrel => "barrel",
            Self::Recoil => "recoil",
            Self::Breech => "breech",
            Self::Drogue => "drogue",
            Self::Sight => "sight",
        }
    }

    pub fn default_slot(self) -> &'static str {
        match self {
            Self::ElevationDial => "elevation",
            Self::DeflectionScrew => "traverse",
            Self::Cartridge => "cartridge",
            Self::Barrel => "barrel",
            Self::Recoil => "recoil",
            Self::Breech => "breech",
            Self::Drogue => "fuse",
            Self::Sight => "sight",
        }
    }

    pub fn default_priority(self) -> i32 {
        match self {
            Self::ElevationDial => 5,
            Self::DeflectionScrew => 6,
            Self::Cartridge => 10,
            Self::Barrel => 25,
            Self::Recoil => 45,
            Self::Breech => 50,
            Self::Drogue => 60,
            Self::Sight => 95,
        }
    }

    pub fn tier(self) -> PriorityTier {
        match self {
            Self::ElevationDial | Self::DeflectionScrew => PriorityTier::InputConverter,
            Self::Cartridge => PriorityTier::BaseValue,
            Self::Barrel => PriorityTier::Modifier,
            Self::Recoil | Self::Breech | Self::Drogue => PriorityTier::NonBallistic,
            Self::Sight => PriorityTier::Assistance,
        }
    }

    /// Player-input keys the runtime reads.
    pub fn input_keys(self) -> &'static [&'static str] {
        match self {
            Self::ElevationDial => &[keys::ELEVATION_CLICKS],
            Self::DeflectionScrew => &[keys::DEFLECTION_TURNS],
            Self::Cartridge => &[keys::POWDER_CHARGES],
            _ => &[],
        }
    }

    /// Pipeline keys the runtime may write.
    pub fn output_keys(self) -> &'static [&'static str] {
        match self {
            Self::ElevationDial => &[keys::ANGLE_DEG],
            Self::DeflectionScrew => &[keys::DEFLECTION_DEG],
            Self::Cartridge => &[
                keys::BASE_INITIAL_VELOCITY,
                keys::INITIAL_VELOCITY,
                keys::SHELL_WEIGHT,
                keys::SURFACE_AREA,
                keys::AREA_OF_EFFECT,
            ],
            Self::Barrel => &[keys::INITIAL_VELOCITY, keys::ANGLE_DEG],
            Self::Recoil => &[keys::ANGLE_DEG],
            Self::Breech | Self::Drogue | Self::Sight => &[],
        }
    }

    pub fn to_runtime(
        self,
        definition: &MechanismDefinition,
        seed: u64,
    ) -> Result<Box<dyn MechanismRuntime>, MechanismError> {
        Ok(match self {
            Self::ElevationDial => Box::new(dials::ElevationDial::new(definition, seed)?),
            Self::DeflectionScrew => Box::new(dials::DeflectionScrew::new(definition, seed)?),
            Self::Cartridge => Box::new(cartridge::Cartridge::new(definition, seed)?),
            Self::Barrel => Box::new(barrel::Barrel::new(definition, seed)?),
            Self::Recoil => Box::new(recoil::Recoil::new(definition, seed)?),
            Self::Breech => Box::new(breech::Breech::new(definition, seed)?),
            Self::Drogue => Box::new(drogue::Drogue::new(definition, seed)?),
            Self::Sight => Box::new(sight::Sight::new(definition, seed)?),
        })
    }
}

impl fmt::Display for MechanismKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable per-match description of one equipped component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDefinition")]
pub struct MechanismDefinition {
    /// Stable identity; mixed into the match seed for calibration.
    pub id: u64,
    pub name: String,
    pub kind: MechanismKind,
    pub slot_key: String,
    pub priority: i32,
    pub upgrade_level: u32,
    pub modifiers: BTreeMap<String, f64>,
}

#[derive(Deserialize)]
struct RawDefinition {
    id: u64,
    #[serde(default)]
    name: Option<String>,
    kind: MechanismKind,
    #[serde(default)]
    slot_key: Option<String>,
    #[serde(default)]
    priority: Option<i32>,
    #[serde(default)]
    upgrade_level: u32,
    #[serde(default)]
    modifiers: BTreeMap<String, f64>,
}

impl From<RawDefinition> for MechanismDefinition {
    fn from(raw: RawDefinition) -> Self {
        Self {
            id: raw.id,
            name: raw.name.unwrap_or_else(|| format!("{}#{}", raw.kind, raw.id)),
            kind: raw.kind,
            slot_key: raw
                .slot_key
                .unwrap_or_else(|| raw.kind.default_slot().to_string()),
            priority: raw.priority.unwrap_or_else(|| raw.kind.default_priority()),
            upgrade_level: raw.upgrade_level,
            modifiers: raw.modifiers,
        }
    }
}

impl MechanismDefinition {
    /// Definition with the kind's default slot and priority and no modifiers.
    pub fn new(id: u64, name: impl Into<String>, kind: MechanismKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            slot_key: kind.default_slot().to_string(),
            priority: kind.default_priority(),
            upgrade_level: 0,
            modifiers: BTreeMap::new(),
        }
    }

    pub fn with_modifier(mut self, key: impl Into<String>, value: f64) -> Self {
        self.modifiers.insert(key.into(), value);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_upgrade_level(mut self, upgrade_level: u32) -> Self {
        self.upgrade_level = upgrade_level;
        self
    }

    pub fn with_slot(mut self, slot_key: impl Into<String>) -> Self {
        self.slot_key = slot_key.into();
        self
    }

    pub fn to_runtime(&self, seed: u64) -> Result<Box<dyn MechanismRuntime>, MechanismError> {
        self.kind.to_runtime(self, seed)
    }

    pub fn modifier(&self, key: &str) -> Option<f64> {
        self.modifiers.get(key).copied()
    }

    pub fn modifier_or(&self, key: &str, default: f64) -> f64 {
        self.modifier(key).unwrap_or(default)
    }

    pub fn required_modifier(&self, key: &str) -> Result<f64, MechanismError> {
        self.modifier(key)
            .ok_or_else(|| MechanismError::MissingModifier {
                mechanism: self.name.clone(),
                key: key.to_string(),
            })
    }

    pub fn invalid_modifier(&self, key: &str, value: f64, reason: &'static str) -> MechanismError {
        MechanismError::InvalidModifier {
            mechanism: self.name.clone(),
            key: key.to_string(),
            value,
            reason,
        }
    }

    /// Required modifier that must be strictly positive.
    pub fn positive_modifier(&self, key: &str) -> Result<f64, MechanismError> {
        let value = self.required_modifier(key)?;
        if value > 0.0 && value.is_finite() {
            Ok(value)
        } else {
            Err(self.invalid_modifier(key, value, "must be positive"))
        }
    }

    pub fn upgrade_factor(&self) -> f64 {
        1.0 + self.upgrade_level as f64
    }
}
