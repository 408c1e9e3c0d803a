pub mod barrel;
pub mod breech;
pub mod cartridge;
pub mod definition;
pub mod dials;
pub mod drogue;
pub mod recoil;
pub mod rng;
pub mod runtime;
pub mod sight;

pub use barrel::Barrel;
pub use breech::Breech;
pub use cartridge::Cartridge;
pub use definition::{MechanismDefinition, MechanismError, MechanismKind};
pub use dials::{DeflectionScrew, ElevationDial};
pub use drogue::Drogue;
pub use recoil::Recoil;
pub use rng::{mix_seed, Rng};
pub use runtime::{AssistanceProvider, MechanismRuntime, Metadata};
pub use sight::Sight;
