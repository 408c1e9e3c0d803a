//! Well-known pipeline value names.

// Player input.
pub const ELEVATION_CLICKS: &str = "elevation";
pub const DEFLECTION_TURNS: &str = "deflection";
pub const POWDER_CHARGES: &str = "powder_charges";

// Ballistic outputs.
pub const ANGLE_DEG: &str = "angle_deg";
pub const DEFLECTION_DEG: &str = "deflection_deg";
pub const BASE_INITIAL_VELOCITY: &str = "base_initial_velocity";
pub const INITIAL_VELOCITY: &str = "initial_velocity";
pub const SHELL_WEIGHT: &str = "shell_weight";
pub const SURFACE_AREA: &str = "surface_area";
pub const AREA_OF_EFFECT: &str = "area_of_effect";
