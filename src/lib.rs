//! Artillery shot resolution: a per-turn mechanism pipeline that turns player input
//! into ballistic attributes, and a fixed-timestep engine that flies the shell.

pub mod ballistics;
pub mod cli;
pub mod config;
pub mod data;
pub mod logging;
pub mod mechanisms;
pub mod parallel;
pub mod pipeline;
pub mod turn;

pub use config::EngineConfig;
pub use turn::{resolve_turn, simulate_shot, Armament, EquippedMechanism, TurnError, TurnResolution};
