//! Simulation engine for NETGUARD.
//!
//! Owns the hecs ECS world, runs systems in a fixed order each tick,
//! and produces GameStateSnapshots for the renderer or runner.

pub mod engine;
pub mod modifiers;
pub mod perks;
pub mod systems;
pub mod wave_composer;
pub mod world_setup;

pub use engine::{Game, SimConfig, WaveStart};
pub use netguard_core as core;

#[cfg(test)]
mod tests;
