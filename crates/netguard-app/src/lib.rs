//! NETGUARD headless runner.
//!
//! Drives the simulation on a wall-clock game-loop thread and feeds it
//! commands from a scripted autopilot standing in for the input layer.

pub mod autopilot;
pub mod game_loop;
pub mod state;

pub use netguard_core as core;
