//! Core types and definitions for the netguard simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! archetype tables, entity models, commands, state snapshots, events,
//! level definitions and constants. It has no dependency on the ECS or
//! any runtime framework.

pub mod archetypes;
pub mod commands;
pub mod components;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod levels;
pub mod state;
pub mod types;
