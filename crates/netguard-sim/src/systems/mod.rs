//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are free functions over `&mut World` (or `&World` for read-only).
//! They own no state; match-level state is passed in by the controller.

pub mod cleanup;
pub mod fire_control;
pub mod loot;
pub mod movement;
pub mod projectile;
pub mod snapshot;
pub mod wave_spawner;
