//! Player commands sent from the input layer to the simulation.
//!
//! Commands are queued and processed at the next tick boundary. Each one
//! has a direct counterpart method on the match controller.

use serde::{Deserialize, Serialize};

use crate::enums::*;

/// All possible player actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    // --- Defenses ---
    /// Build a tower centred on (x, y).
    PlaceTower { kind: TowerKind, x: f64, y: f64 },
    /// Sell the tower under (x, y) for a partial refund.
    SellTower { x: f64, y: f64 },

    // --- Waves and perks ---
    /// Start the next wave (or trigger a due perk offer).
    StartNextWave,
    /// Pick one of the offered perks.
    ChoosePerk { perk: PerkKind },

    // --- Loot ---
    /// Cursor position polled by the input layer.
    CollectLootAt { x: f64, y: f64 },

    // --- Simulation control ---
    /// Set game speed (1.0 = normal).
    SetGameSpeed { multiplier: f64 },
    /// Rotate through 1x, 2x and 4x.
    CycleGameSpeed,
    /// Load a level and reset the match.
    LoadLevel { index: usize },
    Pause,
    Resume,
}
