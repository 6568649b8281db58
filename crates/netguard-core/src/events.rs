//! Events emitted by the simulation for UI and audio feedback.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::Position;

/// Something noteworthy that happened since the previous snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    LevelLoaded { index: usize },
    /// `wave` is 1-based.
    WaveStarted { wave: u32, enemies: u32 },
    WaveCleared { wave: u32 },
    LevelComplete,
    EnemyKilled { kind: EnemyKind, reward: u32, position: Position },
    EnemyLeaked { kind: EnemyKind, lives_left: u32 },
    TowerPlaced { kind: TowerKind, cost: u32 },
    TowerSold { kind: TowerKind, refund: u32 },
    LootDropped { kind: LootKind, position: Position },
    LootCollected { kind: LootKind },
    LootExpired { kind: LootKind },
    PerkOffered { choices: Vec<PerkKind> },
    PerkChosen { perk: PerkKind },
    RateBuffExpired,
    GameOver,
    GameWon,
    /// A queued command was refused.
    CommandRejected { reason: String },
}
