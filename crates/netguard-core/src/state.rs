//! Game state snapshot: the complete visible state handed to the renderer
//! after each tick. Valid until the next tick only.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::GameEvent;
use crate::types::{Position, SimTime};

/// Complete game state broadcast to the renderer after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub mode: GameMode,
    pub level: LevelView,
    pub economy: EconomyView,
    pub game_speed: f64,
    pub enemies: Vec<EnemyView>,
    pub towers: Vec<TowerView>,
    pub projectiles: Vec<ProjectileView>,
    pub loot: Vec<LootView>,
    pub perk_offer: Option<PerkOfferView>,
    pub modifiers: ModifiersView,
    /// Remaining ms of the fire-rate buff, if active.
    pub rate_buff_remaining_ms: Option<f64>,
    pub wave_in_progress: bool,
    pub level_complete: bool,
    pub game_over: bool,
    pub game_won: bool,
    pub events: Vec<GameEvent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelView {
    pub index: usize,
    pub name: String,
    pub story: Vec<String>,
    pub waypoints: Vec<Position>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EconomyView {
    pub money: u32,
    pub lives: u32,
    pub max_lives: u32,
    /// Waves started so far in this level.
    pub wave_index: u32,
    /// Scripted wave count; `None` in endless mode.
    pub wave_total: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyView {
    pub id: u64,
    pub kind: EnemyKind,
    pub position: Position,
    /// 0.0 - 1.0.
    pub health_fraction: f64,
    pub slowed: bool,
    /// Speed per nominal frame including slows and global factors.
    pub speed: f64,
    pub radius: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TowerView {
    pub id: u64,
    pub kind: TowerKind,
    pub position: Position,
    pub damage: f64,
    pub range: f64,
    pub fire_interval_ms: f64,
    pub reloading: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub position: Position,
    pub tower_kind: TowerKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LootView {
    pub id: u64,
    pub kind: LootKind,
    pub position: Position,
    /// 1.0 when fresh, 0.0 at expiry.
    pub remaining_fraction: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerkOfferView {
    pub choices: Vec<PerkChoiceView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerkChoiceView {
    pub perk: PerkKind,
    pub name: String,
    pub description: String,
    pub rarity: Rarity,
}

/// Current global multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModifiersView {
    pub damage: f64,
    pub range: f64,
    pub fire_interval: f64,
    pub cost: f64,
    pub reward: f64,
    pub enemy_speed: f64,
}

impl Default for ModifiersView {
    fn default() -> Self {
        Self {
            damage: 1.0,
            range: 1.0,
            fire_interval: 1.0,
            cost: 1.0,
            reward: 1.0,
            enemy_speed: 1.0,
        }
    }
}

/// One line of the pre-level briefing: an enemy type and the towers that
/// counter it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntelEntry {
    pub enemy: EnemyKind,
    pub name: String,
    pub effective_towers: Vec<TowerKind>,
}
