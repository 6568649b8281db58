//! Entity models stored as hecs components.
//!
//! Each model owns its per-instance state plus the update rules that only
//! touch that state (movement, status timers, reload countdown). Anything
//! that needs other entities lives in the sim crate's systems.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::archetypes::{enemy_archetype, loot_archetype, tower_archetype, TowerArchetype};
use crate::constants::NOMINAL_FRAME_MS;
use crate::enums::*;
use crate::types::Position;

/// Shared, immutable path polyline. Enemies hold a reference, never a copy.
pub type Path = Arc<[Position]>;

/// A hostile unit walking the path.
#[derive(Debug, Clone)]
pub struct Enemy {
    pub kind: EnemyKind,
    /// Spawn sequence number; lower spawned earlier. Targeting priority.
    pub seq: u64,
    pub position: Position,
    path: Path,
    /// Index of the waypoint currently walked toward.
    next_waypoint: usize,
    pub base_speed: f64,
    /// Speed factor of the active slow (1.0 when none).
    slow_factor: f64,
    /// Remaining ms of the active slow.
    slow_remaining_ms: f64,
    health: f64,
    pub max_health: f64,
    /// Reached the end of the path. Terminal.
    finished: bool,
}

impl Enemy {
    /// Create an enemy at the path origin.
    pub fn new(kind: EnemyKind, path: Path, seq: u64) -> Self {
        let archetype = enemy_archetype(kind);
        let position = path.first().copied().unwrap_or_default();
        Self {
            kind,
            seq,
            position,
            finished: path.len() < 2,
            path,
            next_waypoint: 1,
            base_speed: archetype.speed,
            slow_factor: 1.0,
            slow_remaining_ms: 0.0,
            health: archetype.max_health,
            max_health: archetype.max_health,
        }
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn health_fraction(&self) -> f64 {
        if self.max_health > 0.0 {
            (self.health / self.max_health).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_slowed(&self) -> bool {
        self.slow_remaining_ms > 0.0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Speed per nominal frame with the active slow but without global factors.
    pub fn current_speed(&self) -> f64 {
        self.base_speed * self.slow_factor
    }

    /// Apply (or refresh) a slow. The last application wins; slows never stack.
    pub fn apply_slow(&mut self, factor: f64, duration_ms: f64) {
        self.slow_factor = factor.clamp(0.0, 1.0);
        self.slow_remaining_ms = duration_ms.max(0.0);
    }

    /// Advance along the path by `dt_ms` of simulation time.
    ///
    /// `speed_multiplier` is the global enemy-speed factor. A slow in effect
    /// at the start of the frame covers the whole frame; its timer decays
    /// afterwards, so a slow refreshed every tick holds at any frame length.
    pub fn advance(&mut self, dt_ms: f64, speed_multiplier: f64) {
        if !self.finished {
            let step = self.current_speed() * speed_multiplier * (dt_ms / NOMINAL_FRAME_MS);
            let target = self.path[self.next_waypoint];
            if self.position.step_toward(target, step) {
                self.next_waypoint += 1;
                if self.next_waypoint >= self.path.len() {
                    self.finished = true;
                }
            }
        }

        if self.slow_remaining_ms > 0.0 {
            self.slow_remaining_ms -= dt_ms;
            if self.slow_remaining_ms <= 0.0 {
                self.slow_remaining_ms = 0.0;
                self.slow_factor = 1.0;
            }
        }
    }

    /// Subtract `amount` from health. Returns `true` if this hit crossed
    /// the enemy from alive to dead.
    pub fn take_damage(&mut self, amount: f64) -> bool {
        if self.is_dead() {
            return false;
        }
        self.health -= amount.max(0.0);
        self.is_dead()
    }
}

/// Tower reload state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TowerPhase {
    Idle,
    Reloading,
}

/// A player-placed tower.
///
/// Stats are not stored here: they are the archetype's base values layered
/// with the match's modifier set at the moment they are read.
#[derive(Debug, Clone, Copy)]
pub struct Tower {
    pub kind: TowerKind,
    pub position: Position,
    /// Remaining reload in ms. Never negative.
    reload_ms: f64,
}

impl Tower {
    pub fn new(kind: TowerKind, position: Position) -> Self {
        Self {
            kind,
            position,
            reload_ms: 0.0,
        }
    }

    pub fn archetype(&self) -> TowerArchetype {
        tower_archetype(self.kind)
    }

    pub fn is_trap(&self) -> bool {
        self.archetype().slow_factor.is_some()
    }

    pub fn reload_ms(&self) -> f64 {
        self.reload_ms
    }

    pub fn phase(&self) -> TowerPhase {
        if self.reload_ms > 0.0 {
            TowerPhase::Reloading
        } else {
            TowerPhase::Idle
        }
    }

    /// Count the reload down by `dt_ms`, sped up by `rate_buff`.
    pub fn cool_down(&mut self, dt_ms: f64, rate_buff: f64) {
        self.reload_ms = (self.reload_ms - dt_ms * rate_buff).max(0.0);
    }

    /// Start a reload after firing.
    pub fn start_reload(&mut self, fire_interval_ms: f64, rate_buff: f64) {
        self.reload_ms = (fire_interval_ms / rate_buff).max(0.0);
    }
}

/// A collectible lying on the field.
#[derive(Debug, Clone, Copy)]
pub struct LootDrop {
    pub kind: LootKind,
    pub position: Position,
    /// Simulation time of the drop, ms.
    pub created_at_ms: f64,
    pub duration_ms: f64,
}

impl LootDrop {
    pub fn new(kind: LootKind, position: Position, now_ms: f64) -> Self {
        Self {
            kind,
            position,
            created_at_ms: now_ms,
            duration_ms: loot_archetype(kind).duration_ms,
        }
    }

    pub fn is_expired(&self, now_ms: f64) -> bool {
        now_ms - self.created_at_ms > self.duration_ms
    }

    /// Fraction of lifetime left, 1.0 when fresh.
    pub fn remaining_fraction(&self, now_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 0.0;
        }
        (1.0 - (now_ms - self.created_at_ms) / self.duration_ms).clamp(0.0, 1.0)
    }
}
