//! Scripted input layer.
//!
//! Reads snapshots the way a player's UI would and answers with commands:
//! builds towers beside the path while money allows, starts waves, takes
//! the rarest perk on offer, sweeps every loot drop and advances levels.

use netguard_core::archetypes::tower_archetype;
use netguard_core::commands::PlayerCommand;
use netguard_core::enums::{GamePhase, PerkKind, TowerKind};
use netguard_core::state::{GameStateSnapshot, PerkOfferView};
use netguard_core::types::Position;

/// Distance from the path centreline to a tower slot.
const SLOT_OFFSET: f64 = 45.0;

/// Fractions along each path segment where slots sit.
const SLOT_STOPS: [f64; 2] = [0.33, 0.66];

/// Ticks to wait after acting before acting again, so the next decision
/// sees a snapshot that already reflects the previous commands.
const SETTLE_TICKS: u64 = 2;

const BUILD_ROTATION: [TowerKind; 5] = [
    TowerKind::Firewall,
    TowerKind::Firewall,
    TowerKind::Antivirus,
    TowerKind::Honeypot,
    TowerKind::Ids,
];

/// Candidate tower positions, alternating sides along the path.
pub fn tower_slots(waypoints: &[Position]) -> Vec<Position> {
    waypoints
        .windows(2)
        .flat_map(|segment| {
            let (a, b) = (segment[0].to_vec(), segment[1].to_vec());
            let normal = (b - a).normalize_or_zero().perp();
            SLOT_STOPS.into_iter().enumerate().map(move |(i, t)| {
                let side = if i % 2 == 0 { 1.0 } else { -1.0 };
                Position::from_vec(a.lerp(b, t) + normal * SLOT_OFFSET * side)
            })
        })
        .collect()
}

/// Rarest perk on offer; the first listed wins ties.
pub fn pick_perk(offer: &PerkOfferView) -> Option<PerkKind> {
    offer
        .choices
        .iter()
        .rev()
        .max_by_key(|choice| choice.rarity)
        .map(|choice| choice.perk)
}

#[derive(Debug, Default)]
pub struct Autopilot {
    slots: Vec<Position>,
    next_slot: usize,
    level_index: Option<usize>,
    last_action_tick: Option<u64>,
    perk_requested: bool,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Towers ordered so far on the current level.
    pub fn towers_ordered(&self) -> usize {
        self.next_slot
    }

    /// Decide this frame's commands.
    pub fn plan(&mut self, snap: &GameStateSnapshot) -> Vec<PlayerCommand> {
        if snap.game_over || snap.game_won {
            return Vec::new();
        }

        let tick = snap.time.tick;
        let rewound = self.last_action_tick.is_some_and(|last| tick < last);
        if self.level_index != Some(snap.level.index) || rewound {
            self.reset(snap);
        }

        match snap.phase {
            GamePhase::PerkSelection => return self.answer_offer(snap),
            GamePhase::Active | GamePhase::LevelComplete => {}
            _ => return Vec::new(),
        }
        self.perk_requested = false;

        if self
            .last_action_tick
            .is_some_and(|last| tick < last + SETTLE_TICKS)
        {
            return Vec::new();
        }

        let mut commands: Vec<PlayerCommand> = snap
            .loot
            .iter()
            .map(|drop| PlayerCommand::CollectLootAt {
                x: drop.position.x,
                y: drop.position.y,
            })
            .collect();

        if snap.level_complete {
            commands.push(PlayerCommand::LoadLevel {
                index: snap.level.index + 1,
            });
        } else {
            commands.extend(self.build(snap));
            if !snap.wave_in_progress {
                commands.push(PlayerCommand::StartNextWave);
            }
        }

        if !commands.is_empty() {
            self.last_action_tick = Some(tick);
        }
        commands
    }

    fn reset(&mut self, snap: &GameStateSnapshot) {
        tracing::debug!(level = snap.level.index, "autopilot surveying level");
        self.slots = tower_slots(&snap.level.waypoints);
        self.next_slot = 0;
        self.level_index = Some(snap.level.index);
        self.last_action_tick = None;
        self.perk_requested = false;
    }

    fn answer_offer(&mut self, snap: &GameStateSnapshot) -> Vec<PlayerCommand> {
        if self.perk_requested {
            return Vec::new();
        }
        let Some(perk) = snap.perk_offer.as_ref().and_then(pick_perk) else {
            return Vec::new();
        };
        self.perk_requested = true;
        vec![PlayerCommand::ChoosePerk { perk }]
    }

    /// Order towers into free slots until the money runs out.
    fn build(&mut self, snap: &GameStateSnapshot) -> Vec<PlayerCommand> {
        let mut budget = snap.economy.money;
        let mut commands = Vec::new();
        while let Some(&slot) = self.slots.get(self.next_slot) {
            let kind = BUILD_ROTATION[self.next_slot % BUILD_ROTATION.len()];
            let cost = (f64::from(tower_archetype(kind).cost) * snap.modifiers.cost).floor() as u32;
            if cost > budget {
                break;
            }
            budget -= cost;
            self.next_slot += 1;
            commands.push(PlayerCommand::PlaceTower {
                kind,
                x: slot.x,
                y: slot.y,
            });
        }
        commands
    }
}
