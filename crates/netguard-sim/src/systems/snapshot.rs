//! Snapshot system: queries the ECS world and builds a complete GameStateSnapshot.
//!
//! Read-only: it never modifies the world.

use hecs::World;

use netguard_core::archetypes::enemy_archetype;
use netguard_core::components::{Enemy, LootDrop, Tower, TowerPhase};
use netguard_core::enums::{GameMode, GamePhase};
use netguard_core::events::GameEvent;
use netguard_core::state::*;
use netguard_core::types::SimTime;

use crate::modifiers::ModifierSet;
use crate::systems::projectile::Projectile;
use crate::world_setup::entity_id;

/// Match-level state that does not live in the world.
pub struct SnapshotFrame {
    pub time: SimTime,
    pub phase: GamePhase,
    pub mode: GameMode,
    pub level: LevelView,
    pub economy: EconomyView,
    pub game_speed: f64,
    pub modifiers: ModifierSet,
    pub perk_offer: Option<PerkOfferView>,
    pub rate_buff_remaining_ms: Option<f64>,
    pub wave_in_progress: bool,
    pub level_complete: bool,
    pub events: Vec<GameEvent>,
}

/// Build a complete GameStateSnapshot from the current world state.
pub fn build_snapshot(world: &World, frame: SnapshotFrame) -> GameStateSnapshot {
    let now_ms = frame.time.elapsed_ms;

    GameStateSnapshot {
        time: frame.time,
        phase: frame.phase,
        mode: frame.mode,
        level: frame.level,
        economy: frame.economy,
        game_speed: frame.game_speed,
        enemies: build_enemies(world, frame.modifiers.enemy_speed),
        towers: build_towers(world, &frame.modifiers),
        projectiles: build_projectiles(world),
        loot: build_loot(world, now_ms),
        perk_offer: frame.perk_offer,
        modifiers: frame.modifiers.view(),
        rate_buff_remaining_ms: frame.rate_buff_remaining_ms,
        wave_in_progress: frame.wave_in_progress,
        level_complete: frame.level_complete,
        game_over: frame.phase == GamePhase::GameOver,
        game_won: frame.phase == GamePhase::GameWon,
        events: frame.events,
    }
}

/// Enemies in spawn order.
fn build_enemies(world: &World, enemy_speed: f64) -> Vec<EnemyView> {
    let mut enemies: Vec<(u64, EnemyView)> = world
        .query::<&Enemy>()
        .iter()
        .map(|(entity, enemy)| {
            (
                enemy.seq,
                EnemyView {
                    id: entity_id(entity),
                    kind: enemy.kind,
                    position: enemy.position,
                    health_fraction: enemy.health_fraction(),
                    slowed: enemy.is_slowed(),
                    speed: enemy.current_speed() * enemy_speed,
                    radius: enemy_archetype(enemy.kind).radius,
                },
            )
        })
        .collect();
    enemies.sort_by_key(|(seq, _)| *seq);
    enemies.into_iter().map(|(_, view)| view).collect()
}

fn build_towers(world: &World, modifiers: &ModifierSet) -> Vec<TowerView> {
    let mut towers: Vec<TowerView> = world
        .query::<&Tower>()
        .iter()
        .map(|(entity, tower)| {
            let stats = modifiers.tower_stats(tower.kind);
            TowerView {
                id: entity_id(entity),
                kind: tower.kind,
                position: tower.position,
                damage: stats.damage,
                range: stats.range,
                fire_interval_ms: stats.fire_interval_ms,
                reloading: tower.phase() == TowerPhase::Reloading,
            }
        })
        .collect();
    towers.sort_by_key(|t| t.id);
    towers
}

fn build_projectiles(world: &World) -> Vec<ProjectileView> {
    world
        .query::<&Projectile>()
        .iter()
        .filter(|(_, projectile)| projectile.active)
        .map(|(_, projectile)| ProjectileView {
            position: projectile.position,
            tower_kind: projectile.tower_kind,
        })
        .collect()
}

/// Loot in drop order.
fn build_loot(world: &World, now_ms: f64) -> Vec<LootView> {
    let mut loot: Vec<(f64, LootView)> = world
        .query::<&LootDrop>()
        .iter()
        .map(|(entity, drop)| {
            (
                drop.created_at_ms,
                LootView {
                    id: entity_id(entity),
                    kind: drop.kind,
                    position: drop.position,
                    remaining_fraction: drop.remaining_fraction(now_ms),
                },
            )
        })
        .collect();
    loot.sort_by(|(a, a_view), (b, b_view)| a.total_cmp(b).then(a_view.id.cmp(&b_view.id)));
    loot.into_iter().map(|(_, view)| view).collect()
}
