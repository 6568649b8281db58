//! Entity spawn factories.
//!
//! Each entity kind is a single component; the factories exist so every
//! spawn site builds it the same way.

use hecs::{Entity, World};

use netguard_core::components::{Enemy, LootDrop, Path, Tower};
use netguard_core::enums::{EnemyKind, LootKind, TowerKind};
use netguard_core::types::Position;

use crate::systems::projectile::Projectile;

/// Spawn an enemy at the origin of `path`.
pub fn spawn_enemy(world: &mut World, kind: EnemyKind, path: Path, seq: u64) -> Entity {
    world.spawn((Enemy::new(kind, path, seq),))
}

pub fn spawn_tower(world: &mut World, kind: TowerKind, position: Position) -> Entity {
    world.spawn((Tower::new(kind, position),))
}

/// Spawn a projectile at `origin` homing on `target`.
pub fn spawn_projectile(
    world: &mut World,
    origin: Position,
    tower_kind: TowerKind,
    damage: f64,
    target: Entity,
) -> Entity {
    world.spawn((Projectile::new(origin, tower_kind, damage, target),))
}

pub fn spawn_loot(world: &mut World, kind: LootKind, position: Position, now_ms: f64) -> Entity {
    world.spawn((LootDrop::new(kind, position, now_ms),))
}

/// Stable snapshot id for an entity.
pub fn entity_id(entity: Entity) -> u64 {
    entity.to_bits().get()
}
