//! Cleanup system: reaps finished and dead enemies and spent projectiles.
//!
//! Economy effects of each reaped enemy are applied by the caller from the
//! returned list, in spawn order.

use hecs::{Entity, World};

use netguard_core::components::Enemy;
use netguard_core::enums::EnemyKind;
use netguard_core::types::Position;

use crate::systems::projectile::Projectile;

/// Why an enemy left the field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reaped {
    /// Reached the end of the path. Checked before death.
    Leaked { kind: EnemyKind },
    Killed { kind: EnemyKind, position: Position },
}

/// Remove finished/dead enemies and inactive projectiles.
/// Uses a pre-allocated buffer to avoid per-tick allocation.
pub fn run(world: &mut World, despawn_buffer: &mut Vec<Entity>) -> Vec<Reaped> {
    despawn_buffer.clear();

    let mut reaped: Vec<(u64, Reaped)> = Vec::new();
    for (entity, enemy) in world.query_mut::<&Enemy>() {
        let outcome = if enemy.is_finished() {
            Reaped::Leaked { kind: enemy.kind }
        } else if enemy.is_dead() {
            Reaped::Killed {
                kind: enemy.kind,
                position: enemy.position,
            }
        } else {
            continue;
        };
        reaped.push((enemy.seq, outcome));
        despawn_buffer.push(entity);
    }

    for (entity, projectile) in world.query_mut::<&Projectile>() {
        if !projectile.active {
            despawn_buffer.push(entity);
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }

    reaped.sort_by_key(|(seq, _)| *seq);
    reaped.into_iter().map(|(_, outcome)| outcome).collect()
}
