//! Fire control system: tower targeting, reload and trap slows.
//!
//! Normal towers cycle Idle -> fire -> Reloading -> Idle. Trap towers never
//! fire; every tick they refresh a slow on each enemy in range, weakened by
//! the enemy's resistance to the trap.

use hecs::{Entity, World};

use netguard_core::archetypes::DamageMatrix;
use netguard_core::components::{Enemy, Tower, TowerPhase};
use netguard_core::constants::TRAP_SLOW_DURATION_MS;
use netguard_core::types::Position;

use crate::modifiers::ModifierSet;
use crate::world_setup;

/// Target snapshot taken before towers act.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    entity: Entity,
    seq: u64,
    position: Position,
}

/// Run one fire-control pass. Returns the number of shots fired.
///
/// `rate_buff` is the fire-rate multiplier in effect (1.0 without a buff).
pub fn run(
    world: &mut World,
    modifiers: &ModifierSet,
    matrix: &DamageMatrix,
    dt_ms: f64,
    rate_buff: f64,
) -> usize {
    // Earliest spawn first: the entity store does not keep insertion order.
    let mut candidates: Vec<Candidate> = world
        .query::<&Enemy>()
        .iter()
        .filter(|(_, enemy)| !enemy.is_dead() && !enemy.is_finished())
        .map(|(entity, enemy)| Candidate {
            entity,
            seq: enemy.seq,
            position: enemy.position,
        })
        .collect();
    candidates.sort_by_key(|c| c.seq);

    let mut shots = Vec::new();
    let mut slows = Vec::new();

    for (_entity, tower) in world.query_mut::<&mut Tower>() {
        let stats = modifiers.tower_stats(tower.kind);

        if let Some(slow_factor) = tower.archetype().slow_factor {
            for candidate in &candidates {
                if tower.position.distance_to(&candidate.position) <= stats.range {
                    slows.push((candidate.entity, tower.kind, slow_factor));
                }
            }
            continue;
        }

        if tower.phase() == TowerPhase::Reloading {
            tower.cool_down(dt_ms, rate_buff);
            continue;
        }

        let target = candidates
            .iter()
            .find(|c| tower.position.distance_to(&c.position) <= stats.range);
        if let Some(target) = target {
            shots.push((tower.position, tower.kind, stats.damage, target.entity));
            tower.start_reload(stats.fire_interval_ms, rate_buff);
        }
    }

    for (entity, tower_kind, slow_factor) in slows {
        if let Ok(mut enemy) = world.get::<&mut Enemy>(entity) {
            let factor = trap_slow(slow_factor, matrix.get(tower_kind, enemy.kind));
            enemy.apply_slow(factor, TRAP_SLOW_DURATION_MS);
        }
    }

    let fired = shots.len();
    for (origin, kind, damage, target) in shots {
        world_setup::spawn_projectile(world, origin, kind, damage, target);
    }
    fired
}

/// Speed factor a trap applies to an enemy with damage multiplier
/// `multiplier` against it. Never above 1.0.
pub fn trap_slow(slow_factor: f64, multiplier: f64) -> f64 {
    if multiplier <= 0.0 {
        return 1.0;
    }
    (slow_factor / multiplier).min(1.0)
}
