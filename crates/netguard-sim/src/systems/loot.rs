//! Loot drops: kill-time rolls, lifetime expiry and proximity pickup.

use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use netguard_core::archetypes::loot_archetype;
use netguard_core::components::LootDrop;
use netguard_core::constants::{LOOT_DROP_CHANCE, LOOT_PICK_RADIUS};
use netguard_core::enums::LootKind;
use netguard_core::types::Position;

/// Roll for a drop on a kill: a flat chance, then a sub-roll against the
/// cumulative bands in `LootKind::BAND_ORDER`.
pub fn roll_drop(rng: &mut ChaCha8Rng) -> Option<LootKind> {
    if rng.gen::<f64>() >= LOOT_DROP_CHANCE {
        return None;
    }
    band_for(rng.gen::<f64>())
}

/// Map a sub-roll in [0, 1) to a loot kind. Past every band yields nothing.
pub fn band_for(roll: f64) -> Option<LootKind> {
    let mut upper = 0.0;
    for kind in LootKind::BAND_ORDER {
        upper += loot_archetype(kind).chance;
        if roll < upper {
            return Some(kind);
        }
    }
    None
}

/// Despawn drops whose lifetime has passed. Returns the expired kinds.
pub fn expire(world: &mut World, now_ms: f64, despawn_buffer: &mut Vec<Entity>) -> Vec<LootKind> {
    despawn_buffer.clear();
    let mut expired = Vec::new();
    for (entity, drop) in world.query_mut::<&LootDrop>() {
        if drop.is_expired(now_ms) {
            despawn_buffer.push(entity);
            expired.push(drop.kind);
        }
    }
    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
    expired
}

/// The earliest-dropped live drop strictly within pickup reach of `point`.
pub fn find_in_reach(world: &World, point: Position, now_ms: f64) -> Option<(Entity, LootDrop)> {
    world
        .query::<&LootDrop>()
        .iter()
        .filter(|(_, drop)| !drop.is_expired(now_ms))
        .filter(|(_, drop)| drop.position.distance_to(&point) < LOOT_PICK_RADIUS)
        .map(|(entity, drop)| (entity, *drop))
        .min_by(|(a_entity, a), (b_entity, b)| {
            a.created_at_ms
                .total_cmp(&b.created_at_ms)
                .then_with(|| a_entity.id().cmp(&b_entity.id()))
        })
}
