//! Enemy movement system.
//!
//! Advances every live enemy along its path. Finished or dead enemies are
//! left for reconciliation and do not move.

use hecs::World;

use netguard_core::components::Enemy;

/// Advance all enemies by `dt_ms` under the global enemy speed factor.
pub fn run(world: &mut World, dt_ms: f64, enemy_speed: f64) {
    for (_entity, enemy) in world.query_mut::<&mut Enemy>() {
        if enemy.is_dead() {
            continue;
        }
        enemy.advance(dt_ms, enemy_speed);
    }
}
