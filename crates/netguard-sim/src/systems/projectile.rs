//! Homing projectiles and damage resolution.
//!
//! A projectile holds its target by entity handle only. The target may be
//! despawned or killed by another shot before arrival; either way the
//! projectile deactivates without effect.

use hecs::{Entity, World};

use netguard_core::archetypes::DamageMatrix;
use netguard_core::components::Enemy;
use netguard_core::constants::{NOMINAL_FRAME_MS, PROJECTILE_SPEED};
use netguard_core::enums::{EnemyKind, TowerKind};
use netguard_core::types::Position;

#[derive(Debug, Clone, Copy)]
pub struct Projectile {
    pub position: Position,
    pub tower_kind: TowerKind,
    /// Damage at fire time, before the type multiplier.
    pub damage: f64,
    pub target: Entity,
    pub active: bool,
}

impl Projectile {
    pub fn new(position: Position, tower_kind: TowerKind, damage: f64, target: Entity) -> Self {
        Self {
            position,
            tower_kind,
            damage,
            target,
            active: true,
        }
    }
}

/// A hit resolved this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub enemy: EnemyKind,
    pub damage: f64,
    pub killed: bool,
}

/// Advance all active projectiles and apply damage on arrival.
pub fn run(world: &mut World, matrix: &DamageMatrix, dt_ms: f64) -> Vec<Hit> {
    let step = PROJECTILE_SPEED * (dt_ms / NOMINAL_FRAME_MS);
    let mut hits = Vec::new();

    let mut projectiles = world.query::<&mut Projectile>();
    for (_entity, projectile) in projectiles.iter() {
        if !projectile.active {
            continue;
        }

        let Ok(mut enemy) = world.get::<&mut Enemy>(projectile.target) else {
            projectile.active = false;
            continue;
        };
        if enemy.is_dead() {
            projectile.active = false;
            continue;
        }

        if projectile.position.step_toward(enemy.position, step) {
            let damage = projectile.damage * matrix.get(projectile.tower_kind, enemy.kind);
            let killed = enemy.take_damage(damage);
            hits.push(Hit {
                enemy: enemy.kind,
                damage,
                killed,
            });
            projectile.active = false;
        }
    }
    hits
}
