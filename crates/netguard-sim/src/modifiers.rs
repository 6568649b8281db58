//! Global modifier set and layered tower stats.
//!
//! Towers never store their own stats. Every read goes through
//! `ModifierSet::tower_stats`, so a perk chosen mid-match reaches every
//! tower already on the field without touching them.

use netguard_core::archetypes::tower_archetype;
use netguard_core::constants::{HYBRID_DAMAGE_FACTOR, HYBRID_INTERVAL_FACTOR};
use netguard_core::enums::{PerkEffect, TowerKind};
use netguard_core::state::ModifiersView;

/// Multiplicative factors accumulated from perks over one match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModifierSet {
    pub damage: f64,
    pub range: f64,
    /// Applied to the fire interval; below 1.0 fires faster.
    pub fire_interval: f64,
    pub cost: f64,
    pub reward: f64,
    /// Global enemy speed factor; below 1.0 is slower.
    pub enemy_speed: f64,
}

impl Default for ModifierSet {
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

/// Effective stats of one tower type under a modifier set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TowerStats {
    pub damage: f64,
    pub range: f64,
    pub fire_interval_ms: f64,
}

impl ModifierSet {
    /// Fold a perk effect in. `Lives` is not a modifier and leaves the set
    /// unchanged; the match controller handles it.
    pub fn apply(&mut self, effect: PerkEffect, value: f64) {
        match effect {
            PerkEffect::Damage => self.damage *= value,
            PerkEffect::Range => self.range *= value,
            PerkEffect::Rate => self.fire_interval *= value,
            PerkEffect::Cost => self.cost *= value,
            PerkEffect::Reward => self.reward *= value,
            PerkEffect::HybridDamageSpeed => {
                self.damage *= HYBRID_DAMAGE_FACTOR;
                self.fire_interval *= HYBRID_INTERVAL_FACTOR;
            }
            PerkEffect::EnemySlow => self.enemy_speed *= value,
            PerkEffect::Lives => {}
        }
    }

    pub fn tower_stats(&self, kind: TowerKind) -> TowerStats {
        let base = tower_archetype(kind);
        TowerStats {
            damage: base.damage * self.damage,
            range: base.range * self.range,
            fire_interval_ms: base.fire_interval_ms * self.fire_interval,
        }
    }

    /// Build price, floored to whole currency.
    pub fn tower_cost(&self, kind: TowerKind) -> u32 {
        floor_currency(f64::from(tower_archetype(kind).cost) * self.cost)
    }

    /// Kill reward, floored to whole currency.
    pub fn kill_reward(&self, base_reward: u32) -> u32 {
        floor_currency(f64::from(base_reward) * self.reward)
    }

    pub fn view(&self) -> ModifiersView {
        ModifiersView {
            damage: self.damage,
            range: self.range,
            fire_interval: self.fire_interval,
            cost: self.cost,
            reward: self.reward,
            enemy_speed: self.enemy_speed,
        }
    }
}

fn floor_currency(amount: f64) -> u32 {
    // `as` saturates; negative and NaN land on zero.
    amount.floor() as u32
}
