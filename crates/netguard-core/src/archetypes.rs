//! Static archetype tables and the damage multiplier matrix.
//!
//! Archetypes are immutable definitions keyed by the enums in `enums`.
//! Lookups are plain `match`es resolved at compile time.

use serde::{Deserialize, Serialize};

use crate::enums::*;

/// Immutable definition of an enemy type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyArchetype {
    pub name: &'static str,
    /// World units per nominal frame.
    pub speed: f64,
    pub max_health: f64,
    /// Currency awarded on kill, before the reward modifier.
    pub reward: u32,
    /// Collision / display radius.
    pub radius: f64,
}

/// Immutable definition of a tower type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TowerArchetype {
    pub name: &'static str,
    pub cost: u32,
    pub range: f64,
    pub damage: f64,
    /// Milliseconds between shots.
    pub fire_interval_ms: f64,
    /// Speed factor applied to enemies in range (trap towers only).
    pub slow_factor: Option<f64>,
}

/// Immutable definition of a perk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerkArchetype {
    pub name: &'static str,
    pub description: &'static str,
    pub effect: PerkEffect,
    pub value: f64,
    pub rarity: Rarity,
    /// Relative weight when drawing offers.
    pub weight: u32,
}

/// Immutable definition of a loot drop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LootArchetype {
    pub effect: LootEffect,
    pub value: f64,
    /// Width of this kind's band in the drop sub-roll.
    pub chance: f64,
    pub duration_ms: f64,
    pub radius: f64,
}

pub fn enemy_archetype(kind: EnemyKind) -> EnemyArchetype {
    match kind {
        EnemyKind::Malware => EnemyArchetype {
            name: "Malware",
            speed: 2.0,
            max_health: 30.0,
            reward: 10,
            radius: 10.0,
        },
        EnemyKind::Phishing => EnemyArchetype {
            name: "Phishing",
            speed: 3.5,
            max_health: 15.0,
            reward: 15,
            radius: 8.0,
        },
        EnemyKind::Ddos => EnemyArchetype {
            name: "DDoS",
            speed: 1.5,
            max_health: 80.0,
            reward: 25,
            radius: 15.0,
        },
        EnemyKind::Ransomware => EnemyArchetype {
            name: "Ransomware",
            speed: 1.0,
            max_health: 300.0,
            reward: 50,
            radius: 20.0,
        },
        EnemyKind::SocialEngineering => EnemyArchetype {
            name: "Social Eng.",
            speed: 3.0,
            max_health: 60.0,
            reward: 25,
            radius: 14.0,
        },
        EnemyKind::Zeus => EnemyArchetype {
            name: "ZEUS Botnet",
            speed: 0.5,
            max_health: 3000.0,
            reward: 1000,
            radius: 40.0,
        },
        EnemyKind::SqlInjection => EnemyArchetype {
            name: "SQL Injection",
            speed: 2.5,
            max_health: 600.0,
            reward: 150,
            radius: 18.0,
        },
        EnemyKind::Apt => EnemyArchetype {
            name: "A.P.T.",
            speed: 0.3,
            max_health: 10_000.0,
            reward: 5000,
            radius: 50.0,
        },
    }
}

pub fn tower_archetype(kind: TowerKind) -> TowerArchetype {
    match kind {
        TowerKind::Firewall => TowerArchetype {
            name: "Firewall",
            cost: 100,
            range: 120.0,
            damage: 10.0,
            fire_interval_ms: 500.0,
            slow_factor: None,
        },
        TowerKind::Antivirus => TowerArchetype {
            name: "Antivirus",
            cost: 250,
            range: 150.0,
            damage: 15.0,
            fire_interval_ms: 350.0,
            slow_factor: None,
        },
        TowerKind::Ids => TowerArchetype {
            name: "IDS",
            cost: 400,
            range: 250.0,
            damage: 5.0,
            fire_interval_ms: 50.0,
            slow_factor: None,
        },
        TowerKind::Honeypot => TowerArchetype {
            name: "Honeypot",
            cost: 300,
            range: 150.0,
            damage: 0.0,
            fire_interval_ms: 0.0,
            slow_factor: Some(0.5),
        },
    }
}

pub fn perk_archetype(kind: PerkKind) -> PerkArchetype {
    match kind {
        PerkKind::Overclock => PerkArchetype {
            name: "Overclock",
            description: "All towers attack 15% faster.",
            effect: PerkEffect::Rate,
            value: 0.85,
            rarity: Rarity::Common,
            weight: 50,
        },
        PerkKind::HighVoltage => PerkArchetype {
            name: "High Voltage",
            description: "All towers deal 20% more damage.",
            effect: PerkEffect::Damage,
            value: 1.2,
            rarity: Rarity::Rare,
            weight: 15,
        },
        PerkKind::SignalBoost => PerkArchetype {
            name: "Signal Boost",
            description: "All towers have +20% range.",
            effect: PerkEffect::Range,
            value: 1.2,
            rarity: Rarity::Common,
            weight: 50,
        },
        PerkKind::BugBounty => PerkArchetype {
            name: "Bug Bounty",
            description: "Earn 20% more money from kills.",
            effect: PerkEffect::Reward,
            value: 1.2,
            rarity: Rarity::Uncommon,
            weight: 30,
        },
        PerkKind::HardenedKernel => PerkArchetype {
            name: "Hardened Kernel",
            description: "Restore 5 lives.",
            effect: PerkEffect::Lives,
            value: 5.0,
            rarity: Rarity::Uncommon,
            weight: 30,
        },
        PerkKind::OpenSource => PerkArchetype {
            name: "Open Source",
            description: "Towers cost 15% less to build.",
            effect: PerkEffect::Cost,
            value: 0.85,
            rarity: Rarity::Rare,
            weight: 15,
        },
        PerkKind::QuantumCore => PerkArchetype {
            name: "Quantum Core",
            description: "+50% damage and +20% attack speed.",
            effect: PerkEffect::HybridDamageSpeed,
            value: 1.5,
            rarity: Rarity::Legendary,
            weight: 2,
        },
        PerkKind::TimeDilation => PerkArchetype {
            name: "Time Dilation",
            description: "Enemies move 30% slower.",
            effect: PerkEffect::EnemySlow,
            value: 0.7,
            rarity: Rarity::Legendary,
            weight: 2,
        },
    }
}

pub fn loot_archetype(kind: LootKind) -> LootArchetype {
    match kind {
        LootKind::Crypto => LootArchetype {
            effect: LootEffect::Money,
            value: 50.0,
            chance: 0.15,
            duration_ms: 4000.0,
            radius: 8.0,
        },
        LootKind::Patch => LootArchetype {
            effect: LootEffect::Life,
            value: 1.0,
            chance: 0.02,
            duration_ms: 5000.0,
            radius: 10.0,
        },
        LootKind::DataStream => LootArchetype {
            effect: LootEffect::RateBuff,
            value: 0.5,
            chance: 0.05,
            duration_ms: 6000.0,
            radius: 9.0,
        },
    }
}

const TOWER_COUNT: usize = TowerKind::ALL.len();
const ENEMY_COUNT: usize = EnemyKind::ALL.len();

/// Type-effectiveness lookup: (tower type, enemy type) -> damage factor.
///
/// Entries never set default to 1.0. Built once per match and only read
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageMatrix {
    table: [[f64; ENEMY_COUNT]; TOWER_COUNT],
}

impl Default for DamageMatrix {
    fn default() -> Self {
        Self::standard()
    }
}

impl DamageMatrix {
    /// A matrix with every entry at 1.0.
    pub fn neutral() -> Self {
        Self {
            table: [[1.0; ENEMY_COUNT]; TOWER_COUNT],
        }
    }

    /// The stock effectiveness table.
    pub fn standard() -> Self {
        use EnemyKind::*;
        use TowerKind::*;

        Self::neutral()
            .with_entry(Firewall, Ddos, 2.0)
            .with_entry(Firewall, Malware, 1.2)
            .with_entry(Firewall, Phishing, 0.5)
            .with_entry(Firewall, SocialEngineering, 0.5)
            .with_entry(Antivirus, Malware, 2.0)
            .with_entry(Antivirus, Ransomware, 1.5)
            .with_entry(Antivirus, Ddos, 0.5)
            .with_entry(Ids, Phishing, 2.0)
            .with_entry(Ids, SocialEngineering, 2.0)
            .with_entry(Ids, Zeus, 1.5)
            .with_entry(Honeypot, Ransomware, 2.0)
            .with_entry(Honeypot, Zeus, 1.5)
            .with_entry(Honeypot, Ddos, 0.5)
    }

    /// Builder-style override. Negative factors are clamped to zero.
    pub fn with_entry(mut self, tower: TowerKind, enemy: EnemyKind, factor: f64) -> Self {
        self.table[tower.index()][enemy.index()] = factor.max(0.0);
        self
    }

    pub fn get(&self, tower: TowerKind, enemy: EnemyKind) -> f64 {
        self.table[tower.index()][enemy.index()]
    }

    /// Tower types with a factor above 1.0 against `enemy`.
    pub fn effective_against(&self, enemy: EnemyKind) -> Vec<TowerKind> {
        TowerKind::ALL
            .into_iter()
            .filter(|&tower| self.get(tower, enemy) > 1.0)
            .collect()
    }
}
