//! Enumeration types used throughout the simulation.
//!
//! Every archetype category is a closed enum; static data hangs off these
//! keys in `archetypes`, so the per-tick loops never branch on strings.

use serde::{Deserialize, Serialize};

/// Hostile unit type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    Malware,
    Phishing,
    Ddos,
    Ransomware,
    SocialEngineering,
    /// Boss.
    Zeus,
    /// Mini-boss.
    SqlInjection,
    /// Mega-boss.
    Apt,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 8] = [
        EnemyKind::Malware,
        EnemyKind::Phishing,
        EnemyKind::Ddos,
        EnemyKind::Ransomware,
        EnemyKind::SocialEngineering,
        EnemyKind::Zeus,
        EnemyKind::SqlInjection,
        EnemyKind::Apt,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Player-placed defense type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TowerKind {
    Firewall,
    Antivirus,
    Ids,
    /// Zero-damage trap: slows everything in range instead of firing.
    Honeypot,
}

impl TowerKind {
    pub const ALL: [TowerKind; 4] = [
        TowerKind::Firewall,
        TowerKind::Antivirus,
        TowerKind::Ids,
        TowerKind::Honeypot,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Roguelike perk key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PerkKind {
    Overclock,
    HighVoltage,
    SignalBoost,
    BugBounty,
    HardenedKernel,
    OpenSource,
    QuantumCore,
    TimeDilation,
}

impl PerkKind {
    pub const ALL: [PerkKind; 8] = [
        PerkKind::Overclock,
        PerkKind::HighVoltage,
        PerkKind::SignalBoost,
        PerkKind::BugBounty,
        PerkKind::HardenedKernel,
        PerkKind::OpenSource,
        PerkKind::QuantumCore,
        PerkKind::TimeDilation,
    ];
}

/// What a perk changes when chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerkEffect {
    /// Tower damage factor.
    Damage,
    /// Tower range factor.
    Range,
    /// Tower fire-interval factor (lower is faster).
    Rate,
    /// Tower cost factor.
    Cost,
    /// Kill reward factor.
    Reward,
    /// Restore lives (capped at the match maximum).
    Lives,
    /// Damage and fire interval together.
    HybridDamageSpeed,
    /// Global enemy speed factor.
    EnemySlow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
}

/// Collectible dropped by a dying enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LootKind {
    Crypto,
    Patch,
    DataStream,
}

impl LootKind {
    /// Order in which the cumulative drop bands are evaluated.
    pub const BAND_ORDER: [LootKind; 3] = [LootKind::Patch, LootKind::DataStream, LootKind::Crypto];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LootEffect {
    Money,
    Life,
    RateBuff,
}

/// Match mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    /// Scripted levels, finite wave lists.
    #[default]
    Story,
    /// Procedurally generated waves, no level completion.
    Endless,
}

/// Top-level match state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Active,
    Paused,
    /// A perk offer is outstanding; nothing ticks until a choice is made.
    PerkSelection,
    /// Every scripted wave of the level is cleared.
    LevelComplete,
    GameOver,
    GameWon,
}

impl GamePhase {
    /// Whether the world advances on tick in this phase.
    pub fn is_running(self) -> bool {
        matches!(self, GamePhase::Active | GamePhase::LevelComplete)
    }

    /// Terminal phases need an explicit reset to continue.
    pub fn is_terminal(self) -> bool {
        matches!(self, GamePhase::GameOver | GamePhase::GameWon)
    }
}
