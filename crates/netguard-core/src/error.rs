//! Error types.
//!
//! Rejected player commands are ordinary values, never fatal: the match
//! continues unchanged after any `CommandError`.

use thiserror::Error;

use crate::enums::PerkKind;

/// Why a player command was refused. State is untouched on every variant.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("insufficient funds: need {cost}, have {available}")]
    InsufficientFunds { cost: u32, available: u32 },
    #[error("no tower within reach of ({x:.0}, {y:.0})")]
    NoTowerAt { x: f64, y: f64 },
    #[error("no loot within reach of ({x:.0}, {y:.0})")]
    NoLootAt { x: f64, y: f64 },
    #[error("a wave is already in progress")]
    WaveInProgress,
    #[error("no scripted waves remain in this level")]
    NoMoreWaves,
    #[error("no perk offer is pending")]
    NoPerkOffer,
    #[error("perk {0:?} is not among the offered choices")]
    PerkNotOffered(PerkKind),
    #[error("a perk must be chosen first")]
    PerkSelectionPending,
    #[error("invalid game speed {0}")]
    InvalidGameSpeed(f64),
    #[error("invalid position ({x}, {y})")]
    InvalidPosition { x: f64, y: f64 },
    #[error("the match is over")]
    MatchOver,
}

/// Level-pack loading error.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read level pack: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse level pack: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid level {level}: {reason}")]
    Validation { level: usize, reason: String },
}
