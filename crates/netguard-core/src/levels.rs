//! Level definitions: path, starting currency, wave scripts and briefing.
//!
//! Levels are opaque data to the simulation. The three story levels ship
//! built in; replacement packs load from JSON.

use std::fs;
use std::path::Path as FsPath;

use serde::{Deserialize, Serialize};

use crate::constants::{ENDLESS_PATH_LEVEL, ENDLESS_STARTING_MONEY, STARTING_MONEY};
use crate::enums::EnemyKind;
use crate::error::ConfigError;
use crate::types::Position;

/// `count` enemies of one type, each released `delay_ms` after the previous.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnGroup {
    pub enemy: EnemyKind,
    pub count: u32,
    pub delay_ms: u32,
}

impl SpawnGroup {
    pub const fn new(enemy: EnemyKind, count: u32, delay_ms: u32) -> Self {
        Self {
            enemy,
            count,
            delay_ms,
        }
    }
}

/// An ordered list of spawn groups.
pub type WaveScript = Vec<SpawnGroup>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDef {
    pub name: String,
    /// Briefing lines shown before the level. Not interpreted.
    #[serde(default)]
    pub story: Vec<String>,
    pub waypoints: Vec<Position>,
    pub waves: Vec<WaveScript>,
    pub starting_money: u32,
}

impl LevelDef {
    /// Total enemies across every wave.
    pub fn total_enemies(&self) -> u32 {
        self.waves
            .iter()
            .flat_map(|w| w.iter())
            .map(|g| g.count)
            .sum()
    }

    /// Distinct enemy types, in first-appearance order.
    pub fn enemy_kinds(&self) -> Vec<EnemyKind> {
        let mut kinds = Vec::new();
        for group in self.waves.iter().flat_map(|w| w.iter()) {
            if !kinds.contains(&group.enemy) {
                kinds.push(group.enemy);
            }
        }
        kinds
    }

    fn validate(&self, index: usize) -> Result<(), ConfigError> {
        let fail = |reason: &str| ConfigError::Validation {
            level: index,
            reason: reason.to_string(),
        };

        if self.waypoints.len() < 2 {
            return Err(fail("path needs at least two waypoints"));
        }
        if self.waypoints.iter().any(|p| !p.is_finite()) {
            return Err(fail("waypoint coordinates must be finite"));
        }
        if self.waves.is_empty() {
            return Err(fail("level has no waves"));
        }
        if self.waves.iter().any(|w| w.is_empty()) {
            return Err(fail("every wave needs at least one spawn group"));
        }
        if self.waves.iter().flatten().any(|g| g.count == 0) {
            return Err(fail("spawn group count must be at least one"));
        }
        Ok(())
    }
}

/// Parse and validate a JSON array of levels.
pub fn parse_level_pack(json: &str) -> Result<Vec<LevelDef>, ConfigError> {
    let levels: Vec<LevelDef> = serde_json::from_str(json)?;
    if levels.is_empty() {
        return Err(ConfigError::Validation {
            level: 0,
            reason: "level pack is empty".to_string(),
        });
    }
    for (index, level) in levels.iter().enumerate() {
        level.validate(index)?;
    }
    Ok(levels)
}

/// Read a level pack from disk.
pub fn load_level_pack(path: &FsPath) -> Result<Vec<LevelDef>, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_level_pack(&content)
}

fn points(raw: &[(f64, f64)]) -> Vec<Position> {
    raw.iter().copied().map(Position::from).collect()
}

fn lines(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

/// The built-in story campaign.
pub fn story_levels() -> Vec<LevelDef> {
    use EnemyKind::*;

    vec![
        LevelDef {
            name: "Level 1: Home Network".to_string(),
            story: lines(&[
                "INCOMING TRANSMISSION...",
                "Source: Localhost",
                "Message: 'User, your personal device is behaving erratically.'",
                "Diagnosis: Basic Malware and Phishing attempts detected.",
                "Mission: Deploy Firewalls and Antivirus to secure your home network.",
                "STATUS: DANGER",
            ]),
            waypoints: points(&[
                (0.0, 300.0),
                (300.0, 300.0),
                (300.0, 100.0),
                (600.0, 100.0),
                (600.0, 500.0),
                (800.0, 500.0),
            ]),
            waves: vec![
                vec![SpawnGroup::new(Malware, 5, 1000)],
                vec![SpawnGroup::new(Malware, 10, 800)],
                vec![
                    SpawnGroup::new(Phishing, 5, 1000),
                    SpawnGroup::new(Malware, 5, 800),
                ],
                vec![
                    SpawnGroup::new(Phishing, 10, 800),
                    SpawnGroup::new(Malware, 10, 600),
                ],
            ],
            starting_money: STARTING_MONEY,
        },
        LevelDef {
            name: "Level 2: Corporate Server".to_string(),
            story: lines(&[
                "ENCRYPTED CHANNEL ESTABLISHED.",
                "Source: SysAdmin",
                "Message: 'The attack has spread to the company servers.'",
                "Intel: Attackers are using Social Engineering and Ransomware.",
                "Mission: Use IDS for rapid filtering and Honeypots to trap them.",
                "STATUS: CRITICAL",
            ]),
            waypoints: points(&[
                (0.0, 100.0),
                (700.0, 100.0),
                (700.0, 300.0),
                (100.0, 300.0),
                (100.0, 500.0),
                (800.0, 500.0),
            ]),
            waves: vec![
                vec![SpawnGroup::new(SocialEngineering, 5, 1200)],
                vec![
                    SpawnGroup::new(Ransomware, 2, 2000),
                    SpawnGroup::new(Malware, 10, 500),
                ],
                vec![
                    SpawnGroup::new(SocialEngineering, 8, 1000),
                    SpawnGroup::new(Phishing, 10, 500),
                ],
                vec![
                    SpawnGroup::new(Ransomware, 5, 2000),
                    SpawnGroup::new(Ddos, 5, 1000),
                ],
            ],
            starting_money: 600,
        },
        LevelDef {
            name: "Level 3: The Core".to_string(),
            story: lines(&[
                "ALERT! ALERT! ALERT!",
                "Source: THE CORE",
                "Message: 'ZERO-DAY EXPLOIT IMMINENT.'",
                "Intel: The ZEUS Botnet Master is approaching.",
                "Mission: DEFEAT ZEUS. SAVE THE INFRASTRUCTURE.",
                "STATUS: APOCALYPSE",
            ]),
            waypoints: points(&[
                (0.0, 50.0),
                (100.0, 550.0),
                (200.0, 50.0),
                (300.0, 550.0),
                (400.0, 50.0),
                (500.0, 550.0),
                (600.0, 50.0),
                (700.0, 550.0),
                (800.0, 300.0),
            ]),
            waves: vec![
                vec![SpawnGroup::new(Ddos, 10, 500)],
                vec![
                    SpawnGroup::new(Ransomware, 5, 1500),
                    SpawnGroup::new(SocialEngineering, 10, 800),
                ],
                vec![SpawnGroup::new(Ddos, 20, 200)],
                vec![SpawnGroup::new(Zeus, 1, 0)],
            ],
            starting_money: 1000,
        },
    ]
}

/// The endless arena: a story path, no scripted waves.
///
/// Falls back to the first level's path when the pack is shorter than
/// `ENDLESS_PATH_LEVEL + 1`.
pub fn endless_level(levels: &[LevelDef]) -> LevelDef {
    let waypoints = levels
        .get(ENDLESS_PATH_LEVEL)
        .or_else(|| levels.first())
        .map(|level| level.waypoints.clone())
        .unwrap_or_default();

    LevelDef {
        name: "ENDLESS WAVE".to_string(),
        story: lines(&["MODE: ENDLESS", "OBJECTIVE: SURVIVE", "WAVES ARE INFINITE."]),
        waypoints,
        waves: Vec::new(),
        starting_money: ENDLESS_STARTING_MONEY,
    }
}
