//! Endless-mode wave composition.
//!
//! Each wave gets a budget that grows linearly with the wave number and is
//! spent on random batches drawn from a candidate pool that widens as the
//! waves climb. Boss insertions on fixed intervals come on top of the budget.

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use netguard_core::archetypes::enemy_archetype;
use netguard_core::constants::*;
use netguard_core::enums::EnemyKind;
use netguard_core::levels::{SpawnGroup, WaveScript};

/// Enemy types available from the first endless wave.
pub const BASE_CANDIDATES: [EnemyKind; 5] = [
    EnemyKind::Malware,
    EnemyKind::Phishing,
    EnemyKind::Ddos,
    EnemyKind::SocialEngineering,
    EnemyKind::Ransomware,
];

/// Budget price of a single enemy.
pub fn unit_cost(kind: EnemyKind) -> f64 {
    let archetype = enemy_archetype(kind);
    archetype.max_health * ENDLESS_HEALTH_WEIGHT + archetype.speed * ENDLESS_SPEED_WEIGHT
}

/// Spending budget of wave `wave_number` (1-based).
pub fn wave_budget(wave_number: u32) -> f64 {
    f64::from(wave_number) * ENDLESS_BUDGET_PER_WAVE + ENDLESS_BUDGET_BASE
}

/// Candidate pool for wave `wave_number`.
pub fn candidates(wave_number: u32) -> Vec<EnemyKind> {
    let mut pool = BASE_CANDIDATES.to_vec();
    if wave_number >= ENDLESS_ZEUS_WAVE {
        pool.push(EnemyKind::Zeus);
    }
    if wave_number >= ENDLESS_SQL_INJECTION_WAVE {
        pool.push(EnemyKind::SqlInjection);
    }
    if wave_number >= ENDLESS_APT_WAVE {
        pool.push(EnemyKind::Apt);
    }
    pool
}

/// Compose endless wave `wave_number` (1-based).
pub fn compose_wave(wave_number: u32, rng: &mut ChaCha8Rng) -> WaveScript {
    let mut budget = wave_budget(wave_number);
    let pool = candidates(wave_number);
    let mut groups = WaveScript::new();

    if wave_number % ENDLESS_MINI_BOSS_INTERVAL == 0 {
        groups.push(SpawnGroup::new(
            EnemyKind::SqlInjection,
            wave_number / ENDLESS_MINI_BOSS_DIVISOR,
            ENDLESS_MINI_BOSS_DELAY_MS,
        ));
    }
    if wave_number % ENDLESS_MEGA_BOSS_INTERVAL == 0 {
        groups.push(SpawnGroup::new(EnemyKind::Apt, 1, 0));
    }

    while budget > ENDLESS_BUDGET_FLOOR {
        let affordable: Vec<EnemyKind> = pool
            .iter()
            .copied()
            .filter(|&kind| unit_cost(kind) <= budget)
            .collect();
        let Some(&kind) = affordable.choose(rng) else {
            break;
        };

        let cost = unit_cost(kind);
        let wanted = rng.gen_range(ENDLESS_BATCH_MIN..=ENDLESS_BATCH_MAX);
        // At least one fits: `cost <= budget`.
        let count = wanted.min((budget / cost).floor() as u32);
        let delay_ms = rng.gen_range(ENDLESS_DELAY_MIN_MS..=ENDLESS_DELAY_MAX_MS);

        groups.push(SpawnGroup::new(kind, count, delay_ms));
        budget -= cost * f64::from(count);
    }

    if groups.is_empty() {
        groups.push(SpawnGroup::new(EnemyKind::Malware, 5, 500));
    }
    groups
}
