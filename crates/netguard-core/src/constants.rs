//! Simulation constants and tuning parameters.

// --- Time ---

/// Nominal frame duration in milliseconds. Speeds are expressed per nominal frame.
pub const NOMINAL_FRAME_MS: f64 = 16.0;

/// Longest wall-clock frame accepted as-is. Anything longer (a stall, a
/// breakpoint) is replaced by `NOMINAL_FRAME_MS`.
pub const MAX_FRAME_MS: f64 = 100.0;

/// Fastest supported game speed.
pub const MAX_GAME_SPEED: f64 = 4.0;

/// Game speeds visited by `cycle_game_speed`.
pub const GAME_SPEED_STEPS: [f64; 3] = [1.0, 2.0, 4.0];

// --- Match ---

/// Starting currency of the first story level.
pub const STARTING_MONEY: u32 = 450;

/// Starting (and maximum) lives of every match.
pub const STARTING_LIVES: u32 = 20;

/// Lives lost per enemy reaching the end of the path.
pub const LIVES_PER_LEAK: u32 = 1;

// --- Towers ---

/// Fraction of a tower's base cost returned on sale.
pub const SELL_REFUND_FRACTION: f64 = 0.5;

/// A sale click hits a tower whose centre is strictly closer than this.
pub const SELL_PICK_RADIUS: f64 = 20.0;

/// Duration of the slow a trap tower applies; refreshed every tick.
pub const TRAP_SLOW_DURATION_MS: f64 = 100.0;

// --- Projectiles ---

/// Projectile speed in world units per nominal frame.
pub const PROJECTILE_SPEED: f64 = 12.0;

// --- Perks ---

/// A perk offer is due before every wave whose index is a multiple of this.
pub const PERK_MILESTONE_INTERVAL: u32 = 3;

/// Number of distinct choices in a perk offer.
pub const PERK_OFFER_SIZE: usize = 3;

/// Extra damage factor of the hybrid perk (its fire-interval factor is below).
pub const HYBRID_DAMAGE_FACTOR: f64 = 1.5;

/// Fire-interval factor of the hybrid perk (lower is faster).
pub const HYBRID_INTERVAL_FACTOR: f64 = 0.8;

// --- Loot ---

/// Chance that a kill drops anything at all.
pub const LOOT_DROP_CHANCE: f64 = 0.2;

/// Loot is collected when the cursor is strictly closer than this.
pub const LOOT_PICK_RADIUS: f64 = 25.0;

/// Fire-rate multiplier while the rate buff is active.
pub const RATE_BUFF_MULTIPLIER: f64 = 2.0;

// --- Endless mode ---

/// Starting currency in endless mode.
pub const ENDLESS_STARTING_MONEY: u32 = 600;

/// Story level whose path endless mode reuses.
pub const ENDLESS_PATH_LEVEL: usize = 1;

/// Budget of endless wave `n` is `n * ENDLESS_BUDGET_PER_WAVE + ENDLESS_BUDGET_BASE`.
pub const ENDLESS_BUDGET_PER_WAVE: f64 = 300.0;
pub const ENDLESS_BUDGET_BASE: f64 = 500.0;

/// Generation stops once the remaining budget is at or below this.
pub const ENDLESS_BUDGET_FLOOR: f64 = 50.0;

/// Per-unit cost weights: `health * HEALTH_WEIGHT + speed * SPEED_WEIGHT`.
pub const ENDLESS_HEALTH_WEIGHT: f64 = 0.5;
pub const ENDLESS_SPEED_WEIGHT: f64 = 10.0;

/// Random batch size range (inclusive).
pub const ENDLESS_BATCH_MIN: u32 = 1;
pub const ENDLESS_BATCH_MAX: u32 = 5;

/// Random inter-spawn delay range in ms (inclusive).
pub const ENDLESS_DELAY_MIN_MS: u32 = 300;
pub const ENDLESS_DELAY_MAX_MS: u32 = 1500;

/// Wave thresholds at which boss-tier types join the candidate pool.
pub const ENDLESS_ZEUS_WAVE: u32 = 5;
pub const ENDLESS_SQL_INJECTION_WAVE: u32 = 10;
pub const ENDLESS_APT_WAVE: u32 = 20;

/// Guaranteed boss insertions.
pub const ENDLESS_MINI_BOSS_INTERVAL: u32 = 10;
pub const ENDLESS_MINI_BOSS_DIVISOR: u32 = 5;
pub const ENDLESS_MINI_BOSS_DELAY_MS: u32 = 2000;
pub const ENDLESS_MEGA_BOSS_INTERVAL: u32 = 25;
