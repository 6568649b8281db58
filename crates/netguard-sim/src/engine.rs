//! Match controller: the core of the game.
//!
//! `Game` owns the hecs ECS world and every piece of match state: economy,
//! modifiers, perks, the wave scheduler and the seeded RNG. It processes
//! player commands, runs all systems in a fixed order and produces
//! `GameStateSnapshot`s. Completely headless, enabling deterministic testing.

use std::collections::VecDeque;
use std::sync::Arc;

use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace, warn};

use netguard_core::archetypes::{
    enemy_archetype, loot_archetype, perk_archetype, tower_archetype, DamageMatrix,
};
use netguard_core::commands::PlayerCommand;
use netguard_core::components::{Enemy, Path, Tower};
use netguard_core::constants::*;
use netguard_core::enums::*;
use netguard_core::error::CommandError;
use netguard_core::events::GameEvent;
use netguard_core::levels::{endless_level, story_levels, LevelDef, WaveScript};
use netguard_core::state::{EconomyView, GameStateSnapshot, IntelEntry, LevelView};
use netguard_core::types::{Position, SimTime};

use crate::modifiers::ModifierSet;
use crate::perks::{self, PerkState};
use crate::systems;
use crate::systems::cleanup::Reaped;
use crate::systems::snapshot::SnapshotFrame;
use crate::systems::wave_spawner::WaveScheduler;
use crate::wave_composer;
use crate::world_setup;

/// Configuration for starting a new match.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same match.
    pub seed: u64,
    /// Initial game speed (1.0 = normal).
    pub game_speed: f64,
    pub mode: GameMode,
    /// Story levels. Endless mode borrows its path from here.
    pub levels: Vec<LevelDef>,
    pub matrix: DamageMatrix,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            game_speed: 1.0,
            mode: GameMode::Story,
            levels: story_levels(),
            matrix: DamageMatrix::standard(),
        }
    }
}

/// Result of a successful `start_next_wave`.
#[derive(Debug, Clone, PartialEq)]
pub enum WaveStart {
    /// The wave is queued. `wave` is 1-based.
    Started { wave: u32, enemies: u32 },
    /// A perk milestone intercepted the call; choose a perk, then start again.
    PerkOffered(Vec<PerkKind>),
}

/// The match controller. Owns the ECS world and all match state.
pub struct Game {
    world: World,
    time: SimTime,
    phase: GamePhase,
    /// Phase restored by `resume`.
    resume_phase: GamePhase,
    mode: GameMode,
    levels: Vec<LevelDef>,
    level_index: usize,
    level: LevelDef,
    path: Path,
    matrix: DamageMatrix,
    modifiers: ModifierSet,
    perks: PerkState,
    scheduler: WaveScheduler,
    money: u32,
    lives: u32,
    /// Waves started in this level.
    wave_index: u32,
    level_complete: bool,
    /// Simulation time at which the fire-rate buff ends.
    rate_buff_until_ms: Option<f64>,
    game_speed: f64,
    rng: ChaCha8Rng,
    next_seq: u64,
    command_queue: VecDeque<PlayerCommand>,
    despawn_buffer: Vec<Entity>,
    events: Vec<GameEvent>,
}

impl Game {
    /// Create a match and load its first level.
    pub fn new(config: SimConfig) -> Self {
        let levels = if config.levels.is_empty() {
            warn!("no levels configured, using the built-in story levels");
            story_levels()
        } else {
            config.levels
        };
        let game_speed = if valid_game_speed(config.game_speed) {
            config.game_speed
        } else {
            warn!(speed = config.game_speed, "invalid game speed, using 1x");
            1.0
        };

        let mut game = Self {
            world: World::new(),
            time: SimTime::default(),
            phase: GamePhase::default(),
            resume_phase: GamePhase::default(),
            mode: config.mode,
            level_index: 0,
            level: levels[0].clone(),
            path: Arc::from(Vec::new()),
            levels,
            matrix: config.matrix,
            modifiers: ModifierSet::default(),
            perks: PerkState::default(),
            scheduler: WaveScheduler::default(),
            money: 0,
            lives: STARTING_LIVES,
            wave_index: 0,
            level_complete: false,
            rate_buff_until_ms: None,
            game_speed,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            next_seq: 0,
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            events: Vec::new(),
        };
        game.load_level(0);
        game
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the match by one frame of `elapsed_ms` wall-clock time and
    /// return the resulting snapshot.
    ///
    /// Frames longer than `MAX_FRAME_MS` (or non-finite / negative) are
    /// replaced by a nominal frame so a stall never simulates a huge span.
    pub fn tick(&mut self, elapsed_ms: f64) -> GameStateSnapshot {
        self.process_commands();

        if self.phase.is_running() {
            let dt = sanitize_frame(elapsed_ms) * self.game_speed;
            self.time.advance(dt);
            self.run_systems(dt);
        }

        self.snapshot()
    }

    // --- Commands ---

    /// Build a tower centred on (x, y).
    pub fn place_tower(&mut self, kind: TowerKind, x: f64, y: f64) -> Result<Entity, CommandError> {
        self.check_open()?;
        let position = Position::new(x, y);
        if !position.is_finite() {
            return Err(CommandError::InvalidPosition { x, y });
        }

        let cost = self.modifiers.tower_cost(kind);
        if self.money < cost {
            return Err(CommandError::InsufficientFunds {
                cost,
                available: self.money,
            });
        }

        let entity = world_setup::spawn_tower(&mut self.world, kind, position);
        self.money -= cost;
        debug!(?kind, x, y, cost, money = self.money, "tower placed");
        self.events.push(GameEvent::TowerPlaced { kind, cost });
        Ok(entity)
    }

    /// Sell the tower nearest to (x, y) within the pick radius. Returns the
    /// refund.
    pub fn sell_tower(&mut self, x: f64, y: f64) -> Result<u32, CommandError> {
        self.check_open()?;
        let point = Position::new(x, y);

        let hit = self
            .world
            .query::<&Tower>()
            .iter()
            .map(|(entity, tower)| (entity, tower.kind, tower.position.distance_to(&point)))
            .filter(|(_, _, distance)| *distance < SELL_PICK_RADIUS)
            .min_by(|a, b| a.2.total_cmp(&b.2).then(a.0.id().cmp(&b.0.id())));
        let Some((entity, kind, _)) = hit else {
            return Err(CommandError::NoTowerAt { x, y });
        };

        let _ = self.world.despawn(entity);
        let refund = (f64::from(tower_archetype(kind).cost) * SELL_REFUND_FRACTION).floor() as u32;
        self.money = self.money.saturating_add(refund);
        debug!(?kind, refund, money = self.money, "tower sold");
        self.events.push(GameEvent::TowerSold { kind, refund });
        Ok(refund)
    }

    /// Start the next wave, or open a perk offer when a milestone is due.
    pub fn start_next_wave(&mut self) -> Result<WaveStart, CommandError> {
        self.check_open()?;
        if self.scheduler.is_in_progress() {
            return Err(CommandError::WaveInProgress);
        }

        if self.perks.milestone_due(self.wave_index, self.level_complete) {
            let choices = perks::roll_offer(&mut self.rng);
            info!(wave = self.wave_index, ?choices, "perk offered");
            self.perks.set_offer(choices.clone());
            self.phase = GamePhase::PerkSelection;
            self.events.push(GameEvent::PerkOffered {
                choices: choices.clone(),
            });
            return Ok(WaveStart::PerkOffered(choices));
        }

        let script = self.next_wave_script().ok_or(CommandError::NoMoreWaves)?;
        let enemies = self.scheduler.begin(&script);
        self.wave_index += 1;
        info!(wave = self.wave_index, enemies, "wave started");
        self.events.push(GameEvent::WaveStarted {
            wave: self.wave_index,
            enemies,
        });
        Ok(WaveStart::Started {
            wave: self.wave_index,
            enemies,
        })
    }

    /// Resolve the outstanding perk offer.
    pub fn choose_perk(&mut self, perk: PerkKind) -> Result<(), CommandError> {
        if self.phase.is_terminal() {
            return Err(CommandError::MatchOver);
        }
        if !self.perks.is_pending() {
            return Err(CommandError::NoPerkOffer);
        }
        if !self.perks.claim(perk, self.wave_index) {
            return Err(CommandError::PerkNotOffered(perk));
        }

        let archetype = perk_archetype(perk);
        match archetype.effect {
            PerkEffect::Lives => self.restore_lives(archetype.value as u32),
            effect => self.modifiers.apply(effect, archetype.value),
        }
        self.phase = GamePhase::Active;
        info!(?perk, wave = self.wave_index, "perk chosen");
        self.events.push(GameEvent::PerkChosen { perk });
        Ok(())
    }

    /// Collect the earliest-dropped loot within reach of (x, y).
    pub fn collect_loot_at(&mut self, x: f64, y: f64) -> Result<LootKind, CommandError> {
        self.check_open()?;
        let now = self.time.elapsed_ms;
        let (entity, drop) = systems::loot::find_in_reach(&self.world, Position::new(x, y), now)
            .ok_or(CommandError::NoLootAt { x, y })?;
        let _ = self.world.despawn(entity);

        let archetype = loot_archetype(drop.kind);
        match archetype.effect {
            LootEffect::Money => {
                self.money = self.money.saturating_add(archetype.value as u32);
            }
            LootEffect::Life => self.restore_lives(archetype.value as u32),
            LootEffect::RateBuff => {
                self.rate_buff_until_ms = Some(now + archetype.duration_ms);
            }
        }
        debug!(kind = ?drop.kind, money = self.money, lives = self.lives, "loot collected");
        self.events.push(GameEvent::LootCollected { kind: drop.kind });
        Ok(drop.kind)
    }

    /// Set game speed. Accepts finite values in (0, `MAX_GAME_SPEED`].
    pub fn set_game_speed(&mut self, multiplier: f64) -> Result<(), CommandError> {
        self.check_open()?;
        if !valid_game_speed(multiplier) {
            return Err(CommandError::InvalidGameSpeed(multiplier));
        }
        self.game_speed = multiplier;
        debug!(speed = multiplier, "game speed set");
        Ok(())
    }

    /// Rotate through the standard speeds. Returns the new speed.
    pub fn cycle_game_speed(&mut self) -> Result<f64, CommandError> {
        let next = GAME_SPEED_STEPS
            .iter()
            .copied()
            .find(|&step| step > self.game_speed)
            .unwrap_or(GAME_SPEED_STEPS[0]);
        self.set_game_speed(next)?;
        Ok(next)
    }

    /// Load a story level and reset the match. Loading past the last level
    /// wins the game. In endless mode the arena is reset.
    pub fn load_level(&mut self, index: usize) {
        let level = match self.mode {
            GameMode::Story => match self.levels.get(index) {
                Some(level) => level.clone(),
                None => {
                    info!(index, "campaign finished");
                    self.phase = GamePhase::GameWon;
                    self.events.push(GameEvent::GameWon);
                    return;
                }
            },
            GameMode::Endless => endless_level(&self.levels),
        };

        self.world.clear();
        self.time = SimTime::default();
        self.level_index = index;
        self.path = Arc::from(level.waypoints.clone());
        self.money = level.starting_money;
        self.lives = STARTING_LIVES;
        self.level = level;
        self.modifiers = ModifierSet::default();
        self.perks = PerkState::default();
        self.scheduler = WaveScheduler::default();
        self.wave_index = 0;
        self.level_complete = false;
        self.rate_buff_until_ms = None;
        self.next_seq = 0;
        self.phase = GamePhase::Active;
        self.resume_phase = GamePhase::Active;

        info!(
            index,
            name = %self.level.name,
            mode = ?self.mode,
            money = self.money,
            enemies = self.level.total_enemies(),
            "level loaded"
        );
        self.events.push(GameEvent::LevelLoaded { index });
    }

    /// Switch mode and start over from the first level.
    pub fn new_match(&mut self, mode: GameMode) {
        self.mode = mode;
        self.load_level(0);
    }

    pub fn pause(&mut self) -> Result<(), CommandError> {
        self.check_open()?;
        if self.phase != GamePhase::Paused {
            self.resume_phase = self.phase;
            self.phase = GamePhase::Paused;
        }
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), CommandError> {
        if self.phase == GamePhase::Paused {
            self.phase = self.resume_phase;
        }
        Ok(())
    }

    /// Briefing for the current level: each enemy type it sends and the
    /// towers that deal extra damage to it.
    pub fn level_intel(&self) -> Vec<IntelEntry> {
        let kinds = match self.mode {
            GameMode::Story => self.level.enemy_kinds(),
            GameMode::Endless => wave_composer::BASE_CANDIDATES.to_vec(),
        };
        kinds
            .into_iter()
            .map(|enemy| IntelEntry {
                enemy,
                name: enemy_archetype(enemy).name.to_string(),
                effective_towers: self.matrix.effective_against(enemy),
            })
            .collect()
    }

    // --- Accessors ---

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn money(&self) -> u32 {
        self.money
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn wave_index(&self) -> u32 {
        self.wave_index
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn level(&self) -> &LevelDef {
        &self.level
    }

    pub fn game_speed(&self) -> f64 {
        self.game_speed
    }

    pub fn modifiers(&self) -> &ModifierSet {
        &self.modifiers
    }

    pub fn perk_offer(&self) -> Option<&[PerkKind]> {
        self.perks.offer()
    }

    pub fn is_wave_in_progress(&self) -> bool {
        self.scheduler.is_in_progress()
    }

    pub fn is_level_complete(&self) -> bool {
        self.level_complete
    }

    /// Enemies still waiting in the spawn queue.
    pub fn queued_spawns(&self) -> usize {
        self.scheduler.queued()
    }

    pub fn rate_buff_active(&self) -> bool {
        self.rate_buff_until_ms.is_some()
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    #[cfg(test)]
    pub(crate) fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Spawn an enemy at the path origin, outside any wave (for tests).
    #[cfg(test)]
    pub(crate) fn spawn_test_enemy(&mut self, kind: EnemyKind) -> Entity {
        let entity = world_setup::spawn_enemy(&mut self.world, kind, self.path.clone(), self.next_seq);
        self.next_seq += 1;
        entity
    }

    // --- Internals ---

    /// Terminal phases accept nothing but a reset; an open perk offer
    /// blocks everything but the choice.
    fn check_open(&self) -> Result<(), CommandError> {
        if self.phase.is_terminal() {
            return Err(CommandError::MatchOver);
        }
        if self.phase == GamePhase::PerkSelection {
            return Err(CommandError::PerkSelectionPending);
        }
        Ok(())
    }

    fn restore_lives(&mut self, amount: u32) {
        self.lives = self.lives.saturating_add(amount).min(STARTING_LIVES);
    }

    fn next_wave_script(&mut self) -> Option<WaveScript> {
        match self.mode {
            GameMode::Story => self.level.waves.get(self.wave_index as usize).cloned(),
            GameMode::Endless => Some(wave_composer::compose_wave(self.wave_index + 1, &mut self.rng)),
        }
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            if let Err(err) = self.handle_command(command) {
                debug!(%err, "command rejected");
                self.events.push(GameEvent::CommandRejected {
                    reason: err.to_string(),
                });
            }
        }
    }

    /// Handle a single player command.
    fn handle_command(&mut self, command: PlayerCommand) -> Result<(), CommandError> {
        match command {
            PlayerCommand::PlaceTower { kind, x, y } => self.place_tower(kind, x, y).map(drop),
            PlayerCommand::SellTower { x, y } => self.sell_tower(x, y).map(drop),
            PlayerCommand::StartNextWave => self.start_next_wave().map(drop),
            PlayerCommand::ChoosePerk { perk } => self.choose_perk(perk),
            PlayerCommand::CollectLootAt { x, y } => self.collect_loot_at(x, y).map(drop),
            PlayerCommand::SetGameSpeed { multiplier } => self.set_game_speed(multiplier),
            PlayerCommand::CycleGameSpeed => self.cycle_game_speed().map(drop),
            PlayerCommand::LoadLevel { index } => {
                self.load_level(index);
                Ok(())
            }
            PlayerCommand::Pause => self.pause(),
            PlayerCommand::Resume => self.resume(),
        }
    }

    fn rate_buff(&self) -> f64 {
        if self.rate_buff_until_ms.is_some() {
            RATE_BUFF_MULTIPLIER
        } else {
            1.0
        }
    }

    /// Run all systems in order.
    fn run_systems(&mut self, dt: f64) {
        let now = self.time.elapsed_ms;

        // 1. Spawn release
        systems::wave_spawner::run(
            &mut self.world,
            &mut self.scheduler,
            &self.path,
            &mut self.next_seq,
            dt,
        );
        // 2. Timed effects
        if self.rate_buff_until_ms.is_some_and(|until| now > until) {
            self.rate_buff_until_ms = None;
            debug!("rate buff expired");
            self.events.push(GameEvent::RateBuffExpired);
        }
        for kind in systems::loot::expire(&mut self.world, now, &mut self.despawn_buffer) {
            debug!(?kind, "loot expired");
            self.events.push(GameEvent::LootExpired { kind });
        }
        // 3. Enemy movement
        systems::movement::run(&mut self.world, dt, self.modifiers.enemy_speed);
        // 4. Fire control (targeting, reload, trap slows)
        let rate_buff = self.rate_buff();
        let shots = systems::fire_control::run(
            &mut self.world,
            &self.modifiers,
            &self.matrix,
            dt,
            rate_buff,
        );
        // 5. Projectiles
        let hits = systems::projectile::run(&mut self.world, &self.matrix, dt);
        for hit in &hits {
            trace!(enemy = ?hit.enemy, damage = hit.damage, killed = hit.killed, "projectile hit");
        }
        // 6. Reconciliation
        let reaped = systems::cleanup::run(&mut self.world, &mut self.despawn_buffer);
        self.reconcile(reaped, now);

        trace!(
            tick = self.time.tick,
            dt,
            shots,
            hits = hits.len(),
            queued = self.scheduler.queued(),
            "tick"
        );

        // 7. Defeat
        if self.lives == 0 {
            info!(level = self.level_index, wave = self.wave_index, "game over");
            self.phase = GamePhase::GameOver;
            self.events.push(GameEvent::GameOver);
            return;
        }
        // 8. Wave completion
        self.check_wave_complete();
    }

    fn reconcile(&mut self, reaped: Vec<Reaped>, now: f64) {
        for outcome in reaped {
            match outcome {
                Reaped::Leaked { kind } => {
                    self.lives = self.lives.saturating_sub(LIVES_PER_LEAK);
                    debug!(?kind, lives = self.lives, "enemy leaked");
                    self.events.push(GameEvent::EnemyLeaked {
                        kind,
                        lives_left: self.lives,
                    });
                }
                Reaped::Killed { kind, position } => {
                    let reward = self.modifiers.kill_reward(enemy_archetype(kind).reward);
                    self.money = self.money.saturating_add(reward);
                    debug!(?kind, reward, money = self.money, "enemy killed");
                    self.events.push(GameEvent::EnemyKilled {
                        kind,
                        reward,
                        position,
                    });

                    if let Some(loot) = systems::loot::roll_drop(&mut self.rng) {
                        world_setup::spawn_loot(&mut self.world, loot, position, now);
                        debug!(kind = ?loot, "loot dropped");
                        self.events.push(GameEvent::LootDropped {
                            kind: loot,
                            position,
                        });
                    }
                }
            }
        }
    }

    fn check_wave_complete(&mut self) {
        if !self.scheduler.is_in_progress() || self.scheduler.queued() > 0 {
            return;
        }
        if self.world.query::<&Enemy>().iter().next().is_some() {
            return;
        }

        self.scheduler.finish();
        info!(wave = self.wave_index, money = self.money, lives = self.lives, "wave cleared");
        self.events.push(GameEvent::WaveCleared {
            wave: self.wave_index,
        });

        if self.mode == GameMode::Story && self.wave_index as usize == self.level.waves.len() {
            self.level_complete = true;
            self.phase = GamePhase::LevelComplete;
            info!(level = self.level_index, "level complete");
            self.events.push(GameEvent::LevelComplete);
        }
    }

    fn snapshot(&mut self) -> GameStateSnapshot {
        let frame = SnapshotFrame {
            time: self.time,
            phase: self.phase,
            mode: self.mode,
            level: LevelView {
                index: self.level_index,
                name: self.level.name.clone(),
                story: self.level.story.clone(),
                waypoints: self.level.waypoints.clone(),
            },
            economy: EconomyView {
                money: self.money,
                lives: self.lives,
                max_lives: STARTING_LIVES,
                wave_index: self.wave_index,
                wave_total: match self.mode {
                    GameMode::Story => Some(self.level.waves.len() as u32),
                    GameMode::Endless => None,
                },
            },
            game_speed: self.game_speed,
            modifiers: self.modifiers,
            perk_offer: self.perks.view(),
            rate_buff_remaining_ms: self
                .rate_buff_until_ms
                .map(|until| (until - self.time.elapsed_ms).max(0.0)),
            wave_in_progress: self.scheduler.is_in_progress(),
            level_complete: self.level_complete,
            events: std::mem::take(&mut self.events),
        };
        systems::snapshot::build_snapshot(&self.world, frame)
    }
}

fn sanitize_frame(elapsed_ms: f64) -> f64 {
    if elapsed_ms.is_finite() && (0.0..=MAX_FRAME_MS).contains(&elapsed_ms) {
        elapsed_ms
    } else {
        NOMINAL_FRAME_MS
    }
}

fn valid_game_speed(multiplier: f64) -> bool {
    multiplier.is_finite() && multiplier > 0.0 && multiplier <= MAX_GAME_SPEED
}
