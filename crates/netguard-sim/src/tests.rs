//! Tests for the match controller, systems and the tick pipeline.

use std::sync::Arc;

use hecs::Entity;
use proptest::prelude::*;

use netguard_core::archetypes::{perk_archetype, DamageMatrix};
use netguard_core::commands::PlayerCommand;
use netguard_core::components::{Enemy, Path, Tower, TowerPhase};
use netguard_core::constants::*;
use netguard_core::enums::*;
use netguard_core::error::CommandError;
use netguard_core::events::GameEvent;
use netguard_core::levels::{LevelDef, SpawnGroup, WaveScript};
use netguard_core::types::Position;

use crate::engine::{Game, SimConfig, WaveStart};
use crate::modifiers::ModifierSet;
use crate::systems::projectile::{self, Projectile};
use crate::world_setup;

// ---- Helpers ----

fn level(waypoints: &[(f64, f64)], waves: Vec<WaveScript>) -> LevelDef {
    LevelDef {
        name: "Test Range".to_string(),
        story: Vec::new(),
        waypoints: waypoints.iter().copied().map(Position::from).collect(),
        waves,
        starting_money: 450,
    }
}

/// Long straight path: nothing leaks during a short test.
fn long_level(waves: Vec<WaveScript>) -> LevelDef {
    level(&[(0.0, 0.0), (1000.0, 0.0)], waves)
}

/// Ten-unit path: a Phishing enemy leaks three ticks after release.
fn short_level(waves: Vec<WaveScript>) -> LevelDef {
    level(&[(0.0, 0.0), (10.0, 0.0)], waves)
}

fn one(kind: EnemyKind) -> WaveScript {
    vec![SpawnGroup::new(kind, 1, 0)]
}

fn game_with(levels: Vec<LevelDef>) -> Game {
    Game::new(SimConfig {
        levels,
        ..Default::default()
    })
}

/// Tick nominal frames until `done` holds. Panics after `max_ticks`.
fn run_until(game: &mut Game, max_ticks: usize, done: impl Fn(&Game) -> bool) {
    for _ in 0..max_ticks {
        if done(game) {
            return;
        }
        game.tick(NOMINAL_FRAME_MS);
    }
    assert!(done(game), "condition not reached in {max_ticks} ticks");
}

fn enemy_health(game: &Game, entity: Entity) -> f64 {
    game.world().get::<&Enemy>(entity).unwrap().health()
}

fn tower_count(game: &Game) -> usize {
    game.world().query::<&Tower>().iter().count()
}

// ---- Determinism ----

fn drive_autopilot(game: &mut Game, ticks: usize) -> Vec<String> {
    game.queue_commands([
        PlayerCommand::PlaceTower {
            kind: TowerKind::Ids,
            x: 400.0,
            y: 200.0,
        },
        PlayerCommand::PlaceTower {
            kind: TowerKind::Firewall,
            x: 150.0,
            y: 400.0,
        },
    ]);
    let mut frames = Vec::with_capacity(ticks);
    for _ in 0..ticks {
        let snapshot = game.tick(NOMINAL_FRAME_MS);
        if let Some(offer) = &snapshot.perk_offer {
            game.queue_command(PlayerCommand::ChoosePerk {
                perk: offer.choices[0].perk,
            });
        } else if !snapshot.wave_in_progress {
            game.queue_command(PlayerCommand::StartNextWave);
        }
        for loot in &snapshot.loot {
            game.queue_command(PlayerCommand::CollectLootAt {
                x: loot.position.x,
                y: loot.position.y,
            });
        }
        frames.push(serde_json::to_string(&snapshot).unwrap());
    }
    frames
}

#[test]
fn test_determinism_same_seed() {
    let config = SimConfig {
        seed: 12345,
        mode: GameMode::Endless,
        ..Default::default()
    };
    let mut game_a = Game::new(config.clone());
    let mut game_b = Game::new(config);

    let frames_a = drive_autopilot(&mut game_a, 1500);
    let frames_b = drive_autopilot(&mut game_b, 1500);
    for (i, (a, b)) in frames_a.iter().zip(&frames_b).enumerate() {
        assert_eq!(a, b, "snapshots diverged at tick {i}");
    }
}

#[test]
fn test_determinism_different_seeds() {
    let mut game_a = Game::new(SimConfig {
        seed: 111,
        mode: GameMode::Endless,
        ..Default::default()
    });
    let mut game_b = Game::new(SimConfig {
        seed: 222,
        mode: GameMode::Endless,
        ..Default::default()
    });

    let frames_a = drive_autopilot(&mut game_a, 3000);
    let frames_b = drive_autopilot(&mut game_b, 3000);
    assert_ne!(frames_a, frames_b, "different seeds should produce divergent output");
}

// ---- Match setup ----

#[test]
fn test_fresh_story_match() {
    let mut game = Game::new(SimConfig::default());
    assert_eq!(game.money(), 450);
    assert_eq!(game.lives(), 20);
    assert_eq!(game.wave_index(), 0);
    assert_eq!(game.phase(), GamePhase::Active);

    let start = game.start_next_wave().unwrap();
    assert_eq!(start, WaveStart::Started { wave: 1, enemies: 5 });
    assert_eq!(game.queued_spawns(), 5);
    assert!(game.is_wave_in_progress());

    let snapshot = game.tick(NOMINAL_FRAME_MS);
    assert_eq!(snapshot.economy.wave_total, Some(4));
    assert!(snapshot
        .events
        .contains(&GameEvent::WaveStarted { wave: 1, enemies: 5 }));
}

#[test]
fn test_empty_level_list_falls_back_to_story() {
    let game = game_with(Vec::new());
    assert_eq!(game.level().name, "Level 1: Home Network");
}

#[test]
fn test_endless_match() {
    let mut game = Game::new(SimConfig::default());
    game.new_match(GameMode::Endless);
    assert_eq!(game.money(), 600);
    assert_eq!(game.level().name, "ENDLESS WAVE");
    assert_eq!(
        game.level().waypoints,
        netguard_core::levels::story_levels()[1].waypoints
    );

    match game.start_next_wave().unwrap() {
        WaveStart::Started { wave, enemies } => {
            assert_eq!(wave, 1);
            assert!(enemies >= 1);
        }
        other => panic!("unexpected {other:?}"),
    }
    let snapshot = game.tick(NOMINAL_FRAME_MS);
    assert_eq!(snapshot.economy.wave_total, None);
    assert_eq!(snapshot.mode, GameMode::Endless);
    assert_eq!(game.level_intel().len(), 5);
}

#[test]
fn test_level_intel() {
    let game = Game::new(SimConfig::default());
    let intel = game.level_intel();
    assert_eq!(intel.len(), 2);
    assert_eq!(intel[0].enemy, EnemyKind::Malware);
    assert_eq!(
        intel[0].effective_towers,
        vec![TowerKind::Firewall, TowerKind::Antivirus]
    );
    assert_eq!(intel[1].enemy, EnemyKind::Phishing);
    assert_eq!(intel[1].effective_towers, vec![TowerKind::Ids]);
}

// ---- Economy ----

#[test]
fn test_place_tower_deducts_cost() {
    let mut game = Game::new(SimConfig::default());
    game.place_tower(TowerKind::Firewall, 100.0, 200.0).unwrap();
    assert_eq!(game.money(), 350);
    assert_eq!(tower_count(&game), 1);
}

#[test]
fn test_place_tower_insufficient_funds() {
    let mut game = Game::new(SimConfig::default());
    game.place_tower(TowerKind::Ids, 100.0, 200.0).unwrap();
    let err = game.place_tower(TowerKind::Firewall, 200.0, 200.0).unwrap_err();
    assert_eq!(
        err,
        CommandError::InsufficientFunds {
            cost: 100,
            available: 50
        }
    );
    assert_eq!(game.money(), 50);
    assert_eq!(tower_count(&game), 1);
}

#[test]
fn test_place_tower_rejects_non_finite_position() {
    let mut game = Game::new(SimConfig::default());
    assert!(matches!(
        game.place_tower(TowerKind::Firewall, f64::NAN, 0.0),
        Err(CommandError::InvalidPosition { .. })
    ));
    assert_eq!(game.money(), 450);
}

#[test]
fn test_sell_tower_refunds_half_base_cost() {
    let mut game = Game::new(SimConfig::default());
    game.place_tower(TowerKind::Antivirus, 100.0, 100.0).unwrap();
    assert_eq!(game.money(), 200);

    // Pick radius is strict.
    assert!(matches!(
        game.sell_tower(120.0, 100.0),
        Err(CommandError::NoTowerAt { .. })
    ));
    assert_eq!(game.sell_tower(105.0, 100.0).unwrap(), 125);
    assert_eq!(game.money(), 325);
    assert_eq!(tower_count(&game), 0);
    assert!(game.sell_tower(105.0, 100.0).is_err());
}

#[test]
fn test_kill_pays_reward_and_reaps() {
    let mut game = game_with(vec![long_level(vec![one(EnemyKind::Malware)])]);
    let enemy = game.spawn_test_enemy(EnemyKind::Malware);
    game.world_mut()
        .get::<&mut Enemy>(enemy)
        .unwrap()
        .take_damage(1_000.0);

    let snapshot = game.tick(NOMINAL_FRAME_MS);
    assert!(!game.world().contains(enemy));
    assert!(snapshot.enemies.is_empty());
    assert_eq!(game.money(), 460);
    assert!(snapshot.events.iter().any(|e| matches!(
        e,
        GameEvent::EnemyKilled {
            kind: EnemyKind::Malware,
            reward: 10,
            ..
        }
    )));
}

#[test]
fn test_leak_costs_a_life() {
    let mut game = game_with(vec![short_level(vec![one(EnemyKind::Phishing)])]);
    game.start_next_wave().unwrap();
    run_until(&mut game, 20, |g| !g.is_wave_in_progress());
    assert_eq!(game.lives(), 19);
    assert_eq!(game.money(), 450);
}

#[test]
fn test_game_over_is_terminal() {
    let wave = vec![SpawnGroup::new(EnemyKind::Phishing, 20, 0)];
    let mut game = game_with(vec![short_level(vec![wave])]);
    game.start_next_wave().unwrap();
    run_until(&mut game, 200, |g| g.phase() == GamePhase::GameOver);
    assert_eq!(game.lives(), 0);

    let time = game.time();
    let snapshot = game.tick(NOMINAL_FRAME_MS);
    assert!(snapshot.game_over);
    assert_eq!(game.time(), time);
    assert_eq!(
        game.place_tower(TowerKind::Firewall, 0.0, 0.0),
        Err(CommandError::MatchOver)
    );

    game.load_level(0);
    assert_eq!(game.phase(), GamePhase::Active);
    assert_eq!(game.lives(), 20);
}

// ---- Waves and perks ----

#[test]
fn test_wave_in_progress_blocks_start() {
    let mut game = Game::new(SimConfig::default());
    game.start_next_wave().unwrap();
    assert_eq!(game.start_next_wave(), Err(CommandError::WaveInProgress));
    assert_eq!(game.wave_index(), 1);
}

#[test]
fn test_spawns_release_one_per_delay() {
    let wave = vec![SpawnGroup::new(EnemyKind::Malware, 3, 100)];
    let mut game = game_with(vec![long_level(vec![wave])]);
    game.start_next_wave().unwrap();

    // 6 * 16 = 96 ms: not past the delay yet.
    for _ in 0..6 {
        game.tick(NOMINAL_FRAME_MS);
    }
    assert_eq!(game.queued_spawns(), 3);
    let snapshot = game.tick(NOMINAL_FRAME_MS);
    assert_eq!(game.queued_spawns(), 2);
    assert_eq!(snapshot.enemies.len(), 1);
}

#[test]
fn test_perk_milestone_flow() {
    let waves = (0..4).map(|_| one(EnemyKind::Phishing)).collect();
    let mut game = game_with(vec![short_level(waves)]);
    game.place_tower(TowerKind::Firewall, 500.0, 500.0).unwrap();

    for wave in 1..=3 {
        assert_eq!(
            game.start_next_wave().unwrap(),
            WaveStart::Started { wave, enemies: 1 }
        );
        run_until(&mut game, 50, |g| !g.is_wave_in_progress());
    }
    assert_eq!(game.lives(), 17);

    let choices = match game.start_next_wave().unwrap() {
        WaveStart::PerkOffered(choices) => choices,
        other => panic!("expected a perk offer, got {other:?}"),
    };
    assert_eq!(choices.len(), 3);
    assert_eq!(game.phase(), GamePhase::PerkSelection);

    // Frozen while the offer is open.
    let time = game.time();
    let snapshot = game.tick(NOMINAL_FRAME_MS);
    assert_eq!(game.time(), time);
    assert_eq!(snapshot.perk_offer.as_ref().map(|o| o.choices.len()), Some(3));
    assert_eq!(
        game.place_tower(TowerKind::Firewall, 0.0, 50.0),
        Err(CommandError::PerkSelectionPending)
    );
    assert_eq!(game.start_next_wave(), Err(CommandError::PerkSelectionPending));

    let unoffered = PerkKind::ALL
        .into_iter()
        .find(|p| !choices.contains(p))
        .unwrap();
    assert_eq!(
        game.choose_perk(unoffered),
        Err(CommandError::PerkNotOffered(unoffered))
    );

    let chosen = choices[0];
    game.choose_perk(chosen).unwrap();
    assert_eq!(game.phase(), GamePhase::Active);
    assert!(game.perk_offer().is_none());
    assert!(game.lives() <= STARTING_LIVES);
    assert_eq!(game.choose_perk(chosen), Err(CommandError::NoPerkOffer));

    // Modifiers reach the tower placed before the perk.
    let mut expected = ModifierSet::default();
    let archetype = perk_archetype(chosen);
    expected.apply(archetype.effect, archetype.value);
    let stats = expected.tower_stats(TowerKind::Firewall);
    let snapshot = game.tick(NOMINAL_FRAME_MS);
    assert_eq!(snapshot.towers[0].damage, stats.damage);
    assert_eq!(snapshot.towers[0].range, stats.range);
    assert_eq!(snapshot.towers[0].fire_interval_ms, stats.fire_interval_ms);

    // The milestone is claimed: the fourth wave starts.
    assert_eq!(
        game.start_next_wave().unwrap(),
        WaveStart::Started { wave: 4, enemies: 1 }
    );
}

#[test]
fn test_level_complete_then_game_won() {
    let mut game = game_with(vec![short_level(vec![one(EnemyKind::Phishing)])]);
    game.start_next_wave().unwrap();
    run_until(&mut game, 50, |g| g.phase() == GamePhase::LevelComplete);
    assert!(game.is_level_complete());
    assert_eq!(game.start_next_wave(), Err(CommandError::NoMoreWaves));

    let snapshot = game.tick(NOMINAL_FRAME_MS);
    assert!(snapshot.level_complete);
    assert!(!snapshot.game_won);

    game.load_level(1);
    assert_eq!(game.phase(), GamePhase::GameWon);
    assert!(game.tick(NOMINAL_FRAME_MS).game_won);

    game.load_level(0);
    assert_eq!(game.phase(), GamePhase::Active);
    assert_eq!(game.money(), 450);
    assert_eq!(game.wave_index(), 0);
}

// ---- Combat ----

#[test]
fn test_multiplier_applies_to_projectile_damage() {
    let mut game = game_with(vec![long_level(vec![one(EnemyKind::Ddos)])]);
    game.place_tower(TowerKind::Firewall, 20.0, 0.0).unwrap();
    let enemy = game.spawn_test_enemy(EnemyKind::Ddos);

    for _ in 0..10 {
        game.tick(NOMINAL_FRAME_MS);
    }
    // One shot (500 ms reload), 10 base damage, 2.0 against DDoS.
    assert_eq!(enemy_health(&game, enemy), 60.0);
}

#[test]
fn test_towers_target_earliest_spawn() {
    let mut game = game_with(vec![long_level(vec![one(EnemyKind::Malware)])]);
    let first = game.spawn_test_enemy(EnemyKind::Malware);
    for _ in 0..20 {
        game.tick(NOMINAL_FRAME_MS);
    }
    let second = game.spawn_test_enemy(EnemyKind::Malware);
    game.place_tower(TowerKind::Firewall, 0.0, 10.0).unwrap();
    game.tick(NOMINAL_FRAME_MS);

    let targets: Vec<Entity> = game
        .world()
        .query::<&Projectile>()
        .iter()
        .map(|(_, p)| p.target)
        .collect();
    assert_eq!(targets, vec![first]);
    assert_ne!(targets[0], second);
}

#[test]
fn test_projectile_with_vanished_target_deactivates() {
    let mut game = game_with(vec![long_level(vec![one(EnemyKind::Malware)])]);
    let enemy = game.spawn_test_enemy(EnemyKind::Malware);
    game.place_tower(TowerKind::Firewall, 0.0, 100.0).unwrap();
    let snapshot = game.tick(NOMINAL_FRAME_MS);
    assert_eq!(snapshot.projectiles.len(), 1);

    game.world_mut().despawn(enemy).unwrap();
    let snapshot = game.tick(NOMINAL_FRAME_MS);
    assert!(snapshot.projectiles.is_empty());
    assert_eq!(game.money(), 350);
}

#[test]
fn test_dead_target_never_credited_twice() {
    let mut game = game_with(vec![long_level(vec![one(EnemyKind::Phishing)])]);
    // Both towers fire at the same wounded target in the same tick.
    game.place_tower(TowerKind::Firewall, 5.0, 5.0).unwrap();
    game.place_tower(TowerKind::Firewall, 5.0, -5.0).unwrap();
    let enemy = game.spawn_test_enemy(EnemyKind::Phishing);
    game.world_mut()
        .get::<&mut Enemy>(enemy)
        .unwrap()
        .take_damage(10.0);

    run_until(&mut game, 20, |g| !g.world().contains(enemy));
    // Firewall does 0.5x to Phishing: 5 damage finishes the enemy once.
    assert_eq!(game.money(), 450 - 200 + 15);
}

#[test]
fn test_trap_slows_by_inverse_multiplier() {
    let mut game = game_with(vec![long_level(vec![one(EnemyKind::Malware)])]);
    game.spawn_test_enemy(EnemyKind::Ransomware);
    game.spawn_test_enemy(EnemyKind::Ddos);
    game.spawn_test_enemy(EnemyKind::SocialEngineering);
    game.place_tower(TowerKind::Honeypot, 0.0, 50.0).unwrap();

    let snapshot = game.tick(NOMINAL_FRAME_MS);
    assert!(snapshot.projectiles.is_empty());
    let [ransomware, ddos, social] = &snapshot.enemies[..] else {
        panic!("expected three enemies");
    };
    assert!(ransomware.slowed);
    assert_eq!(ransomware.speed, 0.25);
    // Resistant: the slow is clamped to no effect.
    assert_eq!(ddos.speed, 1.5);
    assert_eq!(social.speed, 1.5);
}

/// Distance a lone Malware covers in each of the first three ticks.
fn malware_strides(speed: f64, frame_ms: f64, honeypot: bool) -> Vec<f64> {
    let mut game = Game::new(SimConfig {
        levels: vec![long_level(vec![one(EnemyKind::Malware)])],
        matrix: DamageMatrix::neutral(),
        ..Default::default()
    });
    game.set_game_speed(speed).unwrap();
    game.spawn_test_enemy(EnemyKind::Malware);
    if honeypot {
        game.place_tower(TowerKind::Honeypot, 0.0, 50.0).unwrap();
    }

    let mut last_x = 0.0;
    (0..3)
        .map(|_| {
            let x = game.tick(frame_ms).enemies[0].position.x;
            let stride = x - last_x;
            last_x = x;
            stride
        })
        .collect()
}

#[test]
fn test_trap_holds_enemies_back_at_any_speed() {
    for (speed, frame_ms) in [(1.0, 16.0), (1.0, 45.0), (2.0, 60.0), (4.0, 30.0), (4.0, 100.0)] {
        let free = malware_strides(speed, frame_ms, false);
        let trapped = malware_strides(speed, frame_ms, true);
        let expected_free = 2.0 * frame_ms * speed / NOMINAL_FRAME_MS;
        assert!((free[1] - expected_free).abs() < 1e-9);

        // The trap lands after movement, so the first stride is unslowed.
        assert!((trapped[0] - free[0]).abs() < 1e-9);
        for tick in 1..3 {
            assert!(
                (trapped[tick] - free[tick] * 0.5).abs() < 1e-9,
                "speed {speed} frame {frame_ms}: moved {} vs free {}",
                trapped[tick],
                free[tick]
            );
        }
    }
}

// ---- Loot ----

#[test]
fn test_collect_crypto_and_patch() {
    let mut game = game_with(vec![long_level(vec![one(EnemyKind::Malware)])]);
    let now = game.time().elapsed_ms;
    world_setup::spawn_loot(
        game.world_mut(),
        LootKind::Crypto,
        Position::new(100.0, 100.0),
        now,
    );
    world_setup::spawn_loot(
        game.world_mut(),
        LootKind::Patch,
        Position::new(300.0, 300.0),
        now,
    );

    assert_eq!(
        game.collect_loot_at(110.0, 100.0),
        Ok(LootKind::Crypto)
    );
    assert_eq!(game.money(), 500);
    assert!(matches!(
        game.collect_loot_at(110.0, 100.0),
        Err(CommandError::NoLootAt { .. })
    ));

    // Lives stay capped.
    assert_eq!(game.collect_loot_at(300.0, 300.0), Ok(LootKind::Patch));
    assert_eq!(game.lives(), STARTING_LIVES);
}

#[test]
fn test_rate_buff_expires_on_sim_time() {
    let mut game = game_with(vec![long_level(vec![one(EnemyKind::Malware)])]);
    game.set_game_speed(4.0).unwrap();
    world_setup::spawn_loot(
        game.world_mut(),
        LootKind::DataStream,
        Position::new(0.0, 0.0),
        0.0,
    );
    game.collect_loot_at(0.0, 0.0).unwrap();
    assert!(game.rate_buff_active());

    let snapshot = game.tick(NOMINAL_FRAME_MS);
    assert_eq!(snapshot.rate_buff_remaining_ms, Some(6000.0 - 64.0));

    // 94 * 64 = 6016 ms.
    let mut expired = false;
    for _ in 0..93 {
        let snapshot = game.tick(NOMINAL_FRAME_MS);
        expired |= snapshot.events.contains(&GameEvent::RateBuffExpired);
    }
    assert!(expired);
    assert!(!game.rate_buff_active());
}

#[test]
fn test_loot_times_out() {
    let mut game = game_with(vec![long_level(vec![one(EnemyKind::Malware)])]);
    world_setup::spawn_loot(
        game.world_mut(),
        LootKind::Crypto,
        Position::new(50.0, 50.0),
        0.0,
    );
    run_until(&mut game, 300, |g| g.time().elapsed_ms > 4000.0);
    let snapshot = game.tick(NOMINAL_FRAME_MS);
    assert!(snapshot.loot.is_empty());
    assert!(game.collect_loot_at(50.0, 50.0).is_err());
}

// ---- Time control ----

#[test]
fn test_game_speed_scales_and_clamps_frames() {
    let mut game = Game::new(SimConfig::default());
    game.set_game_speed(2.0).unwrap();
    game.tick(16.0);
    assert_eq!(game.time().elapsed_ms, 32.0);
    // A stall is replaced by a nominal frame.
    game.tick(250.0);
    assert_eq!(game.time().elapsed_ms, 64.0);
    game.tick(f64::NAN);
    assert_eq!(game.time().elapsed_ms, 96.0);

    assert_eq!(
        game.set_game_speed(4.5),
        Err(CommandError::InvalidGameSpeed(4.5))
    );
    assert!(game.set_game_speed(0.0).is_err());
    assert_eq!(game.game_speed(), 2.0);
}

#[test]
fn test_cycle_game_speed() {
    let mut game = Game::new(SimConfig::default());
    assert_eq!(game.cycle_game_speed().unwrap(), 2.0);
    assert_eq!(game.cycle_game_speed().unwrap(), 4.0);
    assert_eq!(game.cycle_game_speed().unwrap(), 1.0);
    game.set_game_speed(3.0).unwrap();
    assert_eq!(game.cycle_game_speed().unwrap(), 4.0);
}

#[test]
fn test_pause_stops_simulation() {
    let mut game = Game::new(SimConfig::default());
    game.tick(NOMINAL_FRAME_MS);
    let time = game.time();

    game.queue_command(PlayerCommand::Pause);
    let snapshot = game.tick(NOMINAL_FRAME_MS);
    assert_eq!(snapshot.phase, GamePhase::Paused);
    assert_eq!(game.time(), time);

    game.queue_command(PlayerCommand::Resume);
    game.tick(NOMINAL_FRAME_MS);
    assert_eq!(game.phase(), GamePhase::Active);
    assert_eq!(game.time().tick, time.tick + 1);
}

#[test]
fn test_queued_rejection_surfaces_as_event() {
    let mut game = Game::new(SimConfig::default());
    game.queue_commands([
        PlayerCommand::PlaceTower {
            kind: TowerKind::Ids,
            x: 100.0,
            y: 100.0,
        },
        PlayerCommand::PlaceTower {
            kind: TowerKind::Ids,
            x: 200.0,
            y: 100.0,
        },
    ]);
    let snapshot = game.tick(NOMINAL_FRAME_MS);
    assert!(snapshot.events.contains(&GameEvent::TowerPlaced {
        kind: TowerKind::Ids,
        cost: 400
    }));
    assert!(snapshot.events.iter().any(|e| matches!(
        e,
        GameEvent::CommandRejected { reason } if reason.starts_with("insufficient funds")
    )));
    assert_eq!(snapshot.towers.len(), 1);

    // Events are drained into one snapshot only.
    assert!(game.tick(NOMINAL_FRAME_MS).events.is_empty());
}

// ---- Properties ----

fn distance_to_segment(p: Position, a: Position, b: Position) -> f64 {
    let (p, a, b) = (p.to_vec(), a.to_vec(), b.to_vec());
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

fn on_polyline(p: Position, path: &[Position]) -> bool {
    path.windows(2)
        .any(|w| distance_to_segment(p, w[0], w[1]) < 1e-6)
}

fn enemy_kind() -> impl Strategy<Value = EnemyKind> {
    prop::sample::select(EnemyKind::ALL.to_vec())
}

fn tower_kind() -> impl Strategy<Value = TowerKind> {
    prop::sample::select(TowerKind::ALL.to_vec())
}

#[derive(Debug, Clone)]
enum Op {
    Place(TowerKind, f64, f64),
    Sell(f64, f64),
    StartWave,
    Tick(usize, f64),
    ChooseFirst,
    Collect(f64, f64),
    Speed(f64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (tower_kind(), 0.0..800.0, 0.0..600.0).prop_map(|(k, x, y)| Op::Place(k, x, y)),
        (0.0..800.0, 0.0..600.0).prop_map(|(x, y)| Op::Sell(x, y)),
        Just(Op::StartWave),
        (1usize..60, 0.0..150.0).prop_map(|(n, ms)| Op::Tick(n, ms)),
        Just(Op::ChooseFirst),
        (0.0..800.0, 0.0..600.0).prop_map(|(x, y)| Op::Collect(x, y)),
        prop::sample::select(vec![0.5, 1.0, 2.0, 4.0, 8.0]).prop_map(Op::Speed),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Health never rises and enemies never leave their path.
    #[test]
    fn prop_enemy_stays_on_path(
        kind in enemy_kind(),
        raw in prop::collection::vec((0.0..800.0f64, 0.0..600.0f64), 2..6),
        steps in prop::collection::vec((0.0..100.0f64, 0.0..50.0f64, 0.0..1.0f64), 1..200),
    ) {
        let path: Path = Arc::from(raw.into_iter().map(Position::from).collect::<Vec<_>>());
        let mut enemy = Enemy::new(kind, path.clone(), 0);
        let mut last_health = enemy.health();

        for (dt, damage, slow) in steps {
            if slow > 0.5 {
                enemy.apply_slow(slow, dt * 2.0);
            }
            enemy.advance(dt, 0.7);
            enemy.take_damage(damage);

            prop_assert!(enemy.health() <= last_health);
            prop_assert!(on_polyline(enemy.position, &path), "off path at {:?}", enemy.position);
            last_health = enemy.health();
        }
    }

    /// Reload never goes negative and a reloading tower never fires.
    #[test]
    fn prop_reload_never_negative(
        steps in prop::collection::vec((0.0..200.0f64, prop::bool::ANY, prop::bool::ANY), 1..200),
    ) {
        let mut tower = Tower::new(TowerKind::Antivirus, Position::new(0.0, 0.0));
        for (dt, buffed, wants_fire) in steps {
            let buff = if buffed { RATE_BUFF_MULTIPLIER } else { 1.0 };
            if tower.phase() == TowerPhase::Reloading {
                tower.cool_down(dt, buff);
            } else if wants_fire {
                tower.start_reload(350.0, buff);
            }
            prop_assert!(tower.reload_ms() >= 0.0);
        }
    }

    /// Damage on arrival is exactly base damage times the matrix entry.
    #[test]
    fn prop_projectile_damage_exact(
        tower in tower_kind(),
        enemy in enemy_kind(),
        damage in 0.0..100.0f64,
        factor in 0.0..3.0f64,
    ) {
        let matrix = DamageMatrix::standard().with_entry(tower, enemy, factor);
        let mut world = hecs::World::new();
        let path: Path = Arc::from(vec![Position::new(0.0, 0.0), Position::new(100.0, 0.0)]);
        let target = world_setup::spawn_enemy(&mut world, enemy, path, 0);
        world_setup::spawn_projectile(&mut world, Position::new(5.0, 0.0), tower, damage, target);

        let hits = projectile::run(&mut world, &matrix, NOMINAL_FRAME_MS);
        prop_assert_eq!(hits.len(), 1);
        prop_assert_eq!(hits[0].damage, damage * factor);
    }

    /// Every offer holds three distinct perks.
    #[test]
    fn prop_perk_offers_distinct(seed in any::<u64>()) {
        use rand::SeedableRng;
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed);
        let offer = crate::perks::roll_offer(&mut rng);
        prop_assert_eq!(offer.len(), PERK_OFFER_SIZE);
        for (i, a) in offer.iter().enumerate() {
            prop_assert!(!offer[i + 1..].contains(a));
        }
    }

    /// Placement always costs the floored, modified price.
    #[test]
    fn prop_cost_rounding(kind in tower_kind(), perks in 0usize..6) {
        let mut mods = ModifierSet::default();
        for _ in 0..perks {
            mods.apply(PerkEffect::Cost, 0.85);
        }
        let base = f64::from(netguard_core::archetypes::tower_archetype(kind).cost);
        prop_assert_eq!(mods.tower_cost(kind), (base * mods.cost).floor() as u32);
    }

    /// Random command soak over the default campaign.
    #[test]
    fn prop_match_invariants(seed in any::<u64>(), ops in prop::collection::vec(op(), 1..40)) {
        let mut game = Game::new(SimConfig { seed, ..Default::default() });

        for op in ops {
            let money_before = game.money();
            match op {
                Op::Place(kind, x, y) => {
                    let cost = game.modifiers().tower_cost(kind);
                    match game.place_tower(kind, x, y) {
                        Ok(_) => prop_assert_eq!(game.money(), money_before - cost),
                        Err(_) => prop_assert_eq!(game.money(), money_before),
                    }
                }
                Op::Sell(x, y) => {
                    if game.sell_tower(x, y).is_err() {
                        prop_assert_eq!(game.money(), money_before);
                    }
                }
                Op::StartWave => {
                    let _ = game.start_next_wave();
                }
                Op::Tick(n, ms) => {
                    for _ in 0..n {
                        game.tick(ms);
                    }
                }
                Op::ChooseFirst => {
                    if let Some(&perk) = game.perk_offer().and_then(|o| o.first()) {
                        prop_assert!(game.choose_perk(perk).is_ok());
                    }
                }
                Op::Collect(x, y) => {
                    let _ = game.collect_loot_at(x, y);
                }
                Op::Speed(multiplier) => {
                    let accepted = game.set_game_speed(multiplier).is_ok();
                    let open = !game.phase().is_terminal() && game.phase() != GamePhase::PerkSelection;
                    prop_assert_eq!(accepted, open && multiplier <= MAX_GAME_SPEED);
                }
            }

            prop_assert!(game.lives() <= STARTING_LIVES);
            if let Some(offer) = game.perk_offer() {
                prop_assert_eq!(offer.len(), PERK_OFFER_SIZE);
                prop_assert_eq!(game.phase(), GamePhase::PerkSelection);
            }
            for (_, enemy) in game.world().query::<&Enemy>().iter() {
                prop_assert!(enemy.health() <= enemy.max_health);
                prop_assert!(on_polyline(enemy.position, enemy.path()));
            }
            for (_, tower) in game.world().query::<&Tower>().iter() {
                prop_assert!(tower.reload_ms() >= 0.0);
            }
        }
    }
}
