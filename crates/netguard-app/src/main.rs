//! netguard: headless match runner.
//!
//! Usage:
//!   netguard-app [LEVEL_PACK.json] [--seed N] [--endless] [--speed X]

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use netguard_app::autopilot::Autopilot;
use netguard_app::game_loop::spawn_game_loop;
use netguard_core::enums::GameMode;
use netguard_core::levels::load_level_pack;
use netguard_sim::SimConfig;

/// How often the autopilot polls for a fresh snapshot.
const POLL_INTERVAL: Duration = Duration::from_millis(8);

#[derive(Debug, Default)]
struct RunnerArgs {
    level_pack: Option<PathBuf>,
    seed: Option<u64>,
    endless: bool,
    speed: Option<f64>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            print_usage();
            process::exit(1);
        }
    };

    let mut config = SimConfig::default();
    if let Some(path) = &args.level_pack {
        match load_level_pack(path) {
            Ok(levels) => config.levels = levels,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "failed to load level pack");
                process::exit(1);
            }
        }
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(speed) = args.speed {
        config.game_speed = speed;
    }
    if args.endless {
        config.mode = GameMode::Endless;
    }

    tracing::info!(seed = config.seed, mode = ?config.mode, levels = config.levels.len(), "starting match");
    let (runner, handle) = match spawn_game_loop(config) {
        Ok(spawned) => spawned,
        Err(e) => {
            tracing::error!(error = %e, "failed to spawn game loop thread");
            process::exit(1);
        }
    };

    let mut autopilot = Autopilot::new();
    let outcome = loop {
        std::thread::sleep(POLL_INTERVAL);
        let Some(snapshot) = runner.snapshot() else {
            continue;
        };
        if snapshot.game_over || snapshot.game_won {
            break snapshot;
        }
        for command in autopilot.plan(&snapshot) {
            if !runner.send(command) {
                tracing::error!("game loop exited unexpectedly");
                process::exit(1);
            }
        }
    };

    runner.shutdown();
    if handle.join().is_err() {
        tracing::error!("game loop thread panicked");
    }

    tracing::info!(
        won = outcome.game_won,
        level = outcome.level.index,
        wave = outcome.economy.wave_index,
        money = outcome.economy.money,
        lives = outcome.economy.lives,
        sim_ms = outcome.time.elapsed_ms,
        "match finished"
    );
}

fn parse_args(args: &[String]) -> Result<RunnerArgs, String> {
    let mut parsed = RunnerArgs::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--seed" => {
                let value = iter.next().ok_or("--seed needs a value")?;
                parsed.seed = Some(value.parse().map_err(|_| format!("bad seed: {value}"))?);
            }
            "--speed" => {
                let value = iter.next().ok_or("--speed needs a value")?;
                parsed.speed = Some(value.parse().map_err(|_| format!("bad speed: {value}"))?);
            }
            "--endless" => parsed.endless = true,
            "help" | "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            other if other.starts_with("--") => return Err(format!("Unknown option: {other}")),
            path if parsed.level_pack.is_none() => parsed.level_pack = Some(PathBuf::from(path)),
            extra => return Err(format!("Unexpected argument: {extra}")),
        }
    }
    Ok(parsed)
}

fn print_usage() {
    eprintln!(
        "netguard-app: headless NETGUARD match runner\n\
         \n\
         Usage: netguard-app [LEVEL_PACK.json] [--seed N] [--endless] [--speed X]\n\
         \n\
           LEVEL_PACK.json  Story levels to play (default: built-in levels)\n\
           --seed <N>       RNG seed (default: 42)\n\
           --endless        Play endless mode instead of the story\n\
           --speed <X>      Initial game speed, 0 < X <= 4 (default: 1)\n\
         \n\
         Logging follows RUST_LOG (default: info)."
    );
}
