//! Game loop thread: ticks the match controller at the nominal frame rate.
//!
//! The `Game` is created inside this thread so it never crosses a thread
//! boundary. Commands arrive via `mpsc`; each tick is fed the measured
//! wall-clock delta and the resulting snapshot is published to shared state.

use std::io;
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use netguard_core::constants::NOMINAL_FRAME_MS;
use netguard_sim::{Game, SimConfig};

use crate::state::{GameLoopCommand, RunnerState, SharedSnapshot};

/// Wall-clock duration of one frame.
const FRAME_DURATION: Duration = Duration::from_millis(NOMINAL_FRAME_MS as u64);

/// Spawns the game loop in a new thread.
pub fn spawn_game_loop(config: SimConfig) -> io::Result<(RunnerState, JoinHandle<()>)> {
    let (command_tx, command_rx) = mpsc::channel::<GameLoopCommand>();
    let latest_snapshot = SharedSnapshot::default();
    let shared = latest_snapshot.clone();

    let handle = std::thread::Builder::new()
        .name("netguard-game-loop".into())
        .spawn(move || run_game_loop(Game::new(config), command_rx, &shared))?;

    Ok((
        RunnerState {
            command_tx,
            latest_snapshot,
        },
        handle,
    ))
}

/// Drain every pending message into the game.
///
/// Returns `false` when the loop should stop.
fn drain_commands(game: &mut Game, command_rx: &mpsc::Receiver<GameLoopCommand>) -> bool {
    loop {
        match command_rx.try_recv() {
            Ok(GameLoopCommand::PlayerCommand(cmd)) => game.queue_command(cmd),
            Ok(GameLoopCommand::Shutdown) => return false,
            Err(mpsc::TryRecvError::Empty) => return true,
            Err(mpsc::TryRecvError::Disconnected) => return false,
        }
    }
}

/// The game loop. Runs until Shutdown or channel disconnect.
fn run_game_loop(
    mut game: Game,
    command_rx: mpsc::Receiver<GameLoopCommand>,
    latest_snapshot: &SharedSnapshot,
) {
    tracing::info!(mode = ?game.mode(), "game loop started");
    let mut last_frame = Instant::now();
    let mut next_frame = last_frame + FRAME_DURATION;

    while drain_commands(&mut game, &command_rx) {
        let now = Instant::now();
        let elapsed_ms = now.duration_since(last_frame).as_secs_f64() * 1000.0;
        last_frame = now;

        let snapshot = game.tick(elapsed_ms);
        if let Ok(mut lock) = latest_snapshot.lock() {
            *lock = Some(snapshot);
        }

        let now = Instant::now();
        if next_frame > now {
            std::thread::sleep(next_frame - now);
            next_frame += FRAME_DURATION;
        } else {
            // Too far behind: resync instead of bursting catch-up frames.
            next_frame = now + FRAME_DURATION;
        }
    }

    tracing::info!(ticks = game.time().tick, "game loop stopped");
}
