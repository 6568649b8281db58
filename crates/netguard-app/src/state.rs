//! State shared between the runner's main thread and the game loop thread.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use netguard_core::commands::PlayerCommand;
use netguard_core::state::GameStateSnapshot;

/// Messages sent from the input side to the game loop thread.
#[derive(Debug)]
pub enum GameLoopCommand {
    /// A player command to forward to the match controller.
    PlayerCommand(PlayerCommand),
    /// Shut down the game loop thread gracefully.
    Shutdown,
}

/// Latest snapshot published by the game loop, `None` before the first tick.
pub type SharedSnapshot = Arc<Mutex<Option<GameStateSnapshot>>>;

/// Handles the runner keeps while the loop thread is alive.
pub struct RunnerState {
    /// Channel sender into the game loop thread.
    pub command_tx: mpsc::Sender<GameLoopCommand>,
    /// Latest snapshot for polling.
    pub latest_snapshot: SharedSnapshot,
}

impl RunnerState {
    /// Forward a player command. Returns `false` once the loop has exited.
    pub fn send(&self, command: PlayerCommand) -> bool {
        self.command_tx
            .send(GameLoopCommand::PlayerCommand(command))
            .is_ok()
    }

    /// Clone of the most recent snapshot, if one has been published.
    pub fn snapshot(&self) -> Option<GameStateSnapshot> {
        self.latest_snapshot
            .lock()
            .ok()
            .and_then(|lock| lock.clone())
    }

    pub fn shutdown(&self) {
        let _ = self.command_tx.send(GameLoopCommand::Shutdown);
    }
}
