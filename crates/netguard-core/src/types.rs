//! Fundamental geometric and simulation types.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// 2D position on the play field (world units, origin top-left, y down).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Simulation time tracking.
///
/// `elapsed_ms` accumulates the effective (game-speed scaled) frame deltas,
/// so every timer measured against it stays in step at any acceleration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimTime {
    /// Number of ticks that advanced the world.
    pub tick: u64,
    /// Elapsed simulation time in milliseconds.
    pub elapsed_ms: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_vec(self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    pub fn from_vec(v: DVec2) -> Self {
        Self { x: v.x, y: v.y }
    }

    /// Euclidean distance to another position.
    pub fn distance_to(&self, other: &Position) -> f64 {
        self.to_vec().distance(other.to_vec())
    }

    /// Move toward `target` by at most `step` units.
    ///
    /// Returns `true` and lands exactly on `target` when the remaining
    /// distance is no greater than `step`.
    pub fn step_toward(&mut self, target: Position, step: f64) -> bool {
        let delta = target.to_vec() - self.to_vec();
        let distance = delta.length();
        if distance <= step {
            *self = target;
            return true;
        }
        *self = Self::from_vec(self.to_vec() + delta / distance * step);
        false
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Position {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl SimTime {
    /// Advance by one tick covering `dt_ms` of simulation time.
    pub fn advance(&mut self, dt_ms: f64) {
        self.tick += 1;
        self.elapsed_ms += dt_ms;
    }
}
