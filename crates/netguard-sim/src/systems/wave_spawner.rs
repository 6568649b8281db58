//! Wave spawning system: expands wave scripts into a spawn queue and
//! releases one enemy at a time as the spawn timer runs out.

use std::collections::VecDeque;

use hecs::{Entity, World};

use netguard_core::components::Path;
use netguard_core::enums::EnemyKind;
use netguard_core::levels::SpawnGroup;

/// One pending spawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnEntry {
    pub enemy: EnemyKind,
    /// Time that must pass since the previous release.
    pub delay_ms: f64,
}

/// Spawn queue and wave-in-progress tracking for the current level.
#[derive(Debug, Clone, Default)]
pub struct WaveScheduler {
    queue: VecDeque<SpawnEntry>,
    timer_ms: f64,
    in_progress: bool,
}

impl WaveScheduler {
    /// Expand `script` into the spawn queue and mark the wave in progress.
    /// Returns the number of queued enemies.
    pub fn begin(&mut self, script: &[SpawnGroup]) -> u32 {
        self.queue.clear();
        for group in script {
            for _ in 0..group.count {
                self.queue.push_back(SpawnEntry {
                    enemy: group.enemy,
                    delay_ms: f64::from(group.delay_ms),
                });
            }
        }
        self.timer_ms = 0.0;
        self.in_progress = true;
        self.queue.len() as u32
    }

    pub fn is_in_progress(&self) -> bool {
        self.in_progress
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn queue(&self) -> impl Iterator<Item = &SpawnEntry> {
        self.queue.iter()
    }

    /// Close the wave. Called once the queue and the field are both empty.
    pub fn finish(&mut self) {
        self.in_progress = false;
    }

    /// Advance the spawn timer and release the head entry if its delay is
    /// exceeded. At most one release per call.
    pub fn release(&mut self, dt_ms: f64) -> Option<EnemyKind> {
        if !self.in_progress {
            return None;
        }
        let head = *self.queue.front()?;
        self.timer_ms += dt_ms;
        if self.timer_ms > head.delay_ms {
            self.queue.pop_front();
            self.timer_ms = 0.0;
            return Some(head.enemy);
        }
        None
    }
}

/// Release any due enemy into the world at the path origin.
pub fn run(
    world: &mut World,
    scheduler: &mut WaveScheduler,
    path: &Path,
    next_seq: &mut u64,
    dt_ms: f64,
) -> Option<Entity> {
    let kind = scheduler.release(dt_ms)?;
    let entity = crate::world_setup::spawn_enemy(world, kind, path.clone(), *next_seq);
    *next_seq += 1;
    Some(entity)
}
