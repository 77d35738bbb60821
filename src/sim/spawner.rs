//! Timer-gated enemy and power-up spawning
//!
//! Enemy cadence shortens linearly with level. Power-ups ride on enemy
//! spawns through a double gate: an enemy spawn sometimes arms a delayed
//! drop, and the armed drop itself only sometimes goes off. The compound
//! odds (~3% per enemy) are the intended rarity, so both gates stay.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::*;

/// Position and velocity for a new enemy, rolled by the spawner. The step
/// turns it into an entity with a pooled visual.
#[derive(Debug, Clone, Copy)]
pub struct EnemySpawn {
    pub pos: Vec3,
    pub vel: Vec3,
}

/// Position and velocity for a new power-up
#[derive(Debug, Clone, Copy)]
pub struct PowerUpSpawn {
    pub pos: Vec3,
    pub vel: Vec3,
}

/// Accumulates frame time and decides when something enters the field.
///
/// Timers advance only while the step runs, so spawning freezes with the
/// rest of the simulation when the session is paused.
#[derive(Debug)]
pub struct Spawner {
    enemy_timer: f32,
    /// Armed power-up drops, as remaining delay. Fire-and-forget; several
    /// can be in flight at once.
    pending_drops: Vec<f32>,
    rng: Pcg32,
}

impl Spawner {
    pub fn new(seed: u64) -> Self {
        Self {
            enemy_timer: 0.0,
            pending_drops: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Restart the cadence for a fresh run
    pub fn reset(&mut self) {
        self.enemy_timer = 0.0;
        self.pending_drops.clear();
    }

    /// Spawn interval for a difficulty level, floored so it never reaches
    /// once-per-frame territory
    pub fn enemy_interval(level: u32) -> f32 {
        (ENEMY_SPAWN_BASE_INTERVAL - level as f32 * ENEMY_SPAWN_LEVEL_STEP)
            .max(ENEMY_SPAWN_MIN_INTERVAL)
    }

    /// Advance timers by one frame. Returns at most one enemy and one
    /// power-up to materialize this frame.
    ///
    /// `quota_open` gates the enemy cadence: once the wave's remaining
    /// count is used up the field drains out so the wave can clear.
    /// Armed power-up drops keep ticking either way.
    pub fn update(
        &mut self,
        dt: f32,
        level: u32,
        quota_open: bool,
    ) -> (Option<EnemySpawn>, Option<PowerUpSpawn>) {
        let mut enemy = None;
        let mut power_up = None;

        if quota_open {
            self.enemy_timer += dt;
            if self.enemy_timer > Self::enemy_interval(level) {
                self.enemy_timer = 0.0;
                enemy = Some(self.roll_enemy());
                if self.rng.random_bool(POWERUP_SCHEDULE_CHANCE) {
                    self.pending_drops.push(POWERUP_SPAWN_DELAY);
                }
            }
        }

        let mut i = 0;
        while i < self.pending_drops.len() {
            self.pending_drops[i] -= dt;
            if self.pending_drops[i] <= 0.0 {
                self.pending_drops.swap_remove(i);
                if power_up.is_none() && self.rng.random_bool(POWERUP_SPAWN_CHANCE) {
                    power_up = Some(self.roll_power_up());
                }
            } else {
                i += 1;
            }
        }

        (enemy, power_up)
    }

    fn roll_enemy(&mut self) -> EnemySpawn {
        let x = self.rng.random_range(-ENEMY_SPAWN_HALF_X..=ENEMY_SPAWN_HALF_X);
        let y = self.rng.random_range(-ENEMY_SPAWN_HALF_Y..=ENEMY_SPAWN_HALF_Y);
        let z_speed = ENEMY_BASE_SPEED + self.rng.random::<f32>() * ENEMY_SPEED_VARIANCE;
        EnemySpawn {
            pos: Vec3::new(x, y, ENEMY_SPAWN_Z),
            vel: Vec3::new(0.0, 0.0, z_speed),
        }
    }

    fn roll_power_up(&mut self) -> PowerUpSpawn {
        let x = self
            .rng
            .random_range(-POWERUP_SPAWN_HALF_X..=POWERUP_SPAWN_HALF_X);
        let y = self
            .rng
            .random_range(-POWERUP_SPAWN_HALF_Y..=POWERUP_SPAWN_HALF_Y);
        PowerUpSpawn {
            pos: Vec3::new(x, y, POWERUP_SPAWN_Z),
            vel: Vec3::new(0.0, 0.0, POWERUP_SPEED),
        }
    }
}
