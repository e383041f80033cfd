//! Wave index and difficulty curve
//!
//! A [`Wave`] is the difficulty snapshot the rest of the simulation reads.
//! Only the wave controller in the engine changes it: once per cleared round,
//! every parameter tightens toward its floor and never loosens again until a
//! restart.

use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Difficulty snapshot for the current wave
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wave {
    /// 1-based wave number
    pub index: u32,
    /// Horizontal distance per movement tick
    pub step_size: f32,
    /// Seconds per enemy step
    pub step_duration: f32,
    /// Enemy fire draws from [1, fire_denominator]
    pub fire_denominator: u32,
    /// Travel time of enemy projectiles (seconds)
    pub enemy_projectile_lifetime: f32,
}

impl Wave {
    /// Wave 1 at the configured starting difficulty
    pub fn initial(tuning: &Tuning) -> Self {
        Self {
            index: 1,
            step_size: tuning.step_size,
            step_duration: tuning.step_duration,
            fire_denominator: tuning.fire_denominator,
            enemy_projectile_lifetime: tuning.enemy_projectile_lifetime,
        }
    }

    /// Movement tick period: one sweep of the whole grid takes the same time
    /// whatever its shape
    pub fn tick_period(&self, columns: u32, rows: u32) -> f32 {
        self.step_duration * columns as f32 * rows as f32
    }

    /// Advance to the next wave and tighten every parameter down to its floor
    pub fn advance(&mut self, tuning: &Tuning) {
        self.index += 1;
        self.step_duration = (self.step_duration - tuning.step_duration_decrement)
            .max(tuning.step_duration_floor);
        self.fire_denominator = self
            .fire_denominator
            .saturating_sub(tuning.fire_denominator_decrement)
            .max(tuning.fire_denominator_floor);
        self.enemy_projectile_lifetime = (self.enemy_projectile_lifetime
            - tuning.enemy_projectile_lifetime_decrement)
            .max(tuning.enemy_projectile_lifetime_floor);
    }
}
