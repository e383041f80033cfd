//! Data-driven game balance
//!
//! Every gameplay number the engine reads lives here. Defaults are the
//! reference configuration from [`crate::consts`]; a JSON document only needs
//! to name the fields it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::TuningError;
use crate::sim::EnemyKind;

/// One formation row: which enemy type fills it and what a kill is worth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSpec {
    pub kind: EnemyKind,
    pub score: u32,
}

/// Full game balance sheet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Play area ===
    pub play_width: f32,
    pub play_height: f32,

    // === Formation ===
    /// Rows from top (index 0) to front
    pub rows: Vec<RowSpec>,
    pub columns: u32,
    pub column_spacing: f32,
    pub row_spacing: f32,
    pub formation_top: f32,
    pub x_start: f32,
    pub x_end: f32,
    pub step_size: f32,
    pub descent_step: f32,

    // === Difficulty curve ===
    pub step_duration: f32,
    pub step_duration_decrement: f32,
    pub step_duration_floor: f32,
    pub fire_denominator: u32,
    pub fire_denominator_decrement: u32,
    pub fire_denominator_floor: u32,
    pub fire_trigger: u32,
    pub enemy_projectile_lifetime: f32,
    pub enemy_projectile_lifetime_decrement: f32,
    pub enemy_projectile_lifetime_floor: f32,

    // === Player ===
    pub player_y: f32,
    pub player_projectile_duration: f32,
    pub tilt_force: f32,
    pub player_damping: f32,
    pub tilt_threshold: f32,

    // === Sequencing ===
    pub blink_count: u32,
    pub blink_interval: f32,
    pub wave_announcement_secs: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            play_width: PLAY_WIDTH,
            play_height: PLAY_HEIGHT,

            rows: vec![
                RowSpec { kind: EnemyKind::Commander, score: 30 },
                RowSpec { kind: EnemyKind::Striker, score: 20 },
                RowSpec { kind: EnemyKind::Striker, score: 20 },
                RowSpec { kind: EnemyKind::Grunt, score: 10 },
            ],
            columns: FORMATION_COLUMNS,
            column_spacing: COLUMN_SPACING,
            row_spacing: ROW_SPACING,
            formation_top: FORMATION_TOP,
            x_start: SWEEP_X_START,
            x_end: SWEEP_X_END,
            step_size: STEP_SIZE,
            descent_step: DESCENT_STEP,

            step_duration: STEP_DURATION,
            step_duration_decrement: STEP_DURATION_DECREMENT,
            step_duration_floor: STEP_DURATION_FLOOR,
            fire_denominator: FIRE_DENOMINATOR,
            fire_denominator_decrement: FIRE_DENOMINATOR_DECREMENT,
            fire_denominator_floor: FIRE_DENOMINATOR_FLOOR,
            fire_trigger: FIRE_TRIGGER,
            enemy_projectile_lifetime: ENEMY_PROJECTILE_LIFETIME,
            enemy_projectile_lifetime_decrement: ENEMY_PROJECTILE_LIFETIME_DECREMENT,
            enemy_projectile_lifetime_floor: ENEMY_PROJECTILE_LIFETIME_FLOOR,

            player_y: PLAYER_Y,
            player_projectile_duration: PLAYER_PROJECTILE_DURATION,
            tilt_force: TILT_FORCE,
            player_damping: PLAYER_DAMPING,
            tilt_threshold: TILT_THRESHOLD,

            blink_count: BLINK_COUNT,
            blink_interval: BLINK_INTERVAL,
            wave_announcement_secs: WAVE_ANNOUNCEMENT_SECS,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read a JSON file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Number of formation rows
    pub fn row_count(&self) -> u32 {
        self.rows.len() as u32
    }

    /// Reject configurations the simulation cannot run
    pub fn validate(&self) -> Result<(), TuningError> {
        fn invalid(msg: impl Into<String>) -> Result<(), TuningError> {
            Err(TuningError::Invalid(msg.into()))
        }

        if self.rows.is_empty() {
            return invalid("formation needs at least one row");
        }
        if self.columns == 0 {
            return invalid("formation needs at least one column");
        }
        if self.x_start >= self.x_end {
            return invalid(format!(
                "x_start ({}) must be left of x_end ({})",
                self.x_start, self.x_end
            ));
        }
        if self.step_size <= 0.0 || self.descent_step < 0.0 {
            return invalid("step_size must be positive and descent_step non-negative");
        }
        if self.step_duration_floor <= 0.0 || self.step_duration < self.step_duration_floor {
            return invalid("step_duration must be at or above a positive floor");
        }
        if self.fire_denominator_floor == 0 || self.fire_denominator < self.fire_denominator_floor {
            return invalid("fire_denominator must be at or above a floor of at least 1");
        }
        if self.fire_trigger == 0 || self.fire_trigger > self.fire_denominator_floor {
            return invalid(format!(
                "fire_trigger ({}) must lie in [1, fire_denominator_floor ({})]",
                self.fire_trigger, self.fire_denominator_floor
            ));
        }
        if self.enemy_projectile_lifetime_floor <= 0.0
            || self.enemy_projectile_lifetime < self.enemy_projectile_lifetime_floor
        {
            return invalid("enemy_projectile_lifetime must be at or above a positive floor");
        }
        if self.player_projectile_duration <= 0.0 {
            return invalid("player_projectile_duration must be positive");
        }
        if self.blink_interval <= 0.0 || self.wave_announcement_secs < 0.0 {
            return invalid("sequence timings must be positive");
        }
        if self.play_width <= 0.0 || self.play_height <= 0.0 {
            return invalid("play area must have a positive size");
        }
        Ok(())
    }
}
