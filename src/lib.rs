//! Formation Shooter - a sweeping-formation arcade combat simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (formation, projectiles, collisions, waves, tutorial)
//! - `tuning`: Data-driven game balance
//! - `persistence`: The "tutorial completed" flag
//! - `error`: Errors for the fallible edges (config and storage)

pub mod error;
pub mod persistence;
pub mod sim;
pub mod tuning;

pub use error::{StoreError, TuningError};
pub use persistence::{JsonFileStore, MemoryStore, TutorialStore};
pub use sim::{Engine, EngineContext, FrameInput, GameEvent, GamePhase};
pub use tuning::Tuning;

/// Reference configuration constants
pub mod consts {
    /// Play area (points, origin bottom-left, y grows toward the enemies)
    pub const PLAY_WIDTH: f32 = 375.0;
    pub const PLAY_HEIGHT: f32 = 667.0;

    /// Horizontal sweep bounds for enemy centers
    pub const SWEEP_X_START: f32 = 37.5;
    pub const SWEEP_X_END: f32 = 355.0;

    /// Formation geometry
    pub const FORMATION_COLUMNS: u32 = 7;
    pub const COLUMN_SPACING: f32 = 40.0;
    pub const ROW_SPACING: f32 = 40.0;
    /// y of the top row's centers on spawn
    pub const FORMATION_TOP: f32 = 580.0;

    /// Sweep movement per tick
    pub const STEP_SIZE: f32 = 10.0;
    pub const DESCENT_STEP: f32 = 40.0;

    /// Seconds per enemy step; the tick period is this times columns times rows
    pub const STEP_DURATION: f32 = 0.01;
    pub const STEP_DURATION_DECREMENT: f32 = 0.002;
    pub const STEP_DURATION_FLOOR: f32 = 0.004;

    /// Enemy fire draws from [1, denominator] and fires on the trigger value
    pub const FIRE_DENOMINATOR: u32 = 60;
    pub const FIRE_DENOMINATOR_DECREMENT: u32 = 2;
    pub const FIRE_DENOMINATOR_FLOOR: u32 = 4;
    pub const FIRE_TRIGGER: u32 = 2;

    /// Enemy projectile travel time to the bottom edge (seconds)
    pub const ENEMY_PROJECTILE_LIFETIME: f32 = 2.0;
    pub const ENEMY_PROJECTILE_LIFETIME_DECREMENT: f32 = 0.2;
    pub const ENEMY_PROJECTILE_LIFETIME_FLOOR: f32 = 0.4;

    /// Player projectile travel time to the top edge (seconds)
    pub const PLAYER_PROJECTILE_DURATION: f32 = 1.0;

    /// Entity half-extents for overlap tests
    pub const ENEMY_HALF_SIZE: f32 = 15.0;
    pub const PLAYER_HALF_WIDTH: f32 = 20.0;
    pub const PLAYER_HALF_HEIGHT: f32 = 15.0;
    pub const PROJECTILE_HALF_WIDTH: f32 = 2.0;
    pub const PROJECTILE_HALF_HEIGHT: f32 = 6.0;

    /// Player ship baseline
    pub const PLAYER_Y: f32 = 60.0;
    /// Tilt acceleration to force (points/s² per unit of tilt)
    pub const TILT_FORCE: f32 = 2400.0;
    /// Velocity damping per second (fraction retained)
    pub const PLAYER_DAMPING: f32 = 0.02;
    /// Absolute tilt needed to clear the first tutorial step
    pub const TILT_THRESHOLD: f32 = 0.3;

    /// Game-over blink sequence
    pub const BLINK_COUNT: u32 = 4;
    pub const BLINK_INTERVAL: f32 = 0.15;

    /// How long the "Wave N" announcement stays up before the formation spawns
    pub const WAVE_ANNOUNCEMENT_SECS: f32 = 1.5;

    /// Largest closing distance between two projectiles in one collision
    /// substep; stays under the 24 px window in which two shots overlap
    pub const MAX_SUBSTEP_TRAVEL: f32 = 2.0 * PROJECTILE_HALF_HEIGHT;
    /// Maximum collision substeps per frame to bound work on long frames
    pub const MAX_SUBSTEPS: u32 = 32;
}
