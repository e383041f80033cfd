//! Game phases, outgoing events and the player ship

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::formation::EnemyId;
use super::tutorial::TutorialStep;
use crate::consts::*;

/// Top-level state of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the player to tilt the device
    TutorialTiltStep,
    /// Waiting for the player to fire once
    TutorialShootStep,
    /// Live play
    Playing,
    /// Run ended; only a restart leaves this phase
    GameOver,
}

impl GamePhase {
    pub fn in_tutorial(self) -> bool {
        matches!(self, GamePhase::TutorialTiltStep | GamePhase::TutorialShootStep)
    }
}

/// Things collaborators (UI, haptics, session reporting) observe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    TutorialAdvanced { step: TutorialStep },
    TutorialCompleted,
    /// "Wave N" banner goes up
    WaveAnnounced { wave: u32 },
    /// Banner comes down
    AnnouncementDismissed,
    /// Fresh formation is on the field
    WaveStarted { wave: u32 },
    RoundComplete { wave: u32 },
    EnemyDestroyed { enemy: EnemyId, row: u32, column: u32, score: u32 },
    PlayerFired,
    EnemyFired { enemy: EnemyId },
    PlayerHit,
    /// Avatar visibility toggled during the game-over sequence
    PlayerBlink { visible: bool },
    GameOver { score: u64, wave: u32 },
    Restarted,
}

/// The player ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Rendered this frame (toggles while blinking)
    pub visible: bool,
    /// Hit and running the game-over sequence; ignores input
    pub dying: bool,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            visible: true,
            dying: false,
        }
    }

    pub fn hitbox(&self) -> Aabb {
        Aabb::new(self.pos, Vec2::new(PLAYER_HALF_WIDTH, PLAYER_HALF_HEIGHT))
    }

    /// Turn one frame of tilt into horizontal motion. Tilt is not stored.
    pub fn apply_tilt(&mut self, tilt: f32, force: f32, damping: f32, dt: f32) {
        self.vel.x += tilt * force * dt;
        self.vel.x *= damping.clamp(0.0, 1.0).powf(dt);
        self.pos += self.vel * dt;
    }

    /// Clamp inside `[0, play_width]` and kill the velocity that pushed out
    pub fn constrain(&mut self, play_width: f32) {
        let min = PLAYER_HALF_WIDTH;
        let max = (play_width - PLAYER_HALF_WIDTH).max(min);
        if self.pos.x < min || self.pos.x > max {
            self.pos.x = self.pos.x.clamp(min, max);
            self.vel.x = 0.0;
        }
    }

    pub fn stop(&mut self) {
        self.vel = Vec2::ZERO;
    }
}
