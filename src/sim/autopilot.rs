//! Scripted player for the headless demo and long-running tests
//!
//! Steers under the frontmost enemy and fires whenever the single player
//! projectile slot is free. It only reads engine state, so a run stays
//! deterministic for a given RNG seed.

use super::engine::{Engine, FrameInput};
use super::state::GamePhase;
use crate::consts::ENEMY_HALF_SIZE;

/// Distance (px) at which the steering saturates
const STEER_RANGE: f32 = 60.0;
/// Velocity damping term so the ship settles instead of oscillating
const VELOCITY_GAIN: f32 = 1.0 / 300.0;

/// Produce the input for the next frame
pub fn drive(engine: &Engine) -> FrameInput {
    match engine.phase() {
        GamePhase::TutorialTiltStep => FrameInput {
            tilt: 1.0,
            fire: false,
        },
        GamePhase::TutorialShootStep => FrameInput {
            tilt: 0.0,
            fire: true,
        },
        GamePhase::Playing => hunt(engine),
        GamePhase::GameOver => FrameInput::default(),
    }
}

fn hunt(engine: &Engine) -> FrameInput {
    let player = engine.player();
    let formation = engine.formation();
    let Some(target) = formation
        .frontmost()
        .and_then(|id| formation.live(id))
    else {
        return FrameInput::default();
    };

    let dx = target.pos.x - player.pos.x;
    let tilt = (dx / STEER_RANGE - player.vel.x * VELOCITY_GAIN).clamp(-1.0, 1.0);
    let fire = dx.abs() < ENEMY_HALF_SIZE && !engine.projectiles().player_in_flight();

    FrameInput { tilt, fire }
}
