//! Tutorial gate
//!
//! Two steps stand between a new player and live play: tilt past a threshold,
//! then fire once. The gate only tracks progress; the engine decides what the
//! steps unlock.

use serde::{Deserialize, Serialize};

/// Tutorial progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TutorialStep {
    #[default]
    TiltToMove,
    TapToShoot,
    Complete,
}

/// Small state machine over [`TutorialStep`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TutorialGate {
    step: TutorialStep,
    tilt_threshold: f32,
}

impl TutorialGate {
    pub fn new(tilt_threshold: f32) -> Self {
        Self {
            step: TutorialStep::TiltToMove,
            tilt_threshold,
        }
    }

    /// A gate that has already been passed (tutorial seen on a previous run)
    pub fn completed() -> Self {
        Self {
            step: TutorialStep::Complete,
            tilt_threshold: 0.0,
        }
    }

    pub fn step(&self) -> TutorialStep {
        self.step
    }

    pub fn is_complete(&self) -> bool {
        self.step == TutorialStep::Complete
    }

    /// Feed one frame of tilt. Returns the new step if it advanced.
    pub fn observe_tilt(&mut self, tilt: f32) -> Option<TutorialStep> {
        if self.step == TutorialStep::TiltToMove && tilt.abs() > self.tilt_threshold {
            self.step = TutorialStep::TapToShoot;
            return Some(self.step);
        }
        None
    }

    /// Whether a fire request should be honoured in the current step
    pub fn allows_fire(&self) -> bool {
        self.step != TutorialStep::TiltToMove
    }

    /// The tutorial shot has finished its flight. Returns the new step if it advanced.
    pub fn observe_shot(&mut self) -> Option<TutorialStep> {
        if self.step == TutorialStep::TapToShoot {
            self.step = TutorialStep::Complete;
            return Some(self.step);
        }
        None
    }
}
