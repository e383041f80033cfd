//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay deterministic for a
//! given RNG provider and frame sequence:
//! - Time only advances through `Engine::update`
//! - Randomness only through the injected `RngProvider`
//! - Stable iteration order (row-major enemy ids)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod engine;
pub mod formation;
pub mod projectile;
pub mod rng;
pub mod scheduler;
pub mod state;
pub mod tutorial;
pub mod wave;

pub use collision::{Aabb, Contact, EntityKind, EntityRef, Interaction, Resolution, classify};
pub use engine::{Engine, EngineContext, FrameInput, Snapshot};
pub use formation::{Direction, Enemy, EnemyId, EnemyKind, Formation, Row, Sweep};
pub use projectile::{Projectile, ProjectileId, ProjectileOwner, Projectiles};
pub use rng::{PcgRng, RngProvider};
pub use scheduler::{Scheduler, TimerId};
pub use state::{GameEvent, GamePhase, Player};
pub use tutorial::{TutorialGate, TutorialStep};
pub use wave::Wave;
