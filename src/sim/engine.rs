//! The game state machine
//!
//! [`Engine`] owns every piece of mutable simulation state and drives it from
//! two sources on one logical thread: the host's per-frame [`Engine::update`]
//! and the movement timer that fires [`Engine::movement_tick`]. Collaborators
//! are injected through [`EngineContext`]; everything the engine wants to tell
//! the outside world goes through the event queue.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{detect_contacts, resolve};
use super::formation::{Formation, Sweep};
use super::projectile::{ProjectileId, ProjectileOwner, Projectiles};
use super::rng::{PcgRng, RngProvider};
use super::scheduler::{Scheduler, TimerId};
use super::state::{GameEvent, GamePhase, Player};
use super::tutorial::{TutorialGate, TutorialStep};
use super::wave::Wave;
use crate::consts::{
    ENEMY_HALF_SIZE, MAX_SUBSTEP_TRAVEL, MAX_SUBSTEPS, PLAYER_HALF_HEIGHT, PROJECTILE_HALF_HEIGHT,
};
use crate::error::TuningError;
use crate::persistence::{MemoryStore, TutorialStore};
use crate::tuning::Tuning;

/// Collaborators and configuration handed to the engine at construction
pub struct EngineContext {
    pub tuning: Tuning,
    /// Falls back to a PCG32 seeded from the thread RNG
    pub rng: Option<Box<dyn RngProvider>>,
    /// Falls back to an in-memory store
    pub store: Option<Box<dyn TutorialStore>>,
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new(Tuning::default())
    }
}

impl EngineContext {
    pub fn new(tuning: Tuning) -> Self {
        Self {
            tuning,
            rng: None,
            store: None,
        }
    }

    pub fn with_rng(mut self, rng: impl RngProvider + 'static) -> Self {
        self.rng = Some(Box::new(rng));
        self
    }

    pub fn with_store(mut self, store: impl TutorialStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }
}

/// Input sampled for a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    /// Device acceleration along the steering axis
    pub tilt: f32,
    /// Fire request (tap)
    pub fire: bool,
}

/// Delayed effects on the simulation clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum Timed {
    MovementTick,
    ExpireProjectile(ProjectileId),
    Blink { step: u32 },
    /// Announcement is over; bring in the next formation
    SpawnWave,
}

/// Serializable view of the simulation for hosts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub score: u64,
    pub wave: Wave,
    pub formation: Formation,
    pub projectiles: Projectiles,
    pub player: Player,
}

/// The formation-shooter simulation
pub struct Engine {
    tuning: Tuning,
    rng: Box<dyn RngProvider>,
    store: Box<dyn TutorialStore>,

    phase: GamePhase,
    tutorial: TutorialGate,
    formation: Formation,
    projectiles: Projectiles,
    player: Player,
    wave: Wave,
    score: u64,

    scheduler: Scheduler<Timed>,
    movement_timer: Option<TimerId>,
    /// Round cleared, waiting for the announcement to finish
    round_pending: bool,
    paused: bool,
    movement_ticks: u64,
    events: Vec<GameEvent>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("phase", &self.phase)
            .field("wave", &self.wave)
            .field("score", &self.score)
            .field("live_enemies", &self.formation.live_count())
            .field("paused", &self.paused)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Build an engine. Reads the tutorial flag once; a player who has seen
    /// the tutorial starts straight in [`GamePhase::Playing`].
    ///
    /// A tuning that fails [`Tuning::validate`] is replaced by the reference
    /// configuration; use [`Engine::try_new`] to surface the error instead.
    pub fn new(mut ctx: EngineContext) -> Self {
        if let Err(e) = ctx.tuning.validate() {
            log::warn!("Rejected tuning ({}), using the reference configuration", e);
            ctx.tuning = Tuning::default();
        }
        Self::build(ctx)
    }

    /// Build an engine, failing if the tuning does not validate
    pub fn try_new(ctx: EngineContext) -> Result<Self, TuningError> {
        ctx.tuning.validate()?;
        Ok(Self::build(ctx))
    }

    fn build(ctx: EngineContext) -> Self {
        let EngineContext { tuning, rng, store } = ctx;
        let rng = rng.unwrap_or_else(|| {
            log::warn!("No RNG provider supplied, using PCG32");
            Box::new(PcgRng::from_entropy())
        });
        let store = store.unwrap_or_else(|| Box::new(MemoryStore::default()));
        let tutorial_seen = store.tutorial_completed();

        let mut engine = Self {
            player: Player::new(Self::player_start(&tuning)),
            wave: Wave::initial(&tuning),
            tutorial: TutorialGate::new(tuning.tilt_threshold),
            tuning,
            rng,
            store,
            phase: GamePhase::TutorialTiltStep,
            formation: Formation::empty(),
            projectiles: Projectiles::new(),
            score: 0,
            scheduler: Scheduler::new(),
            movement_timer: None,
            round_pending: false,
            paused: false,
            movement_ticks: 0,
            events: Vec::new(),
        };

        if tutorial_seen {
            log::info!("Tutorial already completed, starting play");
            engine.tutorial = TutorialGate::completed();
            engine.phase = GamePhase::Playing;
            engine.start_wave();
        }

        engine
    }

    fn player_start(tuning: &Tuning) -> Vec2 {
        Vec2::new(tuning.play_width / 2.0, tuning.player_y)
    }

    // === Read accessors ===

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn tutorial_step(&self) -> TutorialStep {
        self.tutorial.step()
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn wave(&self) -> &Wave {
        &self.wave
    }

    pub fn formation(&self) -> &Formation {
        &self.formation
    }

    pub fn projectiles(&self) -> &Projectiles {
        &self.projectiles
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Seconds on the simulation clock
    pub fn clock(&self) -> f64 {
        self.scheduler.now()
    }

    /// Movement ticks run since construction
    pub fn movement_ticks(&self) -> u64 {
        self.movement_ticks
    }

    /// Current movement tick period (seconds)
    pub fn tick_period(&self) -> f32 {
        self.wave
            .tick_period(self.tuning.columns, self.tuning.row_count())
    }

    /// Whether the movement timer is live
    pub fn movement_active(&self) -> bool {
        self.movement_timer
            .is_some_and(|id| self.scheduler.is_scheduled(id))
    }

    /// A round has been cleared and the next formation has not arrived yet
    pub fn round_pending(&self) -> bool {
        self.round_pending
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            score: self.score,
            wave: self.wave.clone(),
            formation: self.formation.clone(),
            projectiles: self.projectiles.clone(),
            player: self.player.clone(),
        }
    }

    /// Take every event raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // === Host controls ===

    /// Freeze the simulation (frames and timers) while the host is backgrounded
    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            log::info!("{}", if paused { "Paused" } else { "Resumed" });
        }
        self.paused = paused;
    }

    /// Per-frame update: player forces and tutorial checks, projectile
    /// motion with a collision pass per substep, due timers, then a final
    /// collision pass for whatever the timers moved.
    ///
    /// Frozen while paused and after game over; only [`Engine::restart`]
    /// leaves [`GamePhase::GameOver`].
    pub fn update(&mut self, dt: f32, input: &FrameInput) {
        if self.paused || dt <= 0.0 || self.phase == GamePhase::GameOver {
            return;
        }

        if !self.player.dying {
            self.player.apply_tilt(
                input.tilt,
                self.tuning.tilt_force,
                self.tuning.player_damping,
                dt,
            );
            if let Some(step) = self.tutorial.observe_tilt(input.tilt) {
                self.on_tutorial_step(step);
            }
            if input.fire {
                self.fire();
            }
        }

        // Projectiles move in substeps short enough that no pair can pass
        // through each other between two overlap checks
        let substeps = self.collision_substeps(dt);
        let step_dt = dt / substeps as f32;
        for _ in 0..substeps {
            for projectile in self.projectiles.integrate(step_dt) {
                if projectile.owner == ProjectileOwner::Player {
                    self.player_projectile_finished();
                }
            }
            self.resolve_collisions();
        }

        self.scheduler.advance(dt);
        while let Some((_, action)) = self.scheduler.pop_due() {
            self.run_timed(action);
        }

        self.resolve_collisions();
    }

    fn collision_substeps(&self, dt: f32) -> u32 {
        let travel = self.projectiles.closing_speed() * dt;
        ((travel / MAX_SUBSTEP_TRAVEL).ceil() as u32).clamp(1, MAX_SUBSTEPS)
    }

    /// Fire the player's projectile. A request while one is in flight (or
    /// before the tutorial allows shooting) is a silent no-op.
    pub fn fire(&mut self) -> bool {
        if self.paused
            || self.phase == GamePhase::GameOver
            || self.player.dying
            || !self.tutorial.allows_fire()
        {
            return false;
        }

        let origin = self.player.pos + Vec2::new(0.0, PLAYER_HALF_HEIGHT);
        let duration = self.tuning.player_projectile_duration;
        let Some(id) = self
            .projectiles
            .fire_player(origin, self.tuning.play_height, duration)
        else {
            return false;
        };

        self.scheduler
            .schedule_once(duration, Timed::ExpireProjectile(id));
        self.events.push(GameEvent::PlayerFired);
        log::debug!("Player fired at x={:.1}", origin.x);
        true
    }

    /// Leave [`GamePhase::GameOver`] for a fresh run at wave 1.
    ///
    /// Returns false (and does nothing) in any other phase.
    pub fn restart(&mut self) -> bool {
        if self.phase != GamePhase::GameOver {
            return false;
        }

        self.scheduler.clear();
        self.movement_timer = None;
        self.score = 0;
        self.wave = Wave::initial(&self.tuning);
        self.projectiles.clear();
        self.player = Player::new(Self::player_start(&self.tuning));
        self.round_pending = false;
        self.phase = GamePhase::Playing;

        self.events.push(GameEvent::Restarted);
        log::info!("Restarted");
        self.start_wave();
        true
    }

    // === Movement scheduler ===

    /// One movement tick: advance the whole formation, then let the frontmost
    /// enemy roll for a shot.
    pub fn movement_tick(&mut self) {
        if self.paused || self.phase != GamePhase::Playing || self.player.dying {
            return;
        }

        let sweep = Sweep {
            step: self.wave.step_size,
            ..Sweep::from_tuning(&self.tuning)
        };
        self.formation.step(&sweep);
        self.movement_ticks += 1;

        let Some(shooter) = self.formation.frontmost() else {
            return;
        };
        let draw = self
            .rng
            .next_int(1, self.wave.fire_denominator as i32);
        if draw != self.tuning.fire_trigger as i32 {
            return;
        }

        let Some(enemy) = self.formation.live(shooter) else {
            return;
        };
        // Spawn just below the shooter so it does not absorb its own shot
        let origin = enemy.pos - Vec2::new(0.0, ENEMY_HALF_SIZE + PROJECTILE_HALF_HEIGHT + 1.0);
        let lifetime = self.wave.enemy_projectile_lifetime;
        let id = self.projectiles.fire_enemy(origin, 0.0, lifetime);
        self.scheduler
            .schedule_once(lifetime, Timed::ExpireProjectile(id));
        self.events.push(GameEvent::EnemyFired { enemy: shooter });
        log::debug!("Enemy {:?} fired (draw {} of {})", shooter, draw, self.wave.fire_denominator);
    }

    fn schedule_movement(&mut self) {
        self.stop_movement();
        let period = self.tick_period();
        self.movement_timer = Some(
            self.scheduler
                .schedule_repeating(period, Timed::MovementTick),
        );
    }

    fn stop_movement(&mut self) {
        if let Some(id) = self.movement_timer.take() {
            self.scheduler.cancel(id);
        }
    }

    fn run_timed(&mut self, action: Timed) {
        match action {
            Timed::MovementTick => self.movement_tick(),
            Timed::ExpireProjectile(id) => {
                if let Some(projectile) = self.projectiles.remove(id) {
                    if projectile.owner == ProjectileOwner::Player {
                        self.player_projectile_finished();
                    }
                }
            }
            Timed::Blink { step } => self.blink(step),
            Timed::SpawnWave => {
                self.events.push(GameEvent::AnnouncementDismissed);
                if self.phase == GamePhase::Playing && self.round_pending {
                    self.start_wave();
                }
            }
        }
    }

    // === Tutorial ===

    fn player_projectile_finished(&mut self) {
        if let Some(step) = self.tutorial.observe_shot() {
            self.on_tutorial_step(step);
        }
    }

    fn on_tutorial_step(&mut self, step: TutorialStep) {
        self.events.push(GameEvent::TutorialAdvanced { step });
        match step {
            TutorialStep::TiltToMove => {}
            TutorialStep::TapToShoot => {
                self.phase = GamePhase::TutorialShootStep;
                log::info!("Tutorial: tilt done, tap to shoot");
            }
            TutorialStep::Complete => {
                self.store.mark_tutorial_completed();
                self.events.push(GameEvent::TutorialCompleted);
                log::info!("Tutorial complete");
                self.phase = GamePhase::Playing;
                self.start_wave();
            }
        }
    }

    // === Wave controller ===

    fn start_wave(&mut self) {
        self.formation = Formation::spawn(&self.tuning);
        self.round_pending = false;
        self.schedule_movement();
        self.events.push(GameEvent::WaveStarted {
            wave: self.wave.index,
        });
        log::info!(
            "Wave {}: step_duration={:.3} fire=1/{} tick={:.3}s",
            self.wave.index,
            self.wave.step_duration,
            self.wave.fire_denominator,
            self.tick_period()
        );
    }

    /// Check the round-complete predicate, advancing the wave if it just
    /// became true. Returns whether the round is complete.
    fn check_round_complete(&mut self) -> bool {
        if self.round_pending {
            return true;
        }
        if self.phase != GamePhase::Playing
            || self.formation.rows().is_empty()
            || !self.formation.is_cleared()
        {
            return false;
        }

        let cleared = self.wave.index;
        self.round_pending = true;
        self.stop_movement();
        self.events.push(GameEvent::RoundComplete { wave: cleared });
        log::info!("Wave {} cleared, score {}", cleared, self.score);

        self.wave.advance(&self.tuning);
        self.events.push(GameEvent::WaveAnnounced {
            wave: self.wave.index,
        });
        self.scheduler
            .schedule_once(self.tuning.wave_announcement_secs, Timed::SpawnWave);
        true
    }

    // === Collisions ===

    fn resolve_collisions(&mut self) {
        if self.player.dying {
            return;
        }

        let contacts = detect_contacts(
            &self.formation,
            &self.projectiles,
            &self.player,
            self.tuning.play_width,
        );
        if contacts.is_empty() {
            return;
        }

        let outcome = resolve(
            &contacts,
            &mut self.formation,
            &mut self.projectiles,
            &mut self.player,
            self.tuning.play_width,
        );

        if outcome.player_projectile_spent {
            self.player_projectile_finished();
        }

        for kill in &outcome.kills {
            self.score += u64::from(kill.score);
            if let Some(enemy) = self.formation.get(kill.enemy) {
                self.events.push(GameEvent::EnemyDestroyed {
                    enemy: kill.enemy,
                    row: enemy.row,
                    column: enemy.column,
                    score: kill.score,
                });
            }
            log::debug!("Enemy {:?} destroyed (+{})", kill.enemy, kill.score);
        }

        let round_complete = self.check_round_complete();
        if outcome.player_hit {
            if round_complete {
                log::info!("Player hit ignored, round already complete");
            } else {
                self.begin_game_over();
            }
        }
    }

    // === Game over ===

    fn begin_game_over(&mut self) {
        log::info!("Player hit on wave {}", self.wave.index);
        self.events.push(GameEvent::PlayerHit);
        self.player.dying = true;
        self.stop_movement();
        self.player.stop();
        self.projectiles.clear_enemy();
        self.scheduler
            .schedule_once(self.tuning.blink_interval, Timed::Blink { step: 1 });
    }

    fn blink(&mut self, step: u32) {
        if !self.player.dying {
            return;
        }
        self.player.visible = step % 2 == 0;
        self.events.push(GameEvent::PlayerBlink {
            visible: self.player.visible,
        });

        if step < self.tuning.blink_count * 2 {
            self.scheduler
                .schedule_once(self.tuning.blink_interval, Timed::Blink { step: step + 1 });
        } else {
            self.finish_game_over();
        }
    }

    fn finish_game_over(&mut self) {
        let cleared = self.formation.clear();
        self.projectiles.clear();
        self.player.visible = true;
        self.player.dying = false;
        self.phase = GamePhase::GameOver;
        self.events.push(GameEvent::GameOver {
            score: self.score,
            wave: self.wave.index,
        });
        log::info!(
            "Game over: score {} on wave {} ({} enemies left)",
            self.score,
            self.wave.index,
            cleared
        );
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::sim::formation::{Direction, EnemyId};

    const DT: f32 = 1.0 / 60.0;

    /// Always returns the same value and records every requested range
    #[derive(Clone, Default)]
    struct FixedRng {
        value: i32,
        ranges: Rc<RefCell<Vec<(i32, i32)>>>,
    }

    impl FixedRng {
        fn new(value: i32) -> Self {
            Self {
                value,
                ..Default::default()
            }
        }
    }

    impl RngProvider for FixedRng {
        fn next_int(&mut self, min_inclusive: i32, max_inclusive: i32) -> i32 {
            self.ranges.borrow_mut().push((min_inclusive, max_inclusive));
            self.value
        }
    }

    /// Store whose flag the test can observe after handing it to the engine
    #[derive(Clone, Default)]
    struct SharedStore(Rc<Cell<bool>>);

    impl TutorialStore for SharedStore {
        fn tutorial_completed(&self) -> bool {
            self.0.get()
        }

        fn mark_tutorial_completed(&mut self) {
            self.0.set(true);
        }
    }

    fn playing(rng: FixedRng) -> Engine {
        Engine::new(
            EngineContext::default()
                .with_rng(rng)
                .with_store(MemoryStore::new(true)),
        )
    }

    fn run(engine: &mut Engine, seconds: f32) {
        let frames = (seconds / DT).ceil() as u32;
        for _ in 0..frames {
            engine.update(DT, &FrameInput::default());
        }
    }

    fn kill_all_but(engine: &mut Engine, keep: EnemyId) {
        let ids: Vec<_> = engine.formation.iter_live().map(|e| e.id).collect();
        for id in ids.into_iter().filter(|&id| id != keep) {
            engine.formation.kill(id);
        }
    }

    #[test]
    fn test_fresh_player_starts_in_tutorial() {
        let mut engine = Engine::new(EngineContext::default().with_rng(FixedRng::new(2)));
        assert_eq!(engine.phase(), GamePhase::TutorialTiltStep);
        assert_eq!(engine.formation().live_count(), 0);
        assert!(!engine.movement_active());

        // Enemies are inert during the tutorial
        engine.movement_tick();
        assert_eq!(engine.movement_ticks(), 0);
        assert!(engine.projectiles().enemy().is_empty());
    }

    #[test]
    fn test_tutorial_flow() {
        let store = SharedStore::default();
        let mut engine = Engine::new(
            EngineContext::default()
                .with_rng(FixedRng::new(1))
                .with_store(store.clone()),
        );

        // Firing is ignored until the player has tilted
        assert!(!engine.fire());

        engine.update(DT, &FrameInput { tilt: 0.1, fire: false });
        assert_eq!(engine.phase(), GamePhase::TutorialTiltStep);
        engine.update(DT, &FrameInput { tilt: -0.6, fire: false });
        assert_eq!(engine.phase(), GamePhase::TutorialShootStep);

        engine.update(DT, &FrameInput { tilt: 0.0, fire: true });
        assert!(engine.projectiles().player_in_flight());
        assert_eq!(engine.phase(), GamePhase::TutorialShootStep);

        run(&mut engine, 1.1);
        assert_eq!(engine.phase(), GamePhase::Playing);
        assert_eq!(engine.formation().live_count(), 28);
        assert!(engine.movement_active());
        assert!(store.0.get());

        let events = engine.drain_events();
        assert!(events.contains(&GameEvent::TutorialCompleted));
        assert!(events.contains(&GameEvent::WaveStarted { wave: 1 }));
    }

    #[test]
    fn test_seen_tutorial_starts_playing() {
        let mut engine = playing(FixedRng::new(1));
        assert_eq!(engine.phase(), GamePhase::Playing);
        assert_eq!(engine.formation().live_count(), 28);
        assert!(engine.movement_active());
        assert_eq!(engine.drain_events(), vec![GameEvent::WaveStarted { wave: 1 }]);
    }

    #[test]
    fn test_sweep_reverses_once_across_width() {
        let mut engine = playing(FixedRng::new(1));
        let start: Vec<f32> = engine.formation().enemies().iter().map(|e| e.pos.y).collect();

        for _ in 0..35 {
            engine.movement_tick();
        }

        for (enemy, y0) in engine.formation().enemies().iter().zip(start) {
            assert_eq!(enemy.pos.y, y0 - 40.0, "enemy {:?}", enemy.id);
            assert_eq!(enemy.direction, Direction::Left, "enemy {:?}", enemy.id);
        }
    }

    #[test]
    fn test_timer_drives_movement() {
        let mut engine = playing(FixedRng::new(1));
        assert!((engine.tick_period() - 0.28).abs() < 1e-6);
        run(&mut engine, 1.0);
        assert_eq!(engine.movement_ticks(), 3);
    }

    #[test]
    fn test_frontmost_fires_on_trigger_value() {
        let rng = FixedRng::new(2);
        let ranges = rng.ranges.clone();
        let mut engine = playing(rng);
        engine.drain_events();

        engine.movement_tick();
        assert_eq!(engine.projectiles().enemy().len(), 1);
        assert_eq!(ranges.borrow().as_slice(), &[(1, 60)]);
        assert_eq!(
            engine.drain_events(),
            vec![GameEvent::EnemyFired { enemy: EnemyId(21) }]
        );

        let shot = &engine.projectiles().enemy()[0];
        let shooter = engine.formation().get(EnemyId(21)).unwrap();
        assert_eq!(shot.pos.x, shooter.pos.x);
        assert!(shot.pos.y < shooter.pos.y);
    }

    #[test]
    fn test_other_draws_do_not_fire() {
        for value in [1, 3, 60] {
            let mut engine = playing(FixedRng::new(value));
            for _ in 0..10 {
                engine.movement_tick();
            }
            assert!(engine.projectiles().enemy().is_empty());
        }
    }

    #[test]
    fn test_single_player_projectile() {
        let mut engine = playing(FixedRng::new(1));
        assert!(engine.fire());
        assert!(!engine.fire());
        engine.update(DT, &FrameInput { tilt: 0.0, fire: true });
        assert!(engine.projectiles().player_in_flight());
        let fired = engine
            .drain_events()
            .into_iter()
            .filter(|e| *e == GameEvent::PlayerFired)
            .count();
        assert_eq!(fired, 1);
    }

    #[test]
    fn test_kill_adds_row_score() {
        let mut engine = playing(FixedRng::new(1));
        let target = engine.formation.get(EnemyId(2)).unwrap().pos;
        engine.projectiles.fire_player(target, engine.tuning.play_height, 1.0);

        engine.update(DT, &FrameInput::default());
        assert_eq!(engine.score(), 30);
        assert!(engine.formation().live(EnemyId(2)).is_none());
        assert!(!engine.projectiles().player_in_flight());
        assert!(engine.drain_events().contains(&GameEvent::EnemyDestroyed {
            enemy: EnemyId(2),
            row: 0,
            column: 2,
            score: 30,
        }));
    }

    #[test]
    fn test_round_complete_advances_wave() {
        let mut engine = playing(FixedRng::new(1));
        kill_all_but(&mut engine, EnemyId(24));
        let target = engine.formation.get(EnemyId(24)).unwrap().pos;
        engine.projectiles.fire_player(target, engine.tuning.play_height, 1.0);
        engine.drain_events();

        engine.update(DT, &FrameInput::default());
        assert!(engine.round_pending());
        assert!(!engine.movement_active());
        assert_eq!(engine.wave().index, 2);
        let events = engine.drain_events();
        assert!(events.contains(&GameEvent::RoundComplete { wave: 1 }));
        assert!(events.contains(&GameEvent::WaveAnnounced { wave: 2 }));

        let announcement = engine.tuning.wave_announcement_secs;
        run(&mut engine, announcement + 0.1);
        assert!(!engine.round_pending());
        assert_eq!(engine.formation().live_count(), 28);
        assert!(engine.movement_active());
        assert!((engine.tick_period() - 0.008 * 28.0).abs() < 1e-5);
        let events = engine.drain_events();
        assert!(events.contains(&GameEvent::AnnouncementDismissed));
        assert!(events.contains(&GameEvent::WaveStarted { wave: 2 }));
    }

    #[test]
    fn test_thirty_waves_hit_floors() {
        let mut engine = playing(FixedRng::new(1));
        let mut last = engine.wave().clone();
        let announcement = engine.tuning.wave_announcement_secs;

        for _ in 0..30 {
            engine.formation.clear();
            assert!(engine.check_round_complete());
            run(&mut engine, announcement + 0.05);
            assert_eq!(engine.formation().live_count(), 28);

            let wave = engine.wave().clone();
            assert!(wave.step_duration <= last.step_duration);
            assert!(wave.fire_denominator <= last.fire_denominator);
            assert!(wave.enemy_projectile_lifetime <= last.enemy_projectile_lifetime);
            last = wave;
        }

        assert_eq!(engine.wave().index, 31);
        assert_eq!(engine.wave().fire_denominator, 4);
        assert_eq!(engine.wave().step_duration, 0.004);
        assert_eq!(engine.wave().enemy_projectile_lifetime, 0.4);
    }

    #[test]
    fn test_player_hit_runs_game_over_sequence() {
        let mut engine = playing(FixedRng::new(1));
        let target = engine.formation.get(EnemyId(0)).unwrap().pos;
        engine.projectiles.fire_player(target, engine.tuning.play_height, 1.0);
        engine.update(DT, &FrameInput::default());
        assert_eq!(engine.score(), 30);

        let player_pos = engine.player.pos;
        engine.projectiles.fire_enemy(player_pos, 0.0, 2.0);
        engine.projectiles.fire_enemy(Vec2::new(300.0, 300.0), 0.0, 2.0);
        engine.player.vel.x = 50.0;
        engine.drain_events();

        engine.update(DT, &FrameInput::default());
        assert!(engine.player().dying);
        assert!(!engine.movement_active());
        assert!(engine.projectiles().enemy().is_empty());
        assert_eq!(engine.player().vel, Vec2::ZERO);
        assert_eq!(engine.phase(), GamePhase::Playing);
        assert!(engine.drain_events().contains(&GameEvent::PlayerHit));

        // No stale movement ticks while the avatar blinks
        let ticks = engine.movement_ticks();
        let blink_secs = engine.tuning.blink_interval * (engine.tuning.blink_count * 2) as f32;
        run(&mut engine, blink_secs + 0.2);
        assert_eq!(engine.movement_ticks(), ticks);

        assert_eq!(engine.phase(), GamePhase::GameOver);
        assert_eq!(engine.formation().live_count(), 0);
        let events = engine.drain_events();
        let blinks = events
            .iter()
            .filter(|e| matches!(e, GameEvent::PlayerBlink { .. }))
            .count();
        assert_eq!(blinks as u32, engine.tuning.blink_count * 2);
        assert!(events.contains(&GameEvent::GameOver { score: 30, wave: 1 }));

        // Input is ignored after game over
        assert!(!engine.fire());
    }

    #[test]
    fn test_round_complete_beats_simultaneous_hit() {
        let mut engine = playing(FixedRng::new(1));
        kill_all_but(&mut engine, EnemyId(10));
        let target = engine.formation.get(EnemyId(10)).unwrap().pos;
        engine.projectiles.fire_player(target, engine.tuning.play_height, 1.0);
        let player_pos = engine.player.pos;
        engine.projectiles.fire_enemy(player_pos, 0.0, 2.0);
        engine.drain_events();

        engine.update(DT, &FrameInput::default());
        let events = engine.drain_events();
        assert!(events.contains(&GameEvent::RoundComplete { wave: 1 }));
        assert!(!events.contains(&GameEvent::PlayerHit));
        assert!(!engine.player().dying);
        assert_eq!(engine.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_restart_resets_run() {
        let mut engine = playing(FixedRng::new(1));
        assert!(!engine.restart());

        engine.formation.clear();
        engine.check_round_complete();
        run(&mut engine, 2.0);
        engine.score = 120;
        assert_eq!(engine.wave().index, 2);

        let player_pos = engine.player.pos;
        engine.projectiles.fire_enemy(player_pos, 0.0, 2.0);
        run(&mut engine, 2.0);
        assert_eq!(engine.phase(), GamePhase::GameOver);
        engine.drain_events();

        assert!(engine.restart());
        assert_eq!(engine.phase(), GamePhase::Playing);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.wave().index, 1);
        assert_eq!(engine.wave().step_duration, 0.01);
        assert_eq!(engine.wave().fire_denominator, 60);
        assert_eq!(engine.formation().live_count(), 28);
        assert!(engine.movement_active());
        assert_eq!(
            engine.drain_events(),
            vec![GameEvent::Restarted, GameEvent::WaveStarted { wave: 1 }]
        );
    }

    #[test]
    fn test_pause_freezes_everything() {
        let mut engine = playing(FixedRng::new(1));
        engine.set_paused(true);
        run(&mut engine, 5.0);
        assert_eq!(engine.movement_ticks(), 0);
        assert_eq!(engine.clock(), 0.0);

        engine.set_paused(false);
        run(&mut engine, 0.5);
        assert!(engine.movement_ticks() > 0);
    }

    #[test]
    fn test_projectile_timeout() {
        let mut engine = playing(FixedRng::new(2));
        engine.movement_tick();
        let id = engine.projectiles().enemy()[0].id;
        let lifetime = engine.wave().enemy_projectile_lifetime;

        run(&mut engine, lifetime + 0.1);
        assert!(engine.projectiles().get(id).is_none());
        assert!(!engine.player().dying);
    }

    #[test]
    fn test_default_context_falls_back() {
        let engine = Engine::new(EngineContext::default());
        assert_eq!(engine.phase(), GamePhase::TutorialTiltStep);
        let json = serde_json::to_string(&engine.snapshot()).unwrap();
        assert!(json.contains("TutorialTiltStep"));
    }

    #[test]
    fn test_crossing_shots_cancel_at_floor_lifetime() {
        // Half-pixel offsets sweep every frame phase of the crossing
        for dt in [1.0 / 60.0, 1.0 / 30.0, 1.0 / 20.0] {
            for k in 0..60 {
                let enemy_y = 400.0 + 0.5 * k as f32;
                let mut engine = playing(FixedRng::new(1));
                let top = engine.tuning.play_height;
                engine.projectiles.fire_player(Vec2::new(10.0, 75.0), top, 1.0);
                engine.projectiles.fire_enemy(Vec2::new(10.0, enemy_y), 0.0, 0.4);

                for _ in 0..(0.5 / dt) as u32 {
                    engine.update(dt, &FrameInput::default());
                }
                assert!(
                    !engine.projectiles().player_in_flight(),
                    "shots starting at y={enemy_y} passed through each other at dt={dt}"
                );
            }
        }
    }

    #[test]
    fn test_substeps_follow_closing_speed() {
        let mut engine = playing(FixedRng::new(1));
        assert_eq!(engine.collision_substeps(DT), 1);

        engine.projectiles.fire_player(Vec2::new(10.0, 75.0), 667.0, 1.0);
        engine.projectiles.fire_enemy(Vec2::new(10.0, 400.0), 0.0, 0.4);
        let substeps = engine.collision_substeps(DT);
        let closing = engine.projectiles.closing_speed() * DT / substeps as f32;
        assert!(substeps > 1);
        assert!(closing <= MAX_SUBSTEP_TRAVEL);
        assert_eq!(engine.collision_substeps(10.0), MAX_SUBSTEPS);
    }

    #[test]
    fn test_invalid_tuning_is_rejected_or_replaced() {
        let tuning = Tuning {
            columns: 0,
            ..Tuning::default()
        };
        let err = Engine::try_new(EngineContext::new(tuning.clone())).unwrap_err();
        assert!(matches!(err, TuningError::Invalid(_)));

        let engine = Engine::new(
            EngineContext::new(tuning)
                .with_rng(FixedRng::new(1))
                .with_store(MemoryStore::new(true)),
        );
        assert_eq!(engine.tuning().columns, 7);
        assert_eq!(engine.formation().live_count(), 28);
        assert!(engine.tick_period() > 0.0);
    }

    #[test]
    fn test_movement_tick_ignored_while_paused() {
        let mut engine = playing(FixedRng::new(2));
        let before: Vec<Vec2> = engine.formation().enemies().iter().map(|e| e.pos).collect();

        engine.set_paused(true);
        engine.movement_tick();
        assert_eq!(engine.movement_ticks(), 0);
        assert!(engine.projectiles().enemy().is_empty());
        let after: Vec<Vec2> = engine.formation().enemies().iter().map(|e| e.pos).collect();
        assert_eq!(before, after);

        engine.set_paused(false);
        engine.movement_tick();
        assert_eq!(engine.movement_ticks(), 1);
    }
}
