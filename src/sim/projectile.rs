//! Projectile lifecycle
//!
//! At most one player projectile is in flight at a time; enemy projectiles are
//! unbounded. Each projectile travels vertically toward the opposing edge over
//! a fixed duration and is removed when it gets there, when its timeout fires,
//! or when a collision consumes it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileOwner {
    Player,
    Enemy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectileId(pub u32);

/// A projectile in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: ProjectileId,
    pub owner: ProjectileOwner,
    pub pos: Vec2,
    /// Vertical only; x is always zero
    pub vel: Vec2,
    /// y of the edge this projectile is heading for
    pub target_y: f32,
    /// Seconds until the timeout removes it
    pub lifetime: f32,
}

impl Projectile {
    fn launch(
        id: ProjectileId,
        owner: ProjectileOwner,
        origin: Vec2,
        target_y: f32,
        duration: f32,
    ) -> Self {
        let duration = duration.max(f32::EPSILON);
        Self {
            id,
            owner,
            pos: origin,
            vel: Vec2::new(0.0, (target_y - origin.y) / duration),
            target_y,
            lifetime: duration,
        }
    }

    /// True once the projectile has reached (or passed) its target edge
    pub fn arrived(&self) -> bool {
        if self.vel.y >= 0.0 {
            self.pos.y >= self.target_y
        } else {
            self.pos.y <= self.target_y
        }
    }
}

/// Owner of every live projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectiles {
    player: Option<Projectile>,
    enemy: Vec<Projectile>,
    next_id: u32,
}

impl Default for Projectiles {
    fn default() -> Self {
        Self {
            player: None,
            enemy: Vec::new(),
            next_id: 1,
        }
    }
}

impl Projectiles {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_projectile_id(&mut self) -> ProjectileId {
        let id = ProjectileId(self.next_id);
        self.next_id += 1;
        id
    }

    /// The player projectile in flight, if any
    pub fn player(&self) -> Option<&Projectile> {
        self.player.as_ref()
    }

    pub fn enemy(&self) -> &[Projectile] {
        &self.enemy
    }

    pub fn player_in_flight(&self) -> bool {
        self.player.is_some()
    }

    pub fn get(&self, id: ProjectileId) -> Option<&Projectile> {
        self.player
            .iter()
            .chain(self.enemy.iter())
            .find(|p| p.id == id)
    }

    /// Fire from the player toward the top edge.
    ///
    /// Returns `None` without creating anything while a player projectile is
    /// already in flight.
    pub fn fire_player(&mut self, origin: Vec2, top_y: f32, duration: f32) -> Option<ProjectileId> {
        if self.player.is_some() {
            return None;
        }
        let id = self.next_projectile_id();
        self.player = Some(Projectile::launch(
            id,
            ProjectileOwner::Player,
            origin,
            top_y,
            duration,
        ));
        Some(id)
    }

    /// Fire from an enemy toward the bottom edge
    pub fn fire_enemy(&mut self, origin: Vec2, bottom_y: f32, duration: f32) -> ProjectileId {
        let id = self.next_projectile_id();
        self.enemy.push(Projectile::launch(
            id,
            ProjectileOwner::Enemy,
            origin,
            bottom_y,
            duration,
        ));
        id
    }

    /// Move everything by `dt` and drop projectiles that reached their edge.
    ///
    /// Returns the removed projectiles.
    pub fn integrate(&mut self, dt: f32) -> Vec<Projectile> {
        let mut removed = Vec::new();

        if let Some(p) = self.player.as_mut() {
            p.pos += p.vel * dt;
            p.lifetime -= dt;
            if p.arrived() {
                removed.extend(self.player.take());
            }
        }

        for p in self.enemy.iter_mut() {
            p.pos += p.vel * dt;
            p.lifetime -= dt;
        }
        let (arrived, flying): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.enemy).into_iter().partition(Projectile::arrived);
        self.enemy = flying;
        removed.extend(arrived);

        removed
    }

    /// Remove a projectile by id. Unknown ids are a no-op.
    pub fn remove(&mut self, id: ProjectileId) -> Option<Projectile> {
        if self.player.as_ref().is_some_and(|p| p.id == id) {
            return self.player.take();
        }
        let index = self.enemy.iter().position(|p| p.id == id)?;
        Some(self.enemy.remove(index))
    }

    /// Fastest rate (px/s) at which any two projectiles can approach each other
    pub fn closing_speed(&self) -> f32 {
        let player = self.player.as_ref().map_or(0.0, |p| p.vel.y.abs());
        let enemy = self
            .enemy
            .iter()
            .map(|p| p.vel.y.abs())
            .fold(0.0, f32::max);
        player + enemy
    }

    /// Remove every enemy projectile, returning how many were live
    pub fn clear_enemy(&mut self) -> usize {
        let count = self.enemy.len();
        self.enemy.clear();
        count
    }

    pub fn clear(&mut self) {
        self.player = None;
        self.enemy.clear();
    }
}
