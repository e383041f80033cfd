//! Collision classification and resolution
//!
//! Every tracked entity carries one of five kinds. Overlaps are looked up in a
//! symmetric rule table keyed by kind pairs; anything not in the table has no
//! effect. Resolution runs as a separate pass after movement for the frame,
//! and contacts that reference something already consumed are skipped.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::formation::{EnemyId, Formation};
use super::projectile::{ProjectileId, Projectiles};
use super::state::Player;
use crate::consts::*;

/// Collision category of a tracked entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Enemy,
    PlayerProjectile,
    EnemyProjectile,
    Player,
    Boundary,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Enemy,
        EntityKind::PlayerProjectile,
        EntityKind::EnemyProjectile,
        EntityKind::Player,
        EntityKind::Boundary,
    ];
}

/// What happens when two kinds overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interaction {
    /// Enemy dies, player projectile is spent, score is awarded
    KillEnemy,
    /// Both projectiles are removed
    CancelProjectiles,
    /// Enemy projectile is swallowed by an enemy, no damage
    AbsorbEnemyProjectile,
    /// Player is kept inside the play area
    Constrain,
    /// Player is hit
    PlayerHit,
    /// Pair not in the table
    Ignore,
}

impl Interaction {
    /// Resolution order within a frame; kills resolve before player hits so a
    /// round cleared this frame takes precedence over a simultaneous hit.
    pub fn priority(self) -> u8 {
        match self {
            Interaction::KillEnemy => 0,
            Interaction::CancelProjectiles => 1,
            Interaction::AbsorbEnemyProjectile => 2,
            Interaction::Constrain => 3,
            Interaction::PlayerHit => 4,
            Interaction::Ignore => 5,
        }
    }
}

/// The rule table. Each pair appears once; lookup is order-independent.
pub const RULES: [(EntityKind, EntityKind, Interaction); 6] = [
    (EntityKind::Enemy, EntityKind::PlayerProjectile, Interaction::KillEnemy),
    (EntityKind::EnemyProjectile, EntityKind::Player, Interaction::PlayerHit),
    (EntityKind::Enemy, EntityKind::EnemyProjectile, Interaction::AbsorbEnemyProjectile),
    (EntityKind::PlayerProjectile, EntityKind::EnemyProjectile, Interaction::CancelProjectiles),
    (EntityKind::Enemy, EntityKind::Player, Interaction::PlayerHit),
    (EntityKind::Player, EntityKind::Boundary, Interaction::Constrain),
];

/// Look up the interaction for a pair of kinds, in either order
pub fn classify(a: EntityKind, b: EntityKind) -> Interaction {
    RULES
        .iter()
        .find(|(x, y, _)| (*x == a && *y == b) || (*x == b && *y == a))
        .map(|(_, _, interaction)| *interaction)
        .unwrap_or(Interaction::Ignore)
}

/// Reference to a concrete tracked entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityRef {
    Enemy(EnemyId),
    PlayerProjectile(ProjectileId),
    EnemyProjectile(ProjectileId),
    Player,
    Boundary,
}

impl EntityRef {
    pub fn kind(self) -> EntityKind {
        match self {
            EntityRef::Enemy(_) => EntityKind::Enemy,
            EntityRef::PlayerProjectile(_) => EntityKind::PlayerProjectile,
            EntityRef::EnemyProjectile(_) => EntityKind::EnemyProjectile,
            EntityRef::Player => EntityKind::Player,
            EntityRef::Boundary => EntityKind::Boundary,
        }
    }
}

/// Axis-aligned box used for overlap tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub half: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, half: Vec2) -> Self {
        Self { center, half }
    }

    pub fn enemy(pos: Vec2) -> Self {
        Self::new(pos, Vec2::splat(ENEMY_HALF_SIZE))
    }

    pub fn projectile(pos: Vec2) -> Self {
        Self::new(pos, Vec2::new(PROJECTILE_HALF_WIDTH, PROJECTILE_HALF_HEIGHT))
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        let d = (self.center - other.center).abs();
        d.x < self.half.x + other.half.x && d.y < self.half.y + other.half.y
    }

    pub fn min_x(&self) -> f32 {
        self.center.x - self.half.x
    }

    pub fn max_x(&self) -> f32 {
        self.center.x + self.half.x
    }
}

/// An overlap between two tracked entities
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub a: EntityRef,
    pub b: EntityRef,
    pub interaction: Interaction,
}

impl Contact {
    pub fn new(a: EntityRef, b: EntityRef) -> Self {
        Self {
            a,
            b,
            interaction: classify(a.kind(), b.kind()),
        }
    }

    /// The participant of the given kind, if any
    fn side(&self, kind: EntityKind) -> Option<EntityRef> {
        [self.a, self.b].into_iter().find(|e| e.kind() == kind)
    }
}

/// Find every overlapping pair with an entry in the rule table, ordered for resolution
pub fn detect_contacts(
    formation: &Formation,
    projectiles: &Projectiles,
    player: &Player,
    play_width: f32,
) -> Vec<Contact> {
    let mut contacts = Vec::new();
    let player_box = player.hitbox();
    let player_shot = projectiles
        .player()
        .map(|p| (EntityRef::PlayerProjectile(p.id), Aabb::projectile(p.pos)));
    let enemy_shots: Vec<_> = projectiles
        .enemy()
        .iter()
        .map(|p| (EntityRef::EnemyProjectile(p.id), Aabb::projectile(p.pos)))
        .collect();

    for enemy in formation.iter_live() {
        let enemy_ref = EntityRef::Enemy(enemy.id);
        let enemy_box = Aabb::enemy(enemy.pos);

        if let Some((shot, shot_box)) = player_shot {
            if enemy_box.overlaps(&shot_box) {
                contacts.push(Contact::new(enemy_ref, shot));
            }
        }
        for (shot, shot_box) in &enemy_shots {
            if enemy_box.overlaps(shot_box) {
                contacts.push(Contact::new(enemy_ref, *shot));
            }
        }
        if enemy_box.overlaps(&player_box) {
            contacts.push(Contact::new(enemy_ref, EntityRef::Player));
        }
    }

    for (shot, shot_box) in &enemy_shots {
        if let Some((player_shot, player_shot_box)) = player_shot {
            if shot_box.overlaps(&player_shot_box) {
                contacts.push(Contact::new(player_shot, *shot));
            }
        }
        if shot_box.overlaps(&player_box) {
            contacts.push(Contact::new(*shot, EntityRef::Player));
        }
    }

    if player_box.min_x() < 0.0 || player_box.max_x() > play_width {
        contacts.push(Contact::new(EntityRef::Player, EntityRef::Boundary));
    }

    debug_assert!(
        contacts.iter().all(|c| c.interaction != Interaction::Ignore),
        "detected a pair with no rule"
    );
    // Stable sort keeps detection order within a priority
    contacts.sort_by_key(|c| c.interaction.priority());
    contacts
}

/// A kill produced by resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kill {
    pub enemy: EnemyId,
    pub score: u32,
}

/// Aggregate outcome of one resolution pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub kills: Vec<Kill>,
    pub player_hit: bool,
    /// The player projectile was consumed by a collision this pass
    pub player_projectile_spent: bool,
    pub cancelled: u32,
    pub absorbed: u32,
    pub constrained: bool,
}

impl Resolution {
    pub fn score(&self) -> u32 {
        self.kills.iter().map(|k| k.score).sum()
    }
}

/// Apply the effects of each contact in order.
///
/// Contacts naming an entity that an earlier contact already consumed are
/// no-ops.
pub fn resolve(
    contacts: &[Contact],
    formation: &mut Formation,
    projectiles: &mut Projectiles,
    player: &mut Player,
    play_width: f32,
) -> Resolution {
    let mut out = Resolution::default();

    for contact in contacts {
        match contact.interaction {
            Interaction::KillEnemy => {
                let (Some(EntityRef::Enemy(enemy)), Some(EntityRef::PlayerProjectile(shot))) = (
                    contact.side(EntityKind::Enemy),
                    contact.side(EntityKind::PlayerProjectile),
                ) else {
                    continue;
                };
                if formation.live(enemy).is_none() || projectiles.get(shot).is_none() {
                    continue;
                }
                if let Some(score) = formation.kill(enemy) {
                    projectiles.remove(shot);
                    out.player_projectile_spent = true;
                    out.kills.push(Kill { enemy, score });
                }
            }
            Interaction::CancelProjectiles => {
                let (Some(EntityRef::PlayerProjectile(mine)), Some(EntityRef::EnemyProjectile(theirs))) = (
                    contact.side(EntityKind::PlayerProjectile),
                    contact.side(EntityKind::EnemyProjectile),
                ) else {
                    continue;
                };
                if projectiles.get(mine).is_none() || projectiles.get(theirs).is_none() {
                    continue;
                }
                projectiles.remove(mine);
                projectiles.remove(theirs);
                out.player_projectile_spent = true;
                out.cancelled += 1;
            }
            Interaction::AbsorbEnemyProjectile => {
                let (Some(EntityRef::Enemy(enemy)), Some(EntityRef::EnemyProjectile(shot))) = (
                    contact.side(EntityKind::Enemy),
                    contact.side(EntityKind::EnemyProjectile),
                ) else {
                    continue;
                };
                if formation.live(enemy).is_some() && projectiles.remove(shot).is_some() {
                    out.absorbed += 1;
                }
            }
            Interaction::Constrain => {
                player.constrain(play_width);
                out.constrained = true;
            }
            Interaction::PlayerHit => {
                let live = match contact.side(EntityKind::EnemyProjectile) {
                    Some(EntityRef::EnemyProjectile(shot)) => projectiles.get(shot).is_some(),
                    _ => match contact.side(EntityKind::Enemy) {
                        Some(EntityRef::Enemy(enemy)) => formation.live(enemy).is_some(),
                        _ => false,
                    },
                };
                out.player_hit |= live;
            }
            Interaction::Ignore => {
                debug_assert!(false, "contact with no rule: {:?}", contact);
            }
        }
    }

    out
}
