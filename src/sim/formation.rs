//! The enemy formation and its serpentine sweep
//!
//! Enemies live in a flat arena in row-major order; rows refer to them by
//! index. Dead enemies keep their slot until the whole formation is replaced,
//! so indices stay stable for the lifetime of a wave.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Enemy types (one per row)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Commander,
    Striker,
    Grunt,
}

/// Horizontal sweep direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    Left,
    #[default]
    Right,
}

impl Direction {
    pub fn flipped(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn sign(self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }
}

/// Stable index of an enemy within its formation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(pub u32);

/// A single enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EnemyId,
    pub row: u32,
    pub column: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub alive: bool,
    /// Awarded on kill
    pub score: u32,
    pub direction: Direction,
}

/// A formation row: fixed type and score, plus the enemies in it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Row {
    pub kind: EnemyKind,
    pub score: u32,
    pub members: Vec<EnemyId>,
}

/// Sweep geometry for one movement tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sweep {
    pub x_start: f32,
    pub x_end: f32,
    pub step: f32,
    pub descent: f32,
}

impl Sweep {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            x_start: tuning.x_start,
            x_end: tuning.x_end,
            step: tuning.step_size,
            descent: tuning.descent_step,
        }
    }
}

/// The grid of enemies under simultaneous sweep
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Formation {
    enemies: Vec<Enemy>,
    rows: Vec<Row>,
}

impl Formation {
    /// A formation with no enemies (before the tutorial finishes, between waves)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Lay out a full grid: row 0 at the top, columns left to right from `x_start`
    pub fn spawn(tuning: &Tuning) -> Self {
        let mut enemies = Vec::with_capacity(tuning.rows.len() * tuning.columns as usize);
        let mut rows = Vec::with_capacity(tuning.rows.len());

        for (row_index, layout) in tuning.rows.iter().enumerate() {
            let row_index = row_index as u32;
            let y = tuning.formation_top - row_index as f32 * tuning.row_spacing;
            let mut members = Vec::with_capacity(tuning.columns as usize);

            for column in 0..tuning.columns {
                let id = EnemyId(enemies.len() as u32);
                enemies.push(Enemy {
                    id,
                    row: row_index,
                    column,
                    kind: layout.kind,
                    pos: Vec2::new(tuning.x_start + column as f32 * tuning.column_spacing, y),
                    alive: true,
                    score: layout.score,
                    direction: Direction::Right,
                });
                members.push(id);
            }

            rows.push(Row {
                kind: layout.kind,
                score: layout.score,
                members,
            });
        }

        Self { enemies, rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// All enemies, dead ones included, in row-major order
    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.get(id.0 as usize)
    }

    /// Lookup that treats dead enemies as absent
    pub fn live(&self, id: EnemyId) -> Option<&Enemy> {
        self.get(id).filter(|e| e.alive)
    }

    pub fn iter_live(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().filter(|e| e.alive)
    }

    pub fn live_count(&self) -> usize {
        self.iter_live().count()
    }

    /// Round-complete predicate: no enemy in any row is alive
    pub fn is_cleared(&self) -> bool {
        self.rows
            .iter()
            .flat_map(|row| row.members.iter())
            .all(|&id| self.live(id).is_none())
    }

    /// Advance every live enemy one step along the serpentine sweep
    pub fn step(&mut self, sweep: &Sweep) {
        for enemy in self.enemies.iter_mut().filter(|e| e.alive) {
            let at_edge = match enemy.direction {
                Direction::Right => enemy.pos.x + sweep.step >= sweep.x_end,
                Direction::Left => enemy.pos.x - sweep.step <= sweep.x_start,
            };
            if at_edge {
                enemy.pos.y -= sweep.descent;
                enemy.direction = enemy.direction.flipped();
            } else {
                enemy.pos.x += enemy.direction.sign() * sweep.step;
            }
        }
    }

    /// The live enemy closest to the player (lowest y), first in row-major order on ties
    pub fn frontmost(&self) -> Option<EnemyId> {
        self.iter_live()
            .fold(None::<&Enemy>, |best, e| match best {
                Some(b) if b.pos.y <= e.pos.y => Some(b),
                _ => Some(e),
            })
            .map(|e| e.id)
    }

    /// Mark an enemy dead and return its score value. Stale ids are a no-op.
    pub fn kill(&mut self, id: EnemyId) -> Option<u32> {
        let enemy = self.enemies.get_mut(id.0 as usize).filter(|e| e.alive)?;
        enemy.alive = false;
        Some(enemy.score)
    }

    /// Kill everything that is left (end of the game-over sequence)
    pub fn clear(&mut self) -> usize {
        let mut cleared = 0;
        for enemy in self.enemies.iter_mut().filter(|e| e.alive) {
            enemy.alive = false;
            cleared += 1;
        }
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> (Tuning, Formation) {
        let tuning = Tuning::default();
        let formation = Formation::spawn(&tuning);
        (tuning, formation)
    }

    #[test]
    fn test_spawn_full_grid() {
        let (tuning, formation) = reference();
        assert_eq!(formation.live_count(), 28);
        assert_eq!(formation.rows().len(), 4);
        for (i, row) in formation.rows().iter().enumerate() {
            assert_eq!(row.members.len(), 7);
            assert_eq!(row.score, tuning.rows[i].score);
            for &id in &row.members {
                let enemy = formation.get(id).unwrap();
                assert_eq!(enemy.row, i as u32);
                assert_eq!(enemy.kind, row.kind);
                assert_eq!(enemy.direction, Direction::Right);
            }
        }
        assert!(!formation.is_cleared());
    }

    #[test]
    fn test_step_moves_right() {
        let (tuning, mut formation) = reference();
        let before = formation.get(EnemyId(0)).unwrap().pos;
        formation.step(&Sweep::from_tuning(&tuning));
        let after = formation.get(EnemyId(0)).unwrap().pos;
        assert_eq!(after.x, before.x + 10.0);
        assert_eq!(after.y, before.y);
    }

    #[test]
    fn test_right_edge_reverses_and_descends() {
        let (tuning, mut formation) = reference();
        let sweep = Sweep::from_tuning(&tuning);
        formation.enemies[0].pos.x = 346.0;
        let y = formation.enemies[0].pos.y;

        formation.step(&sweep);
        let enemy = &formation.enemies[0];
        assert_eq!(enemy.direction, Direction::Left);
        assert_eq!(enemy.pos.y, y - 40.0);
        assert_eq!(enemy.pos.x, 346.0);
    }

    #[test]
    fn test_left_edge_reverses_and_descends() {
        let (tuning, mut formation) = reference();
        let sweep = Sweep::from_tuning(&tuning);
        formation.enemies[3].pos.x = 47.5;
        formation.enemies[3].direction = Direction::Left;
        let y = formation.enemies[3].pos.y;

        formation.step(&sweep);
        let enemy = &formation.enemies[3];
        assert_eq!(enemy.direction, Direction::Right);
        assert_eq!(enemy.pos.y, y - 40.0);
    }

    #[test]
    fn test_dead_enemies_do_not_move() {
        let (tuning, mut formation) = reference();
        let pos = formation.get(EnemyId(5)).unwrap().pos;
        assert_eq!(formation.kill(EnemyId(5)), Some(30));
        formation.step(&Sweep::from_tuning(&tuning));
        assert_eq!(formation.get(EnemyId(5)).unwrap().pos, pos);
    }

    #[test]
    fn test_kill_is_idempotent() {
        let (_, mut formation) = reference();
        assert!(formation.kill(EnemyId(0)).is_some());
        assert!(formation.kill(EnemyId(0)).is_none());
        assert!(formation.kill(EnemyId(999)).is_none());
        assert_eq!(formation.live_count(), 27);
    }

    #[test]
    fn test_frontmost_is_lowest_live() {
        let (_, mut formation) = reference();
        // Front row (row 3) starts at index 21
        assert_eq!(formation.frontmost(), Some(EnemyId(21)));
        formation.kill(EnemyId(21));
        assert_eq!(formation.frontmost(), Some(EnemyId(22)));
        for id in 21..28 {
            formation.kill(EnemyId(id));
        }
        assert_eq!(formation.frontmost(), Some(EnemyId(14)));
    }

    #[test]
    fn test_cleared_iff_no_live() {
        let (_, mut formation) = reference();
        for id in 0..27 {
            formation.kill(EnemyId(id));
            assert!(!formation.is_cleared());
        }
        formation.kill(EnemyId(27));
        assert!(formation.is_cleared());
        assert_eq!(formation.frontmost(), None);
    }

    #[test]
    fn test_clear_kills_remaining() {
        let (_, mut formation) = reference();
        formation.kill(EnemyId(1));
        assert_eq!(formation.clear(), 27);
        assert!(formation.is_cleared());
        // Slots are kept
        assert_eq!(formation.enemies().len(), 28);
    }
}
