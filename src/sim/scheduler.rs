//! Timers on the simulation clock
//!
//! Delayed effects (the movement tick, projectile timeouts, the game-over
//! blink, the wave announcement) are timers rather than blocking waits. The
//! host advances the clock once per frame and then pops due actions one at a
//! time, so an action can cancel timers that would otherwise fire later in the
//! same frame.

use serde::{Deserialize, Serialize};

/// Handle for a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Timer<A> {
    id: TimerId,
    due: f64,
    period: Option<f64>,
    action: A,
}

/// Single-threaded timer queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scheduler<A> {
    now: f64,
    next_id: u64,
    timers: Vec<Timer<A>>,
}

impl<A> Default for Scheduler<A> {
    fn default() -> Self {
        Self {
            now: 0.0,
            next_id: 1,
            timers: Vec::new(),
        }
    }
}

impl<A: Clone> Scheduler<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock (seconds)
    pub fn now(&self) -> f64 {
        self.now
    }

    fn allocate(&mut self) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Fire `action` once, `delay` seconds from now
    pub fn schedule_once(&mut self, delay: f32, action: A) -> TimerId {
        let id = self.allocate();
        self.timers.push(Timer {
            id,
            due: self.now + f64::from(delay.max(0.0)),
            period: None,
            action,
        });
        id
    }

    /// Fire `action` every `period` seconds, first one period from now
    pub fn schedule_repeating(&mut self, period: f32, action: A) -> TimerId {
        debug_assert!(period > 0.0, "repeating timer needs a positive period");
        let period = f64::from(period.max(f32::EPSILON));
        let id = self.allocate();
        self.timers.push(Timer {
            id,
            due: self.now + period,
            period: Some(period),
            action,
        });
        id
    }

    /// Remove a timer. Unknown or already-fired ids are ignored.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    /// Drop every pending timer
    pub fn clear(&mut self) {
        self.timers.clear();
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Move the clock forward without firing anything
    pub fn advance(&mut self, dt: f32) {
        self.now += f64::from(dt.max(0.0));
    }

    /// Pop the earliest timer that is due, rescheduling it if it repeats.
    ///
    /// Ties are broken by scheduling order.
    pub fn pop_due(&mut self) -> Option<(TimerId, A)> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= self.now)
            .min_by(|(_, a), (_, b)| {
                a.due
                    .partial_cmp(&b.due)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.id.0.cmp(&b.id.0))
            })
            .map(|(i, _)| i)?;

        let timer = &mut self.timers[index];
        let fired = (timer.id, timer.action.clone());
        match timer.period {
            Some(period) => timer.due += period,
            None => {
                self.timers.swap_remove(index);
            }
        }
        Some(fired)
    }
}
