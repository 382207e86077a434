//! Timer Registry ("Elapser")
//!
//! Every timed behavior in the simulation (movement pacing, cooldowns,
//! invulnerability windows, fuses, lifetimes, trap toggles, animation frames)
//! goes through one registry with one clock.
//!
//! ## Keys
//!
//! Timers are addressed by `(owner, use case)`. At most one timer exists per
//! key; starting a key again replaces the entry and restarts its clock.
//!
//! ## Timer Shapes
//!
//! ```text
//! countdown     |-------- duration --------|  elapsed (stays true)
//! step          |step|step|step|step|          index 0..steps-1, then elapsed
//! repeating     |step|step|step|step|step|...  elapsed once per step,
//!                                              index wraps mod steps
//! ```
//!
//! The registry never reads wall-clock time. The tick driver advances it.

use std::collections::BTreeMap;
use std::fmt;
use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::game::entity::EntityId;

/// What a timer is used for. Second half of a timer key.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UseCase {
    /// Movement pacing for step-walking entities
    Movement,
    /// Action rate limiting (e.g. melee hits)
    Cooldown,
    /// Recovery window after taking a hit
    Invulnerability,
    /// Trap/trigger on-off cycle
    Trigger,
    /// Countdown to detonation
    Fuse,
    /// Time until a temporary object disappears
    Lifetime,
    /// Animation frame stepping
    Animation,
    /// Anything else, by name
    Named(String),
}

impl fmt::Display for UseCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UseCase::Named(name) => write!(f, "{}", name),
            other => write!(f, "{:?}", other),
        }
    }
}

/// Registry key: owner plus use case.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerKey {
    /// Entity the timer belongs to
    pub owner: EntityId,
    /// What the timer gates
    pub use_case: UseCase,
}

impl TimerKey {
    /// Create a key.
    pub fn new(owner: EntityId, use_case: UseCase) -> Self {
        Self { owner, use_case }
    }
}

/// One registered timer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    /// Registry clock value when the timer was (re)started
    pub started_at_ms: u64,
    /// Length of one step (the whole duration for countdowns)
    pub step_ms: u64,
    /// Number of steps (1 for countdowns)
    pub steps: u32,
    /// Repeats forever, firing once per step
    pub repeating: bool,
    /// Periods already acknowledged through `is_elapsed`
    acknowledged: u64,
    /// Periods already reported through `advance`
    reported: u64,
}

impl Timer {
    fn new(now_ms: u64, step_ms: u64, steps: u32, repeating: bool) -> Self {
        // A zero-length repeating step would complete infinitely often.
        let step_ms = if repeating { step_ms.max(1) } else { step_ms };
        Self {
            started_at_ms: now_ms,
            step_ms,
            steps: steps.max(1),
            repeating,
            acknowledged: 0,
            reported: 0,
        }
    }

    /// Total run time of a non-repeating timer.
    #[inline]
    pub fn duration_ms(&self) -> u64 {
        self.step_ms.saturating_mul(self.steps as u64)
    }

    /// Time since start.
    #[inline]
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.started_at_ms)
    }

    /// Periods completed by `now_ms`.
    ///
    /// Repeating timers complete one period per step; others complete at
    /// most one period (their whole duration).
    pub fn completed_periods(&self, now_ms: u64) -> u64 {
        let elapsed = self.elapsed_ms(now_ms);
        if self.repeating {
            elapsed / self.step_ms
        } else {
            (elapsed >= self.duration_ms()) as u64
        }
    }

    /// Current step, for animation frame selection.
    pub fn step_index(&self, now_ms: u64) -> u32 {
        if self.step_ms == 0 {
            return self.steps - 1;
        }
        let raw = self.elapsed_ms(now_ms) / self.step_ms;
        if self.repeating {
            (raw % self.steps as u64) as u32
        } else {
            raw.min(self.steps as u64 - 1) as u32
        }
    }

    /// Time until the next completion (0 once a countdown is done).
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        let elapsed = self.elapsed_ms(now_ms);
        if self.repeating {
            self.step_ms - elapsed % self.step_ms
        } else {
            self.duration_ms().saturating_sub(elapsed)
        }
    }
}

/// A timer completion observed while advancing the clock.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerEvent {
    /// Which timer fired
    pub key: TimerKey,
    /// Periods completed since the last report (always 1 for countdowns)
    pub periods: u64,
    /// Step index at the time of the report
    pub step_index: u32,
    /// Whether the timer keeps running
    pub repeating: bool,
}

/// Keyed collection of owner-scoped timers sharing one clock.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Elapser {
    now_ms: u64,
    timers: BTreeMap<TimerKey, Timer>,
}

impl Elapser {
    /// Create an empty registry at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current registry clock.
    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Number of registered timers.
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// True if no timers are registered.
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Look up a timer.
    pub fn get(&self, owner: EntityId, use_case: &UseCase) -> Option<&Timer> {
        self.timers.get(&TimerKey::new(owner, use_case.clone()))
    }

    /// True if a timer is registered for this key.
    pub fn contains(&self, owner: EntityId, use_case: &UseCase) -> bool {
        self.get(owner, use_case).is_some()
    }

    /// Start (or restart) a countdown.
    ///
    /// A repeating countdown fires once every `duration_ms`.
    pub fn start(&mut self, owner: EntityId, use_case: UseCase, duration_ms: u64, repeating: bool) {
        self.start_steps(owner, use_case, duration_ms, 1, repeating);
    }

    /// Start (or restart) a step timer of `steps` steps of `step_ms` each.
    pub fn start_steps(
        &mut self,
        owner: EntityId,
        use_case: UseCase,
        step_ms: u64,
        steps: u32,
        repeating: bool,
    ) {
        let timer = Timer::new(self.now_ms, step_ms, steps, repeating);
        let key = TimerKey::new(owner, use_case);
        if self.timers.insert(key.clone(), timer).is_some() {
            debug!("Timer {}/{} restarted at {}ms", key.owner, key.use_case, self.now_ms);
        }
    }

    /// Check a timer, acknowledging one completed period.
    ///
    /// Unknown keys are never elapsed. Countdowns stay elapsed until cleared.
    /// Repeating timers return true once per completed period: if three
    /// periods finished since the last check, the next three calls are true.
    pub fn is_elapsed(&mut self, owner: EntityId, use_case: &UseCase) -> bool {
        let now = self.now_ms;
        let Some(timer) = self.timers.get_mut(&TimerKey::new(owner, use_case.clone())) else {
            return false;
        };

        let done = timer.completed_periods(now);
        if !timer.repeating {
            return done > 0;
        }
        if done > timer.acknowledged {
            timer.acknowledged += 1;
            true
        } else {
            false
        }
    }

    /// Acknowledge every pending period of a repeating timer at once.
    ///
    /// Returns how many periods completed since they were last acknowledged.
    /// Countdowns and unknown keys return 0.
    pub fn take_periods(&mut self, owner: EntityId, use_case: &UseCase) -> u64 {
        self.take_periods_within(owner, use_case, 0)
    }

    /// Like [`Elapser::take_periods`], counting periods that complete within
    /// `lookahead_ms` of the current time.
    ///
    /// Movement integrates over the slice about to be simulated, before the
    /// clock is advanced past it.
    pub fn take_periods_within(
        &mut self,
        owner: EntityId,
        use_case: &UseCase,
        lookahead_ms: u64,
    ) -> u64 {
        let horizon = self.now_ms.saturating_add(lookahead_ms);
        let Some(timer) = self.timers.get_mut(&TimerKey::new(owner, use_case.clone())) else {
            return 0;
        };
        if !timer.repeating {
            return 0;
        }

        let done = timer.completed_periods(horizon);
        let pending = done.saturating_sub(timer.acknowledged);
        timer.acknowledged = timer.acknowledged.max(done);
        pending
    }

    /// Check a timer without acknowledging anything.
    pub fn peek_elapsed(&self, owner: EntityId, use_case: &UseCase) -> bool {
        self.get(owner, use_case)
            .map(|t| {
                let done = t.completed_periods(self.now_ms);
                if t.repeating { done > t.acknowledged } else { done > 0 }
            })
            .unwrap_or(false)
    }

    /// Current step of a timer.
    pub fn step_index(&self, owner: EntityId, use_case: &UseCase) -> Option<u32> {
        self.get(owner, use_case).map(|t| t.step_index(self.now_ms))
    }

    /// Time until the timer next completes.
    pub fn remaining_ms(&self, owner: EntityId, use_case: &UseCase) -> Option<u64> {
        self.get(owner, use_case).map(|t| t.remaining_ms(self.now_ms))
    }

    /// Remove one timer. Unknown keys are a no-op.
    ///
    /// Returns whether a timer was removed.
    pub fn clear(&mut self, owner: EntityId, use_case: &UseCase) -> bool {
        self.timers.remove(&TimerKey::new(owner, use_case.clone())).is_some()
    }

    /// Remove every timer belonging to `owner`.
    ///
    /// Returns the number of timers removed.
    pub fn clear_owner(&mut self, owner: EntityId) -> usize {
        let before = self.timers.len();
        self.timers.retain(|key, _| key.owner != owner);
        let removed = before - self.timers.len();
        if removed > 0 {
            debug!("Cleared {} timers for {}", removed, owner);
        }
        removed
    }

    /// Advance the clock and report every timer that completed a period.
    ///
    /// Reports are in key order. Countdowns are reported once.
    pub fn advance(&mut self, elapsed_ms: u64) -> Vec<TimerEvent> {
        self.now_ms = self.now_ms.saturating_add(elapsed_ms);
        let now = self.now_ms;

        let mut events = Vec::new();
        for (key, timer) in self.timers.iter_mut() {
            let done = timer.completed_periods(now);
            if done > timer.reported {
                events.push(TimerEvent {
                    key: key.clone(),
                    periods: done - timer.reported,
                    step_index: timer.step_index(now),
                    repeating: timer.repeating,
                });
                timer.reported = done;
            }
        }
        events
    }
}
