//! Simulation Clock
//!
//! Counts ticks and holds the table of delayed effects. Effects are plain
//! data evaluated at tick boundaries, so a pending delay never blocks the
//! tick loop and can be cancelled when its owner goes away.

use bevy_ecs::prelude::*;
use murmuration_events::Tick;

/// Work deferred to a later tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledEffect {
    /// Return a transforming member to stable
    Stabilize { member: Entity },
}

/// Handle returned by [`SimulationClock::schedule_after`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CancelHandle(u64);

#[derive(Debug, Clone)]
struct ScheduledEntry {
    handle: CancelHandle,
    remaining: u64,
    effect: ScheduledEffect,
}

/// Resource: tick counter and schedule table
#[derive(Resource, Debug, Default)]
pub struct SimulationClock {
    now: Tick,
    next_handle: u64,
    entries: Vec<ScheduledEntry>,
}

impl SimulationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks elapsed since the simulation started
    pub fn now(&self) -> Tick {
        self.now
    }

    /// Schedules `effect` to fire `ticks` advances from now.
    ///
    /// A delay of zero fires on the next advance.
    pub fn schedule_after(&mut self, ticks: u64, effect: ScheduledEffect) -> CancelHandle {
        self.next_handle += 1;
        let handle = CancelHandle(self.next_handle);
        self.entries.push(ScheduledEntry {
            handle,
            remaining: ticks.max(1),
            effect,
        });
        tracing::debug!(?handle, ticks, "scheduled {:?}", effect);
        handle
    }

    /// Cancels a pending effect. Unknown, fired or already cancelled handles are ignored.
    pub fn cancel(&mut self, handle: CancelHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.handle != handle);
        self.entries.len() != before
    }

    /// Advances one tick and returns the effects that came due, in scheduling order
    pub fn advance(&mut self) -> Vec<ScheduledEffect> {
        self.now += 1;

        let mut due = Vec::new();
        self.entries.retain_mut(|entry| {
            entry.remaining -= 1;
            if entry.remaining == 0 {
                due.push(entry.effect);
                false
            } else {
                true
            }
        });
        due
    }

    pub fn is_pending(&self, handle: CancelHandle) -> bool {
        self.entries.iter().any(|entry| entry.handle == handle)
    }

    /// Number of effects waiting to fire
    pub fn pending(&self) -> usize {
        self.entries.len()
    }
}
