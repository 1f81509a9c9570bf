//! Deterministic timer queue
//!
//! Logical-time replacement for delayed calls and repeating intervals.
//! Timers fire in `(due, id)` order, so equal deadlines resolve in the order
//! they were scheduled. Every timer has a handle that can cancel it.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use super::creature::CreatureId;

/// Handle to a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

/// What to do when a timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Decay/bonus pass over every blob
    HappinessTick,
    /// Passive coin generation
    IncomeTick,
    /// Periodic save
    Autosave,
    /// A new blob wanders in
    SpawnCreature,
    /// Drop a coin somewhere and re-arm
    CoinDrop,
    /// Maybe attract a blob to a well-decorated garden, then re-arm
    HabitatEvaluation,
    /// Blob finished pausing; pick its next action
    Resume(CreatureId),
    /// Blob's dwell on a decoration is over
    DwellEnd(CreatureId),
}

#[derive(Debug, Clone)]
struct Entry {
    due: u64,
    event: TimerEvent,
    /// Re-arm period for repeating intervals
    period: Option<u64>,
}

/// Timer queue over logical milliseconds
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now: u64,
    next_id: u64,
    entries: BTreeMap<TimerId, Entry>,
    /// Min-heap of (due, id); stale pairs are skipped on pop
    queue: BinaryHeap<Reverse<(u64, TimerId)>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current logical time
    pub fn now(&self) -> u64 {
        self.now
    }

    fn insert(&mut self, due: u64, event: TimerEvent, period: Option<u64>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, Entry { due, event, period });
        self.queue.push(Reverse((due, id)));
        id
    }

    /// One-shot timer `delay_ms` from now
    pub fn after(&mut self, delay_ms: u64, event: TimerEvent) -> TimerId {
        self.insert(self.now + delay_ms, event, None)
    }

    /// Repeating timer, first firing one period from now
    pub fn every(&mut self, period_ms: u64, event: TimerEvent) -> TimerId {
        let period = period_ms.max(1);
        self.insert(self.now + period, event, Some(period))
    }

    /// Stop a timer; unknown or already-fired handles are ignored
    pub fn cancel(&mut self, id: TimerId) {
        self.entries.remove(&id);
    }

    /// Number of live timers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Advance the clock to `time` (never backwards)
    pub fn advance_to(&mut self, time: u64) {
        self.now = self.now.max(time);
    }

    /// Pop the next timer due at or before `now`
    ///
    /// Repeating timers are re-armed before being returned.
    pub fn pop_due(&mut self) -> Option<(TimerId, TimerEvent)> {
        while let Some(Reverse((due, id))) = self.queue.peek().copied() {
            if due > self.now {
                return None;
            }
            self.queue.pop();

            let Some(entry) = self.entries.get(&id) else {
                continue; // cancelled
            };
            if entry.due != due {
                continue; // superseded by a re-arm
            }

            let (event, period) = (entry.event, entry.period);
            match period {
                Some(period) => {
                    let next = due + period;
                    if let Some(e) = self.entries.get_mut(&id) {
                        e.due = next;
                    }
                    self.queue.push(Reverse((next, id)));
                }
                None => {
                    self.entries.remove(&id);
                }
            }
            return Some((id, event));
        }
        None
    }
}
