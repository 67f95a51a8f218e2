//! One-shot timers polled by the host.
//!
//! There is no event loop in this crate. Widgets that need delayed work
//! (input debouncing) start a timer here, and the host asks
//! [`TimerQueue::time_until_next`] how long it may sleep before calling
//! back into the widget to process expired timers.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// Handle to a pending timer.
    pub struct TimerId;
}

/// Queue entry, ordered so the heap pops the earliest deadline first.
#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    id: TimerId,
    fire_time: Instant,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_time == other.fire_time
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.fire_time.cmp(&self.fire_time)
    }
}

/// Pending one-shot timers.
#[derive(Debug, Default)]
pub struct TimerQueue {
    deadlines: SlotMap<TimerId, Instant>,
    queue: BinaryHeap<QueueEntry>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a timer firing `delay` from now.
    pub fn start(&mut self, delay: Duration) -> TimerId {
        self.start_at(Instant::now(), delay)
    }

    /// Start a timer firing `delay` after `now`.
    pub fn start_at(&mut self, now: Instant, delay: Duration) -> TimerId {
        let fire_time = now + delay;
        let id = self.deadlines.insert(fire_time);
        self.queue.push(QueueEntry { id, fire_time });
        tracing::trace!(target: targets::TIMER, ?id, ?delay, "timer started");
        id
    }

    /// Cancel a timer. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.deadlines.remove(id).is_some()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(id)
    }

    /// Time left before the earliest pending timer fires.
    pub fn time_until_next(&mut self) -> Option<Duration> {
        self.time_until_next_at(Instant::now())
    }

    pub fn time_until_next_at(&mut self, now: Instant) -> Option<Duration> {
        self.drop_cancelled();
        self.queue
            .peek()
            .map(|entry| entry.fire_time.saturating_duration_since(now))
    }

    /// Remove and return every timer due by now, earliest first.
    pub fn expire(&mut self) -> Vec<TimerId> {
        self.expire_at(Instant::now())
    }

    pub fn expire_at(&mut self, now: Instant) -> Vec<TimerId> {
        let mut fired = Vec::new();
        while let Some(entry) = self.queue.peek().copied() {
            if entry.fire_time > now {
                break;
            }
            self.queue.pop();
            if self.deadlines.remove(entry.id).is_some() {
                fired.push(entry.id);
            }
        }
        if !fired.is_empty() {
            tracing::trace!(target: targets::TIMER, count = fired.len(), "timers expired");
        }
        fired
    }

    fn drop_cancelled(&mut self) {
        while let Some(entry) = self.queue.peek() {
            if self.deadlines.contains_key(entry.id) {
                break;
            }
            self.queue.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_expire_returns_due_timers_in_order() {
        let mut timers = TimerQueue::new();
        let t0 = Instant::now();
        let late = timers.start_at(t0, MS * 30);
        let early = timers.start_at(t0, MS * 10);

        assert!(timers.expire_at(t0 + MS * 5).is_empty());
        assert_eq!(timers.expire_at(t0 + MS * 40), vec![early, late]);
        assert!(!timers.is_pending(early));
        assert_eq!(timers.time_until_next_at(t0), None);
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let mut timers = TimerQueue::new();
        let t0 = Instant::now();
        let first = timers.start_at(t0, MS * 10);
        let second = timers.start_at(t0, MS * 20);

        assert!(timers.cancel(first));
        assert!(!timers.cancel(first));
        assert_eq!(timers.time_until_next_at(t0), Some(MS * 20));
        assert_eq!(timers.expire_at(t0 + MS * 25), vec![second]);
    }

    #[test]
    fn test_overdue_timer_reports_zero_wait() {
        let mut timers = TimerQueue::new();
        let t0 = Instant::now();
        timers.start_at(t0, MS);
        assert_eq!(timers.time_until_next_at(t0 + MS * 10), Some(Duration::ZERO));
    }
}
