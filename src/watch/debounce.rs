// src/watch/debounce.rs

//! Per-task debouncing of watch triggers.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::types::TaskId;

/// How long the watch loop sleeps when nothing is pending.
const IDLE_SLEEP: Duration = Duration::from_secs(86400);

/// Pure debouncer: timing only, no IO.
///
/// A task becomes ready once `window` has passed since its most recent
/// change. Each task is timed independently, so a burst of stylesheet saves
/// never delays a scripts rebuild.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    last_event: BTreeMap<TaskId, Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_event: BTreeMap::new(),
        }
    }

    /// Record a change for `task` at `now`, restarting its window.
    pub fn add(&mut self, task: TaskId, now: Instant) {
        self.last_event.insert(task, now);
    }

    pub fn is_empty(&self) -> bool {
        self.last_event.is_empty()
    }

    /// Remove and return every task whose window has elapsed.
    pub fn take_ready(&mut self, now: Instant) -> Vec<TaskId> {
        let ready: Vec<TaskId> = self
            .last_event
            .iter()
            .filter(|(_, at)| now.saturating_duration_since(**at) >= self.window)
            .map(|(task, _)| *task)
            .collect();

        for task in &ready {
            self.last_event.remove(task);
        }
        ready
    }

    /// Precise sleep duration until the next task can become ready.
    pub fn sleep_duration(&self, now: Instant) -> Duration {
        self.last_event
            .values()
            .map(|at| self.window.saturating_sub(now.saturating_duration_since(*at)))
            .min()
            .map(|d| d.max(Duration::from_millis(1)))
            .unwrap_or(IDLE_SLEEP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(100);

    #[test]
    fn burst_collapses_into_one_trigger() {
        let start = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        for i in 0..5 {
            d.add(TaskId::Styles, start + Duration::from_millis(i * 20));
        }

        assert!(d.take_ready(start + Duration::from_millis(150)).is_empty());
        assert_eq!(d.take_ready(start + Duration::from_millis(180)), vec![TaskId::Styles]);
        assert!(d.is_empty());
    }

    #[test]
    fn tasks_are_timed_independently() {
        let start = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        d.add(TaskId::Scripts, start);
        d.add(TaskId::Styles, start + Duration::from_millis(80));

        assert_eq!(d.take_ready(start + Duration::from_millis(100)), vec![TaskId::Scripts]);
        assert_eq!(
            d.sleep_duration(start + Duration::from_millis(100)),
            Duration::from_millis(80)
        );
        assert_eq!(d.take_ready(start + Duration::from_millis(180)), vec![TaskId::Styles]);
    }

    #[test]
    fn idle_debouncer_sleeps_long() {
        let d = Debouncer::new(WINDOW);
        assert_eq!(d.sleep_duration(Instant::now()), IDLE_SLEEP);
    }
}
