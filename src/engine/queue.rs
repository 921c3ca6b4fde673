// src/engine/queue.rs

use std::collections::{BTreeSet, VecDeque};

use tracing::{debug, warn};

use crate::types::{TaskId, TriggerWhileRunningBehaviour};

/// Queue of triggers that arrive while the triggered task is already part of
/// the active run.
///
/// Semantics:
/// - Each queued entry is a *batch* of task ids that should be triggered
///   together in a future run.
/// - `max_runs` defines how many such batches to keep (default 1: "at most
///   one future run is queued").
/// - When the scheduler goes idle, `drain_pending()` merges all queued
///   batches into a single set of triggers for the next run.
///
/// A burst of saves to a stylesheet while `styles` is rebuilding therefore
/// collapses into exactly one follow-up rebuild.
#[derive(Debug)]
pub struct TriggerQueue {
    behaviour: TriggerWhileRunningBehaviour,
    max_runs: usize,
    runs: VecDeque<BTreeSet<TaskId>>,
}

impl TriggerQueue {
    /// Create a new queue with the given behaviour and maximum queued runs.
    ///
    /// `max_runs` is clamped to at least 1, as a zero-length queue would make
    /// queuing semantics meaningless.
    pub fn new(behaviour: TriggerWhileRunningBehaviour, max_runs: usize) -> Self {
        let max_runs = max_runs.max(1);
        Self {
            behaviour,
            max_runs,
            runs: VecDeque::new(),
        }
    }

    /// Returns true if there are no queued triggers.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Record that a task was triggered while it is part of the active run.
    ///
    /// - `Queue`: merge into the last batch (or start one); drop the oldest
    ///   batches beyond `max_runs`.
    /// - `Cancel`: drop this task from every queued batch, then queue it
    ///   again in the last batch. Other tasks keep their queued triggers.
    pub fn record_trigger(&mut self, task: TaskId) {
        match self.behaviour {
            TriggerWhileRunningBehaviour::Queue => {
                if let Some(last_batch) = self.runs.back_mut() {
                    let inserted = last_batch.insert(task);
                    debug!(task = %task, inserted, "merged trigger into last queued batch (queue mode)");
                } else {
                    self.runs.push_back(BTreeSet::from([task]));
                    debug!(task = %task, "created first queued batch (queue mode)");
                }

                if self.runs.len() > self.max_runs {
                    warn!(
                        current_batches = self.runs.len(),
                        max_runs = self.max_runs,
                        "exceeded max_runs; dropping oldest queued batches"
                    );
                    while self.runs.len() > self.max_runs {
                        self.runs.pop_front();
                    }
                }
            }
            TriggerWhileRunningBehaviour::Cancel => {
                for batch in self.runs.iter_mut() {
                    batch.remove(&task);
                }
                self.runs.retain(|batch| !batch.is_empty());

                if let Some(last_batch) = self.runs.back_mut() {
                    last_batch.insert(task);
                } else {
                    self.runs.push_back(BTreeSet::from([task]));
                }
                debug!(task = %task, "replaced queued trigger for this task (cancel mode)");
            }
        }
    }

    /// Drain all pending batches and merge them into one list of task ids.
    pub fn drain_pending(&mut self) -> Vec<TaskId> {
        let mut merged: BTreeSet<TaskId> = BTreeSet::new();

        while let Some(batch) = self.runs.pop_front() {
            merged.extend(batch);
        }

        let tasks: Vec<TaskId> = merged.into_iter().collect();
        debug!(drained = tasks.len(), "drained queued triggers into new run");
        tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_mode_merges_triggers_into_one_batch() {
        let mut queue = TriggerQueue::new(TriggerWhileRunningBehaviour::Queue, 1);
        queue.record_trigger(TaskId::Styles);
        queue.record_trigger(TaskId::Scripts);
        queue.record_trigger(TaskId::Styles);

        assert_eq!(queue.drain_pending(), vec![TaskId::Styles, TaskId::Scripts]);
        assert!(queue.is_empty());
    }

    #[test]
    fn cancel_mode_replaces_only_the_same_task() {
        let mut queue = TriggerQueue::new(TriggerWhileRunningBehaviour::Cancel, 1);
        queue.record_trigger(TaskId::Styles);
        queue.record_trigger(TaskId::Scripts);
        queue.record_trigger(TaskId::Scripts);

        assert_eq!(queue.runs.len(), 1);
        assert_eq!(queue.drain_pending(), vec![TaskId::Styles, TaskId::Scripts]);
    }

    #[test]
    fn zero_max_runs_is_clamped() {
        let mut queue = TriggerQueue::new(TriggerWhileRunningBehaviour::Queue, 0);
        queue.record_trigger(TaskId::Images);
        assert_eq!(queue.drain_pending(), vec![TaskId::Images]);
    }
}
