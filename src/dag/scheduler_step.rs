// src/dag/scheduler_step.rs

//! Step-by-step execution result types for the scheduler.

use std::collections::BTreeMap;

use crate::dag::task_info::{ScheduledTask, TaskRunState};
use crate::types::TaskId;

/// Structured result of a single scheduler "step".
///
/// This is useful for tests that want to manually step the graph and make
/// assertions about what changed.
#[derive(Debug, Clone, Default)]
pub struct SchedulerStep {
    /// Tasks that became ready to run as a result of this step.
    pub newly_scheduled: Vec<ScheduledTask>,
    /// Tasks that were newly marked as failed in this step (including the
    /// task that failed and any blocked dependents).
    pub newly_failed: Vec<TaskId>,
    /// Set when this step finished the current run (the scheduler is now
    /// idle).
    pub finished_run: Option<RunSummary>,
}

/// Terminal state of every task that took part in one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub run_id: u64,
    pub outcomes: BTreeMap<TaskId, TaskRunState>,
}

impl RunSummary {
    /// Tasks that failed or were blocked by a failed dependency.
    pub fn failed(&self) -> Vec<TaskId> {
        self.outcomes
            .iter()
            .filter(|(_, state)| **state == TaskRunState::DoneFailed)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn succeeded(&self) -> Vec<TaskId> {
        self.outcomes
            .iter()
            .filter(|(_, state)| **state == TaskRunState::DoneSuccess)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn is_success(&self) -> bool {
        self.failed().is_empty()
    }
}
