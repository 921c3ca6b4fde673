// src/dag/task_info.rs

use crate::types::{TaskId, TransformOptions};

/// Where a task stands within the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Part of the run, waiting for its dependencies.
    Pending,
    /// Handed to the executor; a completion event is outstanding.
    Running,
    DoneSuccess,
    /// Failed itself, or never ran because a dependency failed.
    DoneFailed,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::DoneSuccess | RunState::DoneFailed)
    }
}

/// Run state as seen from outside the scheduler, with an explicit
/// `NotInRun` instead of `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRunState {
    NotInRun,
    Pending,
    Running,
    DoneSuccess,
    DoneFailed,
}

impl From<Option<RunState>> for TaskRunState {
    fn from(state: Option<RunState>) -> Self {
        match state {
            None => TaskRunState::NotInRun,
            Some(RunState::Pending) => TaskRunState::Pending,
            Some(RunState::Running) => TaskRunState::Running,
            Some(RunState::DoneSuccess) => TaskRunState::DoneSuccess,
            Some(RunState::DoneFailed) => TaskRunState::DoneFailed,
        }
    }
}

/// Scheduler bookkeeping for one build graph node.
#[derive(Debug, Clone)]
pub struct TaskInfo {
    pub id: TaskId,
    /// Upstream nodes (for a transform, `clean`).
    pub deps: Vec<TaskId>,
    /// `None` while the task sits out the current run.
    pub run_state: Option<RunState>,
    /// Most recent run in which the task succeeded. A dependency that
    /// succeeded once stays satisfied for later watch runs.
    pub last_successful_run: Option<u64>,
    /// Most recent run in which the task reached a terminal state.
    pub last_finished_run: Option<u64>,
}

impl TaskInfo {
    pub fn new(id: TaskId, deps: Vec<TaskId>) -> Self {
        Self {
            id,
            deps,
            run_state: None,
            last_successful_run: None,
            last_finished_run: None,
        }
    }

    /// Whether this task has run to completion in an earlier run.
    pub fn has_run_before(&self) -> bool {
        self.last_finished_run.is_some()
    }
}

/// A task the executor should start now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTask {
    pub task: TaskId,
    pub options: TransformOptions,
    /// Shared by every task dispatched for the same run.
    pub run_id: u64,
}
