// src/engine/mod.rs

//! Orchestration engine for assetflow.
//!
//! This module ties together:
//! - the build scheduler
//! - the trigger queue (what happens when triggers arrive while a task of
//!   the same kind is still rebuilding)
//! - the main runtime event loop that reacts to:
//!   - file-watch triggers
//!   - task completion events
//!   - shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use crate::dag::RunSummary;
use crate::types::TaskId;

/// Outcome of a single task for the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed,
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success)
    }
}

/// Why a task was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// Manual trigger (the initial build at startup).
    Manual,
    /// Triggered due to a filesystem event.
    FileWatch,
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeOptions {
    /// If true, exit the runtime once the scheduler is idle and there are no
    /// queued triggers (one-shot builds).
    pub exit_when_idle: bool,
}

/// Events flowing into the runtime from the watcher, executor, etc.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A task should be (logically) triggered.
    TaskTriggered {
        task: TaskId,
        reason: TriggerReason,
    },
    /// A task finished with a concrete outcome.
    TaskCompleted {
        task: TaskId,
        outcome: TaskOutcome,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

/// What the runtime observed before it stopped.
#[derive(Debug, Clone, Default)]
pub struct RuntimeReport {
    /// Summaries of every finished run, in order.
    pub runs: Vec<RunSummary>,
    /// The runtime stopped while a run was still in progress.
    pub interrupted: bool,
}

impl RuntimeReport {
    /// True when every started run finished and no task failed in any of
    /// them.
    pub fn is_success(&self) -> bool {
        !self.interrupted && self.runs.iter().all(RunSummary::is_success)
    }

    pub fn failed_tasks(&self) -> Vec<TaskId> {
        let mut failed: Vec<TaskId> = self.runs.iter().flat_map(RunSummary::failed).collect();
        failed.sort();
        failed.dedup();
        failed
    }
}

pub mod core;
pub mod event_handlers;
pub mod queue;
pub mod runtime;

pub use core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use queue::TriggerQueue;
pub use crate::types::TriggerWhileRunningBehaviour;
pub use runtime::Runtime;
