// src/exec/task_runner.rs

//! Individual build task runner.

use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{error, info};

use crate::dag::ScheduledTask;
use crate::engine::{RuntimeEvent, TaskOutcome};
use crate::tasks::{TaskContext, run_task as run_entry_point};

/// Run a single scheduled task and report its outcome to the runtime.
///
/// Errors returned by the entry point are logged here and reported as
/// `TaskOutcome::Failed`; a task never fails silently.
pub async fn run_task(
    task: ScheduledTask,
    ctx: TaskContext,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) {
    let started = Instant::now();

    info!(
        task = %task.task,
        run_id = task.run_id,
        debug = task.options.debug,
        "starting task"
    );

    let outcome = match run_entry_point(task.task, &ctx, task.options).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!(
                task = %task.task,
                run_id = task.run_id,
                error = ?err,
                "task execution error"
            );
            TaskOutcome::Failed
        }
    };

    info!(
        task = %task.task,
        run_id = task.run_id,
        success = outcome.is_success(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "task finished"
    );

    if let Err(err) = runtime_tx
        .send(RuntimeEvent::TaskCompleted {
            task: task.task,
            outcome,
        })
        .await
    {
        error!(task = %task.task, error = %err, "failed to report task completion to runtime");
    }
}
