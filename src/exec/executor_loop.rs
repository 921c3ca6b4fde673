// src/exec/executor_loop.rs

//! Main executor loop that runs scheduled build tasks.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::dag::ScheduledTask;
use crate::engine::RuntimeEvent;
use crate::exec::task_runner::run_task;
use crate::tasks::TaskContext;
use crate::types::TaskId;

/// Spawn the background executor loop.
///
/// The returned `mpsc::Sender<ScheduledTask>` is what `RealExecutorBackend`
/// forwards scheduled tasks into. Each scheduled task runs in its own Tokio
/// task, and **per task id there is never more than one instance running**:
/// if an instance of the same id is still in flight, the new one waits for
/// it to finish before starting. Two writers never touch the same
/// destination at once.
pub fn spawn_executor(
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    ctx: TaskContext,
) -> mpsc::Sender<ScheduledTask> {
    let (tx, mut rx) = mpsc::channel::<ScheduledTask>(32);

    tokio::spawn(async move {
        info!("executor loop started");

        // Last spawned instance per task id.
        let mut active: HashMap<TaskId, JoinHandle<()>> = HashMap::new();

        while let Some(task) = rx.recv().await {
            handle_scheduled_task(task, &mut active, &runtime_tx, &ctx);
        }

        info!("executor loop finished (channel closed)");
    });

    tx
}

/// Handle a newly scheduled task.
fn handle_scheduled_task(
    task: ScheduledTask,
    active: &mut HashMap<TaskId, JoinHandle<()>>,
    runtime_tx: &mpsc::Sender<RuntimeEvent>,
    ctx: &TaskContext,
) {
    let id = task.task;

    let previous = active.remove(&id).filter(|handle| !handle.is_finished());
    if previous.is_some() {
        debug!(
            task = %id,
            run_id = task.run_id,
            "previous instance still running; new instance will wait for it"
        );
    }

    let rt_tx = runtime_tx.clone();
    let ctx = ctx.clone();

    let handle = tokio::spawn(async move {
        if let Some(previous) = previous {
            let _ = previous.await;
        }
        run_task(task, ctx, rt_tx).await;
        debug!(task = %id, "task runner future finished");
    });

    active.insert(id, handle);
}
