// src/exec/backend.rs

//! Where dispatched build tasks go.
//!
//! The runtime hands every batch of ready tasks to an [`ExecutorBackend`].
//! [`RealExecutorBackend`] forwards them to the executor loop, which runs the
//! task entry points against the project; the test-utils crate has a fake
//! that answers with canned outcomes instead.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;
use tracing::trace;

use crate::dag::ScheduledTask;
use crate::engine::RuntimeEvent;
use crate::errors::{AssetflowError, Result};
use crate::tasks::TaskContext;

use super::executor_loop::spawn_executor;

/// Boxed future returned by [`ExecutorBackend::spawn_ready_tasks`].
pub type DispatchFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Accepts tasks the scheduler considers ready.
///
/// Every dispatched task must eventually be answered with exactly one
/// `RuntimeEvent::TaskCompleted`, or the run it belongs to never finishes.
pub trait ExecutorBackend: Send {
    fn spawn_ready_tasks(&mut self, tasks: Vec<ScheduledTask>) -> DispatchFuture<'_>;
}

/// Backend that runs the real transforms.
#[derive(Debug)]
pub struct RealExecutorBackend {
    tx: mpsc::Sender<ScheduledTask>,
}

impl RealExecutorBackend {
    /// Starts the executor loop on the current Tokio runtime.
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>, ctx: TaskContext) -> Self {
        Self {
            tx: spawn_executor(runtime_tx, ctx),
        }
    }
}

impl ExecutorBackend for RealExecutorBackend {
    fn spawn_ready_tasks(&mut self, tasks: Vec<ScheduledTask>) -> DispatchFuture<'_> {
        let tx = self.tx.clone();

        Box::pin(async move {
            for task in tasks {
                trace!(task = %task.task, run_id = task.run_id, "forwarding to executor loop");
                tx.send(task).await.map_err(|err| {
                    AssetflowError::TaskFailed(format!(
                        "{}: executor loop is gone, cannot dispatch",
                        err.0.task
                    ))
                })?;
            }
            Ok(())
        })
    }
}
