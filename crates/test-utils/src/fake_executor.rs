use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use assetflow::dag::ScheduledTask;
use assetflow::engine::{RuntimeEvent, TaskOutcome};
use assetflow::exec::{DispatchFuture, ExecutorBackend};
use assetflow::types::TaskId;
use tokio::sync::mpsc;

/// A fake executor that:
/// - records which tasks were "run", with their options
/// - immediately reports `TaskCompleted` for each scheduled task, with a
///   per-task outcome (default `Success`).
pub struct FakeExecutor {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    executed: Arc<Mutex<Vec<ScheduledTask>>>,
    outcomes: HashMap<TaskId, TaskOutcome>,
}

impl FakeExecutor {
    pub fn new(
        runtime_tx: mpsc::Sender<RuntimeEvent>,
        executed: Arc<Mutex<Vec<ScheduledTask>>>,
    ) -> Self {
        Self {
            runtime_tx,
            executed,
            outcomes: HashMap::new(),
        }
    }

    /// Make every run of `task` report `outcome`.
    pub fn with_outcome(mut self, task: TaskId, outcome: TaskOutcome) -> Self {
        self.outcomes.insert(task, outcome);
        self
    }
}

impl ExecutorBackend for FakeExecutor {
    fn spawn_ready_tasks(&mut self, tasks: Vec<ScheduledTask>) -> DispatchFuture<'_> {
        let tx = self.runtime_tx.clone();
        let executed = Arc::clone(&self.executed);
        let outcomes = self.outcomes.clone();

        Box::pin(async move {
            for t in tasks {
                {
                    let mut guard = executed.lock().unwrap();
                    guard.push(t);
                }

                tx.send(RuntimeEvent::TaskCompleted {
                    task: t.task,
                    outcome: outcomes.get(&t.task).copied().unwrap_or(TaskOutcome::Success),
                })
                .await
                .map_err(anyhow::Error::from)?;
            }
            Ok(())
        })
    }
}
