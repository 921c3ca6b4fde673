// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::dag::{RunSummary, ScheduledTask};
use crate::errors::Result;
use crate::exec::ExecutorBackend;

use super::core::CoreRuntime;
use super::{CoreCommand, RuntimeEvent, RuntimeReport};

/// Drives the build scheduler in response to `RuntimeEvent`s,
/// and delegates actual task execution to an `ExecutorBackend`.
///
/// This is a pure IO shell around `CoreRuntime`, which contains all the
/// runtime semantics. This struct handles async IO: reading events from
/// channels and dispatching tasks to the executor.
pub struct Runtime<E: ExecutorBackend> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    executor: E,
    report: RuntimeReport,
}

impl<E: ExecutorBackend> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("report", &self.report)
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Runtime<E> {
    pub fn new(core: CoreRuntime, event_rx: mpsc::Receiver<RuntimeEvent>, executor: E) -> Self {
        Self {
            core,
            event_rx,
            executor,
            report: RuntimeReport::default(),
        }
    }

    /// Main event loop.
    ///
    /// - Consumes `RuntimeEvent`s from `event_rx`.
    /// - Feeds them into the core runtime.
    /// - Executes commands returned by the core (dispatch tasks, report
    ///   finished runs, exit).
    ///
    /// Returns every run summary observed before the loop stopped.
    pub async fn run(mut self) -> Result<RuntimeReport> {
        info!("assetflow runtime started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    self.mark_interrupted_if_busy();
                    break;
                }
            };

            debug!(?event, "runtime received event");

            if matches!(event, RuntimeEvent::ShutdownRequested) {
                self.mark_interrupted_if_busy();
            }

            let step = self.core.step(event);

            for command in step.commands {
                self.execute_command(command).await?;
            }

            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        info!(
            runs = self.report.runs.len(),
            interrupted = self.report.interrupted,
            "runtime exiting"
        );
        Ok(self.report)
    }

    fn mark_interrupted_if_busy(&mut self) {
        if !self.core.is_idle() {
            warn!("stopping with a build run still in progress");
            self.report.interrupted = true;
        }
    }

    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::DispatchTasks(tasks) => {
                self.spawn_ready(tasks).await?;
            }
            CoreCommand::ReportRun(summary) => {
                log_summary(&summary);
                self.report.runs.push(summary);
            }
            CoreCommand::RequestExit => {
                debug!("core issued RequestExit command");
            }
        }
        Ok(())
    }

    async fn spawn_ready(&mut self, tasks: Vec<ScheduledTask>) -> Result<()> {
        if tasks.is_empty() {
            return Ok(());
        }

        let ids: Vec<_> = tasks.iter().map(|t| t.task.as_str()).collect();
        let run_ids: Vec<_> = tasks.iter().map(|t| t.run_id).collect();
        debug!(?ids, ?run_ids, "spawning ready tasks");

        self.executor.spawn_ready_tasks(tasks).await
    }
}

fn log_summary(summary: &RunSummary) {
    let succeeded: Vec<_> = summary.succeeded().iter().map(|t| t.as_str()).collect();
    let failed: Vec<_> = summary.failed().iter().map(|t| t.as_str()).collect();

    if summary.is_success() {
        info!(run_id = summary.run_id, ?succeeded, "build run finished");
    } else {
        error!(run_id = summary.run_id, ?succeeded, ?failed, "build run finished with failures");
    }
}
