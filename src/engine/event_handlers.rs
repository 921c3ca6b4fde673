// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use std::collections::BTreeSet;

use tracing::debug;

use crate::dag::{RunSummary, ScheduledTask, Scheduler, SchedulerStep, TaskRunState};
use crate::engine::queue::TriggerQueue;
use crate::engine::{RuntimeOptions, TaskOutcome, TriggerReason};
use crate::types::TaskId;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone)]
pub enum CoreCommand {
    /// Send these tasks to the executor.
    DispatchTasks(Vec<ScheduledTask>),
    /// A run just finished; report its outcome.
    ReportRun(RunSummary),
    /// Request that the process exits (one-shot builds, once idle).
    RequestExit,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute (send tasks, report, exit).
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn running(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }

    /// Tasks dispatched by this step, in order.
    pub fn dispatched(&self) -> Vec<TaskId> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                CoreCommand::DispatchTasks(tasks) => Some(tasks.iter().map(|t| t.task)),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Summaries of runs finished by this step.
    pub fn finished_runs(&self) -> Vec<&RunSummary> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                CoreCommand::ReportRun(summary) => Some(summary),
                _ => None,
            })
            .collect()
    }
}

/// Handle a task trigger event.
///
/// - If the scheduler is idle, a new run starts, seeded with this trigger
///   plus anything that was already queued.
/// - If a run is active:
///   - a task already participating in this run is recorded in the queue
///     for a *future* run, so two instances never overlap;
///   - a task *not* in the current run is merged into it right away, so
///     unrelated transforms share the run and proceed in parallel.
pub fn handle_task_trigger(
    scheduler: &mut Scheduler,
    queue: &mut TriggerQueue,
    options: &RuntimeOptions,
    task: TaskId,
    reason: TriggerReason,
) -> CoreStep {
    debug!(task = %task, ?reason, "handling trigger");
    let mut commands = Vec::new();

    if scheduler.is_idle() {
        let mut triggers: BTreeSet<TaskId> = queue.drain_pending().into_iter().collect();
        triggers.insert(task);

        commands.extend(start_new_run_from_triggers(scheduler, triggers.into_iter().collect()));
    } else {
        match scheduler.run_state_of(task) {
            TaskRunState::NotInRun => {
                let step = scheduler.step_trigger(task);
                push_step(&mut commands, step);
            }
            _already_in_run => {
                queue.record_trigger(task);
            }
        }
    }

    finish_step(scheduler, queue, options, commands)
}

/// Handle a task completion event.
pub fn handle_task_completion(
    scheduler: &mut Scheduler,
    queue: &mut TriggerQueue,
    options: &RuntimeOptions,
    task: TaskId,
    outcome: TaskOutcome,
) -> CoreStep {
    let mut commands = Vec::new();

    let step = scheduler.step_completion(task, outcome);
    push_step(&mut commands, step);

    finish_step(scheduler, queue, options, commands)
}

/// Seed a new run from a set of triggers.
///
/// This mirrors the async runtime's startup, but is pure and returns
/// commands instead of performing IO.
pub fn start_new_run_from_triggers(
    scheduler: &mut Scheduler,
    triggers: Vec<TaskId>,
) -> Vec<CoreCommand> {
    let mut commands = Vec::new();

    if triggers.is_empty() {
        return commands;
    }

    let mut all_ready = Vec::new();
    for task in triggers {
        let step = scheduler.step_trigger(task);
        all_ready.extend(step.newly_scheduled);
        if let Some(summary) = step.finished_run {
            commands.push(CoreCommand::ReportRun(summary));
        }
    }

    if !all_ready.is_empty() {
        commands.insert(0, CoreCommand::DispatchTasks(all_ready));
    }

    commands
}

fn push_step(commands: &mut Vec<CoreCommand>, step: SchedulerStep) {
    if !step.newly_scheduled.is_empty() {
        commands.push(CoreCommand::DispatchTasks(step.newly_scheduled));
    }
    if let Some(summary) = step.finished_run {
        commands.push(CoreCommand::ReportRun(summary));
    }
}

/// Start any queued run once idle, then decide whether to keep running.
fn finish_step(
    scheduler: &mut Scheduler,
    queue: &mut TriggerQueue,
    options: &RuntimeOptions,
    mut commands: Vec<CoreCommand>,
) -> CoreStep {
    if scheduler.is_idle() {
        let triggers = queue.drain_pending();
        commands.extend(start_new_run_from_triggers(scheduler, triggers));
    }

    if options.exit_when_idle && scheduler.is_idle() && queue.is_empty() {
        commands.push(CoreCommand::RequestExit);
        return CoreStep {
            commands,
            keep_running: false,
        };
    }

    CoreStep::running(commands)
}
