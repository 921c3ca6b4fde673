use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::dag::graph::BuildGraph;
use crate::dag::scheduler_step::{RunSummary, SchedulerStep};
use crate::dag::state_manager::{ReadOnlyStateManager, StateManager};
use crate::dag::task_info::{RunState, ScheduledTask, TaskInfo, TaskRunState};
use crate::engine::TaskOutcome;
use crate::types::{BuildMode, TaskId};

/// Scheduler holds the immutable build graph plus mutable per-run state.
///
/// It is responsible for:
/// - remembering which tasks are part of the current run
/// - deciding when a triggered task is "ready" to run (deps satisfied)
/// - marking tasks as succeeded/failed
/// - scheduling dependents when appropriate
/// - failing dependents when a task fails
#[derive(Debug)]
pub struct Scheduler {
    graph: BuildGraph,
    mode: BuildMode,
    tasks: BTreeMap<TaskId, TaskInfo>,
    /// Monotonically increasing run ID.
    run_counter: u64,
    /// Currently active run ID, or `None` if there is no active run.
    current_run_id: Option<u64>,
}

impl Scheduler {
    /// Construct a scheduler over the fixed build graph. Every dispatched
    /// task carries the transform options of `mode`.
    pub fn new(mode: BuildMode) -> Self {
        let graph = BuildGraph::new();

        let tasks = graph
            .tasks()
            .map(|id| (id, TaskInfo::new(id, graph.dependencies_of(id))))
            .collect();

        Self {
            graph,
            mode,
            tasks,
            run_counter: 0,
            current_run_id: None,
        }
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    pub fn graph(&self) -> &BuildGraph {
        &self.graph
    }

    /// Returns `true` if there is currently no active run.
    pub fn is_idle(&self) -> bool {
        self.current_run_id.is_none()
    }

    /// Current run ID, if any.
    pub fn current_run_id(&self) -> Option<u64> {
        self.current_run_id
    }

    /// Read-only view of the given task's run state.
    pub fn run_state_of(&self, task: TaskId) -> TaskRunState {
        self.tasks
            .get(&task)
            .map(|info| info.run_state.into())
            .unwrap_or(TaskRunState::NotInRun)
    }

    /// Ids of tasks participating in the *active* run.
    pub fn tasks_in_current_run(&self) -> Vec<TaskId> {
        if self.current_run_id.is_none() {
            return Vec::new();
        }

        self.tasks
            .values()
            .filter(|info| info.run_state.is_some())
            .map(|info| info.id)
            .collect()
    }

    /// Whether the dependencies of `task` are satisfied for the current run.
    pub fn deps_satisfied(&self, task: TaskId) -> bool {
        match self.tasks.get(&task) {
            Some(info) => ReadOnlyStateManager::new(&self.tasks).deps_satisfied_for_info(info),
            None => false,
        }
    }

    /// Start a new run, resetting per-run state but keeping historical success
    /// information (for dependency satisfaction on later runs).
    pub fn start_new_run(&mut self) {
        self.run_counter += 1;
        self.current_run_id = Some(self.run_counter);

        for info in self.tasks.values_mut() {
            info.run_state = None;
        }

        debug!(run_id = self.run_counter, "scheduler: starting new run");
    }

    /// Handle a trigger for a task (production API).
    pub fn handle_trigger(&mut self, task: TaskId) -> Vec<ScheduledTask> {
        self.step_trigger(task).newly_scheduled
    }

    /// Handle completion of a task with a concrete outcome (production API).
    pub fn handle_completion(&mut self, task: TaskId, outcome: TaskOutcome) -> Vec<ScheduledTask> {
        self.step_completion(task, outcome).newly_scheduled
    }

    /// Trigger a task and return a rich [`SchedulerStep`].
    ///
    /// The task and its dependents join the current run (one is started if
    /// the scheduler is idle), together with any upstream dependency that
    /// has never succeeded.
    pub fn step_trigger(&mut self, task: TaskId) -> SchedulerStep {
        if self.current_run_id.is_none() {
            debug!(task = %task, "trigger with no active run; starting a new run");
            self.start_new_run();
        }

        let options = self.mode.transform_options();
        let mut manager = StateManager::new(&self.graph, &mut self.tasks, self.current_run_id);
        manager.mark_task_and_dependents_pending(task);
        manager.mark_unsatisfied_upstream_pending(task);
        let newly_failed = manager.fail_blocked_pending();
        let newly_scheduled = manager.collect_new_ready_tasks(options);
        let finished_run = self.maybe_finish_run();

        SchedulerStep {
            newly_scheduled,
            newly_failed,
            finished_run,
        }
    }

    /// Record a task's completion and return a rich [`SchedulerStep`].
    pub fn step_completion(&mut self, task: TaskId, outcome: TaskOutcome) -> SchedulerStep {
        let Some(run_id) = self.current_run_id else {
            warn!(task = %task, "completion with no active run; ignoring");
            return SchedulerStep::default();
        };

        let options = self.mode.transform_options();
        let mut newly_scheduled = Vec::new();
        let mut newly_failed = Vec::new();

        match self.tasks.get_mut(&task) {
            Some(info) if info.run_state == Some(RunState::Running) => match outcome {
                TaskOutcome::Success => {
                    info.run_state = Some(RunState::DoneSuccess);
                    info.last_successful_run = Some(run_id);
                    info.last_finished_run = Some(run_id);
                    debug!(task = %task, run_id, "task completed successfully");
                    let mut manager =
                        StateManager::new(&self.graph, &mut self.tasks, self.current_run_id);
                    newly_scheduled.extend(manager.collect_new_ready_tasks(options));
                }
                TaskOutcome::Failed => {
                    info.run_state = Some(RunState::DoneFailed);
                    info.last_finished_run = Some(run_id);
                    warn!(task = %task, run_id, "task failed; failing dependents in this run");
                    newly_failed.push(task);
                    let mut manager =
                        StateManager::new(&self.graph, &mut self.tasks, self.current_run_id);
                    newly_failed.append(&mut manager.mark_dependents_failed(task));
                }
            },
            Some(info) => {
                warn!(
                    task = %task,
                    run_id,
                    state = ?info.run_state,
                    "completion for a task that is not running in this run; ignoring"
                );
            }
            None => {
                warn!(task = %task, "completion for unknown task; ignoring");
            }
        }

        let finished_run = self.maybe_finish_run();

        SchedulerStep {
            newly_scheduled,
            newly_failed,
            finished_run,
        }
    }

    /// All task ids in the graph.
    pub fn task_ids(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.tasks.keys().copied()
    }

    /// If every task is terminal, close the run and summarize it.
    fn maybe_finish_run(&mut self) -> Option<RunSummary> {
        let run_id = self.current_run_id?;

        let manager = StateManager::new(&self.graph, &mut self.tasks, self.current_run_id);
        if !manager.all_tasks_terminal() {
            return None;
        }

        let outcomes = self
            .tasks
            .values()
            .filter(|info| info.run_state.is_some())
            .map(|info| (info.id, TaskRunState::from(info.run_state)))
            .collect();

        info!(run_id, "scheduler: all tasks terminal; marking run as finished");
        self.current_run_id = None;

        Some(RunSummary { run_id, outcomes })
    }
}
