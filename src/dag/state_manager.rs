// src/dag/state_manager.rs

//! Per-run state management for tasks in the scheduler.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info, warn};

use crate::dag::BuildGraph;
use crate::dag::task_info::{RunState, ScheduledTask, TaskInfo};
use crate::types::{TaskId, TransformOptions};

/// Manages per-run state transitions for tasks.
pub struct StateManager<'a> {
    graph: &'a BuildGraph,
    tasks: &'a mut BTreeMap<TaskId, TaskInfo>,
    current_run_id: Option<u64>,
}

impl<'a> StateManager<'a> {
    pub fn new(
        graph: &'a BuildGraph,
        tasks: &'a mut BTreeMap<TaskId, TaskInfo>,
        current_run_id: Option<u64>,
    ) -> Self {
        Self {
            graph,
            tasks,
            current_run_id,
        }
    }

    /// Include a triggered task and all its downstream dependents in this run.
    ///
    /// - Tasks that were not yet part of the run (`run_state == None`) are
    ///   marked `Pending`.
    /// - Tasks already participating in this run keep their current state.
    pub fn mark_task_and_dependents_pending(&mut self, root: TaskId) {
        let mut stack: Vec<TaskId> = vec![root];
        let mut visited: HashSet<TaskId> = HashSet::new();

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }

            if let Some(info) = self.tasks.get_mut(&id) {
                if info.run_state.is_none() {
                    info.run_state = Some(RunState::Pending);
                    debug!(task = %id, "marked Pending for this run");
                }
                stack.extend(self.graph.dependents_of(id));
            } else {
                warn!(task = %id, "node in build graph not present in tasks map");
            }
        }
    }

    /// Pull upstream dependencies that have never succeeded into this run.
    ///
    /// A watch trigger for `styles` after a failed initial `clean` would
    /// otherwise wait forever on a dependency nobody is going to run.
    pub fn mark_unsatisfied_upstream_pending(&mut self, task: TaskId) {
        let mut stack: Vec<TaskId> = self.graph.dependencies_of(task);

        while let Some(id) = stack.pop() {
            let Some(info) = self.tasks.get_mut(&id) else {
                continue;
            };
            if info.run_state.is_none() && info.last_successful_run.is_none() {
                info.run_state = Some(RunState::Pending);
                debug!(task = %id, dependent = %task, "pulled never-succeeded dependency into run");
                stack.extend(self.graph.dependencies_of(id));
            }
        }
    }

    /// Mark all *triggered* dependents (and their transitively triggered
    /// dependents) of a failed task as `DoneFailed` for this run.
    ///
    /// Returns the list of tasks that were newly marked as failed (excluding
    /// the root task; the caller should add that separately if desired).
    pub fn mark_dependents_failed(&mut self, failed_task: TaskId) -> Vec<TaskId> {
        let mut stack: Vec<TaskId> = self.graph.dependents_of(failed_task);
        let mut newly_failed = Vec::new();

        while let Some(id) = stack.pop() {
            if let Some(info) = self.tasks.get_mut(&id) {
                // Running dependents are left alone: their completion event
                // is still coming and settles them.
                if info.run_state == Some(RunState::Pending) {
                    info.run_state = Some(RunState::DoneFailed);
                    debug!(
                        task = %id,
                        upstream = %failed_task,
                        "marking dependent as DoneFailed due to upstream failure"
                    );
                    newly_failed.push(id);
                    stack.extend(self.graph.dependents_of(id));
                }
            }
        }

        newly_failed
    }

    /// Fail `Pending` tasks that have a dependency which already failed in
    /// this run. Returns the newly failed tasks.
    pub fn fail_blocked_pending(&mut self) -> Vec<TaskId> {
        let blocked: Vec<TaskId> = self
            .tasks
            .values()
            .filter(|info| info.run_state == Some(RunState::Pending))
            .filter(|info| {
                info.deps.iter().any(|dep| {
                    self.tasks
                        .get(dep)
                        .is_some_and(|d| d.run_state == Some(RunState::DoneFailed))
                })
            })
            .map(|info| info.id)
            .collect();

        let mut newly_failed = Vec::new();
        for id in blocked {
            if let Some(info) = self.tasks.get_mut(&id) {
                info.run_state = Some(RunState::DoneFailed);
                warn!(task = %id, "dependency failed in this run; task blocked");
                newly_failed.push(id);
                newly_failed.extend(self.mark_dependents_failed(id));
            }
        }
        newly_failed
    }

    /// Collect tasks that are `Pending` and whose dependencies are satisfied,
    /// mark them as `Running`, and return them as `ScheduledTask`s.
    pub fn collect_new_ready_tasks(&mut self, options: TransformOptions) -> Vec<ScheduledTask> {
        let mut ready = Vec::new();

        // Decide first, then mutate to avoid borrowing issues.
        let ro = ReadOnlyStateManager::new(&*self.tasks);
        let candidates: Vec<TaskId> = ro
            .tasks
            .values()
            .filter(|info| {
                matches!(info.run_state, Some(RunState::Pending))
                    && ro.deps_satisfied_for_info(info)
            })
            .map(|info| info.id)
            .collect();

        for id in candidates {
            if let Some(info) = self.tasks.get_mut(&id) {
                if info.has_run_before() {
                    info!(task = %id, run_id = self.current_run_id, "scheduling task for re-run");
                } else {
                    info!(task = %id, run_id = self.current_run_id, "scheduling task for first run");
                }

                info.run_state = Some(RunState::Running);
                ready.push(ScheduledTask {
                    task: id,
                    options,
                    run_id: self.current_run_id.unwrap_or(0),
                });
            }
        }

        ready
    }

    /// Check if all tasks are in a terminal state.
    pub fn all_tasks_terminal(&self) -> bool {
        self.tasks
            .values()
            .filter_map(|info| info.run_state)
            .all(RunState::is_terminal)
    }
}

/// A read-only view of the task states for checking dependency satisfaction.
pub struct ReadOnlyStateManager<'a> {
    tasks: &'a BTreeMap<TaskId, TaskInfo>,
}

impl<'a> ReadOnlyStateManager<'a> {
    pub fn new(tasks: &'a BTreeMap<TaskId, TaskInfo>) -> Self {
        Self { tasks }
    }

    /// Determine whether all dependencies of the given task are satisfied for
    /// the *current run*.
    ///
    /// A dependency participating in this run must be `DoneSuccess`; one that
    /// is not participating must have succeeded in an earlier run.
    pub fn deps_satisfied_for_info(&self, info: &TaskInfo) -> bool {
        for dep_id in &info.deps {
            let Some(dep) = self.tasks.get(dep_id) else {
                warn!(task = %info.id, dep = %dep_id, "dependency missing from tasks map");
                return false;
            };

            match dep.run_state {
                Some(RunState::DoneSuccess) => {}
                Some(RunState::DoneFailed) | Some(RunState::Pending) | Some(RunState::Running) => {
                    return false;
                }
                None => {
                    if dep.last_successful_run.is_none() {
                        return false;
                    }
                }
            }
        }

        true
    }
}
