// src/dag/graph.rs

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::types::TaskId;

/// The build graph.
///
/// Edge direction: dependency -> dependent. The graph is fixed:
///
/// ```text
///          +--> styles
/// clean ---+--> scripts
///          +--> images
/// ```
///
/// `clean` must finish before any transform starts; the transforms are
/// independent of each other.
#[derive(Debug, Clone)]
pub struct BuildGraph {
    graph: DiGraphMap<TaskId, ()>,
}

impl BuildGraph {
    pub fn new() -> Self {
        let mut graph = DiGraphMap::new();
        for id in TaskId::ALL {
            graph.add_node(id);
        }
        for transform in [TaskId::Styles, TaskId::Scripts, TaskId::Images] {
            graph.add_edge(TaskId::Clean, transform, ());
        }
        Self { graph }
    }

    /// Return all task ids.
    pub fn tasks(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.graph.nodes()
    }

    /// Immediate dependencies of a task.
    pub fn dependencies_of(&self, task: TaskId) -> Vec<TaskId> {
        let mut deps: Vec<TaskId> = self
            .graph
            .neighbors_directed(task, Direction::Incoming)
            .collect();
        deps.sort();
        deps
    }

    /// Immediate dependents of a task.
    pub fn dependents_of(&self, task: TaskId) -> Vec<TaskId> {
        let mut dependents: Vec<TaskId> = self
            .graph
            .neighbors_directed(task, Direction::Outgoing)
            .collect();
        dependents.sort();
        dependents
    }

    /// Tasks without dependencies; a full build is seeded from these.
    pub fn roots(&self) -> Vec<TaskId> {
        self.tasks()
            .filter(|t| self.dependencies_of(*t).is_empty())
            .collect()
    }

    /// A valid execution order, used for dry-run output.
    pub fn topological_order(&self) -> Vec<TaskId> {
        // The graph is built from constants above and is acyclic.
        toposort(&self.graph, None).unwrap_or_else(|_| TaskId::ALL.to_vec())
    }
}

impl Default for BuildGraph {
    fn default() -> Self {
        Self::new()
    }
}
