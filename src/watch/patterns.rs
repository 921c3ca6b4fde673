// src/watch/patterns.rs

use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::PathConfig;
use crate::types::{AssetKind, TaskId};

/// Asset kinds the watch loop rebuilds. Images are linked in debug builds,
/// so edits show up without a rebuild.
pub const WATCHED_KINDS: [AssetKind; 2] = [AssetKind::Styles, AssetKind::Scripts];

/// Compiled watch glob for a single task.
///
/// The globs are relative to the project root; the watcher passes relative
/// paths (e.g. `"src/styles/main.scss"`) into [`matches`](Self::matches).
#[derive(Clone)]
pub struct TaskWatchProfile {
    task: TaskId,
    /// Directory the watcher observes for this task.
    dir: PathBuf,
    patterns: Vec<String>,
    watch_set: GlobSet,
}

impl fmt::Debug for TaskWatchProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskWatchProfile")
            .field("task", &self.task)
            .field("dir", &self.dir)
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl TaskWatchProfile {
    pub fn new(task: TaskId, dir: impl Into<PathBuf>, patterns: Vec<String>) -> Result<Self> {
        let watch_set = build_globset(&patterns)
            .with_context(|| format!("building watch globset for task {task}"))?;
        Ok(Self {
            task,
            dir: dir.into(),
            patterns,
            watch_set,
        })
    }

    pub fn task(&self) -> TaskId {
        self.task
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Returns true if this task is interested in the given path (relative
    /// to the project root), e.g. `"src/scripts/app.js"`.
    pub fn matches(&self, rel_path: &str) -> bool {
        self.watch_set.is_match(rel_path)
    }
}

/// Watch profiles for the styles and scripts source trees.
pub fn build_watch_profiles(paths: &PathConfig) -> Result<Vec<TaskWatchProfile>> {
    WATCHED_KINDS
        .iter()
        .map(|&kind| {
            let asset = paths.for_kind(kind);
            TaskWatchProfile::new(
                TaskId::from(kind),
                asset.source_dir.clone(),
                vec![asset.root_relative_pattern(paths.root())],
            )
        })
        .collect()
}

/// Tasks whose profile matches `rel_path`, in profile order.
pub fn tasks_for_path(profiles: &[TaskWatchProfile], rel_path: &str) -> Vec<TaskId> {
    profiles
        .iter()
        .filter(|p| p.matches(rel_path))
        .map(TaskWatchProfile::task)
        .collect()
}

/// Build a GlobSet from simple string patterns.
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
