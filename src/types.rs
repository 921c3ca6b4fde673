use std::fmt;

use serde::Deserialize;

/// The three asset kinds the build knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssetKind {
    Styles,
    Scripts,
    Images,
}

impl AssetKind {
    pub const ALL: [AssetKind; 3] = [AssetKind::Styles, AssetKind::Scripts, AssetKind::Images];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Styles => "styles",
            AssetKind::Scripts => "scripts",
            AssetKind::Images => "images",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a node in the build graph.
///
/// Every id maps to exactly one entry point in [`crate::tasks::run_task`];
/// the mapping is a `match`, so adding a variant without an entry point does
/// not compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TaskId {
    Clean,
    Styles,
    Scripts,
    Images,
}

impl TaskId {
    pub const ALL: [TaskId; 4] = [TaskId::Clean, TaskId::Styles, TaskId::Scripts, TaskId::Images];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskId::Clean => "clean",
            TaskId::Styles => "styles",
            TaskId::Scripts => "scripts",
            TaskId::Images => "images",
        }
    }
}

impl From<AssetKind> for TaskId {
    fn from(kind: AssetKind) -> Self {
        match kind {
            AssetKind::Styles => TaskId::Styles,
            AssetKind::Scripts => TaskId::Scripts,
            AssetKind::Images => TaskId::Images,
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Debug or production build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildMode {
    Debug,
    #[default]
    Production,
}

impl BuildMode {
    pub fn from_debug(debug: bool) -> Self {
        if debug { BuildMode::Debug } else { BuildMode::Production }
    }

    pub fn is_debug(&self) -> bool {
        matches!(self, BuildMode::Debug)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildMode::Debug => "debug",
            BuildMode::Production => "production",
        }
    }

    pub fn transform_options(&self) -> TransformOptions {
        TransformOptions {
            debug: self.is_debug(),
        }
    }
}

/// Options handed to every asset transform task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransformOptions {
    /// Skip minification and symlink images instead of copying them.
    pub debug: bool,
}

/// Per-invocation options as parsed from the command line.
///
/// `watch` means "enter the watch loop" for `build` and "keep the runner
/// alive" for `test`; `coverage` only applies to `test`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildOptions {
    pub debug: bool,
    pub watch: bool,
    pub coverage: bool,
}

impl BuildOptions {
    /// `build --watch` implies a debug build: the watch loop only ever
    /// re-runs debug transforms.
    pub fn mode(&self) -> BuildMode {
        BuildMode::from_debug(self.debug || self.watch)
    }

    pub fn enters_watch(&self) -> bool {
        self.debug || self.watch
    }
}

/// Behaviour when a new trigger arrives while a run is already in progress.
///
/// - `Queue`: remember the trigger and start a new run when the current one
///   finishes (default behaviour).
/// - `Cancel`: a new trigger for a task replaces that task's queued
///   follow-up, so at most one follow-up per task is kept. Queued triggers
///   for other tasks are untouched, and the running transform is never
///   interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TriggerWhileRunningBehaviour {
    #[default]
    Queue,
    Cancel,
}
