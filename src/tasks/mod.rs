// src/tasks/mod.rs

//! Build and quality tasks.
//!
//! The build graph's nodes ([`TaskId`]) resolve to their entry points through
//! [`run_task`]; the quality tasks ([`lint`] and [`test_runner`]) are invoked
//! directly from the CLI.

pub mod clean;
pub mod ignore;
pub mod images;
pub mod lint;
pub mod minify;
pub mod scripts;
pub mod styles;
pub mod test_runner;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::config::BuildConfig;
use crate::engine::TaskOutcome;
use crate::fs::{FileSystem, RealFileSystem};
use crate::types::{TaskId, TransformOptions};

pub use clean::clean;
pub use ignore::IgnoreList;
pub use images::place_images;
pub use lint::{LintScope, LintSummary, lint};
pub use scripts::bundle_scripts;
pub use styles::compile_styles;
pub use test_runner::{TestReport, run_tests};

/// Shared, immutable inputs of every task.
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub config: Arc<BuildConfig>,
    pub fs: Arc<dyn FileSystem>,
}

impl TaskContext {
    pub fn new(config: Arc<BuildConfig>, fs: Arc<dyn FileSystem>) -> Self {
        Self { config, fs }
    }

    /// Context backed by the real filesystem.
    pub fn real(config: BuildConfig) -> Self {
        Self::new(Arc::new(config), Arc::new(RealFileSystem))
    }

    pub fn root(&self) -> &Path {
        self.config.root()
    }
}

/// Run the entry point of a build graph task.
pub async fn run_task(
    task: TaskId,
    ctx: &TaskContext,
    options: TransformOptions,
) -> Result<TaskOutcome> {
    match task {
        TaskId::Clean => clean(ctx).await,
        TaskId::Styles => compile_styles(ctx, options).await,
        TaskId::Scripts => bundle_scripts(ctx, options).await,
        TaskId::Images => place_images(ctx, options).await,
    }
}

/// Recursively list the files under `dir`, skipping directories for which
/// `prune` returns true. Symlinks are reported as files and never followed.
pub(crate) fn walk_files(
    fs: &dyn FileSystem,
    dir: &Path,
    prune: &dyn Fn(&Path) -> bool,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stack = vec![dir.to_path_buf()];

    while let Some(current) = stack.pop() {
        let mut entries = fs.read_dir(&current)?;
        entries.sort();
        for entry in entries {
            if fs.is_dir(&entry) && !fs.is_symlink(&entry) {
                if !prune(&entry) {
                    stack.push(entry);
                }
            } else {
                files.push(entry);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// `path` relative to `base`, with forward slashes.
pub(crate) fn relative_slash_path(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
