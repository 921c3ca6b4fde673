// src/tasks/clean.rs

use anyhow::Result;
use tracing::{debug, info};

use crate::engine::TaskOutcome;
use crate::tasks::TaskContext;

/// Delete the whole destination tree.
///
/// A missing tree is not an error. A symlinked `dist` is unlinked, never
/// followed.
pub async fn clean(ctx: &TaskContext) -> Result<TaskOutcome> {
    let fs = ctx.fs.clone();
    let dist = ctx.config.paths.dist_dir().to_path_buf();

    tokio::task::spawn_blocking(move || -> Result<()> {
        if fs.is_symlink(&dist) || fs.is_file(&dist) {
            fs.remove_file(&dist)?;
        } else if fs.is_dir(&dist) {
            fs.remove_dir_all(&dist)?;
        } else {
            debug!(dir = ?dist, "nothing to clean");
            return Ok(());
        }
        info!(dir = ?dist, "removed destination tree");
        Ok(())
    })
    .await??;

    Ok(TaskOutcome::Success)
}
