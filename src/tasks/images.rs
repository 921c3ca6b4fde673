// src/tasks/images.rs

use std::path::Path;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::engine::TaskOutcome;
use crate::fs::FileSystem;
use crate::tasks::{TaskContext, walk_files};
use crate::types::{AssetKind, TransformOptions};

/// Make the source images available under the destination tree.
///
/// Production copies every file, preserving relative paths. Debug replaces
/// the destination with one directory symlink to the (absolute) source dir,
/// so edited images show up without a rebuild.
pub async fn place_images(ctx: &TaskContext, options: TransformOptions) -> Result<TaskOutcome> {
    let ctx = ctx.clone();
    tokio::task::spawn_blocking(move || -> Result<TaskOutcome> {
        let paths = ctx.config.paths.for_kind(AssetKind::Images);
        let fs = ctx.fs.as_ref();

        if !fs.is_dir(&paths.source_dir) {
            warn!(dir = ?paths.source_dir, "images source dir missing; nothing to place");
            return Ok(TaskOutcome::Success);
        }

        if options.debug {
            link_images(fs, &paths.source_dir, &paths.dest_dir)?;
        } else {
            copy_images(fs, &paths.source_dir, &paths.dest_dir)?;
        }
        Ok(TaskOutcome::Success)
    })
    .await?
}

fn link_images(fs: &dyn FileSystem, source: &Path, dest: &Path) -> Result<()> {
    remove_existing(fs, dest)?;
    let target = fs.canonicalize(source)?;
    fs.symlink_dir(&target, dest)?;
    info!(link = ?dest, target = ?target, "linked images");
    Ok(())
}

fn copy_images(fs: &dyn FileSystem, source: &Path, dest: &Path) -> Result<()> {
    // A link left by an earlier debug build would route copies back into
    // the source tree.
    if fs.is_symlink(dest) {
        fs.remove_file(dest)?;
    }

    let files = walk_files(fs, source, &|_| false)?;
    for file in &files {
        let Ok(rel) = file.strip_prefix(source) else {
            continue;
        };
        let to = dest.join(rel);
        fs.copy_file(file, &to)?;
        debug!(from = ?file, to = ?to, "copied image");
    }
    info!(count = files.len(), dest = ?dest, "copied images");
    Ok(())
}

fn remove_existing(fs: &dyn FileSystem, path: &Path) -> Result<()> {
    if fs.is_symlink(path) || fs.is_file(path) {
        fs.remove_file(path)?;
    } else if fs.is_dir(path) {
        fs.remove_dir_all(path)?;
    }
    Ok(())
}
