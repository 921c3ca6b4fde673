// src/tasks/styles.rs

//! Sass compilation.
//!
//! Every non-partial `.scss` file under the styles source dir is compiled
//! with grass, then vendor-prefixed and printed by lightningcss. Files are
//! independent: one file's error is reported and the others still build.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use globset::{Glob, GlobMatcher};
use tracing::{debug, error, info, warn};

use crate::engine::TaskOutcome;
use crate::fs::FileSystem;
use crate::tasks::minify::{process_css, resolve_targets};
use crate::tasks::{TaskContext, relative_slash_path, walk_files};
use crate::types::{AssetKind, TransformOptions};

/// Compile the project's stylesheets into the CSS destination dir.
pub async fn compile_styles(ctx: &TaskContext, options: TransformOptions) -> Result<TaskOutcome> {
    let ctx = ctx.clone();
    tokio::task::spawn_blocking(move || compile_styles_blocking(&ctx, options)).await?
}

fn compile_styles_blocking(ctx: &TaskContext, options: TransformOptions) -> Result<TaskOutcome> {
    let paths = ctx.config.paths.for_kind(AssetKind::Styles);
    let fs = ctx.fs.as_ref();

    if !fs.is_dir(&paths.source_dir) {
        warn!(dir = ?paths.source_dir, "styles source dir missing; nothing to compile");
        return Ok(TaskOutcome::Success);
    }

    let browsers = resolve_targets(&ctx.config.tools.styles.browsers)?;
    let entries = style_entries(fs, &paths.source_dir, paths.pattern)?;
    info!(count = entries.len(), debug = options.debug, "compiling stylesheets");

    let mut failed = 0usize;
    for entry in &entries {
        let rel = relative_slash_path(entry, &paths.source_dir);
        let out = paths.dest_dir.join(&rel).with_extension("css");

        match compile_one(fs, entry, &paths.source_dir, &rel, browsers, options.debug) {
            Ok(css) => {
                fs.write(&out, css.as_bytes())?;
                debug!(file = ?entry, out = ?out, "stylesheet written");
            }
            Err(err) => {
                failed += 1;
                error!(file = ?entry, error = ?err, "stylesheet failed to compile");
            }
        }
    }

    if failed > 0 {
        error!(failed, total = entries.len(), "styles finished with errors");
        Ok(TaskOutcome::Failed)
    } else {
        Ok(TaskOutcome::Success)
    }
}

/// Non-partial files under `source_dir` matching `pattern`.
///
/// Files whose name starts with `_` are Sass partials and are only ever
/// pulled in through `@use`/`@import`.
pub fn style_entries(fs: &dyn FileSystem, source_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let matcher: GlobMatcher = Glob::new(pattern)
        .with_context(|| format!("invalid styles glob '{pattern}'"))?
        .compile_matcher();

    let entries = walk_files(fs, source_dir, &|_| false)?
        .into_iter()
        .filter(|path| matcher.is_match(relative_slash_path(path, source_dir)))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| !n.starts_with('_'))
        })
        .collect();
    Ok(entries)
}

fn compile_one(
    fs: &dyn FileSystem,
    entry: &Path,
    source_dir: &Path,
    rel: &str,
    browsers: Option<lightningcss::targets::Browsers>,
    debug: bool,
) -> Result<String> {
    let source = fs.read_to_string(entry)?;

    let source_dir = source_dir.to_path_buf();
    let entry_dir = entry.parent().map(Path::to_path_buf);

    let mut sass_options = grass::Options::default().load_path(&source_dir);
    if let Some(dir) = &entry_dir {
        sass_options = sass_options.load_path(dir);
    }

    let css = grass::from_string(source, &sass_options).map_err(|e| anyhow!("{rel}: {e}"))?;
    if debug {
        return Ok(css);
    }
    process_css(&css, rel, browsers)
}
