// src/tasks/lint.rs

//! JavaScript linting over the project file set.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;
use tracing::{debug, error, info, warn};

use crate::engine::TaskOutcome;
use crate::exec::{CommandSpec, OutputMode, run_process};
use crate::fs::FileSystem;
use crate::tasks::ignore::IgnoreList;
use crate::tasks::{TaskContext, relative_slash_path, walk_files};

static SUMMARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+) problems? \((\d+) errors?, (\d+) warnings?\)").expect("static regex")
});

/// Which files a lint run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintScope {
    /// Every file in the lint file set.
    All,
    /// Only files currently staged for commit (pre-commit hook).
    Staged,
}

/// Counts parsed from the linter's report footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LintSummary {
    pub problems: u32,
    pub errors: u32,
    pub warnings: u32,
}

impl LintSummary {
    /// Parse the `N problems (E errors, W warnings)` footer, if present.
    pub fn parse(output: &str) -> Option<Self> {
        let caps = SUMMARY_RE.captures(output)?;
        Some(Self {
            problems: caps[1].parse().ok()?,
            errors: caps[2].parse().ok()?,
            warnings: caps[3].parse().ok()?,
        })
    }
}

/// Lint the project.
///
/// An empty file set succeeds without running the linter. Any non-zero
/// linter exit is a failure.
pub async fn lint(ctx: &TaskContext, scope: LintScope) -> Result<TaskOutcome> {
    let mut files = {
        let ctx = ctx.clone();
        tokio::task::spawn_blocking(move || lint_file_set(&ctx)).await??
    };

    if scope == LintScope::Staged {
        let staged = staged_files(ctx).await?;
        files.retain(|rel| staged.contains(rel));
    }

    if files.is_empty() {
        info!(?scope, "no files to lint");
        return Ok(TaskOutcome::Success);
    }

    let root = ctx.root();
    let vars = BTreeMap::from([("ROOT", root.display().to_string())]);
    let spec = CommandSpec::from_template(&ctx.config.tools.lint.command, &vars)?
        .args(files.iter().cloned())
        .cwd(root);

    info!(?scope, count = files.len(), "linting");
    let output = run_process(&spec, OutputMode::Capture, "lint").await?;

    if !output.stdout.is_empty() {
        print!("{}", output.stdout);
    }
    if !output.stderr.is_empty() {
        eprint!("{}", output.stderr);
    }

    let summary = LintSummary::parse(&output.stdout).unwrap_or_default();
    if output.success {
        info!(warnings = summary.warnings, "lint passed");
        Ok(TaskOutcome::Success)
    } else {
        error!(
            exit_code = output.exit_code(),
            errors = summary.errors,
            warnings = summary.warnings,
            "lint failed"
        );
        Ok(TaskOutcome::Failed)
    }
}

/// Root-relative paths of every file the linter covers, sorted.
///
/// Walks the project root, pruning ignored directories, and keeps files that
/// match an include glob and are not ignored. The ignore file is read fresh
/// on every call.
pub fn lint_file_set(ctx: &TaskContext) -> Result<Vec<String>> {
    let fs: &dyn FileSystem = ctx.fs.as_ref();
    let root = ctx.root();
    let ignores = IgnoreList::load(fs, &ctx.config.ignore_file())?;
    let include = include_set(&ctx.config.tools.lint.include)?;

    debug!(exclusions = ?ignores.exclusions(), "lint ignore rules");

    let prune = |dir: &Path| ignores.is_dir_ignored(&relative_slash_path(dir, root));
    let files = walk_files(fs, root, &prune)?
        .into_iter()
        .map(|path| relative_slash_path(&path, root))
        .filter(|rel| include.is_match(rel))
        .filter(|rel| !ignores.is_ignored(rel))
        .collect();
    Ok(files)
}

fn include_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).with_context(|| format!("invalid include glob '{pattern}'"))?);
    }
    Ok(builder.build()?)
}

/// Root-relative paths staged for commit, from the configured command.
async fn staged_files(ctx: &TaskContext) -> Result<BTreeSet<String>> {
    let root = ctx.root();
    let vars = BTreeMap::from([("ROOT", root.display().to_string())]);
    let spec = CommandSpec::from_template(&ctx.config.tools.lint.staged_command, &vars)?.cwd(root);

    let output = run_process(&spec, OutputMode::Capture, "staged-files").await?;
    if !output.success {
        bail!(
            "`{}` exited with {}: {}",
            spec.display(),
            output.exit_code(),
            output.stderr.trim()
        );
    }

    let staged: BTreeSet<String> = output
        .stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.replace('\\', "/"))
        .collect();

    if staged.is_empty() {
        warn!("no staged files");
    }
    Ok(staged)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_footer_is_parsed() {
        let out = "\n/p/a.js\n  1:1  error  x\n\n✖ 3 problems (2 errors, 1 warning)\n";
        assert_eq!(
            LintSummary::parse(out),
            Some(LintSummary {
                problems: 3,
                errors: 2,
                warnings: 1
            })
        );
    }

    #[test]
    fn clean_output_has_no_summary() {
        assert_eq!(LintSummary::parse(""), None);
    }
}
