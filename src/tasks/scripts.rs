// src/tasks/scripts.rs

use std::collections::BTreeMap;

use anyhow::Result;
use tracing::{error, info, warn};

use crate::engine::TaskOutcome;
use crate::exec::{CommandSpec, OutputMode, run_process};
use crate::tasks::TaskContext;
use crate::tasks::minify::minify_js;
use crate::types::{BuildMode, TaskId, TransformOptions};

/// Bundle the scripts entry into a single IIFE exposed under the configured
/// global name, then minify it in production.
pub async fn bundle_scripts(ctx: &TaskContext, options: TransformOptions) -> Result<TaskOutcome> {
    let paths = &ctx.config.paths;
    let entry = paths.scripts_entry();
    let bundle = paths.scripts_bundle();

    if !ctx.fs.is_file(&entry) {
        error!(entry = ?entry, "scripts entry file missing");
        return Ok(TaskOutcome::Failed);
    }

    if let Some(parent) = bundle.parent() {
        ctx.fs.create_dir_all(parent)?;
    }

    let spec = bundler_command(ctx, options)?;
    let output = run_process(&spec, OutputMode::Capture, TaskId::Scripts.as_str()).await?;

    if !output.stdout.trim().is_empty() {
        info!(stdout = %output.stdout.trim_end(), "bundler output");
    }

    if !output.success {
        error!(
            exit_code = output.exit_code(),
            stderr = %output.stderr.trim_end(),
            "bundler failed"
        );
        return Ok(TaskOutcome::Failed);
    }
    if !output.stderr.trim().is_empty() {
        warn!(stderr = %output.stderr.trim_end(), "bundler reported warnings");
    }

    if options.debug {
        return Ok(TaskOutcome::Success);
    }

    let source = ctx.fs.read_to_string(&bundle)?;
    let before = source.len();
    let minified = tokio::task::spawn_blocking(move || minify_js(&source)).await?;

    match minified {
        Some(code) => {
            ctx.fs.write(&bundle, code.as_bytes())?;
            info!(bundle = ?bundle, before, after = code.len(), "bundle minified");
            Ok(TaskOutcome::Success)
        }
        None => {
            error!(bundle = ?bundle, "bundle could not be parsed for minification");
            // A production build never leaves an unminified bundle behind.
            if let Err(err) = ctx.fs.remove_file(&bundle) {
                warn!(bundle = ?bundle, error = ?err, "failed to remove unminified bundle");
            }
            Ok(TaskOutcome::Failed)
        }
    }
}

/// Resolve the configured bundler template for this project.
pub fn bundler_command(ctx: &TaskContext, options: TransformOptions) -> Result<CommandSpec> {
    let paths = &ctx.config.paths;
    let root = paths.root();

    let vars = BTreeMap::from([
        ("ENTRY", paths.scripts_entry().display().to_string()),
        ("OUTFILE", paths.scripts_bundle().display().to_string()),
        ("GLOBAL_NAME", ctx.config.tools.scripts.global_name.clone()),
        ("ROOT", root.display().to_string()),
        ("MODE", BuildMode::from_debug(options.debug).as_str().to_string()),
    ]);

    Ok(CommandSpec::from_template(&ctx.config.tools.scripts.bundler, &vars)?.cwd(root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BuildConfig, ConfigFile, RawConfigFile};
    use crate::fs::mock::MockFileSystem;
    use std::sync::Arc;

    fn ctx() -> TaskContext {
        let tools = ConfigFile::try_from(RawConfigFile::default()).unwrap();
        TaskContext::new(
            Arc::new(BuildConfig::new("/proj", tools)),
            Arc::new(MockFileSystem::new()),
        )
    }

    #[test]
    fn default_bundler_template_is_resolved() {
        let spec = bundler_command(&ctx(), TransformOptions { debug: true }).unwrap();
        assert_eq!(spec.program, "esbuild");
        assert!(spec.args.contains(&"/proj/src/scripts/main.js".to_string()));
        assert!(spec.args.contains(&"--global-name=App".to_string()));
        assert!(spec.args.contains(&"--outfile=/proj/dist/js/bundle.js".to_string()));
        assert!(spec.args.contains(&"--format=iife".to_string()));
        assert_eq!(spec.cwd.as_deref(), Some(std::path::Path::new("/proj")));
    }

    #[tokio::test]
    async fn missing_entry_fails_without_spawning() {
        let outcome = bundle_scripts(&ctx(), TransformOptions { debug: false })
            .await
            .unwrap();
        assert_eq!(outcome, TaskOutcome::Failed);
    }
}
