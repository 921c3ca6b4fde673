// src/tasks/test_runner.rs

use std::collections::BTreeMap;

use anyhow::Result;
use tracing::{error, info, warn};

use crate::engine::TaskOutcome;
use crate::exec::{CommandSpec, OutputMode, run_process_until};
use crate::tasks::TaskContext;
use crate::types::BuildOptions;

/// Result of a test runner invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestReport {
    pub outcome: TaskOutcome,
    /// The runner's own exit code, `0` when it was interrupted in watch mode.
    pub exit_code: i32,
}

/// Resolve the test runner command for `options`.
///
/// `watch` selects the runner's watch arguments instead of its single-run
/// ones; `coverage` appends the coverage arguments.
pub fn test_command(ctx: &TaskContext, options: &BuildOptions) -> Result<CommandSpec> {
    let test = &ctx.config.tools.test;
    let root = ctx.root();

    let vars = BTreeMap::from([
        ("CONFIG", root.join(&test.config).display().to_string()),
        ("ROOT", root.display().to_string()),
    ]);

    let mode_args = if options.watch {
        &test.watch_args
    } else {
        &test.single_run_args
    };

    let mut spec = CommandSpec::from_template(&test.command, &vars)?
        .args(mode_args.iter().cloned())
        .cwd(root);
    if options.coverage {
        spec = spec.args(test.coverage_args.iter().cloned());
    }
    Ok(spec)
}

/// Run the unit tests with inherited stdio.
///
/// In watch mode the runner keeps going until it exits by itself or Ctrl-C
/// is pressed, in which case it is killed and the run counts as passed.
pub async fn run_tests(ctx: &TaskContext, options: &BuildOptions) -> Result<TestReport> {
    let spec = test_command(ctx, options)?;
    info!(watch = options.watch, coverage = options.coverage, "running unit tests");

    let cancel = async {
        if tokio::signal::ctrl_c().await.is_err() {
            warn!("failed to listen for Ctrl+C; test runner can only exit by itself");
            std::future::pending::<()>().await;
        }
    };

    let output = run_process_until(&spec, OutputMode::Inherit, "test", cancel).await?;

    let report = match output.code {
        Some(0) => TestReport {
            outcome: TaskOutcome::Success,
            exit_code: 0,
        },
        None if options.watch => {
            info!("test watcher stopped");
            TestReport {
                outcome: TaskOutcome::Success,
                exit_code: 0,
            }
        }
        _ => {
            let exit_code = output.code.filter(|code| *code > 0).unwrap_or(1);
            error!(exit_code, "unit tests failed");
            TestReport {
                outcome: TaskOutcome::Failed,
                exit_code,
            }
        }
    };
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BuildConfig, ConfigFile, RawConfigFile};
    use crate::fs::RealFileSystem;
    use std::sync::Arc;

    fn ctx() -> TaskContext {
        let tools = ConfigFile::try_from(RawConfigFile::default()).unwrap();
        TaskContext::new(Arc::new(BuildConfig::new("/proj", tools)), Arc::new(RealFileSystem))
    }

    #[test]
    fn single_run_is_the_default() {
        let spec = test_command(&ctx(), &BuildOptions::default()).unwrap();
        assert_eq!(spec.program, "karma");
        assert_eq!(spec.args, vec!["start", "/proj/karma.conf.js", "--single-run"]);
    }

    #[test]
    fn watch_with_coverage_appends_both_arg_sets() {
        let options = BuildOptions {
            watch: true,
            coverage: true,
            ..BuildOptions::default()
        };
        let spec = test_command(&ctx(), &options).unwrap();
        assert_eq!(
            spec.args,
            vec![
                "start",
                "/proj/karma.conf.js",
                "--no-single-run",
                "--auto-watch",
                "--reporters",
                "progress,coverage"
            ]
        );
    }
}
