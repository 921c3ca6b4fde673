// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod tasks;
pub mod types;
pub mod watch;

use std::future::Future;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::cli::{CliArgs, Command};
use crate::config::{BuildConfig, load_and_validate};
use crate::dag::{BuildGraph, Scheduler};
use crate::engine::{
    CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions, RuntimeReport, TriggerReason,
};
use crate::exec::RealExecutorBackend;
use crate::tasks::scripts::bundler_command;
use crate::tasks::test_runner::test_command;
use crate::tasks::{LintScope, TaskContext};
use crate::types::{AssetKind, BuildOptions, TransformOptions};

/// High-level entry point used by `main.rs`. Returns the process exit code.
pub async fn run(args: CliArgs) -> Result<i32> {
    let config_path = PathBuf::from(&args.config);
    let tools = load_and_validate(&config_path)?;
    let root = config_root_dir(&config_path);
    debug!(root = ?root, "project root");

    let config = BuildConfig::new(root, tools);

    match &args.command {
        Command::Build(build_args) => {
            let options = BuildOptions::from(build_args);
            if build_args.dry_run {
                print_dry_run(&config, &options)?;
                return Ok(0);
            }
            build(TaskContext::real(config), options).await
        }
        Command::Lint => lint(TaskContext::real(config), LintScope::All).await,
        Command::PreCommit => lint(TaskContext::real(config), LintScope::Staged).await,
        Command::Test(test_args) => {
            let options = BuildOptions::from(test_args);
            let report = tasks::run_tests(&TaskContext::real(config), &options).await?;
            Ok(report.exit_code)
        }
    }
}

/// Run `build` and map the result to an exit code.
///
/// One-shot builds exit non-zero if any task failed or the build was
/// interrupted before it finished. Watch mode only stops on Ctrl-C, which is
/// a normal exit.
pub async fn build(ctx: TaskContext, options: BuildOptions) -> Result<i32> {
    let report = run_build(ctx, options).await?;

    if options.enters_watch() {
        return Ok(0);
    }
    if report.interrupted {
        error!(finished_runs = report.runs.len(), "build interrupted");
        Ok(1)
    } else if report.is_success() {
        info!("build succeeded");
        Ok(0)
    } else {
        error!(failed = ?report.failed_tasks(), "build failed");
        Ok(1)
    }
}

/// Wire the scheduler, runtime, executor and (in watch mode) the file
/// watcher together, trigger the graph roots and drive the runtime until it
/// stops. Ctrl-C requests a graceful shutdown.
pub async fn run_build(ctx: TaskContext, options: BuildOptions) -> Result<RuntimeReport> {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };
    run_build_until(ctx, options, ctrl_c).await
}

/// [`run_build`] with a caller-supplied shutdown signal: the runtime stops
/// once `shutdown` resolves (or, for one-shot builds, when the graph is
/// done).
pub async fn run_build_until<S>(
    ctx: TaskContext,
    options: BuildOptions,
    shutdown: S,
) -> Result<RuntimeReport>
where
    S: Future<Output = ()> + Send + 'static,
{
    let mode = options.mode();
    let watch = options.enters_watch();
    let watch_cfg = ctx.config.tools.watch.clone();
    info!(mode = mode.as_str(), watch, "starting build");

    let scheduler = Scheduler::new(mode);
    let roots = scheduler.graph().roots();

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let executor = RealExecutorBackend::new(rt_tx.clone(), ctx.clone());

    // The watcher starts before the initial build so no change is missed;
    // its triggers queue behind the initial run.
    let _watcher_handle = if watch {
        let profiles = watch::build_watch_profiles(&ctx.config.paths)?;
        let handle = watch::spawn_watcher(
            ctx.root(),
            profiles,
            ctx.config.tools.debounce(),
            rt_tx.clone(),
        )?;
        info!(dirs = ?handle.watched_dirs(), "watching for changes");
        Some(handle)
    } else {
        None
    };

    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            shutdown.await;
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    info!(?roots, "initial graph roots to trigger at startup");
    for task in roots {
        rt_tx
            .send(RuntimeEvent::TaskTriggered {
                task,
                reason: TriggerReason::Manual,
            })
            .await?;
    }

    let options = RuntimeOptions {
        exit_when_idle: !watch,
    };

    // Construct the pure core runtime (single source of truth for semantics).
    let core = CoreRuntime::new(
        scheduler,
        watch_cfg.triggered_while_running_behaviour,
        watch_cfg.queue_length,
        options,
    );

    let runtime = Runtime::new(core, rt_rx, executor);
    Ok(runtime.run().await?)
}

async fn lint(ctx: TaskContext, scope: LintScope) -> Result<i32> {
    let outcome = tasks::lint(&ctx, scope).await?;
    Ok(if outcome.is_success() { 0 } else { 1 })
}

/// Figure out the project root.
///
/// - If the config path has a non-empty parent (e.g. "web/Assetflow.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Assetflow.toml" (parent = ""),
///   we fall back to the current working directory.
///
/// The result is absolute so watcher event paths can be relativized against
/// it.
pub fn config_root_dir(config_path: &Path) -> PathBuf {
    let dir = match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::path::absolute(&dir).unwrap_or(dir)
}

/// Dry-run output: paths, tool commands and build order.
fn print_dry_run(config: &BuildConfig, options: &BuildOptions) -> Result<()> {
    let mode = options.mode();
    let ctx = TaskContext::real(config.clone());
    let transform = TransformOptions {
        debug: mode.is_debug(),
    };

    println!("assetflow dry-run");
    println!("  root  = {}", config.root().display());
    println!("  mode  = {}", mode.as_str());
    println!("  watch = {}", options.enters_watch());
    println!();

    println!("paths:");
    println!("  dist -> {}", config.paths.dist_dir().display());
    for kind in AssetKind::ALL {
        let asset = config.paths.for_kind(kind);
        println!(
            "  {kind}: {} ({}) -> {}",
            asset.source_dir.display(),
            asset.pattern,
            asset.dest_dir.display()
        );
    }
    println!();

    println!("tools:");
    println!("  bundler: {}", bundler_command(&ctx, transform)?.display());
    println!("  browsers: {:?}", config.tools.styles.browsers);
    println!("  linter: {}", config.tools.lint.command.join(" "));
    println!("  test runner: {}", test_command(&ctx, &BuildOptions::default())?.display());
    println!();

    let graph = BuildGraph::new();
    println!("build order:");
    for task in graph.topological_order() {
        let deps = graph.dependencies_of(task);
        if deps.is_empty() {
            println!("  - {task}");
        } else {
            let deps: Vec<&str> = deps.iter().map(|d| d.as_str()).collect();
            println!("  - {task} (after {})", deps.join(", "));
        }
    }

    if options.enters_watch() {
        println!();
        println!("watch (debounce {:?}):", config.tools.debounce());
        for profile in watch::build_watch_profiles(&config.paths)? {
            println!("  {} <- {:?}", profile.task(), profile.patterns());
        }
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
