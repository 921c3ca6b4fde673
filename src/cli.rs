// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::DEFAULT_CONFIG_FILE;
use crate::types::BuildOptions;

/// Command-line arguments for `assetflow`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "assetflow",
    version,
    about = "Build, lint and test front-end assets.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML). Its directory is the project root.
    ///
    /// A missing file means "all defaults".
    #[arg(long, global = true, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ASSETFLOW_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Clean the dist tree and build styles, scripts and images.
    Build(BuildArgs),
    /// Lint every JavaScript file not excluded by the ignore file.
    Lint,
    /// Lint only the files staged for commit.
    PreCommit,
    /// Run the unit tests.
    Test(TestArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct BuildArgs {
    /// Debug build: no minification, images symlinked. Keeps watching.
    #[arg(short, long)]
    pub debug: bool,

    /// Keep running and rebuild styles/scripts on change (implies debug).
    #[arg(short, long)]
    pub watch: bool,

    /// Print paths, tool commands and build order without running anything.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Default, Args)]
pub struct TestArgs {
    /// Keep the test runner alive and re-run on change.
    #[arg(short, long)]
    pub watch: bool,

    /// Collect coverage.
    #[arg(short, long)]
    pub coverage: bool,
}

impl From<&BuildArgs> for BuildOptions {
    fn from(args: &BuildArgs) -> Self {
        BuildOptions {
            debug: args.debug,
            watch: args.watch,
            coverage: false,
        }
    }
}

impl From<&TestArgs> for BuildOptions {
    fn from(args: &TestArgs) -> Self {
        BuildOptions {
            debug: false,
            watch: args.watch,
            coverage: args.coverage,
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
