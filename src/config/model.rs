// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::types::TriggerWhileRunningBehaviour;

/// Top-level tool configuration as read from `Assetflow.toml`.
///
/// ```toml
/// [styles]
/// browsers = ["last 2 versions"]
///
/// [scripts]
/// global_name = "App"
/// bundler = ["esbuild", "$ENTRY", "--bundle", "--format=iife",
///            "--global-name=$GLOBAL_NAME", "--outfile=$OUTFILE"]
///
/// [lint]
/// command = ["eslint"]
/// ignore_file = ".eslintignore"
///
/// [test]
/// command = ["karma", "start", "$CONFIG"]
/// config = "karma.conf.js"
///
/// [watch]
/// debounce = "100ms"
/// ```
///
/// Every section is optional; a missing file is the same as an empty one.
/// The project layout itself is not configurable, see
/// [`crate::config::paths::PathConfig`].
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub styles: StylesSection,

    #[serde(default)]
    pub scripts: ScriptsSection,

    #[serde(default)]
    pub lint: LintSection,

    #[serde(default)]
    pub test: TestSection,

    #[serde(default)]
    pub watch: WatchSection,
}

/// Validated configuration.
///
/// Only obtainable through `ConfigFile::try_from(RawConfigFile)` (see
/// `validate.rs`), so holders can rely on every command being non-empty and
/// every duration/glob/browser query being parsable.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub styles: StylesSection,
    pub scripts: ScriptsSection,
    pub lint: LintSection,
    pub test: TestSection,
    pub watch: WatchSection,
    debounce: Duration,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile, debounce: Duration) -> Self {
        Self {
            styles: raw.styles,
            scripts: raw.scripts,
            lint: raw.lint,
            test: raw.test,
            watch: raw.watch,
            debounce,
        }
    }

    /// Parsed `[watch].debounce`.
    pub fn debounce(&self) -> Duration {
        self.debounce
    }
}

/// `[styles]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StylesSection {
    /// Browserslist queries used for vendor prefixing.
    pub browsers: Vec<String>,
}

impl Default for StylesSection {
    fn default() -> Self {
        Self {
            browsers: vec!["last 2 versions".to_string()],
        }
    }
}

/// `[scripts]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScriptsSection {
    /// Name of the global binding the IIFE bundle exposes.
    pub global_name: String,

    /// Bundler command template.
    ///
    /// Supports `$ENTRY`, `$OUTFILE`, `$GLOBAL_NAME`, `$ROOT` and `$MODE`.
    /// The bundler must not minify; production minification happens in
    /// process after the bundle is written.
    pub bundler: Vec<String>,
}

impl Default for ScriptsSection {
    fn default() -> Self {
        Self {
            global_name: "App".to_string(),
            bundler: [
                "esbuild",
                "$ENTRY",
                "--bundle",
                "--format=iife",
                "--global-name=$GLOBAL_NAME",
                "--target=es2015",
                "--outfile=$OUTFILE",
                "--log-level=warning",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// `[lint]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LintSection {
    /// Linter command; the file list is appended as trailing arguments.
    pub command: Vec<String>,

    /// Globs (relative to the project root) selecting the files to lint.
    pub include: Vec<String>,

    /// Ignore file at the project root, read fresh on every lint.
    pub ignore_file: String,

    /// Command printing the staged file list, one path per line, relative
    /// to the project root (which need not be the repository root).
    pub staged_command: Vec<String>,
}

impl Default for LintSection {
    fn default() -> Self {
        Self {
            command: vec!["eslint".to_string()],
            include: vec!["**/*.js".to_string()],
            ignore_file: ".eslintignore".to_string(),
            staged_command: [
                "git",
                "diff",
                "--cached",
                "--name-only",
                "--relative",
                "--diff-filter=ACMR",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// `[test]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TestSection {
    /// Runner command template; `$CONFIG` is replaced with `config`.
    pub command: Vec<String>,

    /// Runner configuration file, relative to the project root.
    pub config: String,

    /// Appended when the runner should run once and exit.
    pub single_run_args: Vec<String>,

    /// Appended for `test --watch`.
    pub watch_args: Vec<String>,

    /// Appended for `test --coverage`.
    pub coverage_args: Vec<String>,
}

impl Default for TestSection {
    fn default() -> Self {
        Self {
            command: ["karma", "start", "$CONFIG"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            config: "karma.conf.js".to_string(),
            single_run_args: vec!["--single-run".to_string()],
            watch_args: vec!["--no-single-run".to_string(), "--auto-watch".to_string()],
            coverage_args: vec!["--reporters".to_string(), "progress,coverage".to_string()],
        }
    }
}

/// `[watch]` section.
///
/// Controls debouncing of filesystem events and what happens when a change
/// lands while the affected task is still rebuilding.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatchSection {
    /// Quiet period per task before a burst of events triggers a rebuild,
    /// e.g. `"100ms"`, `"1s"`.
    pub debounce: String,

    /// `"queue"` (default) or `"cancel"`.
    pub triggered_while_running_behaviour: TriggerWhileRunningBehaviour,

    /// Maximum number of queued future runs.
    pub queue_length: usize,
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            debounce: "100ms".to_string(),
            triggered_while_running_behaviour: TriggerWhileRunningBehaviour::Queue,
            queue_length: 1,
        }
    }
}
