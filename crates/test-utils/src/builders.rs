#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use assetflow::config::{BuildConfig, ConfigFile, RawConfigFile};
use assetflow::fs::RealFileSystem;
use assetflow::tasks::TaskContext;
use assetflow::types::TriggerWhileRunningBehaviour;
use tempfile::TempDir;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn browsers(mut self, queries: &[&str]) -> Self {
        self.config.styles.browsers = strings(queries);
        self
    }

    pub fn global_name(mut self, name: &str) -> Self {
        self.config.scripts.global_name = name.to_string();
        self
    }

    pub fn bundler(mut self, cmd: &[&str]) -> Self {
        self.config.scripts.bundler = strings(cmd);
        self
    }

    pub fn lint_command(mut self, cmd: &[&str]) -> Self {
        self.config.lint.command = strings(cmd);
        self
    }

    pub fn staged_command(mut self, cmd: &[&str]) -> Self {
        self.config.lint.staged_command = strings(cmd);
        self
    }

    pub fn test_command(mut self, cmd: &[&str]) -> Self {
        self.config.test.command = strings(cmd);
        self
    }

    pub fn test_args(mut self, single_run: &[&str], watch: &[&str], coverage: &[&str]) -> Self {
        self.config.test.single_run_args = strings(single_run);
        self.config.test.watch_args = strings(watch);
        self.config.test.coverage_args = strings(coverage);
        self
    }

    pub fn debounce(mut self, value: &str) -> Self {
        self.config.watch.debounce = value.to_string();
        self
    }

    pub fn behaviour(mut self, behaviour: TriggerWhileRunningBehaviour) -> Self {
        self.config.watch.triggered_while_running_behaviour = behaviour;
        self
    }

    pub fn queue_length(mut self, len: usize) -> Self {
        self.config.watch.queue_length = len;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A throwaway project directory on disk.
///
/// The directory is removed when the value is dropped.
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp project dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Write `contents` to `rel`, creating parent directories.
    pub fn write(&self, rel: &str, contents: &str) -> &Self {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(&path, contents).expect("write project file");
        self
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path(rel)).expect("read project file")
    }

    pub fn exists(&self, rel: &str) -> bool {
        let path = self.path(rel);
        path.exists() || path.is_symlink()
    }

    /// Write an executable shell script (unix only).
    #[cfg(unix)]
    pub fn script(&self, rel: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        self.write(rel, &format!("#!/bin/sh\n{body}\n"));
        let path = self.path(rel);
        let mut perms = std::fs::metadata(&path).expect("script metadata").permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).expect("make script executable");
        path
    }

    pub fn config(&self, tools: ConfigFile) -> BuildConfig {
        BuildConfig::new(self.root(), tools)
    }

    /// Task context over the real filesystem, rooted at this project.
    pub fn context(&self, tools: ConfigFile) -> TaskContext {
        TaskContext::new(Arc::new(self.config(tools)), Arc::new(RealFileSystem))
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}
