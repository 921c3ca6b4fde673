// src/config/mod.rs

//! Configuration loading and validation for assetflow.
//!
//! Responsibilities:
//! - Fixed project layout (`paths.rs`).
//! - TOML-backed tool configuration (`model.rs`).
//! - Loading from disk (`loader.rs`) and validation (`validate.rs`).
//!
//! Both are folded into one immutable [`BuildConfig`] at startup, which every
//! task receives by `Arc`.

pub mod loader;
pub mod model;
pub mod paths;
pub mod validate;

use std::path::{Path, PathBuf};

pub use loader::{DEFAULT_CONFIG_FILE, load_and_validate, load_from_path};
pub use model::{
    ConfigFile, LintSection, RawConfigFile, ScriptsSection, StylesSection, TestSection,
    WatchSection,
};
pub use paths::{AssetPaths, PathConfig};
pub use validate::parse_duration;

/// Everything a task needs to know about the project, built once.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub paths: PathConfig,
    pub tools: ConfigFile,
}

impl BuildConfig {
    pub fn new(root: impl Into<PathBuf>, tools: ConfigFile) -> Self {
        Self {
            paths: PathConfig::new(root),
            tools,
        }
    }

    pub fn root(&self) -> &Path {
        self.paths.root()
    }

    /// Absolute path of the lint ignore file.
    pub fn ignore_file(&self) -> PathBuf {
        self.root().join(&self.tools.lint.ignore_file)
    }
}
