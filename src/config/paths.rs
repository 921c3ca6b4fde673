// src/config/paths.rs

//! Fixed project layout.
//!
//! ```text
//! <root>/src/styles/**/*.scss  ->  <root>/dist/css/**/*.css
//! <root>/src/scripts/main.js   ->  <root>/dist/js/bundle.js
//! <root>/src/images/**/*       ->  <root>/dist/images/**/*
//! ```

use std::path::{Path, PathBuf};

use crate::types::AssetKind;

pub const SOURCE_DIR: &str = "src";
pub const DIST_DIR: &str = "dist";
pub const SCRIPTS_ENTRY: &str = "main.js";
pub const SCRIPTS_BUNDLE: &str = "bundle.js";

/// Source and destination of one asset kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
    pub kind: AssetKind,
    /// Directory the kind's sources live in.
    pub source_dir: PathBuf,
    /// Glob relative to `source_dir` selecting the kind's files.
    pub pattern: &'static str,
    /// Output directory (for scripts, the directory holding the bundle).
    pub dest_dir: PathBuf,
}

impl AssetPaths {
    /// Glob relative to the project root, with forward slashes.
    pub fn root_relative_pattern(&self, root: &Path) -> String {
        let dir = self
            .source_dir
            .strip_prefix(root)
            .unwrap_or(&self.source_dir)
            .to_string_lossy()
            .replace('\\', "/");
        format!("{}/{}", dir.trim_end_matches('/'), self.pattern)
    }
}

/// Mapping of every [`AssetKind`] to its [`AssetPaths`], rooted at the
/// project directory. Built once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathConfig {
    root: PathBuf,
    dist: PathBuf,
    styles: AssetPaths,
    scripts: AssetPaths,
    images: AssetPaths,
}

impl PathConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let src = root.join(SOURCE_DIR);
        let dist = root.join(DIST_DIR);

        Self {
            styles: AssetPaths {
                kind: AssetKind::Styles,
                source_dir: src.join("styles"),
                pattern: "**/*.scss",
                dest_dir: dist.join("css"),
            },
            scripts: AssetPaths {
                kind: AssetKind::Scripts,
                source_dir: src.join("scripts"),
                pattern: "**/*.js",
                dest_dir: dist.join("js"),
            },
            images: AssetPaths {
                kind: AssetKind::Images,
                source_dir: src.join("images"),
                pattern: "**/*",
                dest_dir: dist.join("images"),
            },
            root,
            dist,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Destination root; `clean` deletes this whole tree.
    pub fn dist_dir(&self) -> &Path {
        &self.dist
    }

    pub fn for_kind(&self, kind: AssetKind) -> &AssetPaths {
        match kind {
            AssetKind::Styles => &self.styles,
            AssetKind::Scripts => &self.scripts,
            AssetKind::Images => &self.images,
        }
    }

    /// The single module the script bundle starts from.
    pub fn scripts_entry(&self) -> PathBuf {
        self.scripts.source_dir.join(SCRIPTS_ENTRY)
    }

    /// Where the script bundle is written.
    pub fn scripts_bundle(&self) -> PathBuf {
        self.scripts.dest_dir.join(SCRIPTS_BUNDLE)
    }
}
