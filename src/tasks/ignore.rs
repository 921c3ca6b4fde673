// src/tasks/ignore.rs

//! Lint ignore file.
//!
//! Each non-blank, non-comment line of the ignore file becomes one rule. A
//! rule excludes matching paths (and, for directories, everything below
//! them); a `!` rule re-includes. When several rules match a path, the last
//! one wins.
//!
//! | line       | excludes                       |
//! |------------|--------------------------------|
//! | `build/`   | `build/**` (root directory)    |
//! | `/tmp.js`  | `tmp.js` at the root           |
//! | `tmp.js`   | `**/tmp.js`, `**/tmp.js/**`    |
//! | `a/b.js`   | `a/b.js`, `a/b.js/**`          |

use std::path::Path;

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobMatcher};
use tracing::debug;

use crate::fs::FileSystem;

/// Entries the linter never sees, whatever the ignore file says.
const BUILTIN_IGNORES: &[&str] = &["**/node_modules/", ".git/"];

#[derive(Debug, Clone)]
struct IgnoreRule {
    line: String,
    negated: bool,
    dir_only: bool,
    matcher: GlobMatcher,
}

impl IgnoreRule {
    fn parse(line: &str) -> Result<Option<Self>> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }

        let (negated, body) = match trimmed.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let dir_only = body.ends_with('/');
        let body = body.trim_end_matches('/');
        let anchored = dir_only || body.starts_with('/') || body.contains('/');
        let body = body.trim_start_matches('/');
        if body.is_empty() {
            return Ok(None);
        }

        let glob = if anchored {
            body.to_string()
        } else {
            format!("**/{body}")
        };

        let matcher = GlobBuilder::new(&glob)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid ignore pattern '{trimmed}'"))?
            .compile_matcher();

        Ok(Some(Self {
            line: trimmed.to_string(),
            negated,
            dir_only,
            matcher,
        }))
    }

    fn matches(&self, rel: &str, is_dir: bool) -> bool {
        (is_dir || !self.dir_only) && self.matcher.is_match(rel)
    }

    /// The exclusion globs this rule stands for, `!`-prefixed.
    fn exclusions(&self) -> Vec<String> {
        let glob = self.matcher.glob().glob();
        let prefix = if self.negated { "" } else { "!" };
        if self.dir_only {
            vec![format!("{prefix}{glob}/**")]
        } else if self.line.trim_start_matches('!').starts_with('/') {
            vec![format!("{prefix}{glob}")]
        } else {
            vec![format!("{prefix}{glob}"), format!("{prefix}{glob}/**")]
        }
    }
}

/// Ordered ignore rules, read fresh from disk on every lint run.
#[derive(Debug, Clone, Default)]
pub struct IgnoreList {
    rules: Vec<IgnoreRule>,
}

impl IgnoreList {
    /// Parse ignore file contents, after the built-in rules.
    pub fn parse(contents: &str) -> Result<Self> {
        let mut rules = Vec::new();
        for line in BUILTIN_IGNORES.iter().copied().chain(contents.lines()) {
            if let Some(rule) = IgnoreRule::parse(line)? {
                rules.push(rule);
            }
        }
        Ok(Self { rules })
    }

    /// Load `path`; a missing file yields only the built-in rules.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        if !fs.is_file(path) {
            debug!(file = ?path, "no ignore file; using built-in rules only");
            return Self::parse("");
        }
        let contents = fs.read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Whether `rel` (root-relative, `/`-separated) is excluded, either
    /// directly or through one of its parent directories.
    pub fn is_ignored(&self, rel: &str) -> bool {
        let rel = rel.trim_matches('/');
        let mut prefix_end = 0;
        while let Some(offset) = rel[prefix_end..].find('/') {
            let dir = &rel[..prefix_end + offset];
            if self.matches(dir, true) {
                return true;
            }
            prefix_end += offset + 1;
        }
        self.matches(rel, false)
    }

    /// Whether a directory should be skipped entirely during the walk.
    pub fn is_dir_ignored(&self, rel: &str) -> bool {
        self.matches(rel.trim_matches('/'), true)
    }

    /// Every exclusion in order, in negated-glob form.
    pub fn exclusions(&self) -> Vec<String> {
        self.rules.iter().flat_map(IgnoreRule::exclusions).collect()
    }

    fn matches(&self, rel: &str, is_dir: bool) -> bool {
        self.rules
            .iter()
            .rev()
            .find(|rule| rule.matches(rel, is_dir))
            .is_some_and(|rule| !rule.negated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patterns_are_translated_to_exclusions() {
        let list = IgnoreList::parse("dist/\n/tmp.js\nvendor.js\nlib/a.js\n").unwrap();
        let exclusions = list.exclusions();
        assert!(exclusions.contains(&"!dist/**".to_string()));
        assert!(exclusions.contains(&"!tmp.js".to_string()));
        assert!(exclusions.contains(&"!**/vendor.js".to_string()));
        assert!(exclusions.contains(&"!**/vendor.js/**".to_string()));
        assert!(exclusions.contains(&"!lib/a.js".to_string()));
        assert!(exclusions.contains(&"!lib/a.js/**".to_string()));
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let list = IgnoreList::parse("# generated\n\n   \nbuild/\n").unwrap();
        assert!(list.is_ignored("build/app.js"));
        assert!(!list.is_ignored("src/app.js"));
    }

    #[test]
    fn directory_rule_covers_nested_files_but_not_same_named_files() {
        let list = IgnoreList::parse("build/\n").unwrap();
        assert!(list.is_ignored("build/a/b.js"));
        assert!(list.is_dir_ignored("build"));
        assert!(!list.is_ignored("src/build.js"));
    }

    #[test]
    fn anchored_rule_only_matches_at_root() {
        let list = IgnoreList::parse("/tmp.js\n").unwrap();
        assert!(list.is_ignored("tmp.js"));
        assert!(!list.is_ignored("src/tmp.js"));
    }

    #[test]
    fn unanchored_rule_matches_at_any_depth() {
        let list = IgnoreList::parse("tmp.js\n").unwrap();
        assert!(list.is_ignored("tmp.js"));
        assert!(list.is_ignored("src/deep/tmp.js"));
    }

    #[test]
    fn last_matching_rule_wins() {
        let list = IgnoreList::parse("*.min.js\n!keep.min.js\n").unwrap();
        assert!(list.is_ignored("src/app.min.js"));
        assert!(!list.is_ignored("src/keep.min.js"));

        let list = IgnoreList::parse("!keep.min.js\n*.min.js\n").unwrap();
        assert!(list.is_ignored("src/keep.min.js"));
    }

    #[test]
    fn node_modules_is_always_ignored() {
        let list = IgnoreList::parse("").unwrap();
        assert!(list.is_ignored("node_modules/pkg/index.js"));
        assert!(!list.is_ignored("src/index.js"));
    }
}
