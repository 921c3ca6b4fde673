// src/config/validate.rs

use std::sync::LazyLock;
use std::time::Duration;

use globset::Glob;
use regex::Regex;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{AssetflowError, Result};
use crate::tasks::minify::resolve_targets;

static JS_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("static regex"));

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::AssetflowError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        let debounce = parse_duration(&raw.watch.debounce)
            .map_err(|e| AssetflowError::ConfigError(format!("[watch].debounce: {e}")))?;
        Ok(ConfigFile::new_unchecked(raw, debounce))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_commands(cfg)?;
    validate_styles(cfg)?;
    validate_scripts(cfg)?;
    validate_lint(cfg)?;
    validate_watch(cfg)?;
    Ok(())
}

fn validate_commands(cfg: &RawConfigFile) -> Result<()> {
    let commands = [
        ("[scripts].bundler", &cfg.scripts.bundler),
        ("[lint].command", &cfg.lint.command),
        ("[lint].staged_command", &cfg.lint.staged_command),
        ("[test].command", &cfg.test.command),
    ];

    for (key, cmd) in commands {
        if cmd.first().is_none_or(|program| program.trim().is_empty()) {
            return Err(AssetflowError::ConfigError(format!(
                "{key} must name a program to run (got {cmd:?})"
            )));
        }
    }
    Ok(())
}

fn validate_styles(cfg: &RawConfigFile) -> Result<()> {
    if cfg.styles.browsers.is_empty() {
        return Err(AssetflowError::ConfigError(
            "[styles].browsers must contain at least one query".to_string(),
        ));
    }

    resolve_targets(&cfg.styles.browsers).map_err(|e| {
        AssetflowError::ConfigError(format!("[styles].browsers: {e}"))
    })?;
    Ok(())
}

fn validate_scripts(cfg: &RawConfigFile) -> Result<()> {
    if !JS_IDENTIFIER.is_match(&cfg.scripts.global_name) {
        return Err(AssetflowError::ConfigError(format!(
            "[scripts].global_name must be a JavaScript identifier (got '{}')",
            cfg.scripts.global_name
        )));
    }
    Ok(())
}

fn validate_lint(cfg: &RawConfigFile) -> Result<()> {
    if cfg.lint.include.is_empty() {
        return Err(AssetflowError::ConfigError(
            "[lint].include must contain at least one glob".to_string(),
        ));
    }
    for pattern in &cfg.lint.include {
        Glob::new(pattern).map_err(|e| {
            AssetflowError::ConfigError(format!("[lint].include: invalid glob '{pattern}': {e}"))
        })?;
    }
    if cfg.lint.ignore_file.trim().is_empty() {
        return Err(AssetflowError::ConfigError(
            "[lint].ignore_file must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_watch(cfg: &RawConfigFile) -> Result<()> {
    if cfg.watch.queue_length == 0 {
        return Err(AssetflowError::ConfigError(
            "[watch].queue_length must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| format!("duration '{s}' is missing a unit suffix"))?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };
    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{s}' is too large"))
}
