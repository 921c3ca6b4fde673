// src/exec/process.rs

//! External tool invocation.
//!
//! The bundler, linter, test runner and staged-file lister are all plain
//! commands configured as argument templates (`["esbuild", "$ENTRY", ...]`).
//! [`CommandSpec`] resolves `$NAME` variables in those templates and
//! [`run_process`] spawns the command with `tokio::process`.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{Context, Result, anyhow};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// A fully resolved command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    /// Resolve `$KEY` occurrences in every element of `template`.
    ///
    /// Longer keys are substituted first so `$ROOT_DIR` is never clobbered by
    /// `$ROOT`.
    pub fn from_template(template: &[String], vars: &BTreeMap<&str, String>) -> Result<Self> {
        let mut keys: Vec<&&str> = vars.keys().collect();
        keys.sort_by_key(|k| std::cmp::Reverse(k.len()));

        let mut resolved = template.iter().map(|arg| {
            let mut result = arg.clone();
            for key in &keys {
                let pattern = format!("${}", key);
                if result.contains(&pattern) {
                    result = result.replace(&pattern, &vars[**key]);
                }
            }
            result
        });

        let program = resolved
            .next()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| anyhow!("empty command template"))?;

        Ok(Self {
            program,
            args: resolved.collect(),
            cwd: None,
        })
    }

    pub fn cwd(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Human-readable command line for logs.
    pub fn display(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).kill_on_drop(true);
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        cmd
    }
}

/// How a child's stdout/stderr are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Child writes straight to our terminal.
    Inherit,
    /// Output is collected and returned in [`ProcessOutput`].
    Capture,
}

/// Result of a finished child process.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    /// Exit code, `None` if the process was killed by a signal.
    pub code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    /// Exit code suitable for propagating as our own, `-1` for signals.
    pub fn exit_code(&self) -> i32 {
        self.code.unwrap_or(-1)
    }
}

/// Run a command to completion.
pub async fn run_process(spec: &CommandSpec, mode: OutputMode, label: &str) -> Result<ProcessOutput> {
    run_process_until(spec, mode, label, std::future::pending::<()>()).await
}

/// Run a command until it exits or `cancel` resolves, whichever is first.
///
/// On cancellation the child is killed and the returned output has
/// `success = false` and no exit code.
pub async fn run_process_until<F>(
    spec: &CommandSpec,
    mode: OutputMode,
    label: &str,
    cancel: F,
) -> Result<ProcessOutput>
where
    F: Future<Output = ()>,
{
    info!(task = %label, cmd = %spec.display(), "starting process");

    let mut cmd = spec.command();
    match mode {
        OutputMode::Inherit => {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        }
        OutputMode::Capture => {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        }
    }

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning `{}` for {}", spec.program, label))?;

    let stdout_reader = child
        .stdout
        .take()
        .map(|out| tokio::spawn(collect_lines(out, label.to_string(), "stdout")));
    let stderr_reader = child
        .stderr
        .take()
        .map(|err| tokio::spawn(collect_lines(err, label.to_string(), "stderr")));

    tokio::pin!(cancel);

    let status = tokio::select! {
        status_res = child.wait() => {
            Some(status_res.with_context(|| format!("waiting for `{}` ({})", spec.program, label))?)
        }
        _ = &mut cancel => {
            info!(task = %label, "cancellation requested; killing process");
            if let Err(e) = child.kill().await {
                warn!(task = %label, error = %e, "failed to kill child process on cancellation");
            }
            None
        }
    };

    let stdout = match stdout_reader {
        Some(handle) => handle.await.unwrap_or_default(),
        None => String::new(),
    };
    let stderr = match stderr_reader {
        Some(handle) => handle.await.unwrap_or_default(),
        None => String::new(),
    };

    let output = match status {
        Some(status) => ProcessOutput {
            code: status.code(),
            success: status.success(),
            stdout,
            stderr,
        },
        None => ProcessOutput {
            code: None,
            success: false,
            stdout,
            stderr,
        },
    };

    info!(
        task = %label,
        exit_code = output.exit_code(),
        success = output.success,
        "process exited"
    );

    Ok(output)
}

/// Drain a child pipe line by line so its buffer never fills up.
async fn collect_lines<R>(reader: R, label: String, stream: &'static str) -> String
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut collected = String::new();

    while let Ok(Some(line)) = lines.next_line().await {
        debug!(task = %label, "{stream}: {}", line);
        collected.push_str(&line);
        collected.push('\n');
    }

    collected
}
