// src/exec/mod.rs

//! Execution layer.
//!
//! - [`backend`] is the seam between the runtime and execution; tests swap
//!   in a fake backend.
//! - [`executor_loop`] owns the loop that runs scheduled build tasks, at most
//!   one instance per task id at a time.
//! - [`task_runner`] runs one scheduled task and reports its outcome.
//! - [`process`] spawns external tools (bundler, linter, test runner, git).

pub mod backend;
pub mod executor_loop;
pub mod process;
pub mod task_runner;

pub use backend::{DispatchFuture, ExecutorBackend, RealExecutorBackend};
pub use executor_loop::spawn_executor;
pub use process::{CommandSpec, OutputMode, ProcessOutput, run_process, run_process_until};
