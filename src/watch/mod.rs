// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Compiling the watch glob of each watched task.
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Debouncing bursts of changes per task.
//!
//! It does **not** know about the build graph; it only turns filesystem
//! changes into task-level triggers.

pub mod debounce;
pub mod event_handler;
pub mod patterns;
pub mod watcher;

pub use debounce::Debouncer;
pub use event_handler::tasks_for_event;
pub use patterns::{TaskWatchProfile, WATCHED_KINDS, build_watch_profiles, tasks_for_path};
pub use watcher::{WatcherHandle, spawn_watcher};
