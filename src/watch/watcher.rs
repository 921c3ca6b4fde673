// src/watch/watcher.rs

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::{RuntimeEvent, TriggerReason};
use crate::watch::debounce::Debouncer;
use crate::watch::event_handler::tasks_for_event;
use crate::watch::patterns::TaskWatchProfile;

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive for
/// as long as needed. Dropping this handle will stop file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
    watched: Vec<PathBuf>,
}

impl WatcherHandle {
    /// Directories actually being watched.
    pub fn watched_dirs(&self) -> &[PathBuf] {
        &self.watched
    }
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("watched", &self.watched)
            .finish_non_exhaustive()
    }
}

/// Spawn a filesystem watcher over each profile's source directory and send
/// debounced `RuntimeEvent::TaskTriggered` events for matching changes.
///
/// - `root` is the project root against which all globs are evaluated.
/// - `profiles` is the compiled per-task pattern set.
/// - `debounce` is the quiet period each task waits for before triggering.
/// - `runtime_tx` is the channel into the main runtime.
///
/// Source directories that do not exist are skipped with a warning.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    profiles: Vec<TaskWatchProfile>,
    debounce: Duration,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    let root = root.into();

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    warn!(error = %err, "failed to forward notify event");
                }
            }
            Err(err) => {
                warn!(error = %err, "file watch error");
            }
        },
        Config::default(),
    )?;

    let mut watched = Vec::new();
    for profile in &profiles {
        let dir = profile.dir();
        if !dir.is_dir() {
            warn!(task = %profile.task(), dir = ?dir, "source dir missing; not watching it");
            continue;
        }
        watcher.watch(dir, RecursiveMode::Recursive)?;
        info!(task = %profile.task(), dir = ?dir, "watching");
        watched.push(dir.clone());
    }

    tokio::spawn(async move {
        let mut debouncer = Debouncer::new(debounce);

        loop {
            tokio::select! {
                biased;
                maybe_event = event_rx.recv() => {
                    let Some(event) = maybe_event else {
                        break;
                    };
                    debug!(?event, "received notify event");
                    let now = Instant::now();
                    for task in tasks_for_event(&root, &event, &profiles) {
                        debouncer.add(task, now);
                    }
                }
                _ = tokio::time::sleep(debouncer.sleep_duration(Instant::now())) => {
                    for task in debouncer.take_ready(Instant::now()) {
                        info!(task = %task, "change detected; triggering rebuild");
                        let event = RuntimeEvent::TaskTriggered {
                            task,
                            reason: TriggerReason::FileWatch,
                        };
                        if runtime_tx.send(event).await.is_err() {
                            debug!("runtime channel closed; stopping watcher loop");
                            return;
                        }
                    }
                }
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle {
        _inner: watcher,
        watched,
    })
}
