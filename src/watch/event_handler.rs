// src/watch/event_handler.rs

//! Turning raw notify events into task triggers.

use std::path::Path;

use notify::event::ModifyKind;
use notify::{Event, EventKind};
use tracing::{debug, warn};

use crate::types::TaskId;
use crate::watch::patterns::{TaskWatchProfile, tasks_for_path};

/// Tasks affected by a single notify event.
///
/// Access and metadata-only events are dropped (they fire on every read or
/// `touch` and would cause rebuild loops), as are editor temp files. The
/// result is deduplicated and sorted.
pub fn tasks_for_event(root: &Path, event: &Event, profiles: &[TaskWatchProfile]) -> Vec<TaskId> {
    if matches!(
        event.kind,
        EventKind::Modify(ModifyKind::Metadata(_)) | EventKind::Access(_) | EventKind::Other
    ) {
        return Vec::new();
    }

    let mut tasks = Vec::new();
    for path in &event.paths {
        if is_temp_file(path) {
            continue;
        }

        let Some(rel) = root_relative(root, path) else {
            warn!(path = ?path, root = ?root, "could not relativize event path");
            continue;
        };

        let matched = tasks_for_path(profiles, &rel);
        if !matched.is_empty() {
            debug!(rel = %rel, ?matched, "watch match");
        }
        tasks.extend(matched);
    }

    tasks.sort();
    tasks.dedup();
    tasks
}

/// `path` relative to `root`, with forward slashes.
///
/// notify may report a different spelling of the root than the one we
/// watched (macOS resolves `/var` to `/private/var`), so on a prefix mismatch
/// both sides are canonicalized. A removed file has nothing to canonicalize;
/// its parent directory is resolved instead.
fn root_relative(root: &Path, path: &Path) -> Option<String> {
    let rel = match path.strip_prefix(root) {
        Ok(rel) => rel.to_path_buf(),
        Err(_) => {
            let root = root.canonicalize().ok()?;
            let resolved = match path.canonicalize() {
                Ok(resolved) => resolved,
                Err(_) => path.parent()?.canonicalize().ok()?.join(path.file_name()?),
            };
            resolved.strip_prefix(&root).ok()?.to_path_buf()
        }
    };
    Some(rel.to_string_lossy().replace('\\', "/"))
}

/// Editor artifacts and hidden files.
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathConfig;
    use crate::watch::patterns::build_watch_profiles;
    use notify::event::{AccessKind, CreateKind, DataChange, MetadataKind};
    use std::path::PathBuf;

    fn event(kind: EventKind, paths: &[&str]) -> Event {
        let mut event = Event::new(kind);
        for p in paths {
            event = event.add_path(PathBuf::from(p));
        }
        event
    }

    fn profiles() -> Vec<TaskWatchProfile> {
        build_watch_profiles(&PathConfig::new("/p")).unwrap()
    }

    #[test]
    fn content_change_triggers_matching_task() {
        let e = event(
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            &["/p/src/scripts/util.js", "/p/src/scripts/main.js"],
        );
        assert_eq!(tasks_for_event(Path::new("/p"), &e, &profiles()), vec![TaskId::Scripts]);
    }

    #[test]
    fn noise_events_are_ignored() {
        let root = Path::new("/p");
        let access = event(EventKind::Access(AccessKind::Any), &["/p/src/styles/a.scss"]);
        let meta = event(
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::WriteTime)),
            &["/p/src/styles/a.scss"],
        );
        let swap = event(EventKind::Create(CreateKind::File), &["/p/src/styles/.a.scss.swp"]);

        assert!(tasks_for_event(root, &access, &profiles()).is_empty());
        assert!(tasks_for_event(root, &meta, &profiles()).is_empty());
        assert!(tasks_for_event(root, &swap, &profiles()).is_empty());
    }

    #[test]
    fn paths_outside_root_are_skipped() {
        let e = event(
            EventKind::Create(CreateKind::File),
            &["/elsewhere/src/styles/a.scss"],
        );
        assert!(tasks_for_event(Path::new("/p"), &e, &profiles()).is_empty());
    }

    #[test]
    fn one_event_can_trigger_both_kinds() {
        let e = event(
            EventKind::Remove(notify::event::RemoveKind::Any),
            &["/p/src/styles/a.scss", "/p/src/scripts/a.js", "/p/src/images/a.png"],
        );
        assert_eq!(
            tasks_for_event(Path::new("/p"), &e, &profiles()),
            vec![TaskId::Styles, TaskId::Scripts]
        );
    }
}
