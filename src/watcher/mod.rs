//! Fixture watching for `--watch`.
//!
//! Watches the fixture's parent directory (editors often replace files
//! instead of writing in place) and reports a change once events have been
//! quiet for the debounce interval.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, warn};

/// Watches a single file and emits debounced change notifications.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    watch_root: PathBuf,
    target_path: PathBuf,
    target_name: Option<OsString>,
    debounce: Duration,
    pending_since: Option<Instant>,
}

impl FileWatcher {
    /// Create a watcher for `path`.
    ///
    /// # Errors
    /// Returns an error if the file watcher cannot be created or the path cannot be watched.
    pub fn new(path: impl AsRef<Path>, debounce: Duration) -> notify::Result<Self> {
        // OS event paths are canonical
        let target_path = path
            .as_ref()
            .canonicalize()
            .unwrap_or_else(|_| path.as_ref().to_path_buf());
        let target_name = target_path.file_name().map(std::ffi::OsStr::to_os_string);
        let watch_root = watch_root_for(&target_path);

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(&watch_root, RecursiveMode::NonRecursive)?;
        debug!(target = %target_path.display(), root = %watch_root.display(), "watching fixture");

        Ok(Self {
            _watcher: watcher,
            rx,
            watch_root,
            target_path,
            target_name,
            debounce,
            pending_since: None,
        })
    }

    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    /// Drain pending events and return true once a debounced change is ready.
    pub fn take_change_ready(&mut self) -> bool {
        let mut relevant = 0u32;
        let mut ignored = 0u32;
        while let Ok(event) = self.rx.try_recv() {
            match event {
                Ok(ev) if self.is_relevant(&ev) => relevant += 1,
                Ok(ev) => {
                    ignored += 1;
                    debug!(kind = ?ev.kind, paths = ?ev.paths, "ignored watch event");
                }
                Err(err) => warn!(%err, "watch error"),
            }
        }

        if relevant + ignored > 0 {
            debug!(
                relevant,
                ignored,
                target = %self.target_path.display(),
                "polled watch events"
            );
        }
        if relevant > 0 {
            self.pending_since = Some(Instant::now());
        }

        match self.pending_since {
            Some(since) if since.elapsed() >= self.debounce => {
                self.pending_since = None;
                true
            }
            _ => false,
        }
    }

    /// Block until a debounced change is ready, polling every `poll`.
    pub fn wait_for_change(&mut self, poll: Duration) {
        while !self.take_change_ready() {
            std::thread::sleep(poll);
        }
    }

    fn is_relevant(&self, event: &Event) -> bool {
        event.paths.iter().any(|path| {
            path == &self.watch_root
                || path == &self.target_path
                || self
                    .target_name
                    .as_ref()
                    .is_some_and(|name| path.file_name().is_some_and(|f| f == name))
        })
    }
}

fn watch_root_for(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::EventKind;
    use tempfile::tempdir;

    fn event(paths: Vec<PathBuf>) -> Event {
        Event {
            kind: EventKind::Any,
            paths,
            attrs: notify::event::EventAttributes::new(),
        }
    }

    #[test]
    fn test_directory_level_event_is_relevant_for_watched_fixture() {
        let dir = tempdir().expect("tempdir");
        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        let path = canonical_dir.join("book.json");
        std::fs::write(&path, "{}").expect("write");
        let watcher = FileWatcher::new(&path, Duration::from_millis(10)).expect("watcher");

        assert!(watcher.is_relevant(&event(vec![canonical_dir])));
    }

    #[test]
    fn test_sibling_file_event_is_ignored() {
        let dir = tempdir().expect("tempdir");
        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        let path = canonical_dir.join("book.json");
        std::fs::write(&path, "{}").expect("write");
        let watcher = FileWatcher::new(&path, Duration::from_millis(10)).expect("watcher");

        assert!(!watcher.is_relevant(&event(vec![canonical_dir.join("other.json")])));
    }

    #[test]
    fn test_watch_root_for_relative_file_is_dot() {
        let root = watch_root_for(Path::new("book.json"));
        assert_eq!(root, PathBuf::from("."));
    }

    #[test]
    fn test_no_change_without_events() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("book.json");
        std::fs::write(&path, "{}").expect("write");
        let mut watcher = FileWatcher::new(&path, Duration::from_millis(10)).expect("watcher");

        assert!(!watcher.take_change_ready());
    }

    #[test]
    fn test_real_file_modification_detected() {
        let dir = tempdir().expect("tempdir");
        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        let path = canonical_dir.join("book.json");
        std::fs::write(&path, "{}").expect("write");

        let mut watcher = FileWatcher::new(&path, Duration::from_millis(50)).expect("watcher");

        // Give the backend time to register the watch
        std::thread::sleep(Duration::from_millis(500));
        std::fs::write(&path, r#"{"text": ""}"#).expect("write");

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut detected = false;
        while Instant::now() < deadline {
            if watcher.take_change_ready() {
                detected = true;
                break;
            }
            std::thread::sleep(Duration::from_millis(50));
        }

        assert!(detected, "watcher should detect fixture modification within 5 seconds");
    }
}
