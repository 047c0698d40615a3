//! Change detection for the loaded document.
//!
//! The parent directory is watched with notify, since many editors save
//! by replacing the file. Raw events only prompt a look at the file's
//! modification time; a notification is produced when that time moved
//! or the file can no longer be inspected.
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::SystemTime;

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

/// Remembers the last modification time seen for the watched file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MtimeGate {
    last: Option<SystemTime>,
}

impl MtimeGate {
    pub const fn new(initial: Option<SystemTime>) -> Self {
        Self { last: initial }
    }

    /// Record `mtime` and report whether it warrants a notification.
    ///
    /// A repeat of the last time is suppressed. A missing time (file
    /// deleted or unreadable) always passes.
    pub fn observe(&mut self, mtime: Option<SystemTime>) -> bool {
        match mtime {
            Some(time) if self.last == Some(time) => false,
            Some(time) => {
                self.last = Some(time);
                true
            }
            None => true,
        }
    }
}

/// Watches one file and reports when it changed on disk.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    /// Path as handed in; this is what gets reported.
    path: PathBuf,
    watch_root: PathBuf,
    canonical_path: PathBuf,
    target_name: Option<OsString>,
    gate: MtimeGate,
}

impl FileWatcher {
    /// Start watching `path`.
    ///
    /// # Errors
    /// Returns an error if the backend cannot be created or the parent
    /// directory cannot be watched.
    pub fn new(path: impl AsRef<Path>) -> notify::Result<Self> {
        let path = path.as_ref().to_path_buf();
        // Backends report canonical paths.
        let canonical_path = path.canonicalize().unwrap_or_else(|_| path.clone());
        let target_name = canonical_path.file_name().map(std::ffi::OsStr::to_os_string);
        let watch_root = watch_root_for(&canonical_path);

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(&watch_root, RecursiveMode::NonRecursive)?;

        let gate = MtimeGate::new(modified_time(&path));
        tracing::debug!(path = %path.display(), root = %watch_root.display(), "watching file");

        Ok(Self {
            _watcher: watcher,
            rx,
            path,
            watch_root,
            canonical_path,
            target_name,
            gate,
        })
    }

    /// Drain pending backend events and return the watched path if the
    /// file changed since the last report.
    ///
    /// Any number of events between two polls yield at most one report.
    pub fn poll_change(&mut self) -> Option<PathBuf> {
        let mut touched = false;
        let mut backend_failed = false;
        while let Ok(event) = self.rx.try_recv() {
            match event {
                Ok(ev) if self.is_relevant(&ev) => touched = true,
                Ok(ev) => {
                    tracing::trace!(kind = ?ev.kind, paths = ?ev.paths, "ignoring watch event");
                }
                Err(err) => {
                    tracing::warn!(%err, path = %self.path.display(), "watch backend error");
                    backend_failed = true;
                }
            }
        }

        if backend_failed {
            return Some(self.path.clone());
        }
        if touched && self.gate.observe(modified_time(&self.path)) {
            return Some(self.path.clone());
        }
        None
    }

    fn is_relevant(&self, event: &Event) -> bool {
        event.paths.iter().any(|path| {
            path == &self.watch_root
                || path == &self.canonical_path
                || self
                    .target_name
                    .as_ref()
                    .is_some_and(|name| path.file_name().is_some_and(|f| f == name))
        })
    }
}

impl std::fmt::Debug for FileWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWatcher")
            .field("path", &self.path)
            .field("watch_root", &self.watch_root)
            .finish_non_exhaustive()
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

fn watch_root_for(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use notify::EventKind;
    use tempfile::tempdir;

    fn event_for(path: PathBuf) -> Event {
        Event {
            kind: EventKind::Any,
            paths: vec![path],
            attrs: notify::event::EventAttributes::new(),
        }
    }

    fn poll_until_change(watcher: &mut FileWatcher) -> Option<PathBuf> {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if let Some(path) = watcher.poll_change() {
                return Some(path);
            }
            std::thread::sleep(Duration::from_millis(50));
        }
        None
    }

    #[test]
    fn test_gate_suppresses_repeated_mtime() {
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(10);
        let t1 = t0 + Duration::from_secs(1);
        let mut gate = MtimeGate::new(Some(t0));

        assert!(!gate.observe(Some(t0)));
        assert!(gate.observe(Some(t1)));
        assert!(!gate.observe(Some(t1)));
    }

    #[test]
    fn test_gate_passes_missing_mtime() {
        let mut gate = MtimeGate::new(Some(SystemTime::UNIX_EPOCH));
        assert!(gate.observe(None));
        assert!(gate.observe(None));
    }

    #[test]
    fn test_directory_event_is_relevant() {
        let dir = tempdir().expect("tempdir");
        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "hi").expect("write");
        let watcher = FileWatcher::new(&path).expect("watcher");

        assert!(watcher.is_relevant(&event_for(canonical_dir.clone())));
        assert!(watcher.is_relevant(&event_for(canonical_dir.join("doc.md"))));
        assert!(!watcher.is_relevant(&event_for(canonical_dir.join("other.md"))));
    }

    #[test]
    fn test_quiet_file_reports_nothing() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "hi").expect("write");
        let mut watcher = FileWatcher::new(&path).expect("watcher");
        assert_eq!(watcher.poll_change(), None);
    }

    #[test]
    fn test_watch_root_for_bare_name_is_dot() {
        assert_eq!(watch_root_for(Path::new("README.md")), PathBuf::from("."));
    }

    #[test]
    fn test_real_modification_is_reported() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("watched.md");
        std::fs::write(&path, "original").expect("write");
        let mut watcher = FileWatcher::new(&path).expect("watcher");

        // Give the backend time to register, and move past mtime granularity.
        std::thread::sleep(Duration::from_millis(1100));
        std::fs::write(&path, "modified").expect("write");

        assert_eq!(poll_until_change(&mut watcher), Some(path));
    }

    #[test]
    fn test_deleted_file_is_reported() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("gone.md");
        std::fs::write(&path, "bye").expect("write");
        let mut watcher = FileWatcher::new(&path).expect("watcher");

        std::thread::sleep(Duration::from_millis(300));
        std::fs::remove_file(&path).expect("remove");

        assert_eq!(poll_until_change(&mut watcher), Some(path));
    }
}
