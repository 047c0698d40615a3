//! The host side of the viewer: file reads and the file watch.
//!
//! The host runs on its own thread and owns all filesystem access. The
//! display talks to it only through [`HostRequest`]s and receives
//! [`HostEvent`]s back over a channel, so a slow disk never blocks input
//! handling.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::LaunchOptions;
use crate::document::Document;
use crate::watcher::FileWatcher;

/// How often the host checks the file watch while idle.
const WATCH_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Display to host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostRequest {
    /// Read `path`; answered with [`HostEvent::ReadCompleted`] carrying
    /// the same ticket.
    Read { ticket: u64, path: PathBuf },
    Shutdown,
}

/// Host to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// The launch file was loaded.
    FileOpened(Document),
    /// The launch file could not be read.
    FileOpenFailed(String),
    /// The watched file changed on disk.
    FileChanged(PathBuf),
    /// Switch the view mode by name.
    SetMode(String),
    ReadCompleted {
        ticket: u64,
        result: Result<Document, String>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("host thread is no longer running")]
    Disconnected,
    #[error("failed to start host thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Where the display sends its requests.
pub trait HostPort {
    /// Queue a request for the host.
    ///
    /// # Errors
    /// Returns [`HostError::Disconnected`] when the host has gone away.
    fn request(&mut self, request: HostRequest) -> Result<(), HostError>;
}

/// Display-side end of a running host thread.
pub struct HostHandle {
    requests: Sender<HostRequest>,
    events: Receiver<HostEvent>,
    thread: Option<JoinHandle<()>>,
}

/// Start the host thread and let it announce the launch settings.
///
/// # Errors
/// Returns an error if the thread cannot be spawned.
pub fn spawn(launch: LaunchOptions) -> Result<HostHandle, HostError> {
    let (request_tx, request_rx) = mpsc::channel();
    let (event_tx, event_rx) = mpsc::channel();

    let thread = thread::Builder::new()
        .name("mdviewer-host".to_string())
        .spawn(move || {
            let mut host = Host::new(event_tx);
            host.announce_launch(&launch);
            host.run(&request_rx);
        })?;

    Ok(HostHandle {
        requests: request_tx,
        events: event_rx,
        thread: Some(thread),
    })
}

impl HostHandle {
    /// Everything the host has sent since the last call, in order.
    pub fn drain_events(&self) -> Vec<HostEvent> {
        self.events.try_iter().collect()
    }
}

impl HostPort for HostHandle {
    fn request(&mut self, request: HostRequest) -> Result<(), HostError> {
        self.requests
            .send(request)
            .map_err(|_| HostError::Disconnected)
    }
}

impl Drop for HostHandle {
    fn drop(&mut self) {
        let _ = self.requests.send(HostRequest::Shutdown);
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            tracing::warn!("host thread panicked");
        }
    }
}

impl std::fmt::Debug for HostHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostHandle")
            .field("running", &self.thread.is_some())
            .finish_non_exhaustive()
    }
}

struct Host {
    events: Sender<HostEvent>,
    watcher: Option<FileWatcher>,
}

impl Host {
    const fn new(events: Sender<HostEvent>) -> Self {
        Self {
            events,
            watcher: None,
        }
    }

    fn announce_launch(&mut self, launch: &LaunchOptions) {
        self.send(HostEvent::SetMode(launch.mode.name().to_string()));
        if let Some(path) = &launch.file {
            let event = match self.read_document(path) {
                Ok(document) => HostEvent::FileOpened(document),
                Err(message) => HostEvent::FileOpenFailed(message),
            };
            self.send(event);
        }
    }

    fn run(&mut self, requests: &Receiver<HostRequest>) {
        loop {
            match requests.recv_timeout(WATCH_POLL_INTERVAL) {
                Ok(HostRequest::Read { ticket, path }) => {
                    let result = self.read_document(&path);
                    if !self.send(HostEvent::ReadCompleted { ticket, result }) {
                        break;
                    }
                }
                Ok(HostRequest::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {}
            }
            if !self.poll_watch() {
                break;
            }
        }
        tracing::debug!("host thread stopping");
    }

    /// Read a file and move the watch onto it.
    ///
    /// The previous watch is dropped only once the read succeeded, so a
    /// failed open leaves the current document watched.
    fn read_document(&mut self, path: &Path) -> Result<Document, String> {
        let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        let content = std::fs::read_to_string(&path).map_err(|err| {
            tracing::debug!(path = %path.display(), %err, "read failed");
            format!("{}: {err}", path.display())
        })?;

        self.watcher = None;
        self.watcher = match FileWatcher::new(&path) {
            Ok(watcher) => Some(watcher),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "file watch unavailable");
                None
            }
        };

        Ok(Document::new(path, content))
    }

    /// Forward a pending change notification. Returns `false` once the
    /// display has hung up.
    fn poll_watch(&mut self) -> bool {
        match self.watcher.as_mut().and_then(FileWatcher::poll_change) {
            Some(path) => self.send(HostEvent::FileChanged(path)),
            None => true,
        }
    }

    fn send(&self, event: HostEvent) -> bool {
        self.events.send(event).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::app::ViewMode;
    use tempfile::tempdir;

    fn next_event(handle: &HostHandle) -> Option<HostEvent> {
        handle.events.recv_timeout(Duration::from_secs(5)).ok()
    }

    fn wait_for_change(handle: &HostHandle) -> Option<PathBuf> {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if let Ok(HostEvent::FileChanged(path)) =
                handle.events.recv_timeout(Duration::from_millis(100))
            {
                return Some(path);
            }
        }
        None
    }

    #[test]
    fn test_launch_without_file_only_sets_mode() {
        let launch = LaunchOptions {
            mode: ViewMode::Rendered,
            file: None,
        };
        let handle = spawn(launch).expect("spawn");
        assert_eq!(
            next_event(&handle),
            Some(HostEvent::SetMode("rendered".to_string()))
        );
        std::thread::sleep(Duration::from_millis(200));
        assert!(handle.drain_events().is_empty());
    }

    #[test]
    fn test_launch_file_is_opened() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("a.md");
        std::fs::write(&path, "# Hi").expect("write");

        let handle = spawn(LaunchOptions {
            mode: ViewMode::Split,
            file: Some(path.clone()),
        })
        .expect("spawn");

        assert_eq!(next_event(&handle), Some(HostEvent::SetMode("split".to_string())));
        assert_eq!(
            next_event(&handle),
            Some(HostEvent::FileOpened(Document::new(path, "# Hi")))
        );
    }

    #[test]
    fn test_unreadable_launch_file_reports_failure() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("missing.md");

        let handle = spawn(LaunchOptions {
            mode: ViewMode::Split,
            file: Some(path),
        })
        .expect("spawn");

        let _mode = next_event(&handle);
        assert!(matches!(
            next_event(&handle),
            Some(HostEvent::FileOpenFailed(message)) if message.contains("missing.md")
        ));
    }

    #[test]
    fn test_read_request_echoes_ticket() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("b.md");
        std::fs::write(&path, "body").expect("write");

        let mut handle = spawn(LaunchOptions::default()).expect("spawn");
        let _mode = next_event(&handle);

        handle
            .request(HostRequest::Read {
                ticket: 7,
                path: path.clone(),
            })
            .expect("request");
        assert_eq!(
            next_event(&handle),
            Some(HostEvent::ReadCompleted {
                ticket: 7,
                result: Ok(Document::new(path, "body")),
            })
        );

        handle
            .request(HostRequest::Read {
                ticket: 8,
                path: dir.path().join("nope.md"),
            })
            .expect("request");
        assert!(matches!(
            next_event(&handle),
            Some(HostEvent::ReadCompleted { ticket: 8, result: Err(_) })
        ));
    }

    #[test]
    fn test_external_edit_is_reported() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("watched.md");
        std::fs::write(&path, "one").expect("write");

        let handle = spawn(LaunchOptions {
            mode: ViewMode::Split,
            file: Some(path.clone()),
        })
        .expect("spawn");
        let _mode = next_event(&handle);
        assert!(matches!(next_event(&handle), Some(HostEvent::FileOpened(_))));

        std::thread::sleep(Duration::from_millis(1100));
        std::fs::write(&path, "two").expect("write");

        assert_eq!(wait_for_change(&handle), Some(path));
    }
}
