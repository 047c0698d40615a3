//! Application state: the loaded document, its editor buffer and
//! everything the UI draws from.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::document::Document;
use crate::editor::EditorBuffer;

use super::mode::ViewMode;

/// Application name used in the window title.
pub const APP_NAME: &str = "mdviewer";

/// Rows below the panes: toast line and status bar.
pub const FOOTER_ROWS: u16 = 2;

const TOAST_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// An action that would throw away unsaved edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardedAction {
    Open,
    Reload,
}

impl GuardedAction {
    /// Question asked before discarding edits.
    pub const fn prompt(self) -> &'static str {
        match self {
            Self::Open => "You have unsaved changes. Discard them and open another file?",
            Self::Reload => "File changed on disk. Reload and discard unsaved changes?",
        }
    }
}

/// Modal overlay waiting for an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// Yes/no question guarding `action`.
    Confirm {
        message: String,
        action: GuardedAction,
    },
    /// The file picker: a path typed by the user.
    OpenPath { input: String },
}

/// Why a read was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPurpose {
    Open,
    Refresh,
}

impl LoadPurpose {
    /// Alert prefix when the read fails.
    pub const fn failure_label(self) -> &'static str {
        match self {
            Self::Open => "Open failed",
            Self::Refresh => "Refresh failed",
        }
    }
}

/// The read the display is currently waiting for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLoad {
    pub ticket: u64,
    pub path: PathBuf,
    pub purpose: LoadPurpose,
}

/// The complete application state.
#[derive(Debug)]
pub struct Model {
    /// Document as last loaded from disk.
    pub document: Option<Document>,
    /// Editable copy of the document's source.
    pub buffer: EditorBuffer,
    /// The buffer differs from what was loaded because of user input.
    pub dirty: bool,
    pub mode: ViewMode,
    /// The file changed on disk since it was loaded.
    pub refresh_available: bool,
    /// Output of the last render of `buffer`.
    pub rendered_html: String,
    pub prompt: Option<Prompt>,
    pub help_visible: bool,
    /// First visible line of the source pane.
    pub source_scroll: usize,
    /// First visible line of the preview pane.
    pub preview_scroll: usize,
    pub terminal_size: (u16, u16),
    pub should_quit: bool,
    pending_load: Option<PendingLoad>,
    next_ticket: u64,
    toast: Option<Toast>,
}

impl Default for Model {
    fn default() -> Self {
        Self::new(ViewMode::default(), (80, 24))
    }
}

impl Model {
    pub fn new(mode: ViewMode, terminal_size: (u16, u16)) -> Self {
        Self {
            document: None,
            buffer: EditorBuffer::default(),
            dirty: false,
            mode,
            refresh_available: false,
            rendered_html: String::new(),
            prompt: None,
            help_visible: false,
            source_scroll: 0,
            preview_scroll: 0,
            terminal_size,
            should_quit: false,
            pending_load: None,
            next_ticket: 0,
            toast: None,
        }
    }

    /// Path of the loaded document, empty when there is none.
    pub fn current_path(&self) -> &Path {
        self.document.as_ref().map_or(Path::new(""), Document::path)
    }

    /// Directory of the loaded document, empty when there is none.
    pub fn current_dir(&self) -> &Path {
        self.document
            .as_ref()
            .map_or(Path::new(""), Document::directory)
    }

    /// Window title: file name, a marker for unsaved edits, app name.
    pub fn title(&self) -> String {
        match self.document.as_ref().and_then(Document::file_name) {
            Some(name) if self.dirty => format!("* {name} - {APP_NAME}"),
            Some(name) => format!("{name} - {APP_NAME}"),
            None => APP_NAME.to_string(),
        }
    }

    /// Replace the document wholesale and reset per-document state.
    pub fn load_document(&mut self, document: Document) {
        self.buffer = EditorBuffer::from_text(document.content());
        self.document = Some(document);
        self.dirty = false;
        self.refresh_available = false;
        self.source_scroll = 0;
        self.preview_scroll = 0;
    }

    /// Record a new outstanding read, superseding any earlier one.
    pub fn begin_load(&mut self, path: PathBuf, purpose: LoadPurpose) -> u64 {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        if let Some(stale) = self.pending_load.replace(PendingLoad {
            ticket,
            path,
            purpose,
        }) {
            tracing::debug!(ticket = stale.ticket, "superseding pending read");
        }
        ticket
    }

    /// Claim the outstanding read if `ticket` is the one being waited for.
    pub fn take_pending(&mut self, ticket: u64) -> Option<PendingLoad> {
        if self.pending_load.as_ref().is_some_and(|p| p.ticket == ticket) {
            return self.pending_load.take();
        }
        None
    }

    pub const fn pending_load(&self) -> Option<&PendingLoad> {
        self.pending_load.as_ref()
    }

    /// Rows available to the source pane's text.
    pub const fn source_rows(&self) -> usize {
        // Pane borders take one row at the top and one at the bottom.
        self.terminal_size.1.saturating_sub(FOOTER_ROWS + 2) as usize
    }

    /// Scroll the source pane so the cursor line is on screen.
    pub fn follow_cursor(&mut self) {
        let rows = self.source_rows().max(1);
        let line = self.buffer.cursor().line;
        if line < self.source_scroll {
            self.source_scroll = line;
        } else if line >= self.source_scroll + rows {
            self.source_scroll = line + 1 - rows;
        }
    }

    /// Number of lines the preview pane can show.
    pub fn preview_line_count(&self) -> usize {
        crate::ui::preview_lines(&self.rendered_html).len()
    }

    pub fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + TOAST_DURATION,
        });
    }

    pub(super) fn dismiss_toast(&mut self) -> bool {
        self.toast.take().is_some()
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }
}
