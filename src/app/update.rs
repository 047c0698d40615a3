use std::path::PathBuf;

use crate::app::Model;
use crate::document::Document;
use crate::editor::EditOp;
use crate::host::HostEvent;

use super::mode::ViewMode;
use super::model::{GuardedAction, LoadPurpose, Prompt};

/// Everything that can change the application state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // View mode
    /// Select a mode from the mode selector
    SetMode(ViewMode),
    /// Mode requested by name from outside (ignored if unknown)
    SetModeNamed(String),

    // Editing
    /// Keystroke for the source buffer
    Edit(EditOp),
    /// The edit quiescence timer elapsed
    RenderDue,

    // Guarded actions
    /// User asked to open another file
    OpenRequested,
    /// User asked to reload the current file
    RefreshRequested,
    /// Answer to a discard-changes question
    ConfirmResolved {
        action: GuardedAction,
        accepted: bool,
    },

    // File picker
    PromptInput(char),
    PromptBackspace,
    PickerSubmitted(PathBuf),
    PickerCancelled,

    // Host
    /// Launch file loaded by the host
    FileOpened(Document),
    /// Launch file could not be loaded
    FileOpenFailed(String),
    /// A requested read finished
    ReadCompleted {
        ticket: u64,
        result: Result<Document, String>,
    },
    /// The watched file changed on disk
    FileChanged(PathBuf),

    // Window
    PreviewScrollUp(usize),
    PreviewScrollDown(usize),
    ToggleHelp,
    /// Close the alert and help overlays
    DismissAlert,
    Resize(u16, u16),
    Quit,
}

impl From<HostEvent> for Message {
    fn from(event: HostEvent) -> Self {
        match event {
            HostEvent::FileOpened(document) => Self::FileOpened(document),
            HostEvent::FileOpenFailed(message) => Self::FileOpenFailed(message),
            HostEvent::FileChanged(path) => Self::FileChanged(path),
            HostEvent::SetMode(name) => Self::SetModeNamed(name),
            HostEvent::ReadCompleted { ticket, result } => Self::ReadCompleted { ticket, result },
        }
    }
}

/// Side effects requested by [`update`] and carried out by the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Ask the user before running `action`.
    Confirm {
        prompt: &'static str,
        action: GuardedAction,
    },
    /// Let the user choose a file to open.
    PickFile,
    /// Ask the host to read `path`.
    ReadFile { ticket: u64, path: PathBuf },
    /// Show an error to the user.
    Alert(String),
    /// (Re)start the edit quiescence timer.
    ScheduleRender,
    /// Render the buffer now, cancelling any scheduled render.
    RenderNow,
}

/// Apply one message to the model.
///
/// Never performs I/O: anything that touches the outside world comes back
/// as an [`Effect`].
pub fn update(mut model: Model, msg: Message) -> (Model, Vec<Effect>) {
    let mut effects = Vec::new();

    match msg {
        Message::SetMode(mode) => model.mode = mode,
        Message::SetModeNamed(name) => match ViewMode::parse(&name) {
            Some(mode) => model.mode = mode,
            None => tracing::debug!(%name, "ignoring unknown mode request"),
        },

        Message::Edit(op) => {
            if model.mode.panes().source {
                let changed = model.buffer.apply(&op);
                model.follow_cursor();
                if changed {
                    model.dirty = true;
                    effects.push(Effect::ScheduleRender);
                }
            }
        }
        Message::RenderDue => effects.push(Effect::RenderNow),

        Message::OpenRequested => {
            if model.dirty {
                effects.push(confirm(GuardedAction::Open));
            } else {
                effects.push(Effect::PickFile);
            }
        }
        Message::RefreshRequested => {
            if model.document.is_some() {
                if model.dirty {
                    effects.push(confirm(GuardedAction::Reload));
                } else {
                    effects.push(start_refresh(&mut model));
                }
            }
        }
        Message::ConfirmResolved { action, accepted } => {
            model.prompt = None;
            if accepted {
                match action {
                    GuardedAction::Open => effects.push(Effect::PickFile),
                    GuardedAction::Reload if model.document.is_some() => {
                        effects.push(start_refresh(&mut model));
                    }
                    GuardedAction::Reload => {}
                }
            }
        }

        Message::PromptInput(ch) => {
            if let Some(Prompt::OpenPath { input }) = &mut model.prompt {
                input.push(ch);
            }
        }
        Message::PromptBackspace => {
            if let Some(Prompt::OpenPath { input }) = &mut model.prompt {
                input.pop();
            }
        }
        Message::PickerSubmitted(path) => {
            model.prompt = None;
            let path = if path.is_relative() && !model.current_dir().as_os_str().is_empty() {
                model.current_dir().join(path)
            } else {
                path
            };
            let ticket = model.begin_load(path.clone(), LoadPurpose::Open);
            effects.push(Effect::ReadFile { ticket, path });
        }
        Message::PickerCancelled => model.prompt = None,

        Message::FileOpened(document) => {
            model.load_document(document);
            effects.push(Effect::RenderNow);
        }
        Message::FileOpenFailed(message) => {
            effects.push(Effect::Alert(format!("Open failed: {message}")));
        }
        Message::ReadCompleted { ticket, result } => match model.take_pending(ticket) {
            Some(pending) => match result {
                Ok(document) => {
                    model.load_document(document);
                    effects.push(Effect::RenderNow);
                }
                Err(message) => {
                    effects.push(Effect::Alert(format!(
                        "{}: {message}",
                        pending.purpose.failure_label()
                    )));
                }
            },
            None => tracing::debug!(ticket, "discarding stale read"),
        },
        Message::FileChanged(path) => {
            if model.document.as_ref().is_some_and(|doc| doc.path() == path) {
                model.refresh_available = true;
            }
        }

        Message::PreviewScrollUp(n) => {
            model.preview_scroll = model.preview_scroll.saturating_sub(n);
        }
        Message::PreviewScrollDown(n) => {
            let max = model.preview_line_count().saturating_sub(1);
            model.preview_scroll = (model.preview_scroll + n).min(max);
        }
        Message::ToggleHelp => model.help_visible = !model.help_visible,
        Message::DismissAlert => {
            model.dismiss_toast();
            model.help_visible = false;
        }
        Message::Resize(width, height) => {
            model.terminal_size = (width, height);
            model.follow_cursor();
        }
        Message::Quit => model.should_quit = true,
    }

    (model, effects)
}

const fn confirm(action: GuardedAction) -> Effect {
    Effect::Confirm {
        prompt: action.prompt(),
        action,
    }
}

fn start_refresh(model: &mut Model) -> Effect {
    let path = model.current_path().to_path_buf();
    let ticket = model.begin_load(path.clone(), LoadPurpose::Refresh);
    Effect::ReadFile { ticket, path }
}
