use std::path::PathBuf;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{Message, Model, ViewMode};
use crate::editor::{Direction, EditOp};

use super::model::Prompt;

/// Text inserted for the Tab key.
const TAB_TEXT: &str = "    ";

/// Translate a terminal event into a message for the current state.
pub(super) fn handle_event(event: &Event, model: &Model) -> Option<Message> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(*key, model),
        Event::Paste(text) if model.prompt.is_none() && model.mode.panes().source => {
            Some(Message::Edit(EditOp::InsertText(text.clone())))
        }
        Event::Resize(width, height) => Some(Message::Resize(*width, *height)),
        _ => None,
    }
}

pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    if ctrl && matches!(key.code, KeyCode::Char('q' | 'c')) {
        return Some(Message::Quit);
    }

    if let Some(prompt) = &model.prompt {
        return handle_prompt_key(key, prompt);
    }

    if model.help_visible {
        return Some(Message::DismissAlert);
    }

    let page = model.source_rows().max(1);
    match key.code {
        KeyCode::Char('o') if ctrl => Some(Message::OpenRequested),
        KeyCode::Char('r') if ctrl => Some(Message::RefreshRequested),

        KeyCode::F(2) => Some(Message::SetMode(ViewMode::Source)),
        KeyCode::F(3) => Some(Message::SetMode(ViewMode::Split)),
        KeyCode::F(4) => Some(Message::SetMode(ViewMode::Rendered)),
        KeyCode::Char('1') if alt => Some(Message::SetMode(ViewMode::Source)),
        KeyCode::Char('2') if alt => Some(Message::SetMode(ViewMode::Split)),
        KeyCode::Char('3') if alt => Some(Message::SetMode(ViewMode::Rendered)),

        KeyCode::F(1) => Some(Message::ToggleHelp),
        KeyCode::Esc => Some(Message::DismissAlert),

        KeyCode::PageUp => Some(Message::PreviewScrollUp(page)),
        KeyCode::PageDown => Some(Message::PreviewScrollDown(page)),

        _ if model.mode.panes().source => edit_for_key(key).map(Message::Edit),
        KeyCode::Up => Some(Message::PreviewScrollUp(1)),
        KeyCode::Down => Some(Message::PreviewScrollDown(1)),
        _ => None,
    }
}

fn handle_prompt_key(key: KeyEvent, prompt: &Prompt) -> Option<Message> {
    match prompt {
        Prompt::Confirm { action, .. } => {
            let accepted = match key.code {
                KeyCode::Char('y' | 'Y') | KeyCode::Enter => true,
                KeyCode::Char('n' | 'N') | KeyCode::Esc => false,
                _ => return None,
            };
            Some(Message::ConfirmResolved {
                action: *action,
                accepted,
            })
        }
        Prompt::OpenPath { input } => match key.code {
            KeyCode::Esc => Some(Message::PickerCancelled),
            KeyCode::Enter => {
                let path = input.trim();
                if path.is_empty() {
                    Some(Message::PickerCancelled)
                } else {
                    Some(Message::PickerSubmitted(PathBuf::from(path)))
                }
            }
            KeyCode::Backspace => Some(Message::PromptBackspace),
            KeyCode::Char(c)
                if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                Some(Message::PromptInput(c))
            }
            _ => None,
        },
    }
}

fn edit_for_key(key: KeyEvent) -> Option<EditOp> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let op = match key.code {
        KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            EditOp::Insert(c)
        }
        KeyCode::Enter => EditOp::Newline,
        KeyCode::Tab => EditOp::InsertText(TAB_TEXT.to_string()),
        KeyCode::Backspace => EditOp::Backspace,
        KeyCode::Delete => EditOp::Delete,
        KeyCode::Left if ctrl => EditOp::WordLeft,
        KeyCode::Right if ctrl => EditOp::WordRight,
        KeyCode::Home if ctrl => EditOp::BufferStart,
        KeyCode::End if ctrl => EditOp::BufferEnd,
        KeyCode::Left => EditOp::Move(Direction::Left),
        KeyCode::Right => EditOp::Move(Direction::Right),
        KeyCode::Up => EditOp::Move(Direction::Up),
        KeyCode::Down => EditOp::Move(Direction::Down),
        KeyCode::Home => EditOp::LineStart,
        KeyCode::End => EditOp::LineEnd,
        _ => return None,
    };
    Some(op)
}
