use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, ToastLevel, ViewMode};

/// Text of the refresh affordance shown while the file is stale.
pub const REFRESH_HINT: &str = " Changed on disk: Ctrl-R reloads ";

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let base = Style::default().bg(Color::DarkGray).fg(Color::White);

    let filename = model
        .document
        .as_ref()
        .and_then(crate::document::Document::file_name)
        .unwrap_or_else(|| "no file".to_string());
    let dirty = if model.dirty { " [modified]" } else { "" };

    let mut spans = vec![Span::raw(format!(" {filename}{dirty}  "))];
    spans.extend(mode_selector(model.mode));
    if model.refresh_available {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            REFRESH_HINT,
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ));
    }
    let cursor = model.buffer.cursor();
    spans.push(Span::raw(format!(
        "  Ln {}, Col {}  F1:help",
        cursor.line + 1,
        cursor.col + 1
    )));

    frame.render_widget(Paragraph::new(Line::from(spans)).style(base), area);
}

/// One indicator per mode; only the active one is highlighted.
pub fn mode_selector(active: ViewMode) -> Vec<Span<'static>> {
    let mut spans = Vec::with_capacity(ViewMode::ALL.len() * 2);
    for (idx, mode) in ViewMode::ALL.into_iter().enumerate() {
        if idx > 0 {
            spans.push(Span::raw(" "));
        }
        let label = format!("[{}]", mode.label());
        if mode == active {
            spans.push(Span::styled(
                label,
                Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD),
            ));
        } else {
            spans.push(Span::raw(label));
        }
    }
    spans
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}  (Esc)")).style(style);
    frame.render_widget(toast, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_one_indicator_is_active() {
        for active in ViewMode::ALL {
            let spans = mode_selector(active);
            let highlighted: Vec<&str> = spans
                .iter()
                .filter(|s| s.style.add_modifier.contains(Modifier::REVERSED))
                .map(|s| s.content.as_ref())
                .collect();
            assert_eq!(highlighted, vec![format!("[{}]", active.label())]);
        }
    }
}
