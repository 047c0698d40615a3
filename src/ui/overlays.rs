use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap};
use unicode_width::UnicodeWidthStr;

fn popup_style() -> Style {
    Style::default().bg(Color::Black).fg(Color::White)
}

fn hint_style() -> Style {
    Style::default().fg(Color::Indexed(245))
}

pub fn render_confirm(message: &str, frame: &mut Frame, area: Rect) {
    let popup = centered_popup_rect(area.width.saturating_sub(10).clamp(30, 70), 7, area);
    let lines = vec![
        Line::styled(message.to_string(), Style::default().add_modifier(Modifier::BOLD)),
        Line::raw(""),
        Line::styled("y/Enter discard changes · n/Esc keep editing", hint_style()),
    ];
    let block = Block::default()
        .title("Unsaved changes")
        .borders(Borders::ALL)
        .padding(Padding::horizontal(1))
        .style(popup_style());
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }).block(block),
        popup,
    );
}

/// The file picker: a single-line path input.
pub fn render_open_prompt(input: &str, frame: &mut Frame, area: Rect) {
    let popup = centered_popup_rect(area.width.saturating_sub(10).max(30), 5, area);
    let block = Block::default()
        .title("Open file")
        .borders(Borders::ALL)
        .padding(Padding::horizontal(1))
        .style(popup_style());
    let inner = block.inner(popup);
    frame.render_widget(Clear, popup);
    frame.render_widget(block, popup);

    // Show the tail of long paths so the caret stays visible.
    let room = usize::from(inner.width.saturating_sub(3));
    let mut shown = input;
    while shown.width() > room {
        let mut chars = shown.chars();
        chars.next();
        shown = chars.as_str();
    }
    let input_line = Line::from(vec![
        Span::styled("> ", Style::default().fg(Color::Yellow)),
        Span::raw(shown.to_string()),
    ]);
    let hint = Line::styled("Enter open · Esc cancel", hint_style());
    frame.render_widget(Paragraph::new(vec![input_line, hint]), inner);

    #[allow(clippy::cast_possible_truncation)]
    let caret_x = inner.x + 2 + shown.width() as u16;
    if caret_x < inner.x + inner.width && inner.height > 0 {
        frame.set_cursor_position((caret_x, inner.y));
    }
}

pub fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup = centered_popup_rect(area.width.saturating_sub(12).max(48), 24, area);

    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let lines = vec![
        Line::styled("Files", section_style),
        Line::raw("  Ctrl-O              Open file"),
        Line::raw("  Ctrl-R              Reload from disk"),
        Line::raw(""),
        Line::styled("View", section_style),
        Line::raw("  F2 / Alt-1          Source"),
        Line::raw("  F3 / Alt-2          Split"),
        Line::raw("  F4 / Alt-3          Rendered"),
        Line::raw("  PageUp/PageDown     Scroll preview"),
        Line::raw(""),
        Line::styled("Editing", section_style),
        Line::raw("  Arrows, Home/End    Move cursor"),
        Line::raw("  Ctrl+Left/Right     Word movement"),
        Line::raw("  Ctrl+Home/End       Buffer start / end"),
        Line::raw("  Typing, paste       Edit source"),
        Line::raw(""),
        Line::styled("Other", section_style),
        Line::raw("  F1                  Toggle help"),
        Line::raw("  Esc                 Dismiss alert"),
        Line::raw("  Ctrl-Q / Ctrl-C     Quit"),
    ];

    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .padding(Padding::uniform(1))
        .style(popup_style());
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
