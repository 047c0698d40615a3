use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use unicode_width::UnicodeWidthChar;

use crate::app::{FOOTER_ROWS, Model, Prompt, ViewMode};

use super::preview::preview_lines;
use super::{overlays, status};

/// Spaces a tab occupies on screen.
const TAB_WIDTH: usize = 4;

/// Screen areas of the visible panes, borders included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneAreas {
    pub source: Option<Rect>,
    pub rendered: Option<Rect>,
}

/// Lay out the panes for `mode` inside `area`. Split divides the width
/// evenly.
pub fn pane_areas(area: Rect, mode: ViewMode) -> PaneAreas {
    let panes = mode.panes();
    match (panes.source, panes.rendered) {
        (true, true) => {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(area);
            PaneAreas {
                source: Some(columns[0]),
                rendered: Some(columns[1]),
            }
        }
        (true, false) => PaneAreas {
            source: Some(area),
            rendered: None,
        },
        (false, _) => PaneAreas {
            source: None,
            rendered: Some(area),
        },
    }
}

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();
    let footer = FOOTER_ROWS.min(area.height);
    let main_area = Rect {
        height: area.height - footer,
        ..area
    };
    let toast_area = Rect {
        y: area.y + area.height.saturating_sub(2),
        height: footer.saturating_sub(1),
        ..area
    };
    let status_area = Rect {
        y: area.y + area.height.saturating_sub(1),
        height: footer.min(1),
        ..area
    };

    let panes = pane_areas(main_area, model.mode);
    if let Some(source_area) = panes.source {
        render_source(model, frame, source_area);
    }
    if let Some(rendered_area) = panes.rendered {
        render_preview(model, frame, rendered_area);
    }

    status::render_toast_bar(model, frame, toast_area);
    status::render_status_bar(model, frame, status_area);

    match &model.prompt {
        Some(Prompt::Confirm { message, .. }) => overlays::render_confirm(message, frame, area),
        Some(Prompt::OpenPath { input }) => overlays::render_open_prompt(input, frame, area),
        None if model.help_visible => overlays::render_help_overlay(frame, area),
        None => {}
    }
}

fn pane_block(title: &str, focused: bool) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        })
}

fn render_source(model: &Model, frame: &mut Frame, area: Rect) {
    let title = if model.dirty { "Source *" } else { "Source" };
    let block = pane_block(title, model.prompt.is_none());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let buf = &model.buffer;
    let total_lines = buf.line_count();
    let gutter_width = line_number_width(total_lines) as usize;
    let text_width = (inner.width as usize).saturating_sub(gutter_width + 1).max(1);

    let visible_height = inner.height as usize;
    let cursor = buf.cursor();
    let start = visible_start(model.source_scroll, cursor.line, visible_height);
    let end = (start + visible_height).min(total_lines);

    // Keep the cursor column on screen for long lines.
    let cursor_line = buf.line_at(cursor.line).unwrap_or_default();
    let cursor_x = display_width(cursor_line.chars().take(cursor.col));
    let h_offset = cursor_x.saturating_sub(text_width.saturating_sub(1));

    let mut content: Vec<Line> = Vec::with_capacity(end.saturating_sub(start));
    for line_idx in start..end {
        let text = buf.line_at(line_idx).unwrap_or_default();
        let number = format!("{:>gutter_width$} ", line_idx + 1);
        let mut spans = vec![Span::styled(number, Style::default().fg(Color::DarkGray))];

        let cells = expand_cells(&text);
        let cursor_cell = (line_idx == cursor.line).then(|| display_width(text.chars().take(cursor.col)));
        spans.extend(cell_spans(&cells, h_offset, cursor_cell));
        content.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(content), inner);
}

fn render_preview(model: &Model, frame: &mut Frame, area: Rect) {
    let block = pane_block("Preview", model.prompt.is_none() && !model.mode.panes().source);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if model.rendered_html.is_empty() {
        let hint = if model.document.is_none() {
            "No document. Ctrl-O opens a file."
        } else {
            ""
        };
        frame.render_widget(
            Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    }

    let lines: Vec<Line> = preview_lines(&model.rendered_html)
        .into_iter()
        .skip(model.preview_scroll)
        .take(inner.height as usize)
        .collect();
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

/// First line to show so that `cursor_line` is inside a window of `rows`.
pub const fn visible_start(scroll: usize, cursor_line: usize, rows: usize) -> usize {
    if rows == 0 {
        return scroll;
    }
    if cursor_line < scroll {
        cursor_line
    } else if cursor_line >= scroll + rows {
        cursor_line + 1 - rows
    } else {
        scroll
    }
}

/// Split text into screen cells, expanding tabs.
fn expand_cells(text: &str) -> Vec<char> {
    let mut cells = Vec::with_capacity(text.len());
    for ch in text.chars() {
        if ch == '\t' {
            cells.extend(std::iter::repeat_n(' ', TAB_WIDTH));
        } else {
            cells.push(ch);
            // Wide glyphs occupy a second cell that is never drawn.
            if ch.width().unwrap_or(0) > 1 {
                cells.push('\0');
            }
        }
    }
    cells
}

fn display_width(chars: impl Iterator<Item = char>) -> usize {
    chars
        .map(|ch| if ch == '\t' { TAB_WIDTH } else { ch.width().unwrap_or(0) })
        .sum()
}

fn cell_spans(cells: &[char], offset: usize, cursor: Option<usize>) -> Vec<Span<'static>> {
    let visible = |range: &[char]| -> String { range.iter().filter(|c| **c != '\0').collect() };
    let cursor_style = Style::default().bg(Color::White).fg(Color::Black);

    let Some(cursor) = cursor else {
        return vec![Span::raw(visible(cells.get(offset..).unwrap_or_default()))];
    };

    let mut spans = Vec::new();
    let before = cells.get(offset..cursor.max(offset)).unwrap_or_default();
    if !before.is_empty() {
        spans.push(Span::raw(visible(before)));
    }
    let under = cells.get(cursor).copied().unwrap_or(' ');
    spans.push(Span::styled(under.to_string(), cursor_style));
    let after_start = cells
        .get(cursor + 1..)
        .map_or(cells.len(), |tail| {
            cursor + 1 + tail.iter().take_while(|c| **c == '\0').count()
        });
    if let Some(after) = cells.get(after_start..)
        && !after.is_empty()
    {
        spans.push(Span::raw(visible(after)));
    }
    spans
}

/// Calculate the width needed for line numbers.
pub const fn line_number_width(total_lines: usize) -> u16 {
    if total_lines < 10 {
        1
    } else if total_lines < 100 {
        2
    } else if total_lines < 1_000 {
        3
    } else if total_lines < 10_000 {
        4
    } else if total_lines < 100_000 {
        5
    } else {
        6
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_start_follows_cursor() {
        assert_eq!(visible_start(0, 3, 10), 0);
        assert_eq!(visible_start(5, 3, 10), 3);
        assert_eq!(visible_start(0, 12, 10), 3);
        assert_eq!(visible_start(4, 0, 0), 4);
    }

    #[test]
    fn test_expand_cells_handles_tabs_and_wide_chars() {
        assert_eq!(expand_cells("a\tb").len(), 2 + TAB_WIDTH);
        assert_eq!(expand_cells("日").len(), 2);
        assert_eq!(display_width("a\t日".chars()), 1 + TAB_WIDTH + 2);
    }

    #[test]
    fn test_cursor_at_line_end_shows_block() {
        let cells = expand_cells("ab");
        let spans = cell_spans(&cells, 0, Some(2));
        let texts: Vec<&str> = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(texts, vec!["ab", " "]);
    }

    #[test]
    fn test_line_number_width() {
        assert_eq!(line_number_width(9), 1);
        assert_eq!(line_number_width(10), 2);
        assert_eq!(line_number_width(12_345), 5);
    }
}
