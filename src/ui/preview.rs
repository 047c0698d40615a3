//! Terminal presentation of rendered HTML.
//!
//! The renderer's output is a small, well-formed subset of HTML. This
//! module walks its tags and text and builds styled lines for the
//! preview pane: tags are dropped, block elements start new lines, and
//! inline elements become span styles.

use ratatui::prelude::*;
use unicode_width::UnicodeWidthStr;

/// Indent in front of every code block line.
const CODE_INDENT: &str = "  ";

/// Width of a horizontal rule.
const RULE_WIDTH: usize = 24;

/// Convert rendered HTML into preview lines.
pub fn preview_lines(html: &str) -> Vec<Line<'static>> {
    let mut builder = LineBuilder::default();
    let mut rest = html;
    while let Some(open) = rest.find('<') {
        if open > 0 {
            builder.text(&rest[..open]);
        }
        let tail = &rest[open..];
        let Some(close) = tail.find('>') else {
            rest = tail;
            break;
        };
        builder.tag(&tail[1..close]);
        rest = &tail[close + 1..];
    }
    if !rest.is_empty() {
        builder.text(rest);
    }
    builder.finish()
}

#[derive(Debug, Default)]
struct InlineState {
    emphasis: usize,
    strong: usize,
    strikethrough: usize,
    link_depth: usize,
    code: usize,
}

impl InlineState {
    fn style(&self) -> Style {
        let mut style = Style::default();
        if self.emphasis > 0 {
            style = style.add_modifier(Modifier::ITALIC);
        }
        if self.strong > 0 {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.strikethrough > 0 {
            style = style.add_modifier(Modifier::CROSSED_OUT);
        }
        if self.code > 0 {
            style = style.fg(Color::Yellow);
        }
        if self.link_depth > 0 {
            style = style.fg(Color::Cyan).add_modifier(Modifier::UNDERLINED);
        }
        style
    }
}

#[derive(Debug)]
struct ListState {
    /// Next number for ordered lists, `None` for bullets.
    next_index: Option<u64>,
}

#[derive(Debug, Default)]
struct LineBuilder {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    line_open: bool,
    /// A blank line goes in before the next top-level block.
    gap: bool,

    inline: InlineState,
    heading_level: Option<u8>,
    blockquote_depth: usize,
    list_stack: Vec<ListState>,
    marker: Option<String>,
    marker_width: usize,
    in_pre: bool,
    in_table: bool,
    cells_in_row: usize,
}

impl LineBuilder {
    fn finish(mut self) -> Vec<Line<'static>> {
        self.close_line();
        self.lines
    }

    fn style(&self) -> Style {
        if self.in_pre {
            return Style::default().fg(Color::Indexed(250));
        }
        match self.heading_level {
            Some(level) => heading_style(level).patch(self.inline.style()),
            None => self.inline.style(),
        }
    }

    fn open_line(&mut self) {
        if self.line_open {
            return;
        }
        if self.gap && !self.lines.is_empty() {
            self.lines.push(Line::default());
        }
        self.gap = false;
        self.line_open = true;

        let muted = Style::default().fg(Color::DarkGray);
        for _ in 0..self.blockquote_depth {
            self.current.push(Span::styled("│ ", muted));
        }
        if self.list_stack.len() > 1 {
            self.current
                .push(Span::raw("  ".repeat(self.list_stack.len() - 1)));
        }
        if let Some(marker) = self.marker.take() {
            self.current.push(Span::styled(marker, muted));
        } else if !self.list_stack.is_empty() {
            self.current.push(Span::raw(" ".repeat(self.marker_width)));
        }
        if self.in_pre {
            self.current.push(Span::raw(CODE_INDENT));
        }
    }

    fn close_line(&mut self) {
        if self.line_open {
            if !self.in_pre
                && let Some(last) = self.current.last_mut()
            {
                let trimmed = last.content.trim_end().to_string();
                last.content = trimmed.into();
            }
            self.lines.push(Line::from(std::mem::take(&mut self.current)));
            self.line_open = false;
        }
    }

    fn end_block(&mut self) {
        self.close_line();
        if self.list_stack.is_empty() && self.blockquote_depth == 0 {
            self.gap = true;
        }
    }

    fn push(&mut self, text: String, style: Style) {
        if !text.is_empty() {
            self.current.push(Span::styled(text, style));
        }
    }

    fn text(&mut self, raw: &str) {
        let text = decode_entities(raw);
        if self.in_pre {
            let mut segments = text.split('\n').peekable();
            while let Some(segment) = segments.next() {
                if !segment.is_empty() {
                    self.open_line();
                    self.push(segment.to_string(), self.style());
                }
                if segments.peek().is_some() {
                    self.open_line();
                    self.close_line();
                }
            }
            return;
        }

        // Newlines between table cells are layout, not content.
        if self.in_table && text.trim().is_empty() {
            return;
        }
        let text = text.replace('\n', " ");
        let text = if self.line_open {
            text.as_str()
        } else {
            text.trim_start()
        };
        if text.is_empty() {
            return;
        }
        self.open_line();
        self.push(text.to_string(), self.style());
    }

    fn tag(&mut self, raw: &str) {
        let closing = raw.starts_with('/');
        let name: String = raw
            .trim_start_matches('/')
            .chars()
            .take_while(char::is_ascii_alphanumeric)
            .collect::<String>()
            .to_ascii_lowercase();

        match name.as_str() {
            "p" => {
                if closing {
                    self.end_block();
                } else {
                    self.close_line();
                }
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.close_line();
                if closing {
                    self.heading_level = None;
                    self.end_block();
                } else {
                    self.heading_level = name[1..].parse().ok();
                }
            }
            "blockquote" => {
                self.close_line();
                if closing {
                    self.blockquote_depth = self.blockquote_depth.saturating_sub(1);
                    self.end_block();
                } else {
                    self.blockquote_depth += 1;
                }
            }
            "pre" => {
                self.close_line();
                self.in_pre = !closing;
                if closing {
                    self.end_block();
                }
            }
            "ul" | "ol" => {
                self.close_line();
                if closing {
                    self.list_stack.pop();
                    self.end_block();
                } else {
                    let next_index = (name == "ol")
                        .then(|| attr(raw, "start").and_then(|s| s.parse().ok()).unwrap_or(1));
                    self.list_stack.push(ListState { next_index });
                }
            }
            "li" => {
                self.close_line();
                if !closing {
                    let marker = match self.list_stack.last_mut() {
                        Some(ListState {
                            next_index: Some(index),
                        }) => {
                            let marker = format!("{index}. ");
                            *index += 1;
                            marker
                        }
                        _ => "• ".to_string(),
                    };
                    self.marker_width = marker.width();
                    self.marker = Some(marker);
                }
            }
            "table" => {
                self.close_line();
                self.in_table = !closing;
                if closing {
                    self.end_block();
                }
            }
            "tr" => {
                self.close_line();
                self.cells_in_row = 0;
            }
            "th" | "td" => {
                if closing {
                    if name == "th" {
                        self.inline.strong = self.inline.strong.saturating_sub(1);
                    }
                } else {
                    self.open_line();
                    if self.cells_in_row > 0 {
                        self.push(" │ ".to_string(), Style::default().fg(Color::DarkGray));
                    }
                    self.cells_in_row += 1;
                    if name == "th" {
                        self.inline.strong += 1;
                    }
                }
            }
            "hr" => {
                self.close_line();
                self.open_line();
                self.push("─".repeat(RULE_WIDTH), Style::default().fg(Color::DarkGray));
                self.end_block();
            }
            "br" => self.close_line(),
            "img" => {
                let alt = attr(raw, "alt").map(decode_entities).unwrap_or_default();
                self.open_line();
                self.push(format!("[image: {alt}]"), Style::default().fg(Color::LightBlue));
            }
            "em" => adjust(&mut self.inline.emphasis, closing),
            "strong" => adjust(&mut self.inline.strong, closing),
            "del" => adjust(&mut self.inline.strikethrough, closing),
            "a" => adjust(&mut self.inline.link_depth, closing),
            "code" if !self.in_pre => adjust(&mut self.inline.code, closing),
            _ => {}
        }
    }
}

fn adjust(counter: &mut usize, closing: bool) {
    if closing {
        *counter = counter.saturating_sub(1);
    } else {
        *counter += 1;
    }
}

fn heading_style(level: u8) -> Style {
    match level {
        1 => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        2 => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
        3 => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        4 => Style::default()
            .fg(Color::Blue)
            .add_modifier(Modifier::BOLD),
        5 => Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD),
        _ => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    }
}

/// Value of a double-quoted attribute inside a tag.
fn attr<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!(" {name}=\"");
    let start = tag.find(&needle)? + needle.len();
    let len = tag[start..].find('"')?;
    Some(&tag[start..start + len])
}

fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .filter(|end| *end <= 10)
            .and_then(|end| entity_char(&tail[1..end]).map(|ch| (ch, end)));
        match decoded {
            Some((ch, end)) => {
                out.push(ch);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn entity_char(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Renderer;
    use std::path::Path;

    fn texts(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    fn render(md: &str) -> Vec<Line<'static>> {
        preview_lines(&Renderer::new().render(md, Path::new("")))
    }

    #[test]
    fn test_heading_drops_tags_and_is_bold() {
        let lines = render("# Hi");
        assert_eq!(texts(&lines), vec!["Hi"]);
        assert!(lines[0].spans[0].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_blocks_are_separated_by_blank_lines() {
        let lines = render("a\nb\n\nc");
        assert_eq!(texts(&lines), vec!["a b", "", "c"]);
    }

    #[test]
    fn test_lists_get_markers_and_numbers() {
        let lines = render("- one\n- two\n\n3. three\n4. four");
        assert_eq!(
            texts(&lines),
            vec!["• one", "• two", "", "3. three", "4. four"]
        );
    }

    #[test]
    fn test_nested_list_is_indented() {
        let lines = render("- outer\n  - inner");
        assert_eq!(texts(&lines), vec!["• outer", "  • inner"]);
    }

    #[test]
    fn test_code_block_keeps_lines_and_indents() {
        let lines = render("```\nlet a = 1;\n\nif a < 2 {}\n```");
        assert_eq!(
            texts(&lines),
            vec!["  let a = 1;", "  ", "  if a < 2 {}"]
        );
    }

    #[test]
    fn test_highlighted_code_has_no_markup() {
        let lines = render("```rust\nfn main() {}\n```");
        assert_eq!(texts(&lines), vec!["  fn main() {}"]);
    }

    #[test]
    fn test_links_are_underlined() {
        let lines = render("see [docs](https://e.com)");
        let link = lines[0]
            .spans
            .iter()
            .find(|s| s.content == "docs")
            .unwrap();
        assert!(link.style.add_modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn test_entities_are_decoded() {
        let lines = render("a < b & \"c\"");
        assert_eq!(texts(&lines), vec!["a < b & “c”"]);
        assert_eq!(decode_entities("&#39;&#x27;&bogus; &"), "''&bogus; &");
    }

    #[test]
    fn test_blockquote_and_table() {
        let lines = render("> quoted\n\n| a | b |\n| - | - |\n| 1 | 2 |");
        assert_eq!(texts(&lines), vec!["│ quoted", "", "a │ b", "1 │ 2"]);
    }

    #[test]
    fn test_image_shows_alt_text() {
        let lines = render("![logo](img.png)");
        assert_eq!(texts(&lines), vec!["[image: logo]"]);
    }

    #[test]
    fn test_raw_html_stays_visible_as_text() {
        let lines = render("<div>x</div>");
        assert_eq!(texts(&lines), vec!["<div>x</div>"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(preview_lines("").is_empty());
    }
}
