use ropey::Rope;

/// Cursor position in the editor buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based column, counted in chars within the line.
    pub col: usize,
    /// Column vertical movement tries to return to.
    sticky_col: usize,
}

impl Cursor {
    pub const fn at(line: usize, col: usize) -> Self {
        Self {
            line,
            col,
            sticky_col: col,
        }
    }

    const fn place(&mut self, line: usize, col: usize) {
        self.line = line;
        self.col = col;
        self.sticky_col = col;
    }
}

/// Direction for single-step cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// One editing or navigation step on the source buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    Insert(char),
    /// Pasted text; line endings are normalised to `\n`.
    InsertText(String),
    Newline,
    Backspace,
    Delete,
    Move(Direction),
    LineStart,
    LineEnd,
    WordLeft,
    WordRight,
    BufferStart,
    BufferEnd,
}

/// The editable source text behind the source pane.
///
/// Backed by a rope so inserts and deletes stay cheap on long documents.
/// Columns are char offsets; the display layer converts them to cell
/// widths.
pub struct EditorBuffer {
    rope: Rope,
    cursor: Cursor,
}

impl Default for EditorBuffer {
    fn default() -> Self {
        Self::from_text("")
    }
}

impl EditorBuffer {
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: Cursor::default(),
        }
    }

    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Number of lines; an empty buffer and a trailing newline both count
    /// a final empty line.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Line contents without the line terminator.
    pub fn line_at(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let mut line = self.rope.line(line_idx).to_string();
        while line.ends_with(['\n', '\r']) {
            line.pop();
        }
        Some(line)
    }

    /// Line length in chars, excluding the terminator.
    pub fn line_len(&self, line_idx: usize) -> usize {
        self.line_at(line_idx).map_or(0, |line| line.chars().count())
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Apply one step. Returns `true` when the text changed.
    pub fn apply(&mut self, op: &EditOp) -> bool {
        match op {
            EditOp::Insert(ch) => {
                let mut utf8 = [0; 4];
                self.insert_str(ch.encode_utf8(&mut utf8))
            }
            EditOp::InsertText(text) => {
                let normalised = text.replace("\r\n", "\n").replace('\r', "\n");
                self.insert_str(&normalised)
            }
            EditOp::Newline => self.insert_str("\n"),
            EditOp::Backspace => self.delete_back(),
            EditOp::Delete => self.delete_forward(),
            EditOp::Move(direction) => {
                self.step(*direction);
                false
            }
            EditOp::LineStart => {
                self.cursor.place(self.cursor.line, 0);
                false
            }
            EditOp::LineEnd => {
                self.cursor.place(self.cursor.line, self.line_len(self.cursor.line));
                false
            }
            EditOp::WordLeft => {
                self.word_left();
                false
            }
            EditOp::WordRight => {
                self.word_right();
                false
            }
            EditOp::BufferStart => {
                self.cursor.place(0, 0);
                false
            }
            EditOp::BufferEnd => {
                let last = self.line_count().saturating_sub(1);
                self.cursor.place(last, self.line_len(last));
                false
            }
        }
    }

    /// Insert at the cursor and leave the cursor after the inserted text.
    pub fn insert_str(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let idx = self.cursor_char_idx();
        self.rope.insert(idx, text);
        let end = idx + text.chars().count();
        self.move_to_char_idx(end);
        true
    }

    fn delete_back(&mut self) -> bool {
        let idx = self.cursor_char_idx();
        if idx == 0 {
            return false;
        }
        // Treat a CRLF pair as one terminator.
        let start = if idx >= 2 && self.rope.slice(idx - 2..idx) == "\r\n" {
            idx - 2
        } else {
            idx - 1
        };
        self.rope.remove(start..idx);
        self.move_to_char_idx(start);
        true
    }

    fn delete_forward(&mut self) -> bool {
        let idx = self.cursor_char_idx();
        let total = self.rope.len_chars();
        if idx >= total {
            return false;
        }
        let end = if idx + 2 <= total && self.rope.slice(idx..idx + 2) == "\r\n" {
            idx + 2
        } else {
            idx + 1
        };
        self.rope.remove(idx..end);
        true
    }

    fn step(&mut self, direction: Direction) {
        let Cursor { line, col, .. } = self.cursor;
        match direction {
            Direction::Left if col > 0 => self.cursor.place(line, col - 1),
            Direction::Left if line > 0 => self.cursor.place(line - 1, self.line_len(line - 1)),
            Direction::Right if col < self.line_len(line) => self.cursor.place(line, col + 1),
            Direction::Right if line + 1 < self.line_count() => self.cursor.place(line + 1, 0),
            Direction::Up if line > 0 => self.vertical_to(line - 1),
            Direction::Down if line + 1 < self.line_count() => self.vertical_to(line + 1),
            _ => {}
        }
    }

    fn vertical_to(&mut self, line: usize) {
        self.cursor.line = line;
        self.cursor.col = self.cursor.sticky_col.min(self.line_len(line));
    }

    fn word_left(&mut self) {
        let Cursor { line, col, .. } = self.cursor;
        if col == 0 {
            if line > 0 {
                self.cursor.place(line - 1, self.line_len(line - 1));
            }
            return;
        }
        let chars: Vec<char> = self.line_at(line).unwrap_or_default().chars().collect();
        let mut pos = col.min(chars.len());
        while pos > 0 && !is_word_char(chars[pos - 1]) {
            pos -= 1;
        }
        while pos > 0 && is_word_char(chars[pos - 1]) {
            pos -= 1;
        }
        self.cursor.place(line, pos);
    }

    fn word_right(&mut self) {
        let Cursor { line, col, .. } = self.cursor;
        let chars: Vec<char> = self.line_at(line).unwrap_or_default().chars().collect();
        if col >= chars.len() {
            if line + 1 < self.line_count() {
                self.cursor.place(line + 1, 0);
            }
            return;
        }
        let mut pos = col;
        while pos < chars.len() && is_word_char(chars[pos]) {
            pos += 1;
        }
        while pos < chars.len() && !is_word_char(chars[pos]) {
            pos += 1;
        }
        self.cursor.place(line, pos);
    }

    fn cursor_char_idx(&self) -> usize {
        let line = self.cursor.line.min(self.line_count().saturating_sub(1));
        self.rope.line_to_char(line) + self.cursor.col.min(self.line_len(line))
    }

    fn move_to_char_idx(&mut self, idx: usize) {
        let line = self.rope.char_to_line(idx);
        self.cursor.place(line, idx - self.rope.line_to_char(line));
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl std::fmt::Debug for EditorBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorBuffer")
            .field("lines", &self.rope.len_lines())
            .field("cursor", &self.cursor)
            .finish()
    }
}
