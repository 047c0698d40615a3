//! Editable source text.
//!
//! A rope-backed buffer with a cursor. Every keystroke reaches it as an
//! [`EditOp`], and [`EditorBuffer::apply`] reports whether the text
//! actually changed so the caller can track unsaved edits.

mod buffer;

pub use buffer::{Cursor, Direction, EditOp, EditorBuffer};
