//! The loaded markdown document.
//!
//! A [`Document`] is the `{path, content}` pair handed over by the host
//! when a file is opened or reloaded. It never changes after loading;
//! edits live in the [`EditorBuffer`](crate::editor::EditorBuffer).

use std::path::{Path, PathBuf};

/// A file as it was read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    path: PathBuf,
    content: String,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Path the document was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw markdown source as read.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Directory containing the document, used to resolve relative links.
    ///
    /// Empty when the path has no parent component.
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Final path component for titles and status lines.
    pub fn file_name(&self) -> Option<String> {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_is_parent_of_path() {
        let doc = Document::new("/tmp/notes/a.md", "# Hi");
        assert_eq!(doc.directory(), Path::new("/tmp/notes"));
        assert_eq!(doc.file_name().as_deref(), Some("a.md"));
    }

    #[test]
    fn test_directory_of_bare_name_is_empty() {
        let doc = Document::new("a.md", "");
        assert_eq!(doc.directory(), Path::new(""));
    }
}
