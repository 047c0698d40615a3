//! URL classification and relative path resolution for links and images.

use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

/// References that already point somewhere absolute: a scheme we leave
/// alone, an in-page anchor, or a rooted path.
static ABSOLUTE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:https?:|file:|data:|mailto:|#|/|\\)").expect("valid regex")
});

/// Schemes that can execute script when followed.
static SCRIPT_SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:javascript|vbscript|data):").expect("valid regex")
});

/// Inline images are the only data URLs allowed through.
static SAFE_DATA_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*data:image/(?:gif|png|jpeg|webp);").expect("valid regex")
});

/// `<a href="...">` as emitted by the HTML formatter.
static ANCHOR_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<a href="([^"]*)""#).expect("valid regex"));

pub fn is_absolute_reference(url: &str) -> bool {
    ABSOLUTE_REFERENCE.is_match(url)
}

/// Whether following `url` could run script in the preview.
pub fn is_script_url(url: &str) -> bool {
    SCRIPT_SCHEME.is_match(url) && !SAFE_DATA_IMAGE.is_match(url)
}

/// Resolve a relative reference against `base_dir` into a `file://` URL.
///
/// Returns `None` when the reference must be left as written: it is
/// empty, already absolute, or there is no base directory to resolve
/// against.
pub fn resolve_relative(url: &str, base_dir: &Path) -> Option<String> {
    if url.is_empty() || base_dir.as_os_str().is_empty() || is_absolute_reference(url) {
        return None;
    }
    let resolved = normalize(&base_dir.join(url));
    Some(format!("file://{}", resolved.display()))
}

/// Add the external-context attributes to every anchor.
pub fn add_link_attributes(html: &str) -> String {
    ANCHOR_OPEN
        .replace_all(html, r#"<a href="$1" target="_blank" rel="noreferrer""#)
        .into_owned()
}

/// Collapse `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let at_root = matches!(
                    out.components().next_back(),
                    None | Some(Component::RootDir | Component::Prefix(_))
                );
                if !at_root {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_references_are_recognized() {
        for url in [
            "http://e.com",
            "HTTPS://e.com/i.png",
            "file:///tmp/a.md",
            "data:image/png;base64,AAAA",
            "mailto:me@example.com",
            "#section",
            "/abs/i.png",
            "\\\\server\\share",
        ] {
            assert!(is_absolute_reference(url), "{url} should be absolute");
        }
        assert!(!is_absolute_reference("img.png"));
        assert!(!is_absolute_reference("../img.png"));
        assert!(!is_absolute_reference("ftp.png"));
    }

    #[test]
    fn test_resolve_relative_joins_base_dir() {
        assert_eq!(
            resolve_relative("img.png", Path::new("/docs")).as_deref(),
            Some("file:///docs/img.png")
        );
    }

    #[test]
    fn test_resolve_relative_collapses_dot_segments() {
        assert_eq!(
            resolve_relative("./a/../../shared/img.png", Path::new("/docs/guide")).as_deref(),
            Some("file:///docs/shared/img.png")
        );
    }

    #[test]
    fn test_parent_segments_stop_at_root() {
        assert_eq!(
            resolve_relative("../../../x.md", Path::new("/docs")).as_deref(),
            Some("file:///x.md")
        );
    }

    #[test]
    fn test_resolve_relative_leaves_absolute_and_empty_alone() {
        assert_eq!(resolve_relative("https://e.com/i.png", Path::new("/docs")), None);
        assert_eq!(resolve_relative("/abs/i.png", Path::new("/docs")), None);
        assert_eq!(resolve_relative("#top", Path::new("/docs")), None);
        assert_eq!(resolve_relative("", Path::new("/docs")), None);
        assert_eq!(resolve_relative("img.png", Path::new("")), None);
    }

    #[test]
    fn test_script_urls_are_detected() {
        assert!(is_script_url("javascript:alert(1)"));
        assert!(is_script_url("  JavaScript:alert(1)"));
        assert!(is_script_url("vbscript:msgbox"));
        assert!(is_script_url("data:text/html;base64,PHNjcmlwdD4="));
        assert!(!is_script_url("data:image/png;base64,AAAA"));
        assert!(!is_script_url("https://e.com"));
        assert!(!is_script_url("notes/javascript:x.md"));
    }

    #[test]
    fn test_add_link_attributes_marks_every_anchor() {
        let html = "<p><a href=\"a.md\">a</a> and <a href=\"https://e.com\" title=\"t\">b</a></p>";
        let out = add_link_attributes(html);
        assert_eq!(
            out,
            "<p><a href=\"a.md\" target=\"_blank\" rel=\"noreferrer\">a</a> and \
             <a href=\"https://e.com\" target=\"_blank\" rel=\"noreferrer\" title=\"t\">b</a></p>"
        );
    }
}
