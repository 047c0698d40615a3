//! Launch configuration: which file to open and which view mode to start in.
//!
//! Command lines are normally parsed by clap in `main`. When clap rejects
//! one, [`LaunchOptions::from_tokens`] recovers what it can from the raw
//! tokens so that a stray flag never prevents the viewer from starting.

use std::path::PathBuf;

use url::Url;

use crate::app::ViewMode;

/// Effective launch settings after validation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    pub mode: ViewMode,
    /// Absolute path of the file to auto-load, if any usable one was given.
    pub file: Option<PathBuf>,
}

impl LaunchOptions {
    /// Validate a requested mode and candidate file arguments.
    pub fn resolve(mode: Option<&str>, files: &[String]) -> Self {
        Self {
            mode: resolve_initial_mode(mode),
            file: resolve_file_arg(files),
        }
    }

    /// Scan raw argument tokens (program name excluded).
    ///
    /// Understands `--mode X` and `--mode=X`, skips the value of
    /// `--log-file`, ignores other flags, and treats the rest as file
    /// candidates.
    pub fn from_tokens(tokens: &[String]) -> Self {
        let mut mode = None;
        let mut files = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            let token = &tokens[i];
            if token == "--mode" {
                mode = tokens.get(i + 1).map(String::as_str);
                i += 1;
            } else if let Some(value) = token.strip_prefix("--mode=") {
                mode = Some(value);
            } else if token == "--log-file" {
                i += 1;
            } else if !token.starts_with('-') {
                files.push(token.clone());
            }
            i += 1;
        }
        Self::resolve(mode, &files)
    }
}

/// The starting view mode; anything unrecognised falls back to split.
pub fn resolve_initial_mode(value: Option<&str>) -> ViewMode {
    match value.map(ViewMode::parse) {
        Some(Some(mode)) => mode,
        Some(None) => {
            tracing::warn!(value = value.unwrap_or_default(), "ignoring unknown view mode");
            ViewMode::default()
        }
        None => ViewMode::default(),
    }
}

/// First candidate that names an existing regular file, made absolute.
///
/// `file:` URLs are accepted and percent-decoded. Flags, `.`/`..`,
/// directories, missing paths and URLs that name no local file are
/// skipped.
pub fn resolve_file_arg(candidates: &[String]) -> Option<PathBuf> {
    candidates.iter().find_map(|candidate| {
        let candidate = candidate.trim();
        if candidate.is_empty()
            || candidate.starts_with('-')
            || candidate == "."
            || candidate == ".."
        {
            return None;
        }
        let is_url = candidate
            .get(..5)
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case("file:"));
        let path = if is_url {
            file_url_to_path(candidate)?
        } else {
            PathBuf::from(candidate)
        };
        if !path.is_file() {
            tracing::debug!(path = %path.display(), "skipping launch argument");
            return None;
        }
        Some(std::path::absolute(&path).unwrap_or(path))
    })
}

/// Local path named by a `file:` URL. Fragments and queries are ignored;
/// URLs naming a remote host are rejected.
fn file_url_to_path(value: &str) -> Option<PathBuf> {
    let url = Url::parse(value).ok().filter(|url| url.scheme() == "file")?;
    url.to_file_path().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_initial_mode_accepts_known_names() {
        assert_eq!(resolve_initial_mode(Some("source")), ViewMode::Source);
        assert_eq!(resolve_initial_mode(Some("split")), ViewMode::Split);
        assert_eq!(resolve_initial_mode(Some("rendered")), ViewMode::Rendered);
    }

    #[test]
    fn test_initial_mode_defaults_to_split() {
        assert_eq!(resolve_initial_mode(None), ViewMode::Split);
        assert_eq!(resolve_initial_mode(Some("bogus")), ViewMode::Split);
        assert_eq!(resolve_initial_mode(Some("")), ViewMode::Split);
    }

    #[test]
    fn test_file_arg_skips_unusable_candidates() {
        let dir = tempdir().expect("tempdir");
        let file = dir.path().join("a.md");
        std::fs::write(&file, "# A").expect("write");
        let missing = dir.path().join("missing.md");

        let args = strings(&[
            "--flag",
            ".",
            "..",
            dir.path().to_str().expect("utf8"),
            missing.to_str().expect("utf8"),
            file.to_str().expect("utf8"),
        ]);
        assert_eq!(resolve_file_arg(&args), Some(file));
    }

    #[test]
    fn test_file_arg_none_when_nothing_usable() {
        assert_eq!(resolve_file_arg(&[]), None);
        assert_eq!(resolve_file_arg(&strings(&[".", "/definitely/not/here.md"])), None);
    }

    #[test]
    fn test_file_url_is_decoded() {
        let dir = tempdir().expect("tempdir");
        let file = dir.path().join("my notes.md");
        std::fs::write(&file, "x").expect("write");

        let url = format!("file://{}", file.display()).replace(' ', "%20");
        assert_eq!(resolve_file_arg(&[url]), Some(file));
    }

    #[test]
    fn test_file_url_ignores_fragment_and_query() {
        let dir = tempdir().expect("tempdir");
        let file = dir.path().join("a.md");
        std::fs::write(&file, "x").expect("write");

        let base = format!("file://{}", file.display());
        assert_eq!(resolve_file_arg(&[format!("{base}#intro")]), Some(file.clone()));
        assert_eq!(resolve_file_arg(&[format!("{base}?x=1")]), Some(file));
    }

    #[test]
    fn test_file_url_with_remote_host_is_skipped() {
        assert_eq!(resolve_file_arg(&strings(&["file://remote/x.md"])), None);
        assert_eq!(file_url_to_path("file://remote/x.md"), None);
        assert_eq!(
            file_url_to_path("file://localhost/tmp/a%20b.md"),
            Some(PathBuf::from("/tmp/a b.md"))
        );
    }

    #[test]
    fn test_from_tokens_reads_mode_and_skips_flag_values() {
        let dir = tempdir().expect("tempdir");
        let file = dir.path().join("a.md");
        std::fs::write(&file, "").expect("write");
        let log = dir.path().join("log.txt");
        std::fs::write(&log, "").expect("write");

        let tokens = strings(&[
            "--unknown",
            "--log-file",
            log.to_str().expect("utf8"),
            "--mode=rendered",
            file.to_str().expect("utf8"),
        ]);
        let launch = LaunchOptions::from_tokens(&tokens);
        assert_eq!(launch.mode, ViewMode::Rendered);
        assert_eq!(launch.file, Some(file));
    }

    #[test]
    fn test_from_tokens_separate_mode_value() {
        let launch = LaunchOptions::from_tokens(&strings(&["--mode", "source"]));
        assert_eq!(launch.mode, ViewMode::Source);
        assert_eq!(launch.file, None);
    }
}
