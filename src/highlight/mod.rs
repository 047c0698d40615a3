//! Syntax highlighting for code blocks.
//!
//! Uses syntect with Sublime Text syntax definitions and emits class-based
//! HTML spans, so styling stays in the stylesheet of whoever displays the
//! preview.

use std::sync::OnceLock;

use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

/// Render a code block as HTML.
///
/// A recognized `language` produces highlighted markup tagged with a
/// `language-*` class. Anything else, including a highlighter failure
/// half way through the block, falls back to escaped plain text.
pub fn code_block_html(language: Option<&str>, code: &str) -> String {
    if let Some(lang) = language
        && let Some(syntax) = find_syntax(lang)
    {
        match highlight_classed(syntax, code) {
            Ok(highlighted) => {
                return format!(
                    "<pre><code class=\"hljs language-{}\">{highlighted}</code></pre>\n",
                    escape_html(lang)
                );
            }
            Err(err) => {
                tracing::debug!(language = lang, %err, "highlighting failed, using plain text");
            }
        }
    }
    format!("<pre><code class=\"hljs\">{}</code></pre>\n", escape_html(code))
}

/// Escape text for use in HTML content or a double-quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn find_syntax(language: &str) -> Option<&'static SyntaxReference> {
    let language = language.trim();
    if language.is_empty() {
        return None;
    }
    let syntax_set = syntax_set();
    syntax_set
        .find_syntax_by_token(language)
        .or_else(|| syntax_set.find_syntax_by_name(language))
}

fn highlight_classed(syntax: &SyntaxReference, code: &str) -> Result<String, syntect::Error> {
    let syntax_set = syntax_set();
    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, syntax_set, ClassStyle::Spaced);
    for line in LinesWithEndings::from(code) {
        generator.parse_html_for_line_which_includes_newline(line)?;
    }
    Ok(generator.finalize())
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_block_is_highlighted_with_language_class() {
        let html = code_block_html(Some("rust"), "fn main() {\n    let x = 1;\n}\n");

        assert!(html.starts_with("<pre><code class=\"hljs language-rust\">"));
        assert!(html.contains("<span class="), "expected classed spans: {html}");
        assert!(html.ends_with("</code></pre>\n"));
    }

    #[test]
    fn test_unknown_language_falls_back_to_plain() {
        let html = code_block_html(Some("nope-not-a-language"), "a < b");
        assert_eq!(html, "<pre><code class=\"hljs\">a &lt; b</code></pre>\n");
    }

    #[test]
    fn test_missing_language_falls_back_to_plain() {
        let html = code_block_html(None, "<script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_highlighted_code_is_escaped() {
        let html = code_block_html(Some("html"), "<div class=\"x\">&</div>\n");
        assert!(!html.contains("<div"), "raw markup leaked: {html}");
        assert!(html.contains("&lt;"));
    }

    #[test]
    fn test_language_lookup_accepts_extension_tokens() {
        assert!(find_syntax("rs").is_some());
        assert!(find_syntax("Rust").is_some());
        assert!(find_syntax("py").is_some());
        assert!(find_syntax("").is_none());
        assert!(find_syntax("definitely-unknown").is_none());
    }

    #[test]
    fn test_escape_html_handles_all_specials() {
        assert_eq!(
            escape_html("<a href=\"x\">'&'</a>"),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }
}
