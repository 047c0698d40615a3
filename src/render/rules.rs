//! Per-node rewrite rules applied between parsing and HTML formatting.

use std::path::Path;

use comrak::nodes::{NodeHtmlBlock, NodeValue};

use super::links;
use crate::highlight::{code_block_html, escape_html};

/// Inputs a rule may consult while rewriting a node.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Directory relative references are resolved against. Empty when
    /// no document is loaded.
    pub base_dir: &'a Path,
}

/// A rewrite applied to every node of a parsed document.
///
/// Rules run in table order on each node, so a later rule sees the
/// value an earlier one left behind.
pub trait NodeRule: Send + Sync {
    fn apply(&self, value: &mut NodeValue, ctx: &RenderContext<'_>);
}

/// The rule table used by [`Renderer::new`](super::Renderer::new).
pub fn default_rules() -> Vec<Box<dyn NodeRule>> {
    vec![
        Box::new(RawHtmlAsText),
        Box::new(HighlightCodeBlocks),
        Box::new(SafeUrls),
        Box::new(ResolveRelativeUrls),
    ]
}

/// Show raw HTML from the source as literal text.
pub struct RawHtmlAsText;

impl NodeRule for RawHtmlAsText {
    fn apply(&self, value: &mut NodeValue, _ctx: &RenderContext<'_>) {
        match value {
            NodeValue::HtmlBlock(block) => {
                block.literal = format!("<p>{}</p>\n", escape_html(block.literal.trim_end()));
            }
            NodeValue::HtmlInline(raw) => {
                *value = NodeValue::Text(std::mem::take(raw));
            }
            _ => {}
        }
    }
}

/// Replace code blocks with highlighted markup.
pub struct HighlightCodeBlocks;

impl NodeRule for HighlightCodeBlocks {
    fn apply(&self, value: &mut NodeValue, _ctx: &RenderContext<'_>) {
        let NodeValue::CodeBlock(block) = value else {
            return;
        };
        let language = block.info.split_whitespace().next();
        let literal = code_block_html(language, &block.literal);
        *value = NodeValue::HtmlBlock(NodeHtmlBlock {
            block_type: 0,
            literal,
        });
    }
}

/// Blank link and image targets that could run script.
pub struct SafeUrls;

impl NodeRule for SafeUrls {
    fn apply(&self, value: &mut NodeValue, _ctx: &RenderContext<'_>) {
        if let NodeValue::Link(link) | NodeValue::Image(link) = value
            && links::is_script_url(&link.url)
        {
            tracing::debug!(url = %link.url, "dropping script url");
            link.url.clear();
        }
    }
}

/// Point relative link and image targets at files next to the document.
pub struct ResolveRelativeUrls;

impl NodeRule for ResolveRelativeUrls {
    fn apply(&self, value: &mut NodeValue, ctx: &RenderContext<'_>) {
        if let NodeValue::Link(link) | NodeValue::Image(link) = value
            && let Some(resolved) = links::resolve_relative(&link.url, ctx.base_dir)
        {
            link.url = resolved;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use comrak::nodes::NodeLink;
    use comrak::{Arena, Options, parse_document};

    fn ctx(dir: &str) -> RenderContext<'_> {
        RenderContext {
            base_dir: Path::new(dir),
        }
    }

    fn link(url: &str) -> NodeValue {
        NodeValue::Link(NodeLink {
            url: url.to_string(),
            title: String::new(),
        })
    }

    fn url_of(value: &NodeValue) -> &str {
        match value {
            NodeValue::Link(link) | NodeValue::Image(link) => &link.url,
            other => panic!("not a link: {other:?}"),
        }
    }

    #[test]
    fn test_inline_html_becomes_text() {
        let mut value = NodeValue::HtmlInline("<b>".to_string());
        RawHtmlAsText.apply(&mut value, &ctx(""));
        assert!(matches!(value, NodeValue::Text(ref t) if t == "<b>"));
    }

    #[test]
    fn test_html_block_is_escaped_into_paragraph() {
        let mut value = NodeValue::HtmlBlock(NodeHtmlBlock {
            block_type: 6,
            literal: "<div onclick=\"x()\">hi</div>\n".to_string(),
        });
        RawHtmlAsText.apply(&mut value, &ctx(""));
        let NodeValue::HtmlBlock(block) = value else {
            panic!("expected html block");
        };
        assert_eq!(
            block.literal,
            "<p>&lt;div onclick=&quot;x()&quot;&gt;hi&lt;/div&gt;</p>\n"
        );
    }

    #[test]
    fn test_code_block_is_replaced_by_highlighted_html() {
        let arena = Arena::new();
        let root = parse_document(&arena, "```rust ignore\nlet x = 1;\n```\n", &Options::default());
        let block = root.first_child().expect("code block");
        let mut value = block.data.borrow().value.clone();
        assert!(matches!(value, NodeValue::CodeBlock(_)));

        HighlightCodeBlocks.apply(&mut value, &ctx(""));
        let NodeValue::HtmlBlock(html) = value else {
            panic!("expected html block");
        };
        assert!(html.literal.starts_with("<pre><code class=\"hljs language-rust\">"));
    }

    #[test]
    fn test_script_urls_are_blanked() {
        let mut value = link("javascript:alert(1)");
        SafeUrls.apply(&mut value, &ctx("/docs"));
        assert_eq!(url_of(&value), "");
    }

    #[test]
    fn test_relative_urls_resolve_against_context() {
        let mut value = link("sub/b.md");
        ResolveRelativeUrls.apply(&mut value, &ctx("/docs"));
        assert_eq!(url_of(&value), "file:///docs/sub/b.md");

        let mut value = link("sub/b.md");
        ResolveRelativeUrls.apply(&mut value, &ctx(""));
        assert_eq!(url_of(&value), "sub/b.md");
    }
}
