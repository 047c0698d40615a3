//! Markdown to HTML rendering.
//!
//! Source is parsed with comrak, every node is passed through a table of
//! [`NodeRule`]s, and the formatted HTML gets a final pass that marks
//! links for opening outside the preview. Rendering is pure: no
//! filesystem access and no state carried between calls.

mod links;
mod rules;

use std::path::Path;
use std::time::Instant;

use comrak::{Arena, Options, format_html, parse_document};

pub use links::{is_absolute_reference, resolve_relative};
pub use rules::{
    HighlightCodeBlocks, NodeRule, RawHtmlAsText, RenderContext, ResolveRelativeUrls, SafeUrls,
    default_rules,
};

/// Converts markdown source into sanitized HTML.
pub struct Renderer {
    rules: Vec<Box<dyn NodeRule>>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("rules", &self.rules.len())
            .finish()
    }
}

impl Renderer {
    /// A renderer with the standard rule table.
    pub fn new() -> Self {
        Self::with_rules(default_rules())
    }

    /// A renderer that applies `rules`, in order, to every node.
    pub fn with_rules(rules: Vec<Box<dyn NodeRule>>) -> Self {
        Self { rules }
    }

    /// Render `markdown`, resolving relative references against `base_dir`.
    ///
    /// Never fails: a formatter error is logged and yields empty output.
    pub fn render(&self, markdown: &str, base_dir: &Path) -> String {
        let started = Instant::now();
        let arena = Arena::new();
        let options = create_options();
        let root = parse_document(&arena, markdown, &options);

        let ctx = RenderContext { base_dir };
        for node in root.descendants() {
            let mut data = node.data.borrow_mut();
            for rule in &self.rules {
                rule.apply(&mut data.value, &ctx);
            }
        }

        let mut out = Vec::with_capacity(markdown.len() * 2);
        if let Err(err) = format_html(root, &options, &mut out) {
            tracing::warn!(%err, "failed to format html");
            return String::new();
        }
        let html = links::add_link_attributes(&String::from_utf8_lossy(&out));

        tracing::debug!(
            bytes = markdown.len(),
            elapsed_us = started.elapsed().as_micros(),
            "rendered markdown"
        );
        html
    }
}

fn create_options() -> Options {
    let mut options = Options::default();

    options.extension.autolink = true;
    options.extension.table = true;
    options.extension.strikethrough = true;

    options.parse.smart = true;

    // Raw HTML is neutralised by `RawHtmlAsText`; letting the formatter
    // through keeps `file:` URLs and highlighted blocks intact.
    options.render.hardbreaks = false;
    options.render.unsafe_ = true;

    options
}
