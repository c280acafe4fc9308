//! Markdown Preview Rendering
//!
//! Converts canonical article markdown into a simplified HTML fragment for the
//! preview pane. This is a single pass over classified lines with a handful of
//! inline substitutions, not a CommonMark renderer:
//!
//! - list items become `<li>` without a wrapping `<ul>`
//! - every blockquote line becomes its own `<blockquote>`
//! - every plain text line becomes its own `<p>`
//!
//! The output is display-only and never converted back into markdown.

use super::syntax::{LineClassifier, LineKind};
use once_cell::sync::Lazy;
use regex::Regex;

/// Deepest heading level rendered as a heading tag
const MAX_PREVIEW_HEADING: usize = 4;

static CODE_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").unwrap());
static IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)\s]*)\)").unwrap());
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)\s]*)\)").unwrap());
static STRONG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static EMPHASIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*\s][^*]*?)\*").unwrap());

/// An open fenced code block
struct CodeBlock {
    language: String,
    lines: Vec<String>,
}

impl CodeBlock {
    /// The class is always present, `language-` alone for an unlabeled fence
    fn to_html(&self) -> String {
        format!(
            "<pre><code class=\"language-{}\">{}</code></pre>",
            escape_html(&self.language),
            self.lines.join("\n")
        )
    }
}

/// Renders article markdown as preview HTML
#[derive(Debug, Default, Clone, Copy)]
pub struct PreviewRenderer {
    classifier: LineClassifier,
}

impl PreviewRenderer {
    pub fn new() -> Self {
        Self {
            classifier: LineClassifier::new(),
        }
    }

    /// Render markdown to an HTML fragment
    pub fn render(&self, markdown: &str) -> String {
        let markdown = markdown.replace("\r\n", "\n");
        let mut blocks: Vec<String> = Vec::new();
        let mut code: Option<CodeBlock> = None;

        for line in self.classifier.classify_document(&markdown) {
            let raw = line.raw;
            match &line.kind {
                LineKind::FenceOpen { language } => {
                    code = Some(CodeBlock {
                        language: language.clone(),
                        lines: Vec::new(),
                    });
                }
                LineKind::CodeContent => {
                    if let Some(block) = code.as_mut() {
                        block.lines.push(escape_html(raw));
                    }
                }
                LineKind::FenceClose => {
                    if let Some(block) = code.take() {
                        blocks.push(block.to_html());
                    }
                }
                LineKind::Blank => {}
                LineKind::Heading { level } if *level <= MAX_PREVIEW_HEADING => {
                    blocks.push(format!(
                        "<h{level}>{}</h{level}>",
                        render_inline(line.content().trim_end())
                    ));
                }
                LineKind::Bullet { .. } => {
                    blocks.push(format!("<li>{}</li>", render_inline(line.content())));
                }
                LineKind::Blockquote => {
                    blocks.push(format!(
                        "<blockquote>{}</blockquote>",
                        render_inline(line.content())
                    ));
                }
                LineKind::HorizontalRule => blocks.push("<hr />".to_string()),
                _ => {
                    blocks.push(format!("<p>{}</p>", render_inline(raw.trim())));
                }
            }
        }

        // A fence left open runs to the end of the document
        if let Some(block) = code.take() {
            blocks.push(block.to_html());
        }

        blocks.join("\n")
    }
}

/// Render markdown to a preview HTML fragment
pub fn markdown_to_html(markdown: &str) -> String {
    PreviewRenderer::new().render(markdown)
}

/// Apply inline rules to one line of text; code spans are left alone
fn render_inline(text: &str) -> String {
    let mut html = String::with_capacity(text.len());
    let mut last = 0;

    for caps in CODE_SPAN.captures_iter(text) {
        let (Some(span), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        html.push_str(&render_spans(&text[last..span.start()]));
        html.push_str("<code>");
        html.push_str(&escape_html(inner.as_str()));
        html.push_str("</code>");
        last = span.end();
    }
    html.push_str(&render_spans(&text[last..]));

    html
}

/// Images, links and emphasis for text outside code spans
fn render_spans(text: &str) -> String {
    let html = escape_html(text);
    // Images first so their syntax is not taken for a link
    let html = IMAGE.replace_all(&html, r#"<img src="$2" alt="$1" />"#);
    let html = LINK.replace_all(&html, r#"<a href="$2" target="_blank">$1</a>"#);
    let html = STRONG.replace_all(&html, "<strong>$1</strong>");
    let html = EMPHASIS.replace_all(&html, "<em>$1</em>");
    html.into_owned()
}

/// Escape the characters that would otherwise be read as markup
pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
