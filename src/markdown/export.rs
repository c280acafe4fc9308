//! Export functionality for articles
//!
//! Renders a canonical article as a standalone HTML page with pulldown-cmark:
//! - embedded light or dark styles
//! - optional table of contents with heading anchors
//! - the article's tags as a footer

use super::preview::escape_html;
use crate::article::GeneratedArticle;
use pulldown_cmark::{html, CowStr, Event, HeadingLevel, Options, Parser, Tag};
use std::collections::HashSet;

/// Options for HTML export
#[derive(Debug, Clone)]
pub struct HtmlExportOptions {
    /// Include CSS styles inline
    pub include_styles: bool,
    /// Use dark mode styles
    pub dark_mode: bool,
    /// Include table of contents
    pub include_toc: bool,
    /// List the article's tags under the body
    pub include_tags: bool,
}

impl Default for HtmlExportOptions {
    fn default() -> Self {
        Self {
            include_styles: true,
            dark_mode: false,
            include_toc: false,
            include_tags: true,
        }
    }
}

/// A heading collected from the rendered document
#[derive(Debug, Clone, PartialEq, Eq)]
struct HeadingEntry {
    level: usize,
    text: String,
    anchor: String,
}

/// Main exporter for articles
pub struct ArticleExporter {
    options: Options,
}

impl ArticleExporter {
    /// Create a new exporter
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        Self { options }
    }

    /// Export an article to an HTML document string
    pub fn export_html(&self, article: &GeneratedArticle, options: &HtmlExportOptions) -> String {
        let events: Vec<Event<'_>> = Parser::new_ext(&article.content, self.options).collect();
        let headings = Self::collect_headings(&events);
        let body = Self::render_body(events, &headings);

        let styles = if options.include_styles {
            Self::get_styles(options.dark_mode)
        } else {
            String::new()
        };

        let toc = if options.include_toc {
            Self::generate_toc(&headings)
        } else {
            String::new()
        };

        let tags = if options.include_tags {
            Self::render_tags(&article.tags)
        } else {
            String::new()
        };

        format!(
            r#"<!DOCTYPE html>
<html lang="ja">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="generator" content="Note Drafter">
    <title>{}</title>
    {}
</head>
<body>
    <article class="markdown-body">
        {}
        {}
        {}
    </article>
</body>
</html>"#,
            escape_html(&article.title),
            styles,
            toc,
            body,
            tags
        )
    }

    /// Suggest a file name for an exported article
    pub fn suggest_file_name(article: &GeneratedArticle) -> String {
        let stem = Self::generate_anchor(&article.title);
        if stem.is_empty() {
            "article.html".to_string()
        } else {
            format!("{}.html", stem)
        }
    }

    /// Gather heading levels and text in document order
    ///
    /// Repeated anchors get a numeric suffix (`setup`, `setup-1`, ...).
    fn collect_headings(events: &[Event<'_>]) -> Vec<HeadingEntry> {
        let mut headings = Vec::new();
        let mut used = HashSet::new();
        let mut current: Option<(usize, String)> = None;

        for event in events {
            match event {
                Event::Start(Tag::Heading(level, _, _)) => {
                    current = Some((Self::heading_number(*level), String::new()));
                }
                Event::Text(text) | Event::Code(text) => {
                    if let Some((_, buffer)) = current.as_mut() {
                        buffer.push_str(text);
                    }
                }
                Event::End(Tag::Heading(..)) => {
                    if let Some((level, text)) = current.take() {
                        let base = Self::generate_anchor(&text);
                        let mut anchor = base.clone();
                        let mut suffix = 1;
                        while !used.insert(anchor.clone()) {
                            anchor = format!("{}-{}", base, suffix);
                            suffix += 1;
                        }
                        headings.push(HeadingEntry { level, text, anchor });
                    }
                }
                _ => {}
            }
        }

        headings
    }

    /// Render events to HTML, giving each heading its anchor id
    fn render_body(events: Vec<Event<'_>>, headings: &[HeadingEntry]) -> String {
        let mut anchors = headings.iter().map(|h| h.anchor.as_str());
        let events = events.into_iter().map(|event| match event {
            Event::Start(Tag::Heading(level, _, _)) => {
                let level = Self::heading_number(level);
                let anchor = anchors.next().unwrap_or_default();
                Event::Html(CowStr::from(format!("<h{} id=\"{}\">", level, escape_html(anchor))))
            }
            Event::End(Tag::Heading(level, _, _)) => {
                Event::Html(CowStr::from(format!("</h{}>\n", Self::heading_number(level))))
            }
            other => other,
        });

        let mut html_content = String::new();
        html::push_html(&mut html_content, events);
        html_content
    }

    fn heading_number(level: HeadingLevel) -> usize {
        match level {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
            HeadingLevel::H4 => 4,
            HeadingLevel::H5 => 5,
            HeadingLevel::H6 => 6,
        }
    }

    /// Generate a table of contents from collected headings
    fn generate_toc(headings: &[HeadingEntry]) -> String {
        let mut toc = String::from("<nav class=\"toc\">\n<h2>目次</h2>\n<ul>\n");
        // The shallowest heading sits in the outer list
        let base_level = headings.iter().map(|h| h.level).min().unwrap_or(1);
        let mut current_level = base_level;

        for heading in headings {
            // Handle nesting
            while current_level < heading.level {
                toc.push_str("<ul>\n");
                current_level += 1;
            }
            while current_level > heading.level {
                toc.push_str("</ul>\n");
                current_level -= 1;
            }

            toc.push_str(&format!(
                "<li><a href=\"#{}\">{}</a></li>\n",
                escape_html(&heading.anchor),
                escape_html(&heading.text)
            ));
        }

        while current_level > base_level {
            toc.push_str("</ul>\n");
            current_level -= 1;
        }

        toc.push_str("</ul>\n</nav>\n");
        toc
    }

    fn render_tags(tags: &[String]) -> String {
        if tags.is_empty() {
            return String::new();
        }

        let items: Vec<String> = tags
            .iter()
            .map(|tag| format!("<span class=\"tag\">#{}</span>", escape_html(tag)))
            .collect();
        format!("<footer class=\"tags\">{}</footer>", items.join(" "))
    }

    /// Generate URL-safe anchor from heading text
    fn generate_anchor(text: &str) -> String {
        text.to_lowercase()
            .chars()
            .map(|c| {
                if c.is_alphanumeric() {
                    c
                } else if c.is_whitespace() {
                    '-'
                } else {
                    '_'
                }
            })
            .collect::<String>()
            .trim_matches(|c| c == '-' || c == '_')
            .to_string()
    }

    fn get_styles(dark_mode: bool) -> String {
        let theme_styles = if dark_mode {
            r#"
            :root {
                --color-bg: #0d1117;
                --color-text: #c9d1d9;
                --color-link: #58a6ff;
                --color-code-bg: #161b22;
                --color-border: #30363d;
                --color-muted: #8b949e;
            }"#
        } else {
            r#"
            :root {
                --color-bg: #ffffff;
                --color-text: #24292e;
                --color-link: #0366d6;
                --color-code-bg: #f6f8fa;
                --color-border: #e1e4e8;
                --color-muted: #6a737d;
            }"#
        };

        format!(
            r#"<style>
        {}

        body {{
            font-family: "Hiragino Sans", "Noto Sans JP", -apple-system, "Segoe UI", sans-serif;
            font-size: 16px;
            line-height: 1.8;
            color: var(--color-text);
            background-color: var(--color-bg);
            max-width: 720px;
            margin: 0 auto;
            padding: 2rem;
        }}

        .markdown-body h1 {{ font-size: 2em; border-bottom: 1px solid var(--color-border); padding-bottom: .3em; }}
        .markdown-body h2 {{ font-size: 1.5em; }}
        .markdown-body h3 {{ font-size: 1.25em; }}
        .markdown-body h4 {{ font-size: 1em; }}

        .markdown-body a {{ color: var(--color-link); text-decoration: none; }}

        .markdown-body code {{
            background-color: var(--color-code-bg);
            padding: .2em .4em;
            border-radius: 6px;
            font-size: 85%;
        }}

        .markdown-body pre {{
            background-color: var(--color-code-bg);
            padding: 16px;
            overflow: auto;
            border-radius: 6px;
        }}

        .markdown-body pre code {{ background: transparent; padding: 0; }}

        .markdown-body blockquote {{
            margin: 16px 0;
            padding: 0 1em;
            color: var(--color-muted);
            border-left: .25em solid var(--color-border);
        }}

        .markdown-body img {{ max-width: 100%; height: auto; }}

        .toc {{
            background-color: var(--color-code-bg);
            padding: 16px 24px;
            border-radius: 6px;
        }}

        .toc ul {{ list-style-type: none; padding-left: 1em; }}

        .tags {{ margin-top: 32px; color: var(--color-muted); }}

        .tag {{ margin-right: 8px; }}
    </style>"#,
            theme_styles
        )
    }
}

impl Default for ArticleExporter {
    fn default() -> Self {
        Self::new()
    }
}
