//! Markdown normalization for note drafts
//!
//! Turns a title, a markdown body and a tag list into a canonical
//! `GeneratedArticle`:
//!
//! 1. drop a leading `# <title>` line that repeats the title
//! 2. demote headings one level (`#`→`##`, `##`→`###`, `###`→`####`)
//! 3. tidy list bullets, strip ordered-list numbering, re-space blockquotes
//! 4. pull every `#タグ:` line out of the body
//! 5. merge and dedupe tags
//! 6. collapse blank-line runs and drop blank lines at either end
//! 7. prepend a fresh `# <title>` heading
//!
//! Demotion is decided from each line's original level, so it never cascades.
//! An already-canonical article is re-normalized with demotion switched off
//! (`GeneratedArticle::renormalize`); every other step is idempotent.

use super::syntax::{LineClassifier, LineKind, LineState, MarkdownLine};
use crate::article::{fallback_tags, GeneratedArticle};
use crate::utils::text::{dedup_preserving_order, split_comma_list};

/// Deepest source heading level that still gets demoted
const MAX_DEMOTED_LEVEL: usize = 3;

/// Rewrites article markdown into its canonical shape
#[derive(Debug, Clone, Copy)]
pub struct MarkdownNormalizer {
    classifier: LineClassifier,
    demote_headings: bool,
}

/// A body line after normalization
struct OutputLine {
    text: String,
    is_code: bool,
}

impl MarkdownNormalizer {
    /// Normalizer for raw generated text
    pub fn new() -> Self {
        Self {
            classifier: LineClassifier::new(),
            demote_headings: true,
        }
    }

    /// Enable or disable heading demotion
    pub fn with_heading_demotion(mut self, demote: bool) -> Self {
        self.demote_headings = demote;
        self
    }

    /// Normalize an article
    pub fn normalize(&self, title: &str, content: &str, tags: &[String]) -> GeneratedArticle {
        let title = fold_title(title);
        let title = title.as_str();
        let content = content.replace("\r\n", "\n");
        let body = Self::strip_leading_title(&content, title);

        let mut recovered_tags = Vec::new();
        let lines = self.process_lines(body, &mut recovered_tags);
        let body = Self::collapse_blank_lines(lines);

        let merged = tags
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .chain(recovered_tags);
        let mut tags = dedup_preserving_order(merged);
        if tags.is_empty() {
            log::debug!("No tags recovered for '{}', using fallback tags", title);
            tags = fallback_tags();
        }

        GeneratedArticle {
            title: title.to_string(),
            content: format!("# {}\n\n{}", title, body),
            tags,
        }
    }

    /// Remove a first-line `# <title>` heading that matches the title, ignoring case
    fn strip_leading_title<'a>(content: &'a str, title: &str) -> &'a str {
        let content = content.trim_start();
        let (first, rest) = content.split_once('\n').unwrap_or((content, ""));

        let first = first.trim_end();
        let Some(heading) = first.strip_prefix('#') else {
            return content;
        };
        if !heading.starts_with([' ', '\t']) {
            return content;
        }

        if heading.trim().to_lowercase() == title.to_lowercase() {
            rest
        } else {
            content
        }
    }

    /// Apply the per-line rewrites, collecting tags from tag-marker lines
    fn process_lines(&self, body: &str, tags: &mut Vec<String>) -> Vec<OutputLine> {
        let mut output = Vec::new();

        for line in self.classifier.classify_document(body) {
            if line.is_code() {
                output.push(OutputLine {
                    text: line.raw.to_string(),
                    is_code: true,
                });
                continue;
            }

            if let Some(text) = self.rewrite_line(&line, tags) {
                output.push(OutputLine {
                    text,
                    is_code: false,
                });
            }
        }

        output
    }

    /// Rewrite one non-code line; `None` drops it from the body
    fn rewrite_line(&self, line: &MarkdownLine<'_>, tags: &mut Vec<String>) -> Option<String> {
        match &line.kind {
            LineKind::Blank => Some(String::new()),
            LineKind::TagMarker => {
                tags.extend(split_comma_list(line.content()));
                None
            }
            LineKind::Heading { level } if self.demote_headings && *level <= MAX_DEMOTED_LEVEL => {
                Some(format!("{} {}", "#".repeat(level + 1), line.content().trim_end()))
            }
            LineKind::Bullet { marker: '-' } => {
                Some(format!("{}- {}", line.indentation(), line.content()))
            }
            LineKind::Ordered => self.strip_ordered_marker(line, tags),
            LineKind::Blockquote if !line.content().is_empty() => {
                Some(format!("{}> {}", line.indentation(), line.content()))
            }
            // Emphasis, links, images and rules pass through byte-identical
            _ => Some(line.raw.to_string()),
        }
    }

    /// Drop list numbering; the remaining text is rewritten as a line of its own
    fn strip_ordered_marker(&self, line: &MarkdownLine<'_>, tags: &mut Vec<String>) -> Option<String> {
        let stripped = format!("{}{}", line.indentation(), line.content());
        let (inner, _) = self.classifier.classify_line(&stripped, LineState::Normal);

        match inner.kind {
            // Stripping would open a code block that was not there before
            LineKind::FenceOpen { .. } => Some(line.raw.to_string()),
            _ => self.rewrite_line(&inner, tags),
        }
    }

    /// Keep at most one blank line between blocks outside code, then drop
    /// leading and trailing blank lines
    ///
    /// Indentation on the first and last kept lines is left alone.
    fn collapse_blank_lines(lines: Vec<OutputLine>) -> String {
        let mut kept: Vec<String> = Vec::with_capacity(lines.len());
        let mut previous_blank = false;

        for line in lines {
            let blank = !line.is_code && line.text.is_empty();
            if blank && previous_blank {
                continue;
            }
            previous_blank = blank;
            kept.push(line.text);
        }

        let is_blank = |text: &String| text.trim().is_empty();
        let start = kept.iter().position(|t| !is_blank(t)).unwrap_or(kept.len());
        let end = kept.iter().rposition(|t| !is_blank(t)).map_or(start, |i| i + 1);
        kept[start..end].join("\n")
    }
}

impl Default for MarkdownNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Join a title onto a single line so it cannot spill into the body
fn fold_title(title: &str) -> String {
    title
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize raw article text into a canonical article
pub fn normalize_article(title: &str, content: &str, tags: &[String]) -> GeneratedArticle {
    MarkdownNormalizer::new().normalize(title, content, tags)
}

impl GeneratedArticle {
    /// Re-run normalization on an article that is already canonical
    ///
    /// Headings were demoted when the article was first built, so this pass
    /// leaves heading levels alone and is a no-op on canonical input.
    pub fn renormalize(&self) -> GeneratedArticle {
        MarkdownNormalizer::new()
            .with_heading_demotion(false)
            .normalize(&self.title, &self.content, &self.tags)
    }
}

/// Prepare an article for the preview pane
pub fn format_for_preview(article: &GeneratedArticle) -> GeneratedArticle {
    article.renormalize()
}
