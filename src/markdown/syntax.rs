//! Line classification for Markdown
//!
//! A minimal block-level tokenizer: every line of a document is classified as
//! a heading, list item, blockquote, code fence, rule, tag-marker line, blank
//! or plain text. Fenced code blocks are tracked across lines so that their
//! contents are never mistaken for structure.
//!
//! The normalizer and the HTML previewer both work from these classifications
//! instead of chained whole-document regex passes.

/// Marker that introduces a tag suggestion line
pub const TAG_MARKER: &str = "#タグ:";

/// Block-level kind of a single line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Empty or whitespace-only
    Blank,
    /// ATX heading, `#` through `######`
    Heading { level: usize },
    /// `#タグ: a, b, c`
    TagMarker,
    /// Unordered list item (`-`, `*` or `+`)
    Bullet { marker: char },
    /// Ordered list item (`1. text`)
    Ordered,
    /// Blockquote (`> text`)
    Blockquote,
    /// Opening code fence with optional language
    FenceOpen { language: String },
    /// Closing code fence
    FenceClose,
    /// Line inside a fenced code block
    CodeContent,
    /// Horizontal rule (`---`, `***`, `___`)
    HorizontalRule,
    /// Anything else
    Text,
}

/// Line-level tokenization state for multi-line constructs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineState {
    /// Normal state
    #[default]
    Normal,
    /// Inside a fenced code block
    InCodeBlock { fence_char: char, fence_count: usize },
}

/// A classified line borrowing from the source document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownLine<'a> {
    /// The line as written, without its newline
    pub raw: &'a str,
    pub kind: LineKind,
    /// Byte length of leading whitespace
    pub indent: usize,
    /// Byte offset where the payload starts (after marker and spacing)
    pub content_start: usize,
}

impl<'a> MarkdownLine<'a> {
    /// Leading whitespace of the line
    pub fn indentation(&self) -> &'a str {
        &self.raw[..self.indent]
    }

    /// Payload after the block marker
    pub fn content(&self) -> &'a str {
        &self.raw[self.content_start..]
    }

    /// Whether this line belongs to a fenced code block, delimiters included
    pub fn is_code(&self) -> bool {
        matches!(
            self.kind,
            LineKind::FenceOpen { .. } | LineKind::FenceClose | LineKind::CodeContent
        )
    }
}

/// Information about a code fence
struct CodeFenceInfo {
    char: char,
    count: usize,
    language: String,
}

/// Block-level line classifier
#[derive(Debug, Default, Clone, Copy)]
pub struct LineClassifier;

impl LineClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify every line of a document, threading code-fence state through
    pub fn classify_document<'a>(&self, text: &'a str) -> Vec<MarkdownLine<'a>> {
        let mut state = LineState::Normal;
        text.split('\n')
            .map(|line| {
                let (classified, next) = self.classify_line(line, state);
                state = next;
                classified
            })
            .collect()
    }

    /// Classify a single line given the state left by the previous one
    pub fn classify_line<'a>(&self, line: &'a str, state: LineState) -> (MarkdownLine<'a>, LineState) {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();
        let whole = |kind| MarkdownLine {
            raw: line,
            kind,
            indent,
            content_start: indent,
        };

        if let LineState::InCodeBlock { fence_char, fence_count } = state {
            if Self::is_closing_fence(trimmed, fence_char, fence_count) {
                return (whole(LineKind::FenceClose), LineState::Normal);
            }
            // Code keeps its own indentation
            let code = MarkdownLine {
                raw: line,
                kind: LineKind::CodeContent,
                indent: 0,
                content_start: 0,
            };
            return (code, state);
        }

        if trimmed.is_empty() {
            return (whole(LineKind::Blank), state);
        }

        if let Some(fence) = Self::parse_code_fence(trimmed) {
            let next = LineState::InCodeBlock {
                fence_char: fence.char,
                fence_count: fence.count,
            };
            return (whole(LineKind::FenceOpen { language: fence.language }), next);
        }

        if let Some(rest) = trimmed.strip_prefix(TAG_MARKER) {
            let content_start = line.len() - rest.trim_start().len();
            let tag_line = MarkdownLine {
                raw: line,
                kind: LineKind::TagMarker,
                indent,
                content_start,
            };
            return (tag_line, state);
        }

        // Up to three spaces may precede a heading marker; four or more is text
        if indent <= 3 && !line[..indent].contains('\t') {
            if let Some((level, offset)) = Self::parse_heading(trimmed) {
                let heading = MarkdownLine {
                    raw: line,
                    kind: LineKind::Heading { level },
                    indent,
                    content_start: indent + offset,
                };
                return (heading, state);
            }
        }

        if Self::is_horizontal_rule(trimmed) {
            return (whole(LineKind::HorizontalRule), state);
        }

        if let Some(rest) = trimmed.strip_prefix('>') {
            let content_start = line.len() - rest.trim_start().len();
            let quote = MarkdownLine {
                raw: line,
                kind: LineKind::Blockquote,
                indent,
                content_start,
            };
            return (quote, state);
        }

        if let Some((marker, marker_end)) = Self::parse_unordered_list(trimmed) {
            let item = MarkdownLine {
                raw: line,
                kind: LineKind::Bullet { marker },
                indent,
                content_start: indent + marker_end,
            };
            return (item, state);
        }

        if let Some(marker_end) = Self::parse_ordered_list(trimmed) {
            let item = MarkdownLine {
                raw: line,
                kind: LineKind::Ordered,
                indent,
                content_start: indent + marker_end,
            };
            return (item, state);
        }

        (whole(LineKind::Text), state)
    }

    /// Parse a code fence (``` or ~~~)
    fn parse_code_fence(line: &str) -> Option<CodeFenceInfo> {
        let fence_char = line.chars().next()?;
        if fence_char != '`' && fence_char != '~' {
            return None;
        }

        let count = line.chars().take_while(|c| *c == fence_char).count();
        if count < 3 {
            return None;
        }

        let language = line[count..].trim().to_string();
        // Backtick fences cannot carry backticks in their info string
        if fence_char == '`' && language.contains('`') {
            return None;
        }

        Some(CodeFenceInfo {
            char: fence_char,
            count,
            language,
        })
    }

    fn is_closing_fence(trimmed: &str, fence_char: char, fence_count: usize) -> bool {
        let count = trimmed.chars().take_while(|c| *c == fence_char).count();
        count >= fence_count && trimmed[count..].trim().is_empty()
    }

    /// Parse a heading, returning its level and where the heading text starts
    fn parse_heading(line: &str) -> Option<(usize, usize)> {
        let level = line.chars().take_while(|c| *c == '#').count();
        if level == 0 || level > 6 {
            return None;
        }

        let rest = &line[level..];
        if !rest.starts_with([' ', '\t']) {
            return None;
        }

        let text = rest.trim_start();
        if text.trim_end().is_empty() {
            return None;
        }

        Some((level, line.len() - text.len()))
    }

    /// Parse an unordered list marker, returning the marker and where the item text starts
    fn parse_unordered_list(line: &str) -> Option<(char, usize)> {
        let marker = line.chars().next()?;
        if !matches!(marker, '-' | '*' | '+') {
            return None;
        }

        let rest = &line[1..];
        if !rest.starts_with([' ', '\t']) {
            return None;
        }

        let text = rest.trim_start();
        if text.is_empty() {
            return None;
        }

        Some((marker, line.len() - text.len()))
    }

    /// Parse an ordered list marker, returning where the item text starts
    fn parse_ordered_list(line: &str) -> Option<usize> {
        let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
        if digits == 0 || digits > 9 {
            return None;
        }

        let rest = line[digits..].strip_prefix('.')?;
        if !rest.starts_with([' ', '\t']) {
            return None;
        }

        let text = rest.trim_start();
        if text.is_empty() {
            return None;
        }

        Some(line.len() - text.len())
    }

    /// Check for a horizontal rule: three or more of the same marker, spaces allowed
    fn is_horizontal_rule(line: &str) -> bool {
        let Some(first) = line.chars().next() else {
            return false;
        };
        if !matches!(first, '-' | '*' | '_') {
            return false;
        }

        let trimmed = line.trim_end();
        trimmed.chars().all(|c| c == first || c == ' ')
            && trimmed.chars().filter(|c| *c == first).count() >= 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_lines(text: &str) -> Vec<MarkdownLine<'_>> {
        LineClassifier::new().classify_document(text)
    }

    fn kinds(text: &str) -> Vec<LineKind> {
        classify_lines(text).into_iter().map(|l| l.kind).collect()
    }

    #[test]
    fn test_heading_levels() {
        assert_eq!(
            kinds("# One\n## Two\n### Three\n####### Seven"),
            vec![
                LineKind::Heading { level: 1 },
                LineKind::Heading { level: 2 },
                LineKind::Heading { level: 3 },
                LineKind::Text,
            ]
        );
    }

    #[test]
    fn test_heading_needs_space_and_text() {
        assert_eq!(kinds("#hashtag"), vec![LineKind::Text]);
        assert_eq!(kinds("#   "), vec![LineKind::Text]);
    }

    #[test]
    fn test_indented_heading() {
        assert_eq!(
            kinds(" # one\n   ### three\n    # four\n\t# tab"),
            vec![
                LineKind::Heading { level: 1 },
                LineKind::Heading { level: 3 },
                LineKind::Text,
                LineKind::Text,
            ]
        );

        let lines = classify_lines("  ##  Indented title");
        assert_eq!(lines[0].content(), "Indented title");
        assert_eq!(lines[0].indentation(), "  ");
    }

    #[test]
    fn test_heading_content() {
        let lines = classify_lines("##   Spaced title");
        assert_eq!(lines[0].content(), "Spaced title");
    }

    #[test]
    fn test_tag_marker_is_not_heading() {
        let lines = classify_lines("#タグ: AI, Tech");
        assert_eq!(lines[0].kind, LineKind::TagMarker);
        assert_eq!(lines[0].content(), "AI, Tech");
    }

    #[test]
    fn test_code_block() {
        let lines = classify_lines("```rust\n# not a heading\n- not a bullet\n```\n# Heading");
        assert_eq!(
            lines[0].kind,
            LineKind::FenceOpen {
                language: "rust".to_string()
            }
        );
        assert_eq!(lines[1].kind, LineKind::CodeContent);
        assert_eq!(lines[2].kind, LineKind::CodeContent);
        assert_eq!(lines[3].kind, LineKind::FenceClose);
        assert_eq!(lines[4].kind, LineKind::Heading { level: 1 });
    }

    #[test]
    fn test_unclosed_fence_runs_to_end() {
        let lines = classify_lines("~~~\ncode\n```\nstill code");
        assert_eq!(lines[2].kind, LineKind::CodeContent);
        assert_eq!(lines[3].kind, LineKind::CodeContent);
    }

    #[test]
    fn test_list_items() {
        let lines = classify_lines("-   spaced\n  * star\n12. twelve\n-nospace\n3.5 percent");
        assert_eq!(lines[0].kind, LineKind::Bullet { marker: '-' });
        assert_eq!(lines[0].content(), "spaced");
        assert_eq!(lines[1].kind, LineKind::Bullet { marker: '*' });
        assert_eq!(lines[1].indentation(), "  ");
        assert_eq!(lines[2].kind, LineKind::Ordered);
        assert_eq!(lines[2].content(), "twelve");
        assert_eq!(lines[3].kind, LineKind::Text);
        assert_eq!(lines[4].kind, LineKind::Text);
    }

    #[test]
    fn test_blockquote_content() {
        let lines = classify_lines(">   quoted");
        assert_eq!(lines[0].kind, LineKind::Blockquote);
        assert_eq!(lines[0].content(), "quoted");
    }

    #[test]
    fn test_horizontal_rule_before_bullet() {
        assert_eq!(
            kinds("---\n- - -\n***\n--"),
            vec![
                LineKind::HorizontalRule,
                LineKind::HorizontalRule,
                LineKind::HorizontalRule,
                LineKind::Text,
            ]
        );
    }

    #[test]
    fn test_multibyte_text() {
        assert_eq!(kinds("エージェントとは"), vec![LineKind::Text]);
        assert_eq!(kinds("- 日本語の項目")[0], LineKind::Bullet { marker: '-' });
    }
}
