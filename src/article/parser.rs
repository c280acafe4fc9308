//! Parsing of raw generated text
//!
//! Generated text is trusted to follow the prompt's contract only loosely, so
//! parsing never fails: a missing title is left empty for the caller to fill,
//! and a missing tag line yields the fallback tags.

use super::{fallback_tags, GeneratedArticle, PLACEHOLDER_TITLE};
use crate::markdown::{normalize_article, LineClassifier, TAG_MARKER};
use crate::utils::text::split_comma_list;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static TITLE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#[ \t]+(.+)$").unwrap());

/// Title, body and tags recovered from generated text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    /// First level-one heading, or empty when there is none
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

/// Split generated text into title, body and tags
pub fn parse_response(text: &str) -> ParsedResponse {
    let title = TITLE_LINE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    let (tags, content) = match find_tag_span(text) {
        Some((span, values)) => {
            let mut body = String::with_capacity(text.len());
            body.push_str(&text[..span.start]);
            body.push_str(&text[span.end..]);
            (split_comma_list(values), body)
        }
        None => (Vec::new(), text.to_string()),
    };

    let tags = if tags.is_empty() {
        log::debug!("Generated text carries no tag suggestions, using fallback tags");
        fallback_tags()
    } else {
        tags
    };

    ParsedResponse {
        title,
        content: content.trim().to_string(),
        tags,
    }
}

/// Locate the first `#タグ:` marker outside fenced code
///
/// Returns the byte range from the marker to the end of its line, and the
/// text after the marker.
fn find_tag_span(text: &str) -> Option<(Range<usize>, &str)> {
    let mut offset = 0;
    for line in LineClassifier::new().classify_document(text) {
        if !line.is_code() {
            if let Some(start) = line.raw.find(TAG_MARKER) {
                let values = line.raw[start + TAG_MARKER.len()..].trim();
                return Some((offset + start..offset + line.raw.len(), values));
            }
        }
        offset += line.raw.len() + 1;
    }
    None
}

/// Parse and normalize generated text, titling it `fallback_title` when it has no heading
pub fn article_from_response(text: &str, fallback_title: &str) -> GeneratedArticle {
    let parsed = parse_response(text);
    let title = if parsed.title.is_empty() {
        log::debug!("Generated text has no title heading, using '{}'", fallback_title);
        fallback_title
    } else {
        parsed.title.as_str()
    };

    normalize_article(title, &parsed.content, &parsed.tags)
}

/// Turn raw generated text into a canonical article in one pass
pub fn process_generated_text(text: &str) -> GeneratedArticle {
    article_from_response(text, PLACEHOLDER_TITLE)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str =
        "# My Title\n\nIntro para.\n\n## Section\nDetail.\n\n#タグ: AI, Agents, Tech";

    #[test]
    fn test_parse_title_and_tags() {
        let parsed = parse_response(SAMPLE);
        assert_eq!(parsed.title, "My Title");
        assert_eq!(parsed.tags, vec!["AI", "Agents", "Tech"]);
        assert_eq!(
            parsed.content,
            "# My Title\n\nIntro para.\n\n## Section\nDetail."
        );
    }

    #[test]
    fn test_title_is_first_h1_anywhere() {
        let parsed = parse_response("Preamble\n## Not this\n#   Real Title  \n# Second");
        assert_eq!(parsed.title, "Real Title");
    }

    #[test]
    fn test_missing_title_is_empty() {
        let parsed = parse_response("Just text\n#タグ: x");
        assert_eq!(parsed.title, "");
        assert_eq!(parsed.content, "Just text");
    }

    #[test]
    fn test_missing_tag_line_uses_fallback() {
        let parsed = parse_response("# T\nBody");
        assert_eq!(parsed.tags, vec!["AI", "エージェント"]);
        assert_eq!(parsed.content, "# T\nBody");
    }

    #[test]
    fn test_empty_tag_values_use_fallback() {
        let parsed = parse_response("# T\nBody\n#タグ: , ,");
        assert_eq!(parsed.tags, vec!["AI", "エージェント"]);
        assert!(!parsed.content.contains("#タグ:"));
    }

    #[test]
    fn test_only_first_tag_line_is_parsed() {
        let parsed = parse_response("#タグ: one\nBody\n#タグ: two");
        assert_eq!(parsed.tags, vec!["one"]);
        assert_eq!(parsed.content, "Body\n#タグ: two");
    }

    #[test]
    fn test_tag_line_inside_code_is_left_alone() {
        let text = "# T\n```\n#タグ: x\n```";
        let parsed = parse_response(text);
        assert_eq!(parsed.tags, vec!["AI", "エージェント"]);
        assert_eq!(parsed.content, text);

        let parsed = parse_response("```\n#タグ: x\n```\nBody #タグ: y, z");
        assert_eq!(parsed.tags, vec!["y", "z"]);
        assert_eq!(parsed.content, "```\n#タグ: x\n```\nBody");
    }

    #[test]
    fn test_end_to_end_pipeline() {
        let article = process_generated_text(SAMPLE);
        assert_eq!(article.title, "My Title");
        assert_eq!(article.tags, vec!["AI", "Agents", "Tech"]);
        assert!(article.content.starts_with("# My Title\n\n"));
        assert!(article.content.contains("### Section"));
        assert!(!article.content.contains("#タグ:"));
        assert_eq!(article.content.matches("# My Title").count(), 1);
    }

    #[test]
    fn test_placeholder_title() {
        let article = process_generated_text("本文だけの記事です。");
        assert_eq!(article.title, PLACEHOLDER_TITLE);
        assert!(article.content.starts_with("# 無題の記事\n\n"));
    }

    #[test]
    fn test_caller_fallback_title() {
        let article = article_from_response("Body only", "エージェント設計");
        assert_eq!(article.title, "エージェント設計");
        assert_eq!(article.content, "# エージェント設計\n\nBody only");
    }

    #[test]
    fn test_pipeline_output_is_stable() {
        let article = process_generated_text(SAMPLE);
        assert_eq!(article.renormalize(), article);
    }
}
