//! Article module for Note Drafter
//!
//! Holds the records that flow through the drafting pipeline:
//! - `BlogIdea` and its `BlogContext` snippets (input from the form)
//! - `GeneratedArticle` (canonical output, ready for preview or publishing)
//!
//! plus the prompt builder and the generated-text parser.

pub mod parser;
pub mod prompt;

pub use parser::{article_from_response, parse_response, process_generated_text, ParsedResponse};
pub use prompt::build_prompt;

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tags used when the generated text suggests none
pub const FALLBACK_TAGS: [&str; 2] = ["AI", "エージェント"];

/// Title used when the generated text has no heading and no better title is known
pub const PLACEHOLDER_TITLE: &str = "無題の記事";

/// A free-form context snippet attached to an idea
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogContext {
    /// Opaque identifier, unique per form session
    pub id: String,
    pub content: String,
}

impl BlogContext {
    /// Create a context with a fresh identifier
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
        }
    }

    /// Whether the snippet carries any text
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Structured description of the article to generate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogIdea {
    pub title: String,
    pub description: String,
    pub target_audience: String,
    pub key_points: String,
    #[serde(default)]
    pub contexts: Vec<BlogContext>,
}

impl BlogIdea {
    /// Check that every required scalar field is present
    pub fn validate(&self) -> Result<(), ValidationError> {
        let required = [
            ("title", &self.title),
            ("description", &self.description),
            ("targetAudience", &self.target_audience),
            ("keyPoints", &self.key_points),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingIdeaField { field });
            }
        }

        Ok(())
    }

    /// Non-blank context snippets in insertion order
    pub fn non_blank_contexts(&self) -> impl Iterator<Item = &str> {
        self.contexts
            .iter()
            .filter(|c| !c.is_blank())
            .map(|c| c.content.as_str())
    }
}

/// Canonical article: `content` starts with `# <title>`, tags are unique
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedArticle {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl GeneratedArticle {
    /// Check that the article can be previewed or published
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingArticleField { field: "title" });
        }
        if self.content.trim().is_empty() {
            return Err(ValidationError::MissingArticleField { field: "content" });
        }
        Ok(())
    }

    /// Tags joined the way the publisher expects them
    pub fn joined_tags(&self) -> String {
        self.tags.join(",")
    }
}

/// The fallback tag pair as owned strings
pub fn fallback_tags() -> Vec<String> {
    FALLBACK_TAGS.iter().map(|t| t.to_string()).collect()
}
