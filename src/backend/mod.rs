//! Backend clients for Note Drafter
//!
//! - `gemini`: article generation via the Gemini `generateContent` API
//! - `note`: draft publishing to note.com
//!
//! Route handlers only see the traits below, so tests can swap in stubs.

pub mod gemini;
pub mod note;

pub use gemini::GeminiClient;
pub use note::NoteClient;

use crate::article::GeneratedArticle;
use crate::error::GenerationResult;
use async_trait::async_trait;
use serde::Serialize;

/// Produces raw article text from a prompt
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> GenerationResult<String>;
}

/// Saves an article as a draft on the publishing platform
///
/// Failures are reported in the outcome rather than as an error.
#[async_trait]
pub trait DraftPublisher: Send + Sync {
    async fn publish(&self, article: &GeneratedArticle) -> PublishOutcome;
}

/// Result of one publish attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl PublishOutcome {
    pub fn saved(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            url: Some(url.into()),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            url: None,
        }
    }
}
