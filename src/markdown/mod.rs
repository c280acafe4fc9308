//! Markdown module for Note Drafter
//!
//! Handles article markdown including:
//! - Line classification
//! - Normalization into canonical form
//! - Preview rendering
//! - Export functionality (standalone HTML)

pub mod export;
pub mod normalizer;
pub mod preview;
pub mod syntax;

pub use export::{ArticleExporter, HtmlExportOptions};
pub use normalizer::{format_for_preview, normalize_article, MarkdownNormalizer};
pub use preview::{markdown_to_html, PreviewRenderer};
pub use syntax::{LineClassifier, LineKind, LineState, MarkdownLine, TAG_MARKER};
