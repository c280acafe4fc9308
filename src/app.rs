//! HTTP application for Note Drafter
//!
//! Holds the shared state handed to every handler and assembles the router.

use crate::backend::{DraftPublisher, GeminiClient, NoteClient, TextGenerator};
use crate::config::Config;
use crate::error::AppResult;
use crate::routes;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<dyn TextGenerator>,
    pub publisher: Arc<dyn DraftPublisher>,
}

impl AppState {
    pub fn new(generator: Arc<dyn TextGenerator>, publisher: Arc<dyn DraftPublisher>) -> Self {
        Self {
            generator,
            publisher,
        }
    }

    /// Build the real backend clients from configuration
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let gemini = GeminiClient::new(&config.generation)?;
        if config.generation.api_key.is_none() {
            log::warn!("GEMINI_API_KEY is not set; article generation will fail");
        }
        log::info!("Generating articles with {}", gemini.model());

        let note = NoteClient::new(&config.publisher)?;
        if !note.has_credentials() {
            log::warn!("NOTE_EMAIL or NOTE_PASSWORD is not set; publishing will fail");
        }

        Ok(Self::new(Arc::new(gemini), Arc::new(note)))
    }
}

/// Assemble the service router
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::article_routes())
        .merge(routes::health_routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
