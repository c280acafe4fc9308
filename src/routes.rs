//! API routes for Note Drafter

use crate::app::AppState;
use crate::article::{article_from_response, build_prompt, BlogIdea, GeneratedArticle};
use crate::backend::PublishOutcome;
use crate::error::{AppError, AppResult};
use crate::markdown::{format_for_preview, markdown_to_html, ArticleExporter, HtmlExportOptions};
use crate::utils::text::{char_count, truncate};
use axum::{
    extract::{Query, State},
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

pub fn article_routes() -> Router<AppState> {
    Router::new()
        .route("/api/generate", post(generate))
        .route("/api/preview", post(preview))
        .route("/api/export", post(export))
        .route("/api/publish", post(publish))
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub article: GeneratedArticle,
    pub html: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ExportQuery {
    pub dark: bool,
    pub toc: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

async fn generate(
    State(state): State<AppState>,
    Json(idea): Json<BlogIdea>,
) -> AppResult<Json<GeneratedArticle>> {
    log::info!("Generating article for '{}'", truncate(&idea.title, 40));
    idea.validate()?;

    let prompt = build_prompt(&idea);
    let text = state.generator.generate(&prompt).await.map_err(|e| {
        log::error!("Article generation failed: {}", e);
        AppError::from(e)
    })?;

    let article = article_from_response(&text, idea.title.trim());
    log::info!(
        "Generated '{}' ({} chars, {} tags)",
        article.title,
        char_count(&article.content),
        article.tags.len()
    );
    Ok(Json(article))
}

async fn preview(Json(article): Json<GeneratedArticle>) -> AppResult<Json<PreviewResponse>> {
    article.validate()?;

    let article = format_for_preview(&article);
    let html = markdown_to_html(&article.content);
    Ok(Json(PreviewResponse { article, html }))
}

async fn export(
    Query(query): Query<ExportQuery>,
    Json(article): Json<GeneratedArticle>,
) -> AppResult<Html<String>> {
    article.validate()?;
    log::info!(
        "Exporting '{}' as {}",
        article.title,
        ArticleExporter::suggest_file_name(&article)
    );

    let options = HtmlExportOptions {
        dark_mode: query.dark,
        include_toc: query.toc,
        ..Default::default()
    };
    Ok(Html(ArticleExporter::new().export_html(&article, &options)))
}

async fn publish(
    State(state): State<AppState>,
    Json(article): Json<GeneratedArticle>,
) -> AppResult<Json<PublishOutcome>> {
    log::info!("Publishing '{}' as a draft", truncate(&article.title, 40));
    article.validate()?;

    let outcome = state.publisher.publish(&article).await;
    if outcome.success {
        Ok(Json(outcome))
    } else {
        log::error!("Publishing failed: {}", outcome.message);
        Err(AppError::PublishFailed(outcome.message))
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::router;
    use crate::backend::{DraftPublisher, TextGenerator};
    use crate::error::{GenerationError, GenerationResult};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct StubGenerator {
        text: Option<&'static str>,
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        async fn generate(&self, _prompt: &str) -> GenerationResult<String> {
            match self.text {
                Some(text) => Ok(text.to_string()),
                None => Err(GenerationError::EmptyResponse),
            }
        }
    }

    struct StubPublisher {
        succeed: bool,
    }

    #[async_trait]
    impl DraftPublisher for StubPublisher {
        async fn publish(&self, _article: &GeneratedArticle) -> PublishOutcome {
            if self.succeed {
                PublishOutcome::saved("https://note.com/edit/42", "saved")
            } else {
                PublishOutcome::failed("Could not save the draft")
            }
        }
    }

    fn app(text: Option<&'static str>, succeed: bool) -> Router {
        router(AppState::new(
            Arc::new(StubGenerator { text }),
            Arc::new(StubPublisher { succeed }),
        ))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn idea() -> Value {
        json!({
            "title": "エージェント入門",
            "description": "基礎から",
            "targetAudience": "開発者",
            "keyPoints": "設計",
            "contexts": []
        })
    }

    fn article() -> Value {
        json!({
            "title": "My Title",
            "content": "# My Title\n\nIntro para.\n\n### Section\nDetail.",
            "tags": ["AI"]
        })
    }

    #[tokio::test]
    async fn test_generate_returns_canonical_article() {
        let text = "# My Title\n\nIntro para.\n\n## Section\nDetail.\n\n#タグ: AI, Agents, Tech";
        let response = app(Some(text), true)
            .oneshot(post_json("/api/generate", idea()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["title"], "My Title");
        assert_eq!(body["tags"], json!(["AI", "Agents", "Tech"]));
        assert!(body["content"].as_str().unwrap().contains("### Section"));
    }

    #[tokio::test]
    async fn test_generate_falls_back_to_idea_title() {
        let response = app(Some("見出しのない本文"), true)
            .oneshot(post_json("/api/generate", idea()))
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["title"], "エージェント入門");
        assert_eq!(body["tags"], json!(["AI", "エージェント"]));
    }

    #[tokio::test]
    async fn test_generate_rejects_incomplete_idea() {
        let mut idea = idea();
        idea["description"] = json!("");
        let response = app(Some("text"), true)
            .oneshot(post_json("/api/generate", idea))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("description"));
    }

    #[tokio::test]
    async fn test_generate_backend_failure() {
        let response = app(None, true)
            .oneshot(post_json("/api/generate", idea()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_preview() {
        let response = app(None, true)
            .oneshot(post_json("/api/preview", article()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["article"], article());
        assert_eq!(
            body["html"],
            "<h1>My Title</h1>\n<p>Intro para.</p>\n<h3>Section</h3>\n<p>Detail.</p>"
        );
    }

    #[tokio::test]
    async fn test_preview_rejects_empty_content() {
        let mut article = article();
        article["content"] = json!("");
        let response = app(None, true)
            .oneshot(post_json("/api/preview", article))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_export_html_document() {
        let response = app(None, true)
            .oneshot(post_json("/api/export?toc=true", article()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/html"));

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>My Title</title>"));
        assert!(html.contains("class=\"toc\""));
    }

    #[tokio::test]
    async fn test_publish_success() {
        let response = app(None, true)
            .oneshot(post_json("/api/publish", article()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["url"], "https://note.com/edit/42");
        assert_eq!(body["message"], "saved");
    }

    #[tokio::test]
    async fn test_publish_failure_is_server_error() {
        let response = app(None, false)
            .oneshot(post_json("/api/publish", article()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Could not save the draft");
    }

    #[tokio::test]
    async fn test_publish_rejects_missing_title() {
        let mut article = article();
        article["title"] = json!(" ");
        let response = app(None, true)
            .oneshot(post_json("/api/publish", article))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(None, true)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}
