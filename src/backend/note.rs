//! note.com draft publishing client
//!
//! One publish attempt is login (when needed), create, then save. The
//! session lock is held for the whole attempt so concurrent publishes never
//! interleave a login.

use super::{DraftPublisher, PublishOutcome};
use crate::article::GeneratedArticle;
use crate::config::PublisherConfig;
use crate::error::{PublishError, PublishResult};
use crate::state::PublisherSession;
use async_trait::async_trait;
use reqwest::header::{COOKIE, SET_COOKIE};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;

/// Name of the note.com session cookie
pub const SESSION_COOKIE: &str = "_note_session_v3";

/// Message returned with a saved draft
pub const SAVED_MESSAGE: &str = "記事が下書きとして保存されました";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct DraftSaveRequest<'a> {
    body: &'a str,
    name: &'a str,
    tags: String,
    status: &'static str,
    publish_at: String,
    price: u32,
    is_note_intro_enabled: bool,
}

impl<'a> DraftSaveRequest<'a> {
    fn new(article: &'a GeneratedArticle) -> Self {
        Self {
            body: &article.content,
            name: &article.title,
            tags: article.joined_tags(),
            status: "draft",
            publish_at: chrono::Utc::now().to_rfc3339(),
            price: 0,
            is_note_intro_enabled: true,
        }
    }
}

/// Find the session cookie among `Set-Cookie` values, keeping only `name=value`
pub fn extract_session_cookie<'a, I>(set_cookies: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    set_cookies
        .into_iter()
        .find(|cookie| cookie.contains(SESSION_COOKIE))
        .and_then(|cookie| cookie.split(';').next())
        .map(|pair| pair.trim().to_string())
}

/// The new draft's id from a create response, as text
fn draft_id(response: &Value) -> Option<String> {
    match response.pointer("/data/id")? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Whether a save response reports success through a truthy `data.result`
fn save_succeeded(response: &Value) -> bool {
    match response.pointer("/data/result") {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map_or(false, |v| v != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        Some(Value::Null) | None => false,
    }
}

/// Client for the note.com draft API
pub struct NoteClient {
    http_client: reqwest::Client,
    config: PublisherConfig,
    session: Mutex<PublisherSession>,
}

impl NoteClient {
    pub fn new(config: &PublisherConfig) -> PublishResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| PublishError::Transport(e.to_string()))?;

        let mut config = config.clone();
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        config.edit_url = config.edit_url.trim_end_matches('/').to_string();

        Ok(Self {
            http_client,
            config,
            session: Mutex::new(PublisherSession::new()),
        })
    }

    /// Whether email and password are both configured
    pub fn has_credentials(&self) -> bool {
        self.config.email.is_some() && self.config.password.is_some()
    }

    /// Run one publish attempt against an already locked session
    async fn publish_with_session(
        &self,
        session: &mut PublisherSession,
        article: &GeneratedArticle,
    ) -> PublishResult<String> {
        if session.needs_login() {
            let cookie = self.login().await?;
            session.authenticate(cookie);
            log::info!("Logged in to note");
        }

        let cookie = session
            .token()
            .ok_or(PublishError::MissingSessionCookie)?
            .to_string();

        let id = self.create_draft(&cookie).await?;
        self.save_draft(&cookie, &id, article).await?;

        Ok(format!("{}/{}", self.config.edit_url, id))
    }

    async fn login(&self) -> PublishResult<String> {
        let (Some(email), Some(password)) = (&self.config.email, &self.config.password) else {
            return Err(PublishError::MissingCredentials);
        };

        let response = self
            .http_client
            .post(format!("{}/login", self.config.base_url))
            .json(&LoginRequest { email, password })
            .send()
            .await
            .map_err(|e| PublishError::Login(e.without_url().to_string()))?;

        if !response.status().is_success() {
            return Err(PublishError::Login(format!("HTTP {}", response.status())));
        }

        let cookies: Vec<&str> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect();

        if cookies.is_empty() {
            return Err(PublishError::MissingCookies);
        }

        extract_session_cookie(cookies).ok_or(PublishError::MissingSessionCookie)
    }

    async fn create_draft(&self, cookie: &str) -> PublishResult<String> {
        let response = self
            .post_json(&format!("{}/text_notes/create", self.config.base_url), cookie, &serde_json::json!({}))
            .await?;

        draft_id(&response).ok_or(PublishError::CreateFailed)
    }

    async fn save_draft(&self, cookie: &str, id: &str, article: &GeneratedArticle) -> PublishResult<()> {
        let url = format!("{}/text_notes/draft_save?id={}", self.config.base_url, id);
        let response = self
            .post_json(&url, cookie, &DraftSaveRequest::new(article))
            .await?;

        if save_succeeded(&response) {
            Ok(())
        } else {
            Err(PublishError::SaveFailed)
        }
    }

    /// POST a JSON body with the session cookie and decode the JSON answer
    async fn post_json<T: Serialize + ?Sized>(&self, url: &str, cookie: &str, body: &T) -> PublishResult<Value> {
        let response = self
            .http_client
            .post(url)
            .header(COOKIE, cookie)
            .json(body)
            .send()
            .await
            .map_err(|e| PublishError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PublishError::Transport(format!("HTTP {}", status)));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| PublishError::Transport(e.without_url().to_string()))
    }
}

#[async_trait]
impl DraftPublisher for NoteClient {
    async fn publish(&self, article: &GeneratedArticle) -> PublishOutcome {
        let mut session = self.session.lock().await;
        log::debug!("Publishing '{}' with {} session", article.title, session.describe());

        match self.publish_with_session(&mut session, article).await {
            Ok(url) => {
                log::info!("Saved draft '{}' at {}", article.title, url);
                PublishOutcome::saved(url, SAVED_MESSAGE)
            }
            Err(e) => {
                log::warn!("Publishing '{}' failed: {}", article.title, e);
                session.expire();
                PublishOutcome::failed(e.user_message())
            }
        }
    }
}
