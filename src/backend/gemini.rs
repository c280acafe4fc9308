//! Gemini `generateContent` client

use super::TextGenerator;
use crate::config::GenerationConfig;
use crate::error::{GenerationError, GenerationResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const TEMPERATURE: f32 = 0.7;
const TOP_K: u32 = 40;
const TOP_P: f32 = 0.95;
const MAX_OUTPUT_TOKENS: u32 = 8192;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationParams,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationParams {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

impl<'a> GenerateRequest<'a> {
    fn new(prompt: &'a str) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationParams {
                temperature: TEMPERATURE,
                top_k: TOP_K,
                top_p: TOP_P,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// Pull the generated text out of a `generateContent` response body
fn extract_text(status: u16, body: &str) -> GenerationResult<String> {
    let success = (200..300).contains(&status);
    let parsed: Option<GenerateResponse> = serde_json::from_str(body).ok();

    let api_message = parsed
        .as_ref()
        .and_then(|r| r.error.as_ref())
        .map(|e| e.message.clone().unwrap_or_else(|| "unknown error".to_string()));

    if !success || api_message.is_some() {
        return Err(GenerationError::Api {
            status,
            message: api_message.unwrap_or_else(|| "unknown error".to_string()),
        });
    }

    let response = parsed.ok_or(GenerationError::MalformedResponse)?;
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(GenerationError::EmptyResponse)?;

    candidate
        .content
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .ok_or(GenerationError::MalformedResponse)
}

/// Client for the Gemini API
pub struct GeminiClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: &GenerationConfig) -> GenerationResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> GenerationResult<String> {
        let api_key = self.api_key.as_deref().ok_or(GenerationError::MissingApiKey)?;
        let start = std::time::Instant::now();

        // The key travels in the query string; strip URLs from errors so it is never logged
        let response = self
            .http_client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&GenerateRequest::new(prompt))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_transport_error)?;
        log::debug!(
            "Gemini {} answered {} in {:.2}s ({} bytes)",
            self.model,
            status,
            start.elapsed().as_secs_f64(),
            body.len()
        );

        extract_text(status, &body)
    }
}

fn map_transport_error(error: reqwest::Error) -> GenerationError {
    if error.is_timeout() {
        GenerationError::Timeout
    } else {
        GenerationError::Transport(error.without_url().to_string())
    }
}
