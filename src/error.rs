//! Error types for Note Drafter
//!
//! This module defines all custom error types used throughout the service.
//! Error types are organized by category so route handlers can map them to
//! status codes and user-friendly messages. `ConfigError` stays out of
//! `AppError`: configuration only fails at startup, before any request.
//!
//! Parse degradation (no title, no tags in generated text) has no variant:
//! fallbacks apply instead.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Main application error type encompassing all error categories
#[derive(Error, Debug)]
pub enum AppError {
    /// Request payload failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Generative backend errors
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Publishing backend errors
    #[error(transparent)]
    Publish(#[from] PublishError),

    /// Publisher reported a failed attempt
    #[error("{0}")]
    PublishFailed(String),
}

/// Validation failures on incoming ideas and articles
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required blog idea field is missing or blank
    #[error("Blog idea field is required: {field}")]
    MissingIdeaField { field: &'static str },

    /// A required article field is missing or blank
    #[error("Article field is required: {field}")]
    MissingArticleField { field: &'static str },
}

/// Errors raised while calling the generative backend
#[derive(Error, Debug)]
pub enum GenerationError {
    /// No API key configured
    #[error("Gemini API key is not configured")]
    MissingApiKey,

    /// Transport-level failure (connection, TLS, body read)
    #[error("Could not reach Gemini API: {0}")]
    Transport(String),

    /// Request timed out
    #[error("Gemini API request timed out")]
    Timeout,

    /// Backend answered with an error object or non-success status
    #[error("Gemini API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response carried no candidates
    #[error("Gemini API returned an empty response")]
    EmptyResponse,

    /// First candidate had no content or no text part
    #[error("Gemini API returned a malformed response")]
    MalformedResponse,
}

/// Errors raised while publishing a draft
#[derive(Error, Debug)]
pub enum PublishError {
    /// Email or password not configured
    #[error("note credentials are not configured")]
    MissingCredentials,

    /// Login request failed
    #[error("Could not log in to note: {0}")]
    Login(String),

    /// Login response did not set any cookie
    #[error("Login failed: no cookies were returned")]
    MissingCookies,

    /// Login response did not set the session cookie
    #[error("Login failed: session cookie not found")]
    MissingSessionCookie,

    /// Draft creation did not return a document id
    #[error("Could not obtain a note id for the new draft")]
    CreateFailed,

    /// Draft save was rejected
    #[error("Could not save the draft")]
    SaveFailed,

    /// Transport-level failure
    #[error("Could not reach note: {0}")]
    Transport(String),
}

/// Configuration related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error loading configuration file
    #[error("Could not load configuration: {0}")]
    LoadError(String),

    /// Error parsing configuration
    #[error("Invalid configuration format: {0}")]
    ParseError(String),

    /// Invalid configuration value
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    /// Configuration directory error
    #[error("Could not access configuration directory")]
    DirectoryError,
}

/// Result type alias for operations that can fail with AppError
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for generation operations
pub type GenerationResult<T> = Result<T, GenerationError>;

/// Result type alias for publish operations
pub type PublishResult<T> = Result<T, PublishError>;

impl GenerationError {
    /// Create a user-friendly error message suitable for the response body
    pub fn user_message(&self) -> String {
        match self {
            GenerationError::MissingApiKey => {
                "Article generation is not configured on this server.".to_string()
            }
            GenerationError::Timeout => {
                "The article took too long to generate. Please try again.".to_string()
            }
            GenerationError::Api { message, .. } => format!("Gemini API error: {}", message),
            _ => self.to_string(),
        }
    }
}

impl PublishError {
    /// Create a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            PublishError::Login(_)
            | PublishError::MissingCookies
            | PublishError::MissingSessionCookie => "Could not log in to note.".to_string(),
            PublishError::MissingCredentials => {
                "Publishing to note is not configured on this server.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl AppError {
    /// HTTP status for this error category
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Generation(_) | AppError::Publish(_) | AppError::PublishFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Create a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(e) => e.to_string(),
            AppError::Generation(e) => e.user_message(),
            AppError::Publish(e) => e.user_message(),
            AppError::PublishFailed(message) => message.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.user_message() });
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_is_bad_request() {
        let err: AppError = ValidationError::MissingIdeaField { field: "title" }.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.user_message().contains("title"));
    }

    #[test]
    fn test_backend_errors_are_server_errors() {
        let err: AppError = GenerationError::EmptyResponse.into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let err: AppError = PublishError::SaveFailed.into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_publish_failure_keeps_outcome_message() {
        let err = AppError::PublishFailed("記事の保存に失敗しました".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.user_message(), "記事の保存に失敗しました");
    }

    #[test]
    fn test_api_error_message() {
        let err = GenerationError::Api {
            status: 400,
            message: "API key not valid".to_string(),
        };
        assert_eq!(err.user_message(), "Gemini API error: API key not valid");
    }

    #[test]
    fn test_login_failures_share_message() {
        assert_eq!(
            PublishError::MissingSessionCookie.user_message(),
            PublishError::Login("401".to_string()).user_message()
        );
    }
}
