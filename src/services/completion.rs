// src/services/completion.rs
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: MessageRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: MessageRole::User, content: content.into() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Failure reported by a completion backend.
///
/// Display strings end up in logs and, outside production, in `errorDetails`,
/// so variants never carry the credential or raw upstream auth messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    #[error("credential rejected by completion service")]
    Unauthorized,
    #[error("completion service rate limit exceeded")]
    RateLimited,
    #[error("completion service rejected the request: {0}")]
    BadRequest(String),
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("network failure: {0}")]
    Network(String),
    #[error("unexpected completion failure: {0}")]
    Unknown(String),
}

impl CompletionError {
    pub fn kind(&self) -> &'static str {
        match self {
            CompletionError::Unauthorized => "unauthorized",
            CompletionError::RateLimited => "rate_limited",
            CompletionError::BadRequest(_) => "bad_request",
            CompletionError::ModelUnavailable(_) => "model_unavailable",
            CompletionError::Network(_) => "network",
            CompletionError::Unknown(_) => "unknown",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            CompletionError::Unauthorized => {
                "Authentication error with the AI service. Please contact support."
            }
            CompletionError::RateLimited => {
                "The AI service is busy right now. Please try again later."
            }
            CompletionError::BadRequest(_) => {
                "The AI service could not process this request (invalid request)."
            }
            CompletionError::ModelUnavailable(_) => {
                "The AI model is currently unavailable. Please try again later."
            }
            CompletionError::Network(_) => {
                "Network issue while contacting the AI service. Please try again."
            }
            CompletionError::Unknown(_) => "Sorry, something went wrong.",
        }
    }
}

/// Text generation backend used by the chatbot.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Generate a reply for `request`. Returns the raw generated text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;

    /// Cheap authenticated call confirming the credential is currently usable.
    async fn verify_credentials(&self) -> Result<(), CompletionError>;
}
