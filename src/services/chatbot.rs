// src/services/chatbot.rs
use std::sync::Arc;

use tracing::{info, warn};

use super::completion::{ChatMessage, CompletionClient, CompletionError, CompletionRequest};
use super::intents::{Intent, IntentReplies};
use crate::config::AppConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplySource {
    Intent(Intent),
    Model(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotReply {
    pub text: String,
    pub source: ReplySource,
}

/// Answers a validated user message, either from canned intent replies or the completion backend.
#[derive(Clone)]
pub struct Chatbot {
    client: Arc<dyn CompletionClient>,
    system_prompt: String,
    models: Vec<String>,
    max_tokens: u32,
    temperature: f32,
    intents: IntentReplies,
}

impl Chatbot {
    pub fn new(config: &AppConfig, client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client,
            system_prompt: config.system_prompt.clone(),
            models: config.models.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            intents: config.intent_replies.clone(),
        }
    }

    pub fn client(&self) -> &Arc<dyn CompletionClient> {
        &self.client
    }

    pub async fn reply(&self, message: &str) -> Result<BotReply, CompletionError> {
        if let Some((intent, canned)) = self.intents.resolve(message) {
            info!(intent = %intent, "answered from canned intent reply");
            return Ok(BotReply {
                text: canned.to_string(),
                source: ReplySource::Intent(intent),
            });
        }

        self.complete_with_fallback(message).await
    }

    /// Try each configured model in order. Only an unavailable model moves on to the next one.
    async fn complete_with_fallback(&self, message: &str) -> Result<BotReply, CompletionError> {
        let messages = vec![
            ChatMessage::system(self.system_prompt.as_str()),
            ChatMessage::user(message),
        ];

        let mut last_err = CompletionError::Unknown("no models configured".to_string());

        for model in &self.models {
            let request = CompletionRequest {
                model: model.clone(),
                messages: messages.clone(),
                max_tokens: self.max_tokens,
                temperature: self.temperature,
            };

            match self.client.complete(&request).await {
                Ok(text) => {
                    info!(model = %model, "completion succeeded");
                    return Ok(BotReply {
                        text: text.trim().to_string(),
                        source: ReplySource::Model(model.clone()),
                    });
                }
                Err(err @ CompletionError::ModelUnavailable(_)) => {
                    warn!(model = %model, error = %err, "model unavailable, trying next");
                    last_err = err;
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_err)
    }
}
