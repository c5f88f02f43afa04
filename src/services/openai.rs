// src/services/openai.rs
//! OpenAI-compatible chat completions client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::completion::{ChatMessage, CompletionClient, CompletionError, CompletionRequest};

pub struct OpenAiClient {
    http: Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: Option<String>,
}

impl OpenAiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let body = ChatCompletionBody {
            model: &request.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        debug!(model = %request.model, "sending chat completion request");

        let resp = self
            .http
            .post(self.url("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_failure)?;

        let status = resp.status();
        if !status.is_success() {
            let err_body = resp.text().await.unwrap_or_default();
            return Err(classify_failure(status, &err_body));
        }

        let parsed: ChatCompletionResponse = resp.json().await.map_err(transport_failure)?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| CompletionError::Unknown("completion contained no text".to_string()))
    }

    async fn verify_credentials(&self) -> Result<(), CompletionError> {
        let resp = self
            .http
            .get(self.url("models"))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(transport_failure)?;

        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            let err_body = resp.text().await.unwrap_or_default();
            Err(classify_failure(status, &err_body))
        }
    }
}

/// Map a non-success upstream response to a typed failure.
pub fn classify_failure(status: StatusCode, body: &str) -> CompletionError {
    let api_error = serde_json::from_str::<ApiErrorBody>(body).ok().map(|b| b.error);
    let code = api_error.as_ref().and_then(|e| e.code.clone());
    let message = api_error
        .map(|e| e.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| status.to_string());

    warn!(status = status.as_u16(), code = ?code, "completion service returned an error");

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CompletionError::Unauthorized,
        StatusCode::TOO_MANY_REQUESTS => CompletionError::RateLimited,
        StatusCode::NOT_FOUND => CompletionError::ModelUnavailable(message),
        StatusCode::BAD_REQUEST if code.as_deref() == Some("model_not_found") => {
            CompletionError::ModelUnavailable(message)
        }
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            CompletionError::BadRequest(message)
        }
        _ => CompletionError::Unknown(format!("upstream returned {status}")),
    }
}

fn transport_failure(err: reqwest::Error) -> CompletionError {
    if err.is_decode() {
        CompletionError::Unknown(format!("malformed completion response: {err}"))
    } else if err.is_timeout() || err.is_connect() || err.is_request() || err.is_body() {
        CompletionError::Network(err.to_string())
    } else {
        CompletionError::Unknown(err.to_string())
    }
}
