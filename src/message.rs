// src/message.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    /// Already trimmed, never empty.
    pub message: String,
}

impl ChatRequest {
    /// Validate a raw JSON body. The `message` field must be a string with visible content.
    pub fn from_json(body: &Value) -> Result<Self, AppError> {
        let message = match body.get("message") {
            Some(Value::String(s)) => s.trim(),
            Some(_) => return Err(AppError::BadRequest("message is not a string".into())),
            None => return Err(AppError::BadRequest("message is missing".into())),
        };

        if message.is_empty() {
            return Err(AppError::BadRequest("message is empty".into()));
        }

        Ok(Self { message: message.to_string() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetails {
    #[serde(rename = "type")]
    pub kind: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    #[serde(rename = "errorDetails", default, skip_serializing_if = "Option::is_none")]
    pub error_details: Option<ErrorDetails>,
}

impl ChatResponse {
    pub fn new(reply: impl Into<String>) -> Self {
        Self { reply: reply.into(), error_details: None }
    }
}
