// src/error.rs
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use std::time::Duration;
use thiserror::Error;

use crate::message::{ChatResponse, ErrorDetails};
use crate::services::completion::CompletionError;

pub const INVALID_MESSAGE_REPLY: &str = "Please provide a valid message.";
pub const TOO_MANY_REQUESTS_REPLY: &str = "Too many requests, please try again later.";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid chat message: {0}")]
    BadRequest(String),
    #[error("too many requests")]
    TooManyRequests { retry_after: Duration },
    #[error("completion failed: {source}")]
    Completion {
        source: CompletionError,
        expose_details: bool,
    },
}

impl AppError {
    pub fn completion(source: CompletionError, expose_details: bool) -> Self {
        AppError::Completion { source, expose_details }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Completion { source, .. } => match source {
                CompletionError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self {
            AppError::BadRequest(_) => {
                (status, Json(ChatResponse::new(INVALID_MESSAGE_REPLY))).into_response()
            }
            AppError::TooManyRequests { retry_after } => {
                let mut resp =
                    (status, Json(ChatResponse::new(TOO_MANY_REQUESTS_REPLY))).into_response();
                // Round up so clients never retry early.
                let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
                resp.headers_mut()
                    .insert(RETRY_AFTER, HeaderValue::from(secs.max(1)));
                resp
            }
            AppError::Completion { source, expose_details } => {
                let body = ChatResponse {
                    reply: source.user_message().to_string(),
                    error_details: expose_details.then(|| ErrorDetails {
                        kind: source.kind().to_string(),
                        detail: source.to_string(),
                    }),
                };
                (status, Json(body)).into_response()
            }
        }
    }
}
