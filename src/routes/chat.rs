use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde_json::Value;
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

use crate::{
    error::AppError,
    message::{ChatRequest, ChatResponse},
    services::chatbot::ReplySource,
    state::SharedState,
};

pub async fn chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("chat", %request_id);

    async move {
        // Malformed or non-JSON bodies are treated like a missing message.
        let Json(body) = payload.map_err(|rejection| {
            info!(reason = %rejection.body_text(), "rejected chat body");
            AppError::BadRequest(rejection.body_text())
        })?;

        let request = ChatRequest::from_json(&body).inspect_err(|err| {
            info!(reason = %err, "rejected chat message");
        })?;

        let reply = state
            .chatbot
            .reply(&request.message)
            .await
            .map_err(|err| {
                error!(kind = err.kind(), error = %err, "chat completion failed");
                AppError::completion(err, state.config.expose_error_details)
            })?;

        match &reply.source {
            ReplySource::Intent(intent) => info!(intent = %intent, "chat answered"),
            ReplySource::Model(model) => info!(model = %model, "chat answered"),
        }

        Ok::<_, AppError>(Json(ChatResponse::new(reply.text)))
    }
    .instrument(span)
    .await
}
