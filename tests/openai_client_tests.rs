use std::time::Duration;

use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use maizic_chatbot::services::completion::{
    ChatMessage, CompletionClient, CompletionError, CompletionRequest,
};
use maizic_chatbot::services::openai::OpenAiClient;
use serde_json::{Value, json};

const KEY: &str = "sk-mock";

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {KEY}"))
}

async fn completions(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": {"message": "Incorrect API key provided", "code": "invalid_api_key"}})),
        );
    }

    match body["model"].as_str() {
        Some("missing-model") => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": {"message": "The model `missing-model` does not exist", "code": "model_not_found"}})),
        ),
        Some("busy-model") => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({"error": {"message": "Rate limit reached"}})),
        ),
        Some("empty-model") => (StatusCode::OK, Json(json!({"choices": []}))),
        _ => {
            let user = body["messages"][1]["content"].as_str().unwrap_or_default();
            let max_tokens = body["max_tokens"].as_u64().unwrap_or_default();
            (
                StatusCode::OK,
                Json(json!({
                    "choices": [{
                        "message": {"role": "assistant", "content": format!(" echo: {user} ({max_tokens}) ")}
                    }]
                })),
            )
        }
    }
}

async fn models(headers: HeaderMap) -> StatusCode {
    if authorized(&headers) { StatusCode::OK } else { StatusCode::UNAUTHORIZED }
}

async fn spawn_mock() -> String {
    let app = Router::new()
        .route("/v1/chat/completions", post(completions))
        .route("/v1/models", get(models));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/v1/")
}

fn request(model: &str) -> CompletionRequest {
    CompletionRequest {
        model: model.to_string(),
        messages: vec![ChatMessage::system("be nice"), ChatMessage::user("hi there")],
        max_tokens: 42,
        temperature: 0.7,
    }
}

fn client(base: &str, key: &str) -> OpenAiClient {
    OpenAiClient::new(base, key, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn completes_against_mock_upstream() {
    let base = spawn_mock().await;
    let text = client(&base, KEY).complete(&request("gpt-4")).await.unwrap();
    assert_eq!(text, " echo: hi there (42) ");
}

#[tokio::test]
async fn maps_upstream_failures() {
    let base = spawn_mock().await;

    let err = client(&base, "sk-wrong").complete(&request("gpt-4")).await.unwrap_err();
    assert_eq!(err, CompletionError::Unauthorized);

    let ok = client(&base, KEY);
    assert!(matches!(
        ok.complete(&request("missing-model")).await,
        Err(CompletionError::ModelUnavailable(_))
    ));
    assert_eq!(ok.complete(&request("busy-model")).await, Err(CompletionError::RateLimited));
    assert!(matches!(
        ok.complete(&request("empty-model")).await,
        Err(CompletionError::Unknown(_))
    ));
}

#[tokio::test]
async fn verifies_credentials() {
    let base = spawn_mock().await;
    assert_eq!(client(&base, KEY).verify_credentials().await, Ok(()));
    assert_eq!(
        client(&base, "sk-wrong").verify_credentials().await,
        Err(CompletionError::Unauthorized)
    );
}

#[tokio::test]
async fn unreachable_upstream_is_a_network_failure() {
    // Bind then drop to get a port nobody listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{addr}/v1"), KEY)
        .complete(&request("gpt-4"))
        .await
        .unwrap_err();
    assert!(matches!(err, CompletionError::Network(_)), "got {err:?}");
}

#[tokio::test]
async fn stalled_upstream_times_out_as_network_failure() {
    // Accept connections but never answer.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let client = OpenAiClient::new(format!("http://{addr}/v1"), KEY, Duration::from_secs(1)).unwrap();
    let err = client.complete(&request("gpt-4")).await.unwrap_err();
    assert!(matches!(err, CompletionError::Network(_)), "got {err:?}");
}
