#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use maizic_chatbot::config::AppConfig;
use maizic_chatbot::services::completion::{
    CompletionClient, CompletionError, CompletionRequest,
};

pub const TEST_API_KEY: &str = "sk-test-secret-key-1234";

/// Scripted completion backend. Answers per model and records every request.
#[derive(Default)]
pub struct FakeCompletion {
    responses: HashMap<String, Result<String, CompletionError>>,
    default: Option<Result<String, CompletionError>>,
    credentials: Option<CompletionError>,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl FakeCompletion {
    pub fn replying(text: &str) -> Self {
        Self { default: Some(Ok(text.to_string())), ..Default::default() }
    }

    pub fn failing(err: CompletionError) -> Self {
        Self { default: Some(Err(err)), ..Default::default() }
    }

    pub fn with_model(mut self, model: &str, result: Result<String, CompletionError>) -> Self {
        self.responses.insert(model.to_string(), result);
        self
    }

    pub fn rejecting_credentials(mut self, err: CompletionError) -> Self {
        self.credentials = Some(err);
        self
    }

    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called_models(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.model).collect()
    }
}

#[async_trait]
impl CompletionClient for FakeCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        self.calls.lock().unwrap().push(request.clone());
        self.responses
            .get(&request.model)
            .or(self.default.as_ref())
            .cloned()
            .unwrap_or_else(|| Err(CompletionError::Unknown("no scripted response".into())))
    }

    async fn verify_credentials(&self) -> Result<(), CompletionError> {
        match &self.credentials {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

pub fn config_with(extra: &[(&str, &str)]) -> AppConfig {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("OPENAI_API_KEY".to_string(), TEST_API_KEY.to_string()),
    ]);
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }
    AppConfig::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

pub fn test_config() -> AppConfig {
    config_with(&[])
}

pub fn shared(fake: FakeCompletion) -> (Arc<FakeCompletion>, Arc<dyn CompletionClient>) {
    let fake = Arc::new(fake);
    let client: Arc<dyn CompletionClient> = fake.clone();
    (fake, client)
}
