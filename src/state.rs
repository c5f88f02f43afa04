// src/state.rs
use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::chatbot::Chatbot;
use crate::services::completion::CompletionClient;
use crate::services::rate_limiter::RateLimiter;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: AppConfig,
    pub chatbot: Chatbot,
    pub limiter: RateLimiter,
}

impl AppState {
    pub fn new(config: AppConfig, client: Arc<dyn CompletionClient>) -> Self {
        Self {
            chatbot: Chatbot::new(&config, client),
            limiter: RateLimiter::new(config.rate_limit.max_requests, config.rate_limit.window),
            config,
        }
    }
}
