pub mod chatbot;
pub mod completion;
pub mod intents;
pub mod openai;
pub mod rate_limiter;
