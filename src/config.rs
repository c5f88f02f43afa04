// src/config.rs
use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

use thiserror::Error;

use crate::services::intents::IntentReplies;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_FALLBACK_MODELS: &str = "gpt-3.5-turbo";
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful customer care agent for Maizic Smarthome.";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY is not set")]
    MissingCredential,
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("cannot read intents file {path}: {source}")]
    IntentsFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse intents file {path}: {source}")]
    IntentsParse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format {other:?}, expected compact, pretty or json")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

/// Process configuration, validated once at startup.
#[derive(Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub api_base_url: String,
    pub environment: Environment,
    pub port: u16,
    /// Primary model first, then fallbacks.
    pub models: Vec<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub request_timeout: Duration,
    pub system_prompt: String,
    pub intent_replies: IntentReplies,
    pub allowed_origins: Vec<String>,
    pub rate_limit: RateLimitConfig,
    pub trust_proxy: bool,
    pub debug_endpoint: bool,
    pub expose_error_details: bool,
    pub log_format: LogFormat,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("environment", &self.environment)
            .field("port", &self.port)
            .field("models", &self.models)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("request_timeout", &self.request_timeout)
            .field("allowed_origins", &self.allowed_origins)
            .field("rate_limit", &self.rate_limit)
            .field("trust_proxy", &self.trust_proxy)
            .field("debug_endpoint", &self.debug_endpoint)
            .field("expose_error_details", &self.expose_error_details)
            .field("log_format", &self.log_format)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key/value source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = get("OPENAI_API_KEY").ok_or(ConfigError::MissingCredential)?;

        let environment = match get("APP_ENV").map(|v| v.to_lowercase()).as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            _ => Environment::Development,
        };

        let port = parse_or("PORT", get("PORT"), DEFAULT_PORT)?;

        let primary = get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        // Explicitly empty disables fallbacks, unset uses the default list.
        let fallbacks = match lookup("OPENAI_FALLBACK_MODELS") {
            Some(raw) => split_list(&raw),
            None => split_list(DEFAULT_FALLBACK_MODELS),
        };
        let mut models = vec![primary];
        for model in fallbacks {
            if !models.contains(&model) {
                models.push(model);
            }
        }

        let max_tokens: u32 = parse_or("OPENAI_MAX_TOKENS", get("OPENAI_MAX_TOKENS"), 500)?;
        if max_tokens == 0 {
            return Err(invalid("OPENAI_MAX_TOKENS", "0", "must be greater than zero"));
        }

        let temperature: f32 = parse_or("OPENAI_TEMPERATURE", get("OPENAI_TEMPERATURE"), 0.7)?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(invalid(
                "OPENAI_TEMPERATURE",
                &temperature.to_string(),
                "must be between 0.0 and 2.0",
            ));
        }

        let timeout_secs: u64 = parse_or("OPENAI_TIMEOUT_SECS", get("OPENAI_TIMEOUT_SECS"), 30)?;
        if timeout_secs == 0 {
            return Err(invalid("OPENAI_TIMEOUT_SECS", "0", "must be greater than zero"));
        }

        let intent_replies = match get("INTENTS_FILE") {
            Some(path) => load_intents(PathBuf::from(path))?,
            None => IntentReplies::default(),
        };

        let window_secs: u64 = parse_or("RATE_LIMIT_WINDOW_SECS", get("RATE_LIMIT_WINDOW_SECS"), 900)?;
        if window_secs == 0 {
            return Err(invalid("RATE_LIMIT_WINDOW_SECS", "0", "must be greater than zero"));
        }
        let rate_limit = RateLimitConfig {
            max_requests: parse_or("RATE_LIMIT_MAX", get("RATE_LIMIT_MAX"), 100)?,
            window: Duration::from_secs(window_secs),
        };

        Ok(Self {
            api_key,
            api_base_url: get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            environment,
            port,
            models,
            max_tokens,
            temperature,
            request_timeout: Duration::from_secs(timeout_secs),
            system_prompt: get("SYSTEM_PROMPT").unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            intent_replies,
            allowed_origins: get("CORS_ALLOWED_ORIGINS")
                .map(|v| split_list(&v))
                .unwrap_or_default(),
            rate_limit,
            trust_proxy: parse_bool("TRUST_PROXY", get("TRUST_PROXY"), false)?,
            debug_endpoint: parse_bool(
                "ENABLE_DEBUG_ENDPOINT",
                get("ENABLE_DEBUG_ENDPOINT"),
                !environment.is_production(),
            )?,
            expose_error_details: !environment.is_production(),
            log_format: parse_or("LOG_FORMAT", get("LOG_FORMAT"), LogFormat::Compact)?,
        })
    }

    pub fn api_key_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

fn invalid(key: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw {
        Some(value) => value
            .parse()
            .map_err(|e: T::Err| invalid(key, &value, &e.to_string())),
        None => Ok(default),
    }
}

fn parse_bool(key: &'static str, raw: Option<String>, default: bool) -> Result<bool, ConfigError> {
    match raw.as_deref().map(str::to_lowercase).as_deref() {
        None => Ok(default),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(invalid(key, other, "expected true or false")),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn load_intents(path: PathBuf) -> Result<IntentReplies, ConfigError> {
    let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::IntentsFile {
        path: path.clone(),
        source,
    })?;
    IntentReplies::from_json(&raw).map_err(|source| ConfigError::IntentsParse { path, source })
}
