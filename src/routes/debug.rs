use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::state::SharedState;

#[derive(Debug, Default, Deserialize)]
pub struct DebugQuery {
    pub verify: Option<String>,
}

impl DebugQuery {
    /// Accepts `1`, `true`, `yes` or `on`. Anything else leaves the check skipped.
    pub fn wants_verify(&self) -> bool {
        self.verify
            .as_deref()
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialCheck {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugStatus {
    pub status: String,
    pub environment: String,
    pub api_key_configured: bool,
    pub port: u16,
    pub models: Vec<String>,
    pub credential_check: CredentialCheck,
}

/// Read-only report of process configuration. `?verify=true` also checks the credential upstream.
pub async fn debug_handler(
    State(state): State<SharedState>,
    Query(query): Query<DebugQuery>,
) -> Json<DebugStatus> {
    let config = &state.config;

    let credential_check = if !query.wants_verify() {
        CredentialCheck { status: "skipped".into(), detail: None }
    } else {
        match state.chatbot.client().verify_credentials().await {
            Ok(()) => CredentialCheck { status: "valid".into(), detail: None },
            Err(err) => {
                warn!(kind = err.kind(), "credential check failed");
                CredentialCheck {
                    status: "invalid".into(),
                    detail: Some(err.user_message().to_string()),
                }
            }
        }
    };

    Json(DebugStatus {
        status: "ok".into(),
        environment: config.environment.as_str().into(),
        api_key_configured: config.api_key_configured(),
        port: config.port,
        models: config.models.clone(),
        credential_check,
    })
}
