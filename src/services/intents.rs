// src/services/intents.rs
use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Warranty,
    Installation,
    Return,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Warranty => "warranty",
            Intent::Installation => "installation",
            Intent::Return => "return",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword table, checked top to bottom. First match wins.
const RULES: &[(Intent, &[&str])] = &[
    (Intent::Warranty, &["warranty"]),
    (Intent::Installation, &["install", "setup"]),
    (Intent::Return, &["return", "replace", "broken"]),
];

pub fn detect_intent(msg: &str) -> Option<Intent> {
    let msg_lower = msg.to_lowercase();

    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| msg_lower.contains(k)))
        .map(|(intent, _)| *intent)
}

/// Canned answers keyed by intent. Built once at startup, read-only after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentReplies {
    replies: HashMap<Intent, String>,
}

impl Default for IntentReplies {
    fn default() -> Self {
        let replies = HashMap::from([
            (
                Intent::Warranty,
                "All Maizic Smarthome devices come with a 1-year limited warranty from the date of purchase. \
                 Please keep your invoice handy when you contact support."
                    .to_string(),
            ),
            (
                Intent::Installation,
                "You can find step-by-step setup guides in the Maizic Smarthome app under Help > Device Setup. \
                 Make sure your phone is on a 2.4 GHz Wi-Fi network during installation."
                    .to_string(),
            ),
            (
                Intent::Return,
                "Sorry to hear about the trouble with your device. Returns and replacements are accepted \
                 within 7 days of delivery. Please share your order ID and a short description of the issue \
                 so we can help."
                    .to_string(),
            ),
        ]);
        Self { replies }
    }
}

impl IntentReplies {
    pub fn new(replies: HashMap<Intent, String>) -> Self {
        Self { replies }
    }

    /// Parse a JSON object such as `{"warranty": "..."}`. Unknown keys are rejected.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        let replies: HashMap<Intent, String> = serde_json::from_str(raw)?;
        Ok(Self::new(replies))
    }

    pub fn get(&self, intent: Intent) -> Option<&str> {
        self.replies.get(&intent).map(String::as_str)
    }

    /// Detect the intent of `msg` and return it with its canned reply, if both exist.
    pub fn resolve(&self, msg: &str) -> Option<(Intent, &str)> {
        let intent = detect_intent(msg)?;
        self.get(intent).map(|reply| (intent, reply))
    }
}
